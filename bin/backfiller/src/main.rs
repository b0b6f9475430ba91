//! Entrypoint. Runs a single backfill invocation and exits.

use backfill::{BackfillError, Backfiller};
use clap::Parser;
use config::Opts;
use dotenvy::dotenv;
use eyre::WrapErr;
use rpc::ChainClient;
use storage::PostgresStore;
use tracing::{error, info, warn};
use tracing_subscriber::filter::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    if let Ok(custom_env_file) = std::env::var("ENV_FILE") {
        dotenvy::from_filename(custom_env_file)?;
    } else {
        // Try the default .env file, and ignore if it doesn't exist.
        dotenv().ok();
    }

    let opts = Opts::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let client = ChainClient::new(opts.rpc.rpc_url);
    info!(rpc_url = %client.url(), "Backfiller starting...");

    let store =
        PostgresStore::connect(&opts.postgres.database_url, opts.postgres.max_connections).await?;
    if opts.init_schema {
        store.init_schema().await?;
    }

    let end_block = match opts.end_block {
        Some(end_block) => end_block,
        None => match store
            .latest_indexed_block()
            .await
            .wrap_err("Failed to resolve the end block")?
        {
            Some(latest) => latest,
            None => {
                info!("No indexed blocks yet, nothing to backfill");
                return Ok(());
            }
        },
    };

    let backfiller = Backfiller::new(store, client, opts.backfill);
    if backfiller.opts().dry_run {
        info!("🧪 DRY-RUN MODE: Database writes disabled");
    }

    run_until_shutdown(
        backfiller.discover_and_backfill(end_block),
        tokio::signal::ctrl_c(),
        end_block,
    )
    .await
}

/// Drives one invocation to completion unless `shutdown` resolves first.
///
/// An abandoned invocation is an error, so the process exits non-zero.
async fn run_until_shutdown<F, S>(backfill: F, shutdown: S, end_block: u64) -> eyre::Result<()>
where
    F: Future<Output = Result<u64, BackfillError>>,
    S: Future,
{
    tokio::select! {
        result = backfill => match result {
            Ok(start_block) => {
                info!(start_block, end_block, "Backfill finished");
                Ok(())
            }
            Err(e) => {
                let reason = e.reason();
                error!(reason, err = %e, "Backfill failed");
                Err(eyre::Report::new(e).wrap_err(format!("backfill failed ({reason})")))
            }
        },
        _ = shutdown => {
            // a commit already sent to the database is applied or rolled back as a whole
            warn!(end_block, "Received Ctrl-C, backfill abandoned");
            Err(eyre::eyre!("backfill of blocks up to {end_block} interrupted"))
        }
    }
}
