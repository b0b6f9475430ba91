//! Backfiller configuration
use clap::Parser;
use url::Url;

/// Postgres database configuration options
#[derive(Debug, Clone, Parser)]
pub struct PostgresOpts {
    /// Postgres connection URL of the indexer database
    #[clap(long = "database-url", env = "DATABASE_URL")]
    pub database_url: String,
    /// Maximum number of pooled connections
    #[clap(
        long = "database-max-connections",
        env = "DATABASE_MAX_CONNECTIONS",
        default_value = "5",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_connections: u32,
}

/// RPC endpoint configuration options
#[derive(Debug, Clone, Parser)]
pub struct RpcOpts {
    /// Arbitrum JSON-RPC HTTP URL
    #[clap(long = "rpc-url", env = "ARBITRUM_RPC_URL")]
    pub rpc_url: Url,
}

/// Backfill window and batching options.
///
/// Handed to the backfiller at construction and read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Parser)]
pub struct BackfillOpts {
    /// Lowest block the chain guarantees enrichment data for
    #[clap(long, env = "BACKFILL_FIRST_BLOCK", default_value = "0")]
    pub first_block: u64,
    /// Maximum number of blocks inspected by one invocation
    #[clap(
        long,
        env = "BACKFILL_BLOCKS_DEPTH",
        default_value = "500",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub backfill_blocks_depth: u64,
    /// Maximum number of blocks requested in a single RPC batch
    #[clap(
        long,
        env = "BACKFILL_CHUNK_SIZE",
        default_value = "20",
        value_parser = parse_non_zero_usize
    )]
    pub chunk_size: usize,
    /// Maximum number of chunks fetched concurrently
    #[clap(
        long,
        env = "BACKFILL_FETCH_CONCURRENCY",
        default_value = "1",
        value_parser = parse_non_zero_usize
    )]
    pub fetch_concurrency: usize,
    /// Log the updates instead of writing them
    #[clap(long, env = "BACKFILL_DRY_RUN")]
    pub dry_run: bool,
}

fn parse_non_zero_usize(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("value must be greater than zero".to_owned()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// CLI options for the backfiller
#[derive(Debug, Clone, Parser)]
#[clap(name = "backfiller", about = "Backfills Arbitrum-specific block and transaction fields")]
pub struct Opts {
    /// Postgres database configuration
    #[clap(flatten)]
    pub postgres: PostgresOpts,

    /// RPC endpoint configuration
    #[clap(flatten)]
    pub rpc: RpcOpts,

    /// Backfill configuration
    #[clap(flatten)]
    pub backfill: BackfillOpts,

    /// Last block of the window. Defaults to the highest consensus block in the database.
    #[clap(long, env = "BACKFILL_END_BLOCK")]
    pub end_block: Option<u64>,

    /// If set, create the expected tables before running (local/dev only)
    #[clap(long)]
    pub init_schema: bool,
}
