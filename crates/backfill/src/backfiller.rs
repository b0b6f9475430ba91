use config::BackfillOpts;
use primitives::BlockNumber;
use tracing::{error, info};

use crate::{
    discover::{discover_window, find_missing_blocks},
    error::BackfillError,
    fetch::fetch_enrichment,
    merge::merge,
    traits::{BlockReader, BlockWriter, EnrichmentSource},
};

/// Fills the Arbitrum enrichment fields of already indexed blocks and transactions.
///
/// `S` is the persisted index (read and write side), `C` the chain data source.
#[derive(Debug)]
pub struct Backfiller<S, C> {
    pub(crate) store: S,
    pub(crate) source: C,
    opts: BackfillOpts,
}

impl<S, C> Backfiller<S, C>
where
    S: BlockReader + BlockWriter,
    C: EnrichmentSource,
{
    /// Create a new backfiller. `opts` is never re-read from the environment afterwards.
    pub const fn new(store: S, source: C, opts: BackfillOpts) -> Self {
        Self { store, source, opts }
    }

    /// Backfill options this instance was created with.
    pub const fn opts(&self) -> &BackfillOpts {
        &self.opts
    }

    /// Run one backfill invocation for the window ending at `end_block`.
    ///
    /// Returns the first block of the inspected window. On error nothing was written.
    /// Dropping the returned future before it resolves is safe for the same reason.
    pub async fn discover_and_backfill(
        &self,
        end_block: BlockNumber,
    ) -> Result<BlockNumber, BackfillError> {
        let window = discover_window(
            &self.store,
            end_block,
            self.opts.first_block,
            self.opts.backfill_blocks_depth,
        )
        .await?;
        if window.is_empty() {
            info!(end_block, first_block = self.opts.first_block, "Empty backfill window");
            return Ok(window.start_block);
        }

        let missing = find_missing_blocks(&self.store, &window).await?;
        if missing.is_empty() {
            info!(
                start_block = window.start_block,
                end_block = window.end_block,
                "No blocks missing enrichment data"
            );
            return Ok(window.start_block);
        }
        info!(
            start_block = window.start_block,
            end_block = window.end_block,
            window_len = window.len(),
            missing = missing.len(),
            "Backfilling blocks missing enrichment data"
        );

        let fetched = fetch_enrichment(
            &self.source,
            &missing,
            self.opts.chunk_size,
            self.opts.fetch_concurrency,
        )
        .await
        .inspect_err(|e| {
            error!(
                start_block = window.start_block,
                end_block = window.end_block,
                err = %e,
                "Failed to discover blocks"
            )
        })?;

        let summary = merge(&self.store, &fetched, self.opts.dry_run).await?;

        info!(
            start_block = window.start_block,
            end_block = window.end_block,
            blocks = fetched.blocks.len(),
            receipts = fetched.receipts.len(),
            blocks_updated = summary.blocks_updated,
            transactions_updated = summary.transactions_updated,
            "Backfill complete"
        );
        Ok(window.start_block)
    }
}
