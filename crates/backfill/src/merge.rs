//! Turns fetched enrichment data into a single atomic write.
use chrono::{DateTime, Utc};
use primitives::enrichment::FetchedEnrichment;
use storage::{BlockUpdate, TransactionUpdate, UpdateSummary, WriteBatch};
use tracing::{error, info};

use crate::{error::BackfillError, traits::BlockWriter};

/// One block statement per fetched block, one transaction statement per fetched receipt.
///
/// Every statement is stamped with the same `updated_at`.
pub fn build_write_batch(fetched: &FetchedEnrichment, updated_at: DateTime<Utc>) -> WriteBatch {
    let mut batch = WriteBatch::new(updated_at);
    batch.blocks = fetched.blocks.iter().map(BlockUpdate::from).collect();
    batch.transactions = fetched.receipts.iter().map(TransactionUpdate::from).collect();
    batch
}

/// Write `fetched` to storage in one transaction.
///
/// Nothing is sent to the writer when there is nothing to write or `dry_run` is set.
pub async fn merge<W>(
    writer: &W,
    fetched: &FetchedEnrichment,
    dry_run: bool,
) -> Result<UpdateSummary, BackfillError>
where
    W: BlockWriter + ?Sized,
{
    if fetched.is_empty() {
        return Ok(UpdateSummary::default());
    }

    let batch = build_write_batch(fetched, Utc::now());

    if dry_run {
        info!(
            blocks = batch.blocks.len(),
            transactions = batch.transactions.len(),
            "🧪 DRY-RUN: Would update enrichment fields"
        );
        return Ok(UpdateSummary::default());
    }

    let summary = writer.atomic_update(&batch).await.map_err(|e| {
        error!(err = %e, statements = batch.len(), "Failed to commit enrichment updates");
        BackfillError::Commit(e)
    })?;

    info!(
        blocks_updated = summary.blocks_updated,
        transactions_updated = summary.transactions_updated,
        statements = batch.len(),
        "Committed enrichment updates"
    );
    Ok(summary)
}
