//! Range discovery: picks the window and refuses to run ahead of the primary indexer.
use primitives::{BlockNumber, window::BackfillWindow};
use tracing::{debug, warn};

use crate::{error::BackfillError, traits::BlockReader};

/// Compute the window ending at `end_block` and check that it is fully base-indexed.
///
/// An empty window (`end_block` below `first_block`) is returned without touching storage.
pub async fn discover_window<R>(
    reader: &R,
    end_block: BlockNumber,
    first_block: BlockNumber,
    depth: u64,
) -> Result<BackfillWindow, BackfillError>
where
    R: BlockReader + ?Sized,
{
    let window = BackfillWindow::new(end_block, first_block, depth);
    if window.is_empty() {
        debug!(end_block, first_block, "End block is below the first block, nothing to inspect");
        return Ok(window);
    }

    let indexed = reader
        .indexed(window.start_block, window.end_block)
        .await
        .map_err(BackfillError::Storage)?;
    if !indexed {
        warn!(
            start_block = window.start_block,
            end_block = window.end_block,
            "Backfill window is not fully indexed yet"
        );
        return Err(BackfillError::NotIndexed {
            start_block: window.start_block,
            end_block: window.end_block,
        });
    }

    Ok(window)
}

/// Blocks of the window whose enrichment fields are still unset.
pub async fn find_missing_blocks<R>(
    reader: &R,
    window: &BackfillWindow,
) -> Result<Vec<BlockNumber>, BackfillError>
where
    R: BlockReader + ?Sized,
{
    if window.is_empty() {
        return Ok(Vec::new());
    }

    let mut missing = reader
        .blocks_missing_enrichment(window.start_block, window.end_block)
        .await
        .map_err(BackfillError::Storage)?;
    // never act on blocks outside the window, whatever the reader returned
    missing.retain(|&block| window.contains(block));
    missing.dedup();
    Ok(missing)
}
