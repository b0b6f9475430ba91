//! Chunked fetch pipeline.
//!
//! Block numbers are split into chunks of at most `chunk_size`. Each chunk costs one
//! block-data call and one receipt call. The first failing chunk aborts the pipeline and
//! every result fetched so far is dropped with it.
use futures::{StreamExt, TryStreamExt, stream};
use primitives::{BlockNumber, enrichment::FetchedEnrichment};
use tracing::{debug, error, info};

use crate::{error::FetchError, traits::EnrichmentSource};

/// Fetch blocks and receipts for `block_numbers`, all or nothing.
///
/// With `concurrency == 1` chunks are fetched one after the other in input order. Higher
/// values keep up to that many chunks in flight; results are still only returned when
/// every chunk succeeded.
pub async fn fetch_enrichment<S>(
    source: &S,
    block_numbers: &[BlockNumber],
    chunk_size: usize,
    concurrency: usize,
) -> Result<FetchedEnrichment, FetchError>
where
    S: EnrichmentSource + ?Sized,
{
    if block_numbers.is_empty() {
        return Ok(FetchedEnrichment::default());
    }

    let chunks = block_numbers.chunks(chunk_size.max(1));
    info!(
        blocks = block_numbers.len(),
        chunks = chunks.len(),
        concurrency,
        "Fetching enrichment data"
    );

    stream::iter(chunks)
        .map(|chunk| fetch_chunk(source, chunk))
        .buffered(concurrency.max(1))
        .try_collect()
        .await
        .inspect_err(|e| error!(err = %e, "Fetch pipeline aborted, discarding fetched data"))
}

async fn fetch_chunk<S>(source: &S, chunk: &[BlockNumber]) -> Result<FetchedEnrichment, FetchError>
where
    S: EnrichmentSource + ?Sized,
{
    let (first, last) = (chunk[0], chunk[chunk.len() - 1]);

    let blocks = source
        .fetch_blocks_by_numbers(chunk)
        .await
        .map_err(|source| FetchError::Blocks { first, last, source })?;
    let receipts = source
        .fetch_receipts_by_block_numbers(chunk)
        .await
        .map_err(|source| FetchError::Receipts { first, last, source })?;

    debug!(first, last, blocks = blocks.len(), receipts = receipts.len(), "Fetched chunk");
    Ok(FetchedEnrichment { blocks, receipts })
}
