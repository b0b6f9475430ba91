//! Tagged failures of a backfill invocation.
use primitives::BlockNumber;
use thiserror::Error;

/// Why a chunk could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The block-data call for a chunk failed
    #[error("block fetch failed for blocks {first}..={last}")]
    Blocks {
        /// First block of the chunk
        first: BlockNumber,
        /// Last block of the chunk
        last: BlockNumber,
        /// Underlying RPC error
        #[source]
        source: eyre::Report,
    },
    /// The receipt call for a chunk failed
    #[error("receipt fetch failed for blocks {first}..={last}")]
    Receipts {
        /// First block of the chunk
        first: BlockNumber,
        /// Last block of the chunk
        last: BlockNumber,
        /// Underlying RPC error
        #[source]
        source: eyre::Report,
    },
}

/// Failure of [`crate::Backfiller::discover_and_backfill`].
///
/// Every variant means the invocation wrote nothing.
#[derive(Debug, Error)]
pub enum BackfillError {
    /// The window is not fully base-indexed yet
    #[error("blocks {start_block}..={end_block} are not fully indexed yet")]
    NotIndexed {
        /// First block of the window
        start_block: BlockNumber,
        /// Last block of the window
        end_block: BlockNumber,
    },
    /// A chunk fetch failed, every fetched result was discarded
    #[error("failed to discover blocks: {0}")]
    Fetch(#[from] FetchError),
    /// The write batch was rolled back
    #[error("write batch was rolled back")]
    Commit(#[source] eyre::Report),
    /// Reading the index state failed
    #[error("failed to read index state")]
    Storage(#[source] eyre::Report),
}

impl BackfillError {
    /// Stable tag of the failure, for logs and callers deciding on retries.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::NotIndexed { .. } => "not_indexed_blocks",
            Self::Fetch(_) => "discover_blocks_error",
            Self::Commit(_) => "commit_error",
            Self::Storage(_) => "storage_error",
        }
    }
}
