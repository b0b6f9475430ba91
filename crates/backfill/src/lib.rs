//! Backfills Arbitrum-specific fields (`send_count`, `send_root`, `l1_block_number`,
//! `gas_used_for_l1`) on rows the primary indexer already persisted.
//!
//! One invocation discovers a depth-bounded window, fetches fresh data for the blocks
//! still missing it, and writes everything in a single transaction. Either every update
//! of the invocation is committed or none is.

mod backfiller;
pub use backfiller::Backfiller;

pub mod discover;
pub mod error;
pub mod fetch;
pub mod merge;
pub mod traits;

pub use error::{BackfillError, FetchError};
pub use traits::{BlockReader, BlockWriter, EnrichmentSource};

#[cfg(test)]
mod test_utils;
