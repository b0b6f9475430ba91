//! Core primitives for the backfiller.
/// Fetched block and receipt records
pub mod enrichment;
/// Backfill window computation
pub mod window;

pub use alloy_primitives::BlockNumber;
