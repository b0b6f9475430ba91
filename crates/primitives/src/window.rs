//! Block-number window inspected by a single backfill invocation.
use alloy_primitives::BlockNumber;

/// Inclusive block range `[start_block, end_block]`.
///
/// The window is empty when `end_block < start_block`, which only happens when the
/// requested end lies below the configured first block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillWindow {
    /// First block of the window
    pub start_block: BlockNumber,
    /// Last block of the window
    pub end_block: BlockNumber,
}

impl BackfillWindow {
    /// Computes `max(first_block, end_block - depth + 1)` as the window start.
    ///
    /// A `depth` of zero is treated as one.
    pub const fn new(end_block: BlockNumber, first_block: BlockNumber, depth: u64) -> Self {
        let lookback = end_block.saturating_sub(depth.saturating_sub(1));
        let start_block = if lookback > first_block { lookback } else { first_block };
        Self { start_block, end_block }
    }

    /// Whether the window contains no blocks at all.
    pub const fn is_empty(&self) -> bool {
        self.end_block < self.start_block
    }

    /// Number of blocks in the window.
    pub const fn len(&self) -> u64 {
        if self.is_empty() { 0 } else { self.end_block - self.start_block + 1 }
    }

    /// Whether `block` lies inside the window.
    pub const fn contains(&self, block: BlockNumber) -> bool {
        self.start_block <= block && block <= self.end_block
    }
}
