//! Enrichment data fetched fresh from the chain for blocks that were indexed without it.
use alloy_primitives::{B256, BlockHash, BlockNumber, TxHash};
use serde::{Deserialize, Serialize};

/// Arbitrum-specific fields of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedBlock {
    /// Block hash, matching an already persisted block row
    pub hash: BlockHash,
    /// Block number
    pub number: BlockNumber,
    /// Number of L2-to-L1 messages sent so far
    pub send_count: u64,
    /// Merkle root of the L2-to-L1 outbox
    pub send_root: B256,
    /// L1 block the L2 block was anchored to
    pub l1_block_number: BlockNumber,
}

/// Arbitrum-specific fields of one transaction receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedReceipt {
    /// Transaction hash, matching an already persisted transaction row
    pub transaction_hash: TxHash,
    /// Block the transaction was included in
    pub block_number: BlockNumber,
    /// Gas spent on L1 data posting
    pub gas_used_for_l1: u64,
}

/// All blocks and receipts fetched by one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedEnrichment {
    /// Fetched blocks, across every chunk
    pub blocks: Vec<FetchedBlock>,
    /// Fetched receipts, across every chunk
    pub receipts: Vec<FetchedReceipt>,
}

impl FetchedEnrichment {
    /// Returns `true` if nothing was fetched.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.receipts.is_empty()
    }
}

/// Appends the records of further chunks, keeping their order.
impl Extend<Self> for FetchedEnrichment {
    fn extend<I: IntoIterator<Item = Self>>(&mut self, iter: I) {
        for chunk in iter {
            self.blocks.extend(chunk.blocks);
            self.receipts.extend(chunk.receipts);
        }
    }
}

impl FromIterator<Self> for FetchedEnrichment {
    fn from_iter<I: IntoIterator<Item = Self>>(iter: I) -> Self {
        let mut all = Self::default();
        all.extend(iter);
        all
    }
}
