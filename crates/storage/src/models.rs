//! Rows written by the backfiller.
use alloy_primitives::{B256, BlockHash, BlockNumber, TxHash};
use chrono::{DateTime, Utc};
use primitives::enrichment::{FetchedBlock, FetchedReceipt};

/// Enrichment fields for one persisted block, keyed by hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockUpdate {
    /// Hash of the block row to update
    pub hash: BlockHash,
    /// Number of L2-to-L1 messages sent so far
    pub send_count: u64,
    /// Outbox merkle root
    pub send_root: B256,
    /// Anchoring L1 block
    pub l1_block_number: BlockNumber,
}

/// Enrichment fields for one persisted transaction, keyed by hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionUpdate {
    /// Hash of the transaction row to update
    pub hash: TxHash,
    /// Gas spent on L1 data posting
    pub gas_used_for_l1: u64,
}

/// Every update of one invocation, applied in a single database transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteBatch {
    /// Block updates
    pub blocks: Vec<BlockUpdate>,
    /// Transaction updates
    pub transactions: Vec<TransactionUpdate>,
    /// `updated_at` value written to every touched row
    pub updated_at: DateTime<Utc>,
}

impl WriteBatch {
    /// Create an empty batch stamped with `updated_at`.
    pub const fn new(updated_at: DateTime<Utc>) -> Self {
        Self { blocks: Vec::new(), transactions: Vec::new(), updated_at }
    }

    /// Returns `true` if the batch holds no statement.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.transactions.is_empty()
    }

    /// Total number of update statements.
    pub fn len(&self) -> usize {
        self.blocks.len() + self.transactions.len()
    }
}

/// Rows matched by a committed [`WriteBatch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Block rows updated
    pub blocks_updated: u64,
    /// Transaction rows updated
    pub transactions_updated: u64,
}

impl From<&FetchedBlock> for BlockUpdate {
    fn from(block: &FetchedBlock) -> Self {
        Self {
            hash: block.hash,
            send_count: block.send_count,
            send_root: block.send_root,
            l1_block_number: block.l1_block_number,
        }
    }
}

impl From<&FetchedReceipt> for TransactionUpdate {
    fn from(receipt: &FetchedReceipt) -> Self {
        Self { hash: receipt.transaction_hash, gas_used_for_l1: receipt.gas_used_for_l1 }
    }
}
