//! Collaborators the backfill pipeline is written against.
use async_trait::async_trait;
use eyre::Result;
use primitives::{
    BlockNumber,
    enrichment::{FetchedBlock, FetchedReceipt},
};
use rpc::ChainClient;
use storage::{PostgresStore, UpdateSummary, WriteBatch};

/// Read access to the persisted index.
#[async_trait]
pub trait BlockReader: Send + Sync {
    /// Whether every block in `[start_block, end_block]` is base-indexed.
    async fn indexed(&self, start_block: BlockNumber, end_block: BlockNumber) -> Result<bool>;

    /// Blocks in `[start_block, end_block]` with at least one enrichment field unset,
    /// in ascending order.
    async fn blocks_missing_enrichment(
        &self,
        start_block: BlockNumber,
        end_block: BlockNumber,
    ) -> Result<Vec<BlockNumber>>;
}

/// Atomic write access to the persisted index.
#[async_trait]
pub trait BlockWriter: Send + Sync {
    /// Apply the whole batch in one transaction, or nothing at all.
    async fn atomic_update(&self, batch: &WriteBatch) -> Result<UpdateSummary>;
}

/// Source of fresh enrichment data.
#[async_trait]
pub trait EnrichmentSource: Send + Sync {
    /// Fetch the given blocks in one call.
    async fn fetch_blocks_by_numbers(&self, numbers: &[BlockNumber]) -> Result<Vec<FetchedBlock>>;

    /// Fetch the receipts of the given blocks in one call.
    async fn fetch_receipts_by_block_numbers(
        &self,
        numbers: &[BlockNumber],
    ) -> Result<Vec<FetchedReceipt>>;
}

#[async_trait]
impl BlockReader for PostgresStore {
    async fn indexed(&self, start_block: BlockNumber, end_block: BlockNumber) -> Result<bool> {
        self.is_range_indexed(start_block, end_block).await
    }

    async fn blocks_missing_enrichment(
        &self,
        start_block: BlockNumber,
        end_block: BlockNumber,
    ) -> Result<Vec<BlockNumber>> {
        self.find_blocks_missing_enrichment(start_block, end_block).await
    }
}

#[async_trait]
impl BlockWriter for PostgresStore {
    async fn atomic_update(&self, batch: &WriteBatch) -> Result<UpdateSummary> {
        self.apply_write_batch(batch).await
    }
}

#[async_trait]
impl EnrichmentSource for ChainClient {
    async fn fetch_blocks_by_numbers(
        &self,
        numbers: &[BlockNumber],
    ) -> Result<Vec<FetchedBlock>> {
        self.get_blocks_by_numbers(numbers).await
    }

    async fn fetch_receipts_by_block_numbers(
        &self,
        numbers: &[BlockNumber],
    ) -> Result<Vec<FetchedReceipt>> {
        self.get_receipts_by_block_numbers(numbers).await
    }
}
