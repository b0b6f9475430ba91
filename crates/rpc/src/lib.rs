//! JSON-RPC client fetching Arbitrum enrichment data in batches.
use alloy_rpc_client::{ClientBuilder, RpcClient};
use alloy_rpc_types_eth::BlockNumberOrTag;
use derive_more::Debug;
use eyre::{Result, WrapErr, eyre};
use primitives::{
    BlockNumber,
    enrichment::{FetchedBlock, FetchedReceipt},
};
use tracing::debug;
use url::Url;

pub mod retries;
pub mod types;

use retries::DEFAULT_RETRY_LAYER;
use types::{ArbBlock, ArbReceipt};

/// HTTP JSON-RPC client for an Arbitrum node.
#[derive(Debug, Clone)]
pub struct ChainClient {
    #[debug(skip)]
    client: RpcClient,
    url: Url,
}

impl ChainClient {
    /// Create a new client. Transport errors are retried by [`DEFAULT_RETRY_LAYER`].
    pub fn new(rpc_url: Url) -> Self {
        let client = ClientBuilder::default().layer(DEFAULT_RETRY_LAYER).http(rpc_url.clone());
        Self { client, url: rpc_url }
    }

    /// The node URL this client talks to.
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch the given blocks with a single `eth_getBlockByNumber` batch.
    ///
    /// Fails if any block is unknown to the node or lacks an Arbitrum field.
    pub async fn get_blocks_by_numbers(
        &self,
        numbers: &[BlockNumber],
    ) -> Result<Vec<FetchedBlock>> {
        if numbers.is_empty() {
            return Ok(Vec::new());
        }

        let mut batch = self.client.new_batch();
        let mut waiters = Vec::with_capacity(numbers.len());
        for &number in numbers {
            let params = (BlockNumberOrTag::Number(number), false);
            let waiter = batch.add_call::<_, Option<ArbBlock>>("eth_getBlockByNumber", &params)?;
            waiters.push((number, waiter));
        }
        // JSON-RPC error responses of single calls fail here, the waiters only see decode errors
        batch.send().await.wrap_err("eth_getBlockByNumber batch request failed")?;

        let mut blocks = Vec::with_capacity(numbers.len());
        for (number, waiter) in waiters {
            let block = waiter
                .await
                .wrap_err_with(|| format!("eth_getBlockByNumber failed for block {number}"))?
                .ok_or_else(|| eyre!("block {number} not found"))?;
            blocks.push(FetchedBlock::try_from(block)?);
        }

        debug!(count = blocks.len(), first = numbers[0], "Fetched blocks");
        Ok(blocks)
    }

    /// Fetch the receipts of every given block with a single `eth_getBlockReceipts` batch.
    ///
    /// Receipts are returned flattened, in the order of `numbers`.
    pub async fn get_receipts_by_block_numbers(
        &self,
        numbers: &[BlockNumber],
    ) -> Result<Vec<FetchedReceipt>> {
        if numbers.is_empty() {
            return Ok(Vec::new());
        }

        let mut batch = self.client.new_batch();
        let mut waiters = Vec::with_capacity(numbers.len());
        for &number in numbers {
            let params = (BlockNumberOrTag::Number(number),);
            let waiter =
                batch.add_call::<_, Option<Vec<ArbReceipt>>>("eth_getBlockReceipts", &params)?;
            waiters.push((number, waiter));
        }
        batch.send().await.wrap_err("eth_getBlockReceipts batch request failed")?;

        let mut receipts = Vec::new();
        for (number, waiter) in waiters {
            let block_receipts = waiter
                .await
                .wrap_err_with(|| format!("eth_getBlockReceipts failed for block {number}"))?
                .ok_or_else(|| eyre!("receipts for block {number} not found"))?;
            for receipt in block_receipts {
                receipts.push(FetchedReceipt::try_from(receipt)?);
            }
        }

        debug!(count = receipts.len(), first = numbers[0], "Fetched receipts");
        Ok(receipts)
    }
}
