//! Wire types for the Arbitrum extensions of block and receipt responses.
use alloy_primitives::{B256, U64};
use eyre::{Error, OptionExt, Result};
use primitives::enrichment::{FetchedBlock, FetchedReceipt};
use serde::Deserialize;

/// Subset of an `eth_getBlockByNumber` response carrying the Arbitrum fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbBlock {
    /// Block hash
    pub hash: B256,
    /// Block number
    pub number: U64,
    /// `sendCount`
    pub send_count: Option<U64>,
    /// `sendRoot`
    pub send_root: Option<B256>,
    /// `l1BlockNumber`
    pub l1_block_number: Option<U64>,
}

/// Subset of an `eth_getBlockReceipts` item carrying the Arbitrum fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbReceipt {
    /// Transaction hash
    pub transaction_hash: B256,
    /// Block number
    pub block_number: U64,
    /// `gasUsedForL1`
    pub gas_used_for_l1: Option<U64>,
}

impl TryFrom<ArbBlock> for FetchedBlock {
    type Error = Error;

    fn try_from(block: ArbBlock) -> Result<Self, Self::Error> {
        let number = block.number.to::<u64>();
        let missing = |field: &str| format!("block {number} response has no {field}");

        let send_count = block.send_count.ok_or_eyre(missing("sendCount"))?;
        let send_root = block.send_root.ok_or_eyre(missing("sendRoot"))?;
        let l1_block_number = block.l1_block_number.ok_or_eyre(missing("l1BlockNumber"))?;

        Ok(Self {
            hash: block.hash,
            number,
            send_count: send_count.to::<u64>(),
            send_root,
            l1_block_number: l1_block_number.to::<u64>(),
        })
    }
}

impl TryFrom<ArbReceipt> for FetchedReceipt {
    type Error = Error;

    fn try_from(receipt: ArbReceipt) -> Result<Self, Self::Error> {
        let gas_used_for_l1 = receipt.gas_used_for_l1.ok_or_else(|| {
            eyre::eyre!("receipt {} response has no gasUsedForL1", receipt.transaction_hash)
        })?;

        Ok(Self {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number.to::<u64>(),
            gas_used_for_l1: gas_used_for_l1.to::<u64>(),
        })
    }
}
