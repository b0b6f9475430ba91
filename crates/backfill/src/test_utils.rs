//! In-memory collaborators for pipeline and state-machine tests.
use std::{
    collections::{BTreeMap, BTreeSet},
    ops::RangeInclusive,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use alloy_primitives::{B256, TxHash};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::{Result, eyre};
use primitives::{
    BlockNumber,
    enrichment::{FetchedBlock, FetchedReceipt},
};
use storage::{UpdateSummary, WriteBatch};

use crate::traits::{BlockReader, BlockWriter, EnrichmentSource};

pub(crate) fn block_hash(number: BlockNumber) -> B256 {
    B256::left_padding_from(&number.to_be_bytes())
}

pub(crate) fn tx_hash(block_number: BlockNumber, index: u8) -> TxHash {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&block_number.to_be_bytes());
    bytes[31] = index;
    TxHash::from(bytes)
}

pub(crate) fn fetched_block(number: BlockNumber) -> FetchedBlock {
    FetchedBlock {
        hash: block_hash(number),
        number,
        send_count: number * 3,
        send_root: B256::repeat_byte(0xab),
        l1_block_number: 18_000_000 + number,
    }
}

pub(crate) fn fetched_receipt(block_number: BlockNumber, index: u8) -> FetchedReceipt {
    FetchedReceipt {
        transaction_hash: tx_hash(block_number, index),
        block_number,
        gas_used_for_l1: 1_000 + block_number + u64::from(index),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BlockRow {
    pub(crate) hash: B256,
    pub(crate) parent_hash: B256,
    pub(crate) gas_used: u64,
    pub(crate) consensus: bool,
    pub(crate) send_count: Option<u64>,
    pub(crate) send_root: Option<B256>,
    pub(crate) l1_block_number: Option<u64>,
    pub(crate) updated_at: Option<DateTime<Utc>>,
}

impl BlockRow {
    fn base(number: BlockNumber) -> Self {
        Self {
            hash: block_hash(number),
            parent_hash: block_hash(number.saturating_sub(1)),
            gas_used: 21_000 * number,
            consensus: true,
            send_count: None,
            send_root: None,
            l1_block_number: None,
            updated_at: None,
        }
    }

    const fn is_enriched(&self) -> bool {
        self.send_count.is_some() && self.send_root.is_some() && self.l1_block_number.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TransactionRow {
    pub(crate) block_number: BlockNumber,
    pub(crate) gas_used: u64,
    pub(crate) gas_used_for_l1: Option<u64>,
    pub(crate) updated_at: Option<DateTime<Utc>>,
}

/// Persisted rows, comparable before and after an invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub(crate) blocks: BTreeMap<BlockNumber, BlockRow>,
    pub(crate) transactions: BTreeMap<TxHash, TransactionRow>,
}

/// Storage fake applying a [`WriteBatch`] all at once, the way a committed transaction does.
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    state: Mutex<Snapshot>,
    fail_commits: bool,
    fail_reads: bool,
    reads: AtomicUsize,
    commits: AtomicUsize,
}

impl MemoryStore {
    /// Base-indexed blocks without any enrichment data.
    pub(crate) fn indexed(numbers: RangeInclusive<BlockNumber>) -> Self {
        let blocks = numbers.map(|n| (n, BlockRow::base(n))).collect();
        Self { state: Mutex::new(Snapshot { blocks, ..Default::default() }), ..Default::default() }
    }

    pub(crate) fn with_transactions<I>(self, transactions: I) -> Self
    where
        I: IntoIterator<Item = (BlockNumber, u8)>,
    {
        {
            let mut state = self.state.lock().unwrap();
            for (block_number, index) in transactions {
                state.transactions.insert(
                    tx_hash(block_number, index),
                    TransactionRow {
                        block_number,
                        gas_used: 50_000,
                        gas_used_for_l1: None,
                        updated_at: None,
                    },
                );
            }
        }
        self
    }

    /// Marks blocks as already enriched.
    pub(crate) fn with_enriched<I>(self, numbers: I) -> Self
    where
        I: IntoIterator<Item = BlockNumber>,
    {
        {
            let mut state = self.state.lock().unwrap();
            for number in numbers {
                let row = state.blocks.get_mut(&number).unwrap();
                let fetched = fetched_block(number);
                row.send_count = Some(fetched.send_count);
                row.send_root = Some(fetched.send_root);
                row.l1_block_number = Some(fetched.l1_block_number);
            }
        }
        self
    }

    /// Marks a block as seen but not yet part of consensus.
    pub(crate) fn with_pending(self, number: BlockNumber) -> Self {
        self.state.lock().unwrap().blocks.get_mut(&number).unwrap().consensus = false;
        self
    }

    pub(crate) fn failing_commits(mut self) -> Self {
        self.fail_commits = true;
        self
    }

    pub(crate) fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        self.state.lock().unwrap().clone()
    }

    pub(crate) fn block(&self, number: BlockNumber) -> Option<BlockRow> {
        self.state.lock().unwrap().blocks.get(&number).cloned()
    }

    pub(crate) fn transaction(&self, hash: TxHash) -> Option<TransactionRow> {
        self.state.lock().unwrap().transactions.get(&hash).cloned()
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub(crate) fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    fn read(&self) -> Result<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads { Err(eyre!("connection pool timed out")) } else { Ok(()) }
    }
}

#[async_trait]
impl BlockReader for MemoryStore {
    async fn indexed(&self, start_block: BlockNumber, end_block: BlockNumber) -> Result<bool> {
        self.read()?;
        let state = self.state.lock().unwrap();
        Ok((start_block..=end_block)
            .all(|n| state.blocks.get(&n).is_some_and(|row| row.consensus)))
    }

    async fn blocks_missing_enrichment(
        &self,
        start_block: BlockNumber,
        end_block: BlockNumber,
    ) -> Result<Vec<BlockNumber>> {
        self.read()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .blocks
            .range(start_block..=end_block)
            .filter(|(_, row)| row.consensus && !row.is_enriched())
            .map(|(&n, _)| n)
            .collect())
    }
}

#[async_trait]
impl BlockWriter for MemoryStore {
    async fn atomic_update(&self, batch: &WriteBatch) -> Result<UpdateSummary> {
        if self.fail_commits {
            return Err(eyre!("could not serialize access due to concurrent update"));
        }

        let mut state = self.state.lock().unwrap();
        let mut next = state.clone();
        let mut summary = UpdateSummary::default();
        for update in &batch.blocks {
            for row in next.blocks.values_mut().filter(|row| row.hash == update.hash) {
                row.send_count = Some(update.send_count);
                row.send_root = Some(update.send_root);
                row.l1_block_number = Some(update.l1_block_number);
                row.updated_at = Some(batch.updated_at);
                summary.blocks_updated += 1;
            }
        }
        for update in &batch.transactions {
            if let Some(row) = next.transactions.get_mut(&update.hash) {
                row.gas_used_for_l1 = Some(update.gas_used_for_l1);
                row.updated_at = Some(batch.updated_at);
                summary.transactions_updated += 1;
            }
        }
        *state = next;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(summary)
    }
}

/// Chain fake serving one receipt per block and recording every call.
#[derive(Debug, Default)]
pub(crate) struct ScriptedChain {
    blocks: BTreeSet<BlockNumber>,
    fail_blocks: BTreeSet<BlockNumber>,
    fail_receipts: BTreeSet<BlockNumber>,
    block_calls: Mutex<Vec<Vec<BlockNumber>>>,
    receipt_calls: Mutex<Vec<Vec<BlockNumber>>>,
}

impl ScriptedChain {
    pub(crate) fn with_blocks(numbers: RangeInclusive<BlockNumber>) -> Self {
        Self { blocks: numbers.collect(), ..Default::default() }
    }

    /// Fails the block call of the chunk containing `number`.
    pub(crate) fn fail_blocks_at(mut self, number: BlockNumber) -> Self {
        self.fail_blocks.insert(number);
        self
    }

    /// Fails the receipt call of the chunk containing `number`.
    pub(crate) fn fail_receipts_at(mut self, number: BlockNumber) -> Self {
        self.fail_receipts.insert(number);
        self
    }

    pub(crate) fn block_calls(&self) -> Vec<Vec<BlockNumber>> {
        self.block_calls.lock().unwrap().clone()
    }

    pub(crate) fn receipt_calls(&self) -> Vec<Vec<BlockNumber>> {
        self.receipt_calls.lock().unwrap().clone()
    }

    fn check(&self, numbers: &[BlockNumber], failing: &BTreeSet<BlockNumber>) -> Result<()> {
        if let Some(n) = numbers.iter().find(|&&n| failing.contains(&n)) {
            return Err(eyre!("connection reset while fetching block {n}"));
        }
        if let Some(n) = numbers.iter().find(|&&n| !self.blocks.contains(&n)) {
            return Err(eyre!("block {n} not found"));
        }
        Ok(())
    }
}

#[async_trait]
impl EnrichmentSource for ScriptedChain {
    async fn fetch_blocks_by_numbers(&self, numbers: &[BlockNumber]) -> Result<Vec<FetchedBlock>> {
        self.block_calls.lock().unwrap().push(numbers.to_vec());
        self.check(numbers, &self.fail_blocks)?;
        Ok(numbers.iter().copied().map(fetched_block).collect())
    }

    async fn fetch_receipts_by_block_numbers(
        &self,
        numbers: &[BlockNumber],
    ) -> Result<Vec<FetchedReceipt>> {
        self.receipt_calls.lock().unwrap().push(numbers.to_vec());
        self.check(numbers, &self.fail_receipts)?;
        Ok(numbers.iter().map(|&n| fetched_receipt(n, 1)).collect())
    }
}
