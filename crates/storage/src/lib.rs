//! Postgres access for the backfiller.
//!
//! Reads the index state of the `blocks` table and applies [`WriteBatch`]es atomically.
use std::time::Duration;

use alloy_primitives::BlockNumber;
use derive_more::Debug;
use eyre::{Context, Result};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::{debug, info};

pub mod models;
pub mod schema;

pub use models::{BlockUpdate, TransactionUpdate, UpdateSummary, WriteBatch};
use schema::{
    BLOCKS_MISSING_ENRICHMENT, BLOCKS_NUMBER_INDEX, COUNT_INDEXED_BLOCKS, LATEST_INDEXED_BLOCK,
    TABLE_SCHEMAS, UPDATE_BLOCK, UPDATE_TRANSACTION, create_table_sql,
};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Postgres reader and writer for block and transaction rows
#[derive(Clone, Debug)]
pub struct PostgresStore {
    #[debug(skip)]
    pool: PgPool,
}

impl PostgresStore {
    /// Connect a pool of at most `max_connections` connections.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(url)
            .await
            .wrap_err("Failed to connect to Postgres")?;
        info!(max_connections, "Postgres connection pool created");
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the tables the backfiller expects, if missing
    pub async fn init_schema(&self) -> Result<()> {
        for schema in TABLE_SCHEMAS {
            sqlx::query(&create_table_sql(schema))
                .execute(&self.pool)
                .await
                .wrap_err_with(|| format!("Failed to create {} table", schema.name))?;
        }
        sqlx::query(BLOCKS_NUMBER_INDEX)
            .execute(&self.pool)
            .await
            .wrap_err("Failed to create blocks number index")?;
        info!("Schema initialized");
        Ok(())
    }

    /// Highest consensus block number, if any block is indexed
    pub async fn latest_indexed_block(&self) -> Result<Option<BlockNumber>> {
        let latest: Option<i64> = sqlx::query_scalar(LATEST_INDEXED_BLOCK)
            .fetch_one(&self.pool)
            .await
            .wrap_err("Failed to query latest indexed block")?;
        latest.map(from_db_number).transpose()
    }

    /// Whether every block in `[start_block, end_block]` has a consensus row
    pub async fn is_range_indexed(
        &self,
        start_block: BlockNumber,
        end_block: BlockNumber,
    ) -> Result<bool> {
        if end_block < start_block {
            return Ok(true);
        }
        let indexed: i64 = sqlx::query_scalar(COUNT_INDEXED_BLOCKS)
            .bind(to_db_number(start_block)?)
            .bind(to_db_number(end_block)?)
            .fetch_one(&self.pool)
            .await
            .wrap_err("Failed to count indexed blocks")?;

        let expected = end_block - start_block + 1;
        debug!(start_block, end_block, indexed, expected, "Counted indexed blocks");
        Ok(u64::try_from(indexed).is_ok_and(|indexed| indexed == expected))
    }

    /// Consensus blocks in `[start_block, end_block]` with an unset enrichment field, ascending
    pub async fn find_blocks_missing_enrichment(
        &self,
        start_block: BlockNumber,
        end_block: BlockNumber,
    ) -> Result<Vec<BlockNumber>> {
        let numbers: Vec<i64> = sqlx::query_scalar(BLOCKS_MISSING_ENRICHMENT)
            .bind(to_db_number(start_block)?)
            .bind(to_db_number(end_block)?)
            .fetch_all(&self.pool)
            .await
            .wrap_err("Failed to query blocks missing enrichment")?;
        numbers.into_iter().map(from_db_number).collect()
    }

    /// Apply every update of `batch` in one transaction.
    ///
    /// Either all statements commit or none do. An update whose hash matches no row
    /// changes nothing and is not an error.
    pub async fn apply_write_batch(&self, batch: &WriteBatch) -> Result<UpdateSummary> {
        if batch.is_empty() {
            return Ok(UpdateSummary::default());
        }

        // dropping `tx` without commit rolls every statement back
        let mut tx = self.pool.begin().await.wrap_err("Failed to open transaction")?;
        let mut summary = UpdateSummary::default();

        for update in &batch.blocks {
            let result = sqlx::query(UPDATE_BLOCK)
                .bind(update.hash.as_slice())
                .bind(to_db_number(update.send_count)?)
                .bind(update.send_root.as_slice())
                .bind(to_db_number(update.l1_block_number)?)
                .bind(batch.updated_at)
                .execute(&mut *tx)
                .await
                .wrap_err_with(|| format!("Failed to update block {}", update.hash))?;
            summary.blocks_updated += result.rows_affected();
        }

        for update in &batch.transactions {
            let result = sqlx::query(UPDATE_TRANSACTION)
                .bind(update.hash.as_slice())
                .bind(to_db_number(update.gas_used_for_l1)?)
                .bind(batch.updated_at)
                .execute(&mut *tx)
                .await
                .wrap_err_with(|| format!("Failed to update transaction {}", update.hash))?;
            summary.transactions_updated += result.rows_affected();
        }

        tx.commit().await.wrap_err("Failed to commit write batch")?;
        Ok(summary)
    }
}

/// Postgres has no unsigned integers; values are stored as `BIGINT`.
fn to_db_number(value: u64) -> Result<i64> {
    i64::try_from(value).wrap_err_with(|| format!("{value} does not fit in a BIGINT column"))
}

fn from_db_number(value: i64) -> Result<u64> {
    u64::try_from(value).wrap_err_with(|| format!("negative block number {value} in database"))
}
