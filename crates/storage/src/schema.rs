//! Table definitions and the statements issued against them.

/// Table schema definition
#[derive(Debug)]
pub struct TableSchema {
    /// Table name
    pub name: &'static str,
    /// Column definitions
    pub columns: &'static str,
}

/// Base-indexed blocks
pub const BLOCKS_TABLE: &str = "blocks";
/// Base-indexed transactions
pub const TRANSACTIONS_TABLE: &str = "transactions";

/// Columns filled in by the backfiller on `blocks`
pub const BLOCK_ENRICHMENT_COLUMNS: &[&str] = &["send_count", "send_root", "l1_block_number"];
/// Columns filled in by the backfiller on `transactions`
pub const TRANSACTION_ENRICHMENT_COLUMNS: &[&str] = &["gas_used_for_l1"];

/// Tables the backfiller reads and updates. The primary indexer owns them in production.
pub const TABLE_SCHEMAS: &[TableSchema] = &[
    TableSchema {
        name: BLOCKS_TABLE,
        columns: "hash BYTEA PRIMARY KEY,
                 number BIGINT NOT NULL,
                 parent_hash BYTEA NOT NULL,
                 gas_used BIGINT NOT NULL,
                 consensus BOOLEAN NOT NULL DEFAULT TRUE,
                 send_count BIGINT,
                 send_root BYTEA,
                 l1_block_number BIGINT,
                 inserted_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                 updated_at TIMESTAMPTZ NOT NULL DEFAULT now()",
    },
    TableSchema {
        name: TRANSACTIONS_TABLE,
        columns: "hash BYTEA PRIMARY KEY,
                 block_number BIGINT NOT NULL,
                 block_hash BYTEA NOT NULL,
                 gas_used BIGINT NOT NULL,
                 gas_used_for_l1 BIGINT,
                 inserted_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                 updated_at TIMESTAMPTZ NOT NULL DEFAULT now()",
    },
];

/// Index backing the range queries on `blocks.number`
pub(crate) const BLOCKS_NUMBER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS blocks_number_index ON blocks (number)";

/// Highest consensus block
pub(crate) const LATEST_INDEXED_BLOCK: &str = "SELECT MAX(number) FROM blocks WHERE consensus";

/// Distinct consensus block numbers in `[$1, $2]`
pub(crate) const COUNT_INDEXED_BLOCKS: &str = "SELECT COUNT(DISTINCT number) FROM blocks \
     WHERE consensus AND number BETWEEN $1 AND $2";

/// Consensus blocks in `[$1, $2]` with at least one enrichment field unset
pub(crate) const BLOCKS_MISSING_ENRICHMENT: &str = "SELECT DISTINCT number FROM blocks \
     WHERE consensus AND number BETWEEN $1 AND $2 \
     AND (send_count IS NULL OR send_root IS NULL OR l1_block_number IS NULL) \
     ORDER BY number";

/// Sets the enrichment fields of the block with hash `$1`
pub(crate) const UPDATE_BLOCK: &str = "UPDATE blocks \
     SET send_count = $2, send_root = $3, l1_block_number = $4, updated_at = $5 \
     WHERE hash = $1";

/// Sets the enrichment field of the transaction with hash `$1`
pub(crate) const UPDATE_TRANSACTION: &str = "UPDATE transactions \
     SET gas_used_for_l1 = $2, updated_at = $3 \
     WHERE hash = $1";

/// `CREATE TABLE` statement for a schema
pub(crate) fn create_table_sql(schema: &TableSchema) -> String {
    format!("CREATE TABLE IF NOT EXISTS {} ({})", schema.name, schema.columns)
}
