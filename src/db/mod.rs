//! Relational query/execute capability consumed by the catalog and CRUD service.

mod mysql;
pub use mysql::MySqlExecutor;

use crate::error::AppError;
use crate::sql::SqlValue;
use async_trait::async_trait;

/// One decoded column value as the engine returned it.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    /// Opaque or binary representation; the row packer turns it into text.
    Bytes(Vec<u8>),
}

/// Fully drained result of a query. `columns` is known even when no rows matched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ResultSet {
    /// Text content of column `idx` in every row, skipping nulls.
    pub fn text_column(&self, idx: usize) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| match row.get(idx) {
                Some(Cell::Text(s)) => Some(s.clone()),
                Some(Cell::Bytes(b)) => Some(String::from_utf8_lossy(b).into_owned()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    /// Zero when the engine generated no id.
    pub last_insert_id: u64,
}

/// Parameterized statements against a pooled connection. Implementations must release the
/// connection before returning.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    async fn fetch(&self, sql: &str, params: &[SqlValue]) -> Result<ResultSet, AppError>;

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome, AppError>;
}
