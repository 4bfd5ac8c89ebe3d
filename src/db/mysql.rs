//! SqlExecutor over a sqlx MySQL pool.

use crate::db::{Cell, ExecOutcome, ResultSet, SqlExecutor};
use crate::error::AppError;
use crate::sql::SqlValue;
use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlArguments, MySqlPool, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Executor, Row, Statement, ValueRef};

#[derive(Clone)]
pub struct MySqlExecutor {
    pool: MySqlPool,
}

impl MySqlExecutor {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlExecutor { pool }
    }
}

#[async_trait]
impl SqlExecutor for MySqlExecutor {
    async fn fetch(&self, sql: &str, params: &[SqlValue]) -> Result<ResultSet, AppError> {
        tracing::debug!(sql = %sql, params = ?params, "query");
        // Prepared metadata gives the column list even when no row comes back.
        let statement = (&self.pool).prepare(sql).await?;
        let columns = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let rows = bind_params(statement.query(), params)
            .fetch_all(&self.pool)
            .await?;
        let rows = rows
            .iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ResultSet { columns, rows })
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome, AppError> {
        tracing::debug!(sql = %sql, params = ?params, "execute");
        let result = bind_params(sqlx::query(sql), params)
            .execute(&self.pool)
            .await?;
        Ok(ExecOutcome {
            rows_affected: result.rows_affected(),
            last_insert_id: result.last_insert_id(),
        })
    }
}

fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &[SqlValue],
) -> Query<'q, MySql, MySqlArguments> {
    for p in params {
        query = match p {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int(n) => query.bind(*n),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.clone()),
        };
    }
    query
}

fn decode_row(row: &MySqlRow) -> Result<Vec<Cell>, sqlx::Error> {
    (0..row.len()).map(|idx| cell_at(row, idx)).collect()
}

fn cell_at(row: &MySqlRow, idx: usize) -> Result<Cell, sqlx::Error> {
    if row.try_get_raw(idx)?.is_null() {
        return Ok(Cell::Null);
    }
    if let Ok(n) = row.try_get::<i64, _>(idx) {
        return Ok(Cell::Int(n));
    }
    if let Ok(n) = row.try_get::<u64, _>(idx) {
        return Ok(Cell::UInt(n));
    }
    if let Ok(n) = row.try_get::<f64, _>(idx) {
        return Ok(Cell::Float(n));
    }
    if let Ok(n) = row.try_get::<f32, _>(idx) {
        return Ok(Cell::Float(n as f64));
    }
    if let Ok(d) = row.try_get::<chrono::NaiveDateTime, _>(idx) {
        return Ok(Cell::Text(d.format("%Y-%m-%d %H:%M:%S").to_string()));
    }
    if let Ok(d) = row.try_get::<chrono::NaiveDate, _>(idx) {
        return Ok(Cell::Text(d.format("%Y-%m-%d").to_string()));
    }
    if let Ok(t) = row.try_get::<chrono::NaiveTime, _>(idx) {
        return Ok(Cell::Text(t.format("%H:%M:%S").to_string()));
    }
    if let Ok(s) = row.try_get::<String, _>(idx) {
        return Ok(Cell::Text(s));
    }
    // DECIMAL, BLOB and the rest arrive as raw bytes.
    let bytes = row.try_get_unchecked::<Vec<u8>, _>(idx)?;
    Ok(Cell::Bytes(bytes))
}
