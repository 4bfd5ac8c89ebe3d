//! Generic CRUD execution against any catalog-discovered table.

use crate::catalog::SchemaCatalog;
use crate::db::{ExecOutcome, SqlExecutor};
use crate::error::AppError;
use crate::service::packer::{pack_one, pack_rows, Row};
use crate::service::validation::{Operation, PayloadValidator};
use crate::sql::{delete, insert, select_by_key, select_page, update};
use serde_json::{Map, Value};
use std::sync::Arc;

pub struct CrudService {
    executor: Arc<dyn SqlExecutor>,
    catalog: SchemaCatalog,
}

impl CrudService {
    pub fn new(executor: Arc<dyn SqlExecutor>, catalog: SchemaCatalog) -> Self {
        CrudService { executor, catalog }
    }

    /// Tables of the default database.
    pub async fn tables(&self) -> Result<Vec<String>, AppError> {
        self.catalog.list_tables().await
    }

    /// One page of rows. An empty page is a success.
    pub async fn list(&self, table: &str, limit: u64, offset: u64) -> Result<Vec<Row>, AppError> {
        let database = self.catalog.resolve_database(table).await?;
        let q = select_page(&database, table, limit, offset);
        let rs = self.executor.fetch(&q.sql, &q.params).await?;
        Ok(pack_rows(rs))
    }

    /// Fetch one row by primary key; absent rows are `record not found`.
    pub async fn read(&self, table: &str, id: i64) -> Result<Row, AppError> {
        let t = self.catalog.locate(table).await?;
        let q = select_by_key(&t.database, &t.table, &t.primary_key, id);
        let rs = self.executor.fetch(&q.sql, &q.params).await?;
        pack_one(rs)
    }

    /// Insert one row. Returns the primary key name and the new row's id.
    pub async fn create(&self, table: &str, payload: &Map<String, Value>) -> Result<(String, i64), AppError> {
        let t = self.catalog.table_schema(table).await?;
        let fields = PayloadValidator::validate(payload, &t.columns, &t.primary_key, Operation::Create)?;
        let q = insert(&t.database, &t.table, &fields);
        let outcome = self.executor.execute(&q.sql, &q.params).await?;
        let id = created_id(outcome, t.auto_increment, payload, &t.primary_key)?;
        Ok((t.primary_key, id))
    }

    /// Update one row by primary key. Returns the number of matched rows.
    pub async fn update(&self, table: &str, id: i64, payload: &Map<String, Value>) -> Result<u64, AppError> {
        let t = self.catalog.table_schema(table).await?;
        let fields = PayloadValidator::validate(payload, &t.columns, &t.primary_key, Operation::Update)?;
        let q = update(&t.database, &t.table, &t.primary_key, id, &fields)
            .ok_or_else(|| AppError::BadRequest("no fields to update".into()))?;
        let outcome = self.executor.execute(&q.sql, &q.params).await?;
        Ok(outcome.rows_affected)
    }

    /// Delete one row by primary key. Returns the number of deleted rows (0 or 1).
    pub async fn delete(&self, table: &str, id: i64) -> Result<u64, AppError> {
        let t = self.catalog.locate(table).await?;
        let q = delete(&t.database, &t.table, &t.primary_key, id);
        let outcome = self.executor.execute(&q.sql, &q.params).await?;
        Ok(outcome.rows_affected)
    }
}

/// Id reported for an insert: the engine-generated id for auto-increment keys, else the
/// payload's own integral key, else whatever non-zero id the engine reported.
fn created_id(
    outcome: ExecOutcome,
    auto_increment: bool,
    payload: &Map<String, Value>,
    primary_key: &str,
) -> Result<i64, AppError> {
    let generated = i64::try_from(outcome.last_insert_id).ok().filter(|id| *id > 0);
    if auto_increment {
        if let Some(id) = generated {
            return Ok(id);
        }
    }
    payload
        .get(primary_key)
        .and_then(Value::as_i64)
        .or(generated)
        .ok_or_else(|| AppError::Internal(format!("no generated id for {}", primary_key)))
}
