//! Schema catalog: table ownership, primary key, column types and auto-increment, read from
//! information_schema on every call.

use crate::config::AutoIncrementOnError;
use crate::db::SqlExecutor;
use crate::error::AppError;
use crate::sql::{select_probe, show_tables, SqlValue};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

const BASE_TABLES_SQL: &str = "SELECT TABLE_SCHEMA, TABLE_NAME FROM information_schema.tables \
     WHERE TABLE_TYPE = 'BASE TABLE' \
     AND TABLE_SCHEMA NOT IN ('mysql', 'information_schema', 'performance_schema', 'sys')";

const COLUMNS_SQL: &str = "SELECT COLUMN_NAME, DATA_TYPE, IS_NULLABLE FROM information_schema.columns \
     WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? ORDER BY ORDINAL_POSITION";

const AUTO_INCREMENT_SQL: &str = "SELECT COLUMN_NAME FROM information_schema.columns \
     WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND EXTRA LIKE ?";

/// Semantic column type used for payload checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    /// Only null can be written to these columns.
    Unsupported,
}

impl ColumnType {
    /// Map a native DATA_TYPE name (e.g. "varchar", "int").
    pub fn from_native(data_type: &str) -> Self {
        match data_type.trim().to_lowercase().as_str() {
            "char" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" => ColumnType::Text,
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" => ColumnType::Integer,
            _ => ColumnType::Unsupported,
        }
    }

    /// Whether a decoded JSON value has this type. Null never matches; nullability is separate.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ColumnType::Text => value.is_string(),
            ColumnType::Integer => value.as_i64().is_some(),
            ColumnType::Unsupported => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub column_type: ColumnType,
    pub nullable: bool,
}

pub type ColumnDescriptors = HashMap<String, ColumnDescriptor>;

/// A table resolved to its owning database and key column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRef {
    pub database: String,
    pub table: String,
    pub primary_key: String,
}

/// Full shape of a table for writes: location, key, key generation and column rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableSchema {
    pub database: String,
    pub table: String,
    pub primary_key: String,
    pub auto_increment: bool,
    pub columns: ColumnDescriptors,
}

pub struct SchemaCatalog {
    executor: Arc<dyn SqlExecutor>,
    on_auto_increment_error: AutoIncrementOnError,
}

impl SchemaCatalog {
    pub fn new(executor: Arc<dyn SqlExecutor>, on_auto_increment_error: AutoIncrementOnError) -> Self {
        SchemaCatalog {
            executor,
            on_auto_increment_error,
        }
    }

    /// Table names of the connection's default database.
    pub async fn list_tables(&self) -> Result<Vec<String>, AppError> {
        let q = show_tables();
        let rs = self.executor.fetch(&q.sql, &q.params).await?;
        Ok(rs.text_column(0))
    }

    /// Database name -> base tables, across every non-system database.
    pub async fn database_index(&self) -> Result<BTreeMap<String, BTreeSet<String>>, AppError> {
        let rs = self.executor.fetch(BASE_TABLES_SQL, &[]).await?;
        let mut index: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (schema, table) in rs.text_column(0).into_iter().zip(rs.text_column(1)) {
            index.entry(schema).or_default().insert(table);
        }
        Ok(index)
    }

    /// Owning database of `table`. With the same name in several databases the
    /// alphabetically first one wins.
    pub async fn resolve_database(&self, table: &str) -> Result<String, AppError> {
        let index = self.database_index().await?;
        index
            .into_iter()
            .find(|(_, tables)| tables.contains(table))
            .map(|(database, _)| database)
            .ok_or_else(|| AppError::NotFound("unknown table".into()))
    }

    /// First column in the engine's natural order.
    pub async fn primary_key_of(&self, database: &str, table: &str) -> Result<String, AppError> {
        let q = select_probe(database, table);
        let rs = self.executor.fetch(&q.sql, &q.params).await?;
        rs.columns
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("not found primary key".into()))
    }

    pub async fn column_descriptors(&self, database: &str, table: &str) -> Result<ColumnDescriptors, AppError> {
        let params = [SqlValue::from(database), SqlValue::from(table)];
        let rs = self.executor.fetch(COLUMNS_SQL, &params).await?;
        let names = rs.text_column(0);
        let types = rs.text_column(1);
        let nullability = rs.text_column(2);
        Ok(names
            .into_iter()
            .zip(types)
            .zip(nullability)
            .map(|((name, data_type), is_nullable)| {
                let descriptor = ColumnDescriptor {
                    column_type: ColumnType::from_native(&data_type),
                    nullable: is_nullable.eq_ignore_ascii_case("YES"),
                };
                (name, descriptor)
            })
            .collect())
    }

    /// Whether `column` carries the auto_increment extra. Query failures follow the configured policy.
    pub async fn is_auto_increment(&self, database: &str, table: &str, column: &str) -> Result<bool, AppError> {
        let params = [
            SqlValue::from(database),
            SqlValue::from(table),
            SqlValue::from("%auto_increment%"),
        ];
        match self.executor.fetch(AUTO_INCREMENT_SQL, &params).await {
            Ok(rs) => Ok(rs.text_column(0).iter().any(|name| name == column)),
            Err(e) => match self.on_auto_increment_error {
                AutoIncrementOnError::AssumeFalse => {
                    tracing::warn!(database, table, column, error = %e, "auto increment lookup failed; assuming false");
                    Ok(false)
                }
                AutoIncrementOnError::Fail => Err(e),
            },
        }
    }

    /// Resolve database and primary key for a request on `table`.
    pub async fn locate(&self, table: &str) -> Result<TableRef, AppError> {
        let database = self.resolve_database(table).await?;
        let primary_key = self.primary_key_of(&database, table).await?;
        Ok(TableRef {
            database,
            table: table.to_string(),
            primary_key,
        })
    }

    /// Resolve everything a create or update on `table` needs.
    pub async fn table_schema(&self, table: &str) -> Result<TableSchema, AppError> {
        let TableRef {
            database,
            table,
            primary_key,
        } = self.locate(table).await?;
        let columns = self.column_descriptors(&database, &table).await?;
        let auto_increment = self.is_auto_increment(&database, &table, &primary_key).await?;
        Ok(TableSchema {
            database,
            table,
            primary_key,
            auto_increment,
            columns,
        })
    }
}
