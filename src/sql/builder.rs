//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for a catalog-resolved table.

use crate::sql::SqlValue;
use serde_json::Value;

/// Quote identifier for MySQL. Identifiers come from the catalog, never from values.
pub fn quoted(s: &str) -> String {
    format!("`{}`", s.replace('`', "``"))
}

/// Database-qualified table name.
pub fn qualified_table(database: &str, table: &str) -> String {
    format!("{}.{}", quoted(database), quoted(table))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl QueryBuf {
    fn new(sql: String) -> Self {
        QueryBuf {
            sql,
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: impl Into<SqlValue>) {
        self.params.push(v.into());
    }
}

/// Tables of the connection's default database.
pub fn show_tables() -> QueryBuf {
    QueryBuf::new("SHOW TABLES".into())
}

/// Row-capped structural probe; only its column list is used.
pub fn select_probe(database: &str, table: &str) -> QueryBuf {
    QueryBuf::new(format!("SELECT * FROM {} LIMIT 1", qualified_table(database, table)))
}

/// One page of rows in engine order.
pub fn select_page(database: &str, table: &str, limit: u64, offset: u64) -> QueryBuf {
    let mut q = QueryBuf::new(format!(
        "SELECT * FROM {} LIMIT ? OFFSET ?",
        qualified_table(database, table)
    ));
    q.push_param(limit);
    q.push_param(offset);
    q
}

/// SELECT by primary key.
pub fn select_by_key(database: &str, table: &str, primary_key: &str, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new(format!(
        "SELECT * FROM {} WHERE {} = ?",
        qualified_table(database, table),
        quoted(primary_key)
    ));
    q.push_param(id);
    q
}

/// INSERT of the validated fields, in field order. No fields inserts a row of engine defaults.
pub fn insert(database: &str, table: &str, fields: &[(String, Value)]) -> QueryBuf {
    let table = qualified_table(database, table);
    let mut q = QueryBuf::default();
    let mut cols = Vec::with_capacity(fields.len());
    let mut placeholders = Vec::with_capacity(fields.len());
    for (name, value) in fields {
        cols.push(quoted(name));
        placeholders.push("?");
        q.push_param(SqlValue::from_json(value));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// UPDATE by primary key: SET every validated field except the key itself.
/// Returns None when nothing is left to set.
pub fn update(
    database: &str,
    table: &str,
    primary_key: &str,
    id: i64,
    fields: &[(String, Value)],
) -> Option<QueryBuf> {
    let mut q = QueryBuf::default();
    let mut sets = Vec::with_capacity(fields.len());
    for (name, value) in fields {
        if name == primary_key {
            continue;
        }
        sets.push(format!("{} = ?", quoted(name)));
        q.push_param(SqlValue::from_json(value));
    }
    if sets.is_empty() {
        return None;
    }
    q.push_param(id);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        qualified_table(database, table),
        sets.join(", "),
        quoted(primary_key)
    );
    Some(q)
}

/// DELETE by primary key.
pub fn delete(database: &str, table: &str, primary_key: &str, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new(format!(
        "DELETE FROM {} WHERE {} = ?",
        qualified_table(database, table),
        quoted(primary_key)
    ));
    q.push_param(id);
    q
}
