//! In-memory SqlExecutor for tests. Understands the catalog queries and the statements the
//! builder emits; the first column of every table is its key.

use crate::db::{Cell, ExecOutcome, ResultSet, SqlExecutor};
use crate::error::AppError;
use crate::sql::SqlValue;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Clone, Debug)]
pub(crate) struct FakeColumn {
    name: String,
    data_type: String,
    nullable: bool,
    auto_increment: bool,
}

pub(crate) fn column(name: &str, data_type: &str, nullable: bool, auto_increment: bool) -> FakeColumn {
    FakeColumn {
        name: name.into(),
        data_type: data_type.into(),
        nullable,
        auto_increment,
    }
}

#[derive(Default)]
struct FakeTable {
    columns: Vec<FakeColumn>,
    rows: Vec<Vec<Cell>>,
    next_id: u64,
}

pub(crate) struct FakeDb {
    default_database: String,
    tables: Mutex<BTreeMap<(String, String), FakeTable>>,
    fail_on: Option<String>,
    statements: Mutex<Vec<String>>,
}

impl FakeDb {
    pub(crate) fn new(default_database: &str) -> Self {
        FakeDb {
            default_database: default_database.into(),
            tables: Mutex::new(BTreeMap::new()),
            fail_on: None,
            statements: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_table(self, database: &str, table: &str, columns: Vec<FakeColumn>) -> Self {
        self.tables.lock().unwrap().insert(
            (database.into(), table.into()),
            FakeTable {
                columns,
                ..FakeTable::default()
            },
        );
        self
    }

    /// Append a stored row; advances the auto-increment counter past integer keys.
    pub(crate) fn with_row(self, database: &str, table: &str, row: Vec<Cell>) -> Self {
        {
            let mut tables = self.tables.lock().unwrap();
            let t = tables
                .get_mut(&(database.to_string(), table.to_string()))
                .expect("table registered before rows");
            if let Some(Cell::Int(id)) = row.first() {
                t.next_id = t.next_id.max(*id as u64);
            }
            t.rows.push(row);
        }
        self
    }

    /// Every statement containing `fragment` fails with an internal error.
    pub(crate) fn failing_on(mut self, fragment: &str) -> Self {
        self.fail_on = Some(fragment.into());
        self
    }

    pub(crate) fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    fn record(&self, sql: &str) -> Result<(), AppError> {
        self.statements.lock().unwrap().push(sql.to_string());
        match &self.fail_on {
            Some(fragment) if sql.contains(fragment.as_str()) => {
                Err(AppError::Internal("fake database failure".into()))
            }
            _ => Ok(()),
        }
    }

    fn fetch_sync(&self, sql: &str, params: &[SqlValue]) -> Result<ResultSet, AppError> {
        self.record(sql)?;
        let tables = self.tables.lock().unwrap();

        if sql.starts_with("SHOW TABLES") {
            let rows = tables
                .keys()
                .filter(|(db, _)| *db == self.default_database)
                .map(|(_, t)| vec![Cell::Text(t.clone())])
                .collect();
            return Ok(ResultSet {
                columns: vec![format!("Tables_in_{}", self.default_database)],
                rows,
            });
        }
        if sql.contains("information_schema.tables") {
            let rows = tables
                .keys()
                .map(|(db, t)| vec![Cell::Text(db.clone()), Cell::Text(t.clone())])
                .collect();
            return Ok(ResultSet {
                columns: vec!["TABLE_SCHEMA".into(), "TABLE_NAME".into()],
                rows,
            });
        }
        if sql.contains("information_schema.columns") {
            let key = (text_param(params, 0)?, text_param(params, 1)?);
            let columns = tables.get(&key).map(|t| t.columns.clone()).unwrap_or_default();
            if sql.contains("EXTRA LIKE") {
                let rows = columns
                    .iter()
                    .filter(|c| c.auto_increment)
                    .map(|c| vec![Cell::Text(c.name.clone())])
                    .collect();
                return Ok(ResultSet {
                    columns: vec!["COLUMN_NAME".into()],
                    rows,
                });
            }
            let rows = columns
                .iter()
                .map(|c| {
                    vec![
                        Cell::Text(c.name.clone()),
                        // Some servers hand back information_schema text as binary.
                        Cell::Bytes(c.data_type.clone().into_bytes()),
                        Cell::Text(if c.nullable { "YES" } else { "NO" }.into()),
                    ]
                })
                .collect();
            return Ok(ResultSet {
                columns: vec!["COLUMN_NAME".into(), "DATA_TYPE".into(), "IS_NULLABLE".into()],
                rows,
            });
        }
        if sql.starts_with("SELECT * FROM") {
            let idents = backtick_idents(sql);
            let table = lookup(&tables, &idents)?;
            let columns = table.columns.iter().map(|c| c.name.clone()).collect();
            let mut rows = table.rows.clone();
            if sql.contains(" WHERE ") {
                let id = int_param(params, 0)?;
                rows.retain(|r| key_matches(r, id));
            }
            if sql.ends_with("LIMIT ? OFFSET ?") {
                let limit = int_param(params, 0)? as usize;
                let offset = int_param(params, 1)? as usize;
                rows = rows.into_iter().skip(offset).take(limit).collect();
            } else if sql.ends_with("LIMIT 1") {
                rows.truncate(1);
            }
            return Ok(ResultSet { columns, rows });
        }
        Err(AppError::Internal(format!("fake database cannot fetch: {}", sql)))
    }

    fn execute_sync(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome, AppError> {
        self.record(sql)?;
        let mut tables = self.tables.lock().unwrap();
        let idents = backtick_idents(sql);
        let key = table_key(&idents)?;
        let table = tables
            .get_mut(&key)
            .ok_or_else(|| AppError::NotFound(format!("Table '{}.{}' doesn't exist", key.0, key.1)))?;

        if sql.starts_with("INSERT INTO") {
            let given = &idents[2..];
            for name in given {
                if !table.columns.iter().any(|c| &c.name == name) {
                    return Err(AppError::Internal(format!("Unknown column '{}'", name)));
                }
            }
            let mut last_insert_id = 0;
            let mut row = Vec::with_capacity(table.columns.len());
            for c in &table.columns {
                if let Some(pos) = given.iter().position(|g| *g == c.name) {
                    row.push(cell_from(&params[pos]));
                } else if c.auto_increment {
                    table.next_id += 1;
                    last_insert_id = table.next_id;
                    row.push(Cell::Int(table.next_id as i64));
                } else if c.nullable {
                    row.push(Cell::Null);
                } else {
                    return Err(AppError::Internal(format!(
                        "Field '{}' doesn't have a default value",
                        c.name
                    )));
                }
            }
            table.rows.push(row);
            return Ok(ExecOutcome {
                rows_affected: 1,
                last_insert_id,
            });
        }
        if sql.starts_with("UPDATE") {
            let set_cols = &idents[2..idents.len() - 1];
            let id = int_param(params, params.len() - 1)?;
            let indexes: Vec<usize> = set_cols
                .iter()
                .map(|name| {
                    table
                        .columns
                        .iter()
                        .position(|c| &c.name == name)
                        .ok_or_else(|| AppError::Internal(format!("Unknown column '{}'", name)))
                })
                .collect::<Result<_, _>>()?;
            let mut affected = 0;
            for row in table.rows.iter_mut().filter(|r| key_matches(r, id)) {
                for (param, idx) in params.iter().zip(&indexes) {
                    row[*idx] = cell_from(param);
                }
                affected += 1;
            }
            return Ok(ExecOutcome {
                rows_affected: affected,
                last_insert_id: 0,
            });
        }
        if sql.starts_with("DELETE FROM") {
            let id = int_param(params, 0)?;
            let before = table.rows.len();
            table.rows.retain(|r| !key_matches(r, id));
            return Ok(ExecOutcome {
                rows_affected: (before - table.rows.len()) as u64,
                last_insert_id: 0,
            });
        }
        Err(AppError::Internal(format!("fake database cannot execute: {}", sql)))
    }
}

#[async_trait]
impl SqlExecutor for FakeDb {
    async fn fetch(&self, sql: &str, params: &[SqlValue]) -> Result<ResultSet, AppError> {
        self.fetch_sync(sql, params)
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome, AppError> {
        self.execute_sync(sql, params)
    }
}

fn backtick_idents(sql: &str) -> Vec<String> {
    sql.split('`').skip(1).step_by(2).map(String::from).collect()
}

fn table_key(idents: &[String]) -> Result<(String, String), AppError> {
    match idents {
        [db, table, ..] => Ok((db.clone(), table.clone())),
        _ => Err(AppError::Internal("statement names no table".into())),
    }
}

fn lookup<'a>(
    tables: &'a BTreeMap<(String, String), FakeTable>,
    idents: &[String],
) -> Result<&'a FakeTable, AppError> {
    let key = table_key(idents)?;
    tables
        .get(&key)
        .ok_or_else(|| AppError::NotFound(format!("Table '{}.{}' doesn't exist", key.0, key.1)))
}

fn key_matches(row: &[Cell], id: i64) -> bool {
    row.first() == Some(&Cell::Int(id))
}

fn int_param(params: &[SqlValue], idx: usize) -> Result<i64, AppError> {
    match params.get(idx) {
        Some(SqlValue::Int(n)) => Ok(*n),
        other => Err(AppError::Internal(format!("expected integer parameter, got {:?}", other))),
    }
}

fn text_param(params: &[SqlValue], idx: usize) -> Result<String, AppError> {
    match params.get(idx) {
        Some(SqlValue::Text(s)) => Ok(s.clone()),
        other => Err(AppError::Internal(format!("expected text parameter, got {:?}", other))),
    }
}

fn cell_from(v: &SqlValue) -> Cell {
    match v {
        SqlValue::Null => Cell::Null,
        SqlValue::Bool(b) => Cell::Int(*b as i64),
        SqlValue::Int(n) => Cell::Int(*n),
        SqlValue::Float(f) => Cell::Float(*f),
        SqlValue::Text(s) => Cell::Text(s.clone()),
    }
}
