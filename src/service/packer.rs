//! Result set to JSON rows.

use crate::db::{Cell, ResultSet};
use crate::error::AppError;
use serde_json::{Map, Number, Value};

/// Column name -> scalar, in the engine's column order.
pub type Row = Map<String, Value>;

/// Every row of `rs`. An empty result is an empty list; list fetches rely on that.
pub fn pack_rows(rs: ResultSet) -> Vec<Row> {
    let ResultSet { columns, rows } = rs;
    rows.into_iter()
        .map(|cells| {
            columns
                .iter()
                .cloned()
                .zip(cells.into_iter().map(cell_to_value))
                .collect()
        })
        .collect()
}

/// The first row of `rs`. Zero rows is `record not found`.
pub fn pack_one(rs: ResultSet) -> Result<Row, AppError> {
    pack_rows(rs)
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("record not found".into()))
}

fn cell_to_value(cell: Cell) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::Int(n) => Value::Number(n.into()),
        Cell::UInt(n) => Value::Number(n.into()),
        Cell::Float(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        Cell::Text(s) => Value::String(s),
        Cell::Bytes(b) => Value::String(String::from_utf8_lossy(&b).into_owned()),
    }
}
