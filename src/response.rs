//! Standard response envelope helpers. Every success body is `{"response": ...}`.

use crate::service::Row;
use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Serialize)]
pub struct Envelope<T> {
    pub response: T,
}

#[derive(Serialize)]
pub struct Tables {
    pub tables: Vec<String>,
}

#[derive(Serialize)]
pub struct Records {
    pub records: Vec<Row>,
}

#[derive(Serialize)]
pub struct Record {
    pub record: Row,
}

#[derive(Serialize)]
pub struct Updated {
    pub updated: u64,
}

#[derive(Serialize)]
pub struct Deleted {
    pub deleted: u64,
}

pub fn success<T: Serialize>(response: T) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::OK, Json(Envelope { response }))
}

/// `{<primary key name>: id}` for a freshly inserted row.
pub fn created_key(primary_key: &str, id: i64) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert(primary_key.to_string(), Value::Number(id.into()));
    body
}
