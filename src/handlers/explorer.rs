//! Explorer handlers: list tables, list, read, create, update, delete.

use crate::error::AppError;
use crate::response::{created_key, success, Deleted, Record, Records, Tables, Updated};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::IntoResponse,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

const DEFAULT_OFFSET: u64 = 0;

// Extractor rejections flow through AppError so every error body stays JSON.
type TablePath = Result<Path<String>, PathRejection>;
type RowPath = Result<Path<(String, String)>, PathRejection>;
type JsonBody = Result<Bytes, BytesRejection>;

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest("invalid id".into()))
}

/// Decode a request body into a JSON object. Integers stay distinct from floats.
fn body_to_map(body: &[u8]) -> Result<Map<String, Value>, AppError> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::Internal("body must be a JSON object".into())),
    }
}

/// Non-negative integer query value, or `default` when absent or unparsable.
fn page_param(params: &HashMap<String, String>, key: &str, default: u64) -> u64 {
    params
        .get(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub async fn list_tables(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let tables = state.crud.tables().await?;
    Ok(success(Tables { tables }))
}

pub async fn list(
    State(state): State<AppState>,
    path: TablePath,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(table) = path?;
    let Query(params) = query?;
    let limit = page_param(&params, "limit", state.default_page_limit);
    let offset = page_param(&params, "offset", DEFAULT_OFFSET);
    let records = state.crud.list(&table, limit, offset).await?;
    Ok(success(Records { records }))
}

pub async fn read(State(state): State<AppState>, path: RowPath) -> Result<impl IntoResponse, AppError> {
    let Path((table, id_str)) = path?;
    let id = parse_id(&id_str)?;
    let record = state.crud.read(&table, id).await?;
    Ok(success(Record { record }))
}

pub async fn create(
    State(state): State<AppState>,
    path: TablePath,
    body: JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let Path(table) = path?;
    let body = body?;
    let payload = body_to_map(&body)?;
    let (primary_key, id) = state.crud.create(&table, &payload).await?;
    Ok(success(created_key(&primary_key, id)))
}

pub async fn update(
    State(state): State<AppState>,
    path: RowPath,
    body: JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let Path((table, id_str)) = path?;
    let body = body?;
    let id = parse_id(&id_str)?;
    let payload = body_to_map(&body)?;
    let updated = state.crud.update(&table, id, &payload).await?;
    Ok(success(Updated { updated }))
}

pub async fn delete(State(state): State<AppState>, path: RowPath) -> Result<impl IntoResponse, AppError> {
    let Path((table, id_str)) = path?;
    let id = parse_id(&id_str)?;
    let deleted = state.crud.delete(&table, id).await?;
    Ok(success(Deleted { deleted }))
}

/// Any path or method outside the explorer surface.
pub async fn unknown_method() -> AppError {
    AppError::NotFound("unknown method".into())
}
