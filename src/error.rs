//! Typed errors and HTTP mapping.

use axum::{
    extract::rejection::{BytesRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// MySQL server error numbers that mean the addressed table or database does not exist.
const ER_BAD_DB_ERROR: u16 = 1049;
const ER_NO_SUCH_TABLE: u16 = 1146;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("validation: {0}")]
    Validation(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Unknown table, missing primary key, zero-row single record fetch.
    #[error("{0}")]
    NotFound(String),
    /// Payload field rejected by type, nullability or primary-key rules.
    #[error("field {0} have invalid type")]
    InvalidField(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
    #[error("{0}")]
    Db(#[from] sqlx::Error),
    /// Malformed request body.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// An extractor refused the request before the handler ran (bad path encoding, body too large).
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl From<PathRejection> for AppError {
    fn from(r: PathRejection) -> Self {
        AppError::Rejected {
            status: r.status(),
            message: r.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(r: QueryRejection) -> Self {
        AppError::Rejected {
            status: r.status(),
            message: r.body_text(),
        }
    }
}

impl From<BytesRejection> for AppError {
    fn from(r: BytesRejection) -> Self {
        AppError::Rejected {
            status: r.status(),
            message: r.body_text(),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidField(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Rejected { status, .. } => *status,
            AppError::Db(e) if is_structural_not_found(e) => StatusCode::NOT_FOUND,
            AppError::Internal(_) | AppError::Db(_) | AppError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Row-not-found and "no such table/database" engine errors surface as 404.
fn is_structural_not_found(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::RowNotFound => true,
        sqlx::Error::Database(db) => db
            .try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
            .map(|my| matches!(my.number(), ER_NO_SUCH_TABLE | ER_BAD_DB_ERROR))
            .unwrap_or(false),
        _ => false,
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
