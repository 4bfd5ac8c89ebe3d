//! DB Explorer: schema-driven REST interface over an existing MySQL database.

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{ColumnDescriptor, ColumnType, SchemaCatalog, TableRef, TableSchema};
pub use config::{AutoIncrementOnError, ExplorerConfig};
pub use db::{MySqlExecutor, SqlExecutor};
pub use error::{AppError, ConfigError};
pub use routes::explorer_routes;
pub use service::{CrudService, PayloadValidator};
pub use state::AppState;
