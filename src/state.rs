//! Shared application state for all routes. Built once from an injected executor.

use crate::catalog::SchemaCatalog;
use crate::config::ExplorerConfig;
use crate::db::SqlExecutor;
use crate::service::CrudService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub crud: Arc<CrudService>,
    pub default_page_limit: u64,
    pub body_limit_bytes: usize,
}

impl AppState {
    pub fn new(executor: Arc<dyn SqlExecutor>, config: &ExplorerConfig) -> Self {
        let catalog = SchemaCatalog::new(executor.clone(), config.auto_increment_on_error);
        AppState {
            crud: Arc::new(CrudService::new(executor, catalog)),
            default_page_limit: config.default_page_limit,
            body_limit_bytes: config.body_limit_bytes,
        }
    }
}
