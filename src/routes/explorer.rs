//! Explorer routes. Path segments are table names and row ids; handlers resolve both against
//! the live catalog on every request.

use crate::handlers::explorer::{create, delete as delete_handler, list, list_tables, read, unknown_method, update};
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::get, Router};

pub fn explorer_routes(state: AppState) -> Router {
    let body_limit = state.body_limit_bytes;
    Router::new()
        .route("/", get(list_tables).fallback(unknown_method))
        .route("/:table", get(list).put(create).fallback(unknown_method))
        .route(
            "/:table/:id",
            get(read).post(update).delete(delete_handler).fallback(unknown_method),
        )
        .fallback(unknown_method)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
