//! Explorer server: serves db-explorer over the MySQL database named by `DATABASE_URL`.
//!
//! Run from repo root: `cargo run -p explorer-server`
//! Settings come from the environment (or a `.env` file); see `ExplorerConfig::from_env`.

use db_explorer::{explorer_routes, AppState, ExplorerConfig, MySqlExecutor};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("db_explorer=info,explorer_server=info")),
        )
        .init();

    let config = ExplorerConfig::from_env()?;
    let pool = sqlx::mysql::MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    let state = AppState::new(Arc::new(MySqlExecutor::new(pool)), &config);
    let app = explorer_routes(state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("explorer listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
