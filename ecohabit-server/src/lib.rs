//! ecohabit-server: HTTP API for the eco habit tracker
//!
//! CRUD over a single `habits` table, served by axum, backed by a
//! PostgreSQL pool (or an in-memory store for local development).

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod service;
pub mod state;

use std::sync::Arc;

pub use config::Config;
pub use error::{Error, Result};
pub use service::HabitService;
pub use state::AppState;

use db::{HabitRepo, HabitStore, MemoryHabitStore};

/// Connect the pool and serve until shutdown.
pub async fn serve(config: Config) -> Result<()> {
    tracing::info!(
        host = %config.database.host,
        port = config.database.port,
        database = %config.database.name,
        connection_limit = config.database.connection_limit,
        "Connecting to database"
    );
    let pool = db::create_pool(&config.database).await?;

    serve_with_store(config, Arc::new(HabitRepo::new(pool))).await
}

/// Serve from process memory; nothing is persisted.
pub async fn serve_in_memory(config: Config) -> Result<()> {
    tracing::warn!("Using in-memory store - habits are lost on shutdown");
    serve_with_store(config, Arc::new(MemoryHabitStore::new())).await
}

async fn serve_with_store(config: Config, store: Arc<dyn HabitStore>) -> Result<()> {
    let habits = HabitService::new(store, config.http.request_timeout)
        .with_queue_limit(&config.database);
    let state = AppState::new(habits);

    http::run_server(state, &config).await?;
    Ok(())
}
