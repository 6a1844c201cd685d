//! Database connection pool management
//!
//! Uses sqlx PgPool with the connection limit from [`DatabaseConfig`].

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Create a PostgreSQL connection pool.
///
/// Connects eagerly so an unreachable database fails startup instead of
/// the first request.
///
/// # Errors
///
/// Returns an error if the connection fails.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&config.database).await?;
/// ```
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.connection_limit)
        .connect_with(connect_options(config))
        .await
}

fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .database(&config.name);

    match &config.password {
        Some(password) => options.password(password),
        None => options,
    }
}
