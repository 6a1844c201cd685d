//! Startup error types for ecohabit-server
//!
//! Request-time failures are `http::ApiError`; this covers what can stop
//! the server from starting or keep it from serving.

use thiserror::Error;

use crate::config::ConfigError;
use crate::http::ServerError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("server error: {0}")]
    Server(#[from] ServerError),
}
