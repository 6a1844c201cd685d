//! HTTP server layer
//!
//! Axum server with:
//! - CORS (localhost only by default)
//! - Per-client rate limiting
//! - Request tracing
//! - Graceful shutdown
//! - JSON error responses

pub mod error;
pub mod extractors;
pub mod rate_limit;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, ServerError};
