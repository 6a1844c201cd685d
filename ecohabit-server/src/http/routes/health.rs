//! Liveness probe, outside the rate limiter

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Which store backs the service ("postgres" or "memory")
    pub store: &'static str,
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        store: state.habits().backend(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
