//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Per-client rate limiting on the habit routes
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use super::rate_limit::{self, RateLimiter};
use super::routes;
use crate::config::{Config, HttpConfig};
use crate::state::AppState;

/// Build the application router with all routes
pub fn build_router(state: AppState, config: &Config) -> Router {
    let mut habits = routes::habits::router();
    if let Some(quota) = &config.rate_limit {
        tracing::info!(
            max_requests = quota.max_requests,
            window_secs = quota.window.as_secs(),
            "Rate limiting enabled"
        );
        let limiter = Arc::new(RateLimiter::new(quota.clone()));
        habits = habits.route_layer(middleware::from_fn_with_state(limiter, rate_limit::enforce));
    }

    Router::new()
        .merge(routes::health::router())
        .merge(habits)
        .fallback(no_route)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(cors_layer(&config.http))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until a shutdown signal arrives.
pub async fn run_server(state: AppState, config: &Config) -> Result<(), ServerError> {
    let app = build_router(state, config);
    let bind_addr = config.http.bind_addr;

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("Eco Habit Tracker API listening on {}", bind_addr);

    // Connect info feeds the rate limiter's client key
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn cors_layer(config: &HttpConfig) -> CorsLayer {
    if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }

    let port = config.bind_addr.port();
    let origins: Vec<HeaderValue> = ["localhost", "127.0.0.1"]
        .iter()
        .filter_map(|host| format!("http://{}:{}", host, port).parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn no_route() -> ApiError {
    ApiError::NoRoute
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
