//! API error types with IntoResponse
//!
//! Errors are converted to JSON `{error, message}` responses with
//! appropriate status codes. Store details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// No route matched (404)
    NoRoute,

    /// Route exists but not for this method (405)
    MethodNotAllowed,

    /// Store access failed (500, logged)
    Database {
        context: &'static str,
        source: DbError,
    },

    /// Deadline elapsed or store queue full (503)
    Unavailable { reason: String },

    /// Client exceeded its request quota (429)
    RateLimited,
}

impl ApiError {
    /// Map a store error, keeping `context` for the client-facing message.
    ///
    /// ```ignore
    /// state.habits.list().await.map_err(ApiError::store("could not fetch habits"))?;
    /// ```
    pub fn store(context: &'static str) -> impl FnOnce(DbError) -> Self {
        move |source| match source {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Timeout { .. } | DbError::QueueFull { .. } => Self::Unavailable {
                reason: source.to_string(),
            },
            DbError::Sqlx(_) => Self::Database { context, source },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_error",
                    "message": e.to_string()
                }),
            ),
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": format!("{} '{}' not found", resource, id)
                }),
            ),
            Self::NoRoute => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": "no such route"
                }),
            ),
            Self::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({
                    "error": "method_not_allowed",
                    "message": "method not allowed for this route"
                }),
            ),
            Self::Database { context, source } => {
                // Log the actual error, return generic message
                tracing::error!(error = %source, "{}", context);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": format!("Server error - {}", context)
                    }),
                )
            }
            Self::Unavailable { reason } => {
                tracing::warn!("Store unavailable: {}", reason);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({
                        "error": "unavailable",
                        "message": "service temporarily unavailable, please retry"
                    }),
                )
            }
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "error": "rate_limited",
                    "message": "Too many requests from this IP, please try again later"
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use std::time::Duration;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_is_400() {
        let err = ApiError::Validation(ValidationError::Empty { field: "title" });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "title is required");
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let err = ApiError::store("could not update habit")(DbError::NotFound {
            resource: "habit",
            id: "7".into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "habit '7' not found");
    }

    #[tokio::test]
    async fn database_error_hides_detail() {
        let err = ApiError::store("could not fetch habits")(DbError::Sqlx(
            sqlx::Error::PoolTimedOut,
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "Server error - could not fetch habits");
    }

    #[tokio::test]
    async fn timeout_is_503() {
        let err = ApiError::store("could not add habit")(DbError::Timeout {
            after: Duration::from_secs(5),
        });
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn queue_full_is_503_without_detail() {
        let err = ApiError::store("could not fetch habits")(DbError::QueueFull { capacity: 101 });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["error"], "unavailable");
        assert!(!body["message"].as_str().unwrap().contains("101"));
    }
}
