//! Habit endpoints
//!
//! | Method | Path           | Success                      |
//! |--------|----------------|------------------------------|
//! | GET    | /habits        | 200 `[Habit]`                |
//! | POST   | /habits        | 201 `{message, habit}`       |
//! | PUT    | /habits/{id}   | 200 `{message, habit}`       |
//! | DELETE | /habits/{id}   | 200 `{message}`              |

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::extractors::{HabitIdPath, JsonBody};
use crate::models::{Habit, HabitPatch, NewHabit};
use crate::state::AppState;

/// Habit request body for create and update.
///
/// Create requires `title`; update leaves absent or null fields unchanged.
#[derive(Debug, Deserialize)]
pub struct HabitRequest {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub points: Option<i32>,
}

/// Acknowledgment, with the affected record when there is one
#[derive(Debug, Serialize)]
pub struct HabitResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub habit: Option<Habit>,
}

/// GET /habits - list all habits
async fn list_habits(State(state): State<AppState>) -> Result<Json<Vec<Habit>>, ApiError> {
    let habits = state
        .habits()
        .list()
        .await
        .map_err(ApiError::store("could not fetch habits"))?;

    Ok(Json(habits))
}

/// POST /habits - add a habit
async fn create_habit(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<HabitRequest>,
) -> Result<(StatusCode, Json<HabitResponse>), ApiError> {
    let habit = NewHabit::from_parts(req.title.as_deref(), req.completed, req.points)?;
    let created = state
        .habits()
        .create(habit)
        .await
        .map_err(ApiError::store("could not add habit"))?;

    tracing::debug!(id = created.id, "Habit added");
    Ok((
        StatusCode::CREATED,
        Json(HabitResponse {
            message: "Habit added successfully",
            habit: Some(created),
        }),
    ))
}

/// PUT /habits/{id} - patch the provided fields
async fn update_habit(
    State(state): State<AppState>,
    HabitIdPath(id): HabitIdPath,
    JsonBody(req): JsonBody<HabitRequest>,
) -> Result<Json<HabitResponse>, ApiError> {
    let patch = HabitPatch::from_parts(req.title.as_deref(), req.completed, req.points)?;
    let updated = state
        .habits()
        .update(id, patch)
        .await
        .map_err(ApiError::store("could not update habit"))?;

    Ok(Json(HabitResponse {
        message: "Habit updated successfully",
        habit: Some(updated),
    }))
}

/// DELETE /habits/{id} - remove a habit
async fn delete_habit(
    State(state): State<AppState>,
    HabitIdPath(id): HabitIdPath,
) -> Result<Json<HabitResponse>, ApiError> {
    state
        .habits()
        .delete(id)
        .await
        .map_err(ApiError::store("could not delete habit"))?;

    Ok(Json(HabitResponse {
        message: "Habit deleted successfully",
        habit: None,
    }))
}

/// Habit routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/habits", get(list_habits).post(create_habit))
        .route("/habits/{id}", put(update_habit).delete(delete_habit))
}
