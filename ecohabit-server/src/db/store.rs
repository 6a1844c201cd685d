//! Storage seam for habit records
//!
//! Handlers and the service only see `HabitStore`; the PostgreSQL pool
//! and the in-memory map are interchangeable behind it.

use std::time::Duration;

use async_trait::async_trait;

use crate::models::{Habit, HabitId, HabitPatch, NewHabit};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("store call exceeded deadline of {}ms", .after.as_millis())]
    Timeout { after: Duration },

    #[error("store queue is full ({capacity} calls in flight)")]
    QueueFull { capacity: usize },
}

impl DbError {
    pub(crate) fn habit_not_found(id: HabitId) -> Self {
        Self::NotFound {
            resource: "habit",
            id: id.to_string(),
        }
    }
}

/// One statement per operation; every call is atomic on its own.
#[async_trait]
pub trait HabitStore: Send + Sync + 'static {
    /// Short backend name for diagnostics.
    fn backend(&self) -> &'static str;

    /// All habits ordered by ascending id.
    async fn list(&self) -> Result<Vec<Habit>, DbError>;

    /// Insert and return the record with its assigned id.
    async fn create(&self, habit: NewHabit) -> Result<Habit, DbError>;

    /// Apply a partial patch. `NotFound` when no row matches.
    async fn update(&self, id: HabitId, patch: HabitPatch) -> Result<Habit, DbError>;

    /// Remove exactly one row. `NotFound` when no row matches.
    async fn delete(&self, id: HabitId) -> Result<(), DbError>;
}
