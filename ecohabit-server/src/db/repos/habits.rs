//! Habit repository over PostgreSQL
//!
//! Each operation is a single parameterized statement:
//! - create/update: RETURNING the row so handlers can echo it
//! - update: COALESCE keeps columns whose input is NULL
//! - delete: rows_affected == 0 means not found

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::store::{DbError, HabitStore};
use crate::models::{Habit, HabitId, HabitPatch, NewHabit};

/// Habit repository backed by a connection pool
#[derive(Clone)]
pub struct HabitRepo {
    pool: PgPool,
}

impl HabitRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HabitStore for HabitRepo {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn list(&self) -> Result<Vec<Habit>, DbError> {
        let habits: Vec<Habit> = sqlx::query_as(
            r#"
            SELECT id, title, completed, points
            FROM habits
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(habits)
    }

    async fn create(&self, habit: NewHabit) -> Result<Habit, DbError> {
        let created: Habit = sqlx::query_as(
            r#"
            INSERT INTO habits (title, completed, points)
            VALUES ($1, $2, $3)
            RETURNING id, title, completed, points
            "#,
        )
        .bind(habit.title.as_str())
        .bind(habit.completed)
        .bind(habit.points)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update(&self, id: HabitId, patch: HabitPatch) -> Result<Habit, DbError> {
        let updated: Option<Habit> = sqlx::query_as(
            r#"
            UPDATE habits
            SET title = COALESCE($1, title),
                completed = COALESCE($2, completed),
                points = COALESCE($3, points)
            WHERE id = $4
            RETURNING id, title, completed, points
            "#,
        )
        .bind(patch.title.as_ref().map(|t| t.as_str()))
        .bind(patch.completed)
        .bind(patch.points)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DbError::habit_not_found(id))
    }

    async fn delete(&self, id: HabitId) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM habits WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::habit_not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HabitTitle;

    // Integration tests - run with DATABASE_URL set
    // cargo test -p ecohabit-server -- --ignored

    async fn repo() -> HabitRepo {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = PgPool::connect(&url).await.expect("pool creation failed");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS habits (
                id BIGSERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                completed BOOLEAN NOT NULL DEFAULT FALSE,
                points INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&pool)
        .await
        .expect("create table failed");

        HabitRepo::new(pool)
    }

    fn new_habit(title: &str) -> NewHabit {
        NewHabit {
            title: HabitTitle::new(title).unwrap(),
            completed: false,
            points: 0,
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_keeps_unspecified_columns() {
        let repo = repo().await;
        let created = repo.create(new_habit("Refill water bottle")).await.unwrap();

        let patch = HabitPatch {
            points: Some(10),
            ..Default::default()
        };
        let updated = repo.update(created.id, patch).await.unwrap();

        assert_eq!(updated.title, "Refill water bottle");
        assert!(!updated.completed);
        assert_eq!(updated.points, 10);

        repo.delete(created.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn delete_missing_is_not_found() {
        let repo = repo().await;
        let err = repo.delete(i64::MAX).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn created_row_is_listed() {
        let repo = repo().await;
        let created = repo.create(new_habit("Take the bus")).await.unwrap();

        let habits = repo.list().await.unwrap();
        assert!(habits.contains(&created));

        repo.delete(created.id).await.unwrap();
    }
}
