//! In-memory habit store
//!
//! Backs `ecohabit --memory` and the router tests. Ids are assigned from a
//! monotonically increasing counter and never reused.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::store::{DbError, HabitStore};
use crate::models::{Habit, HabitId, HabitPatch, NewHabit};

#[derive(Default)]
struct Table {
    rows: BTreeMap<HabitId, Habit>,
    last_id: HabitId,
}

/// Habit store kept in process memory
#[derive(Default)]
pub struct MemoryHabitStore {
    table: RwLock<Table>,
}

impl MemoryHabitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HabitStore for MemoryHabitStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> Result<Vec<Habit>, DbError> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn create(&self, habit: NewHabit) -> Result<Habit, DbError> {
        let mut table = self.table.write().await;
        table.last_id += 1;

        let record = Habit {
            id: table.last_id,
            title: habit.title.into_string(),
            completed: habit.completed,
            points: habit.points,
        };
        table.rows.insert(record.id, record.clone());

        Ok(record)
    }

    async fn update(&self, id: HabitId, patch: HabitPatch) -> Result<Habit, DbError> {
        let mut table = self.table.write().await;
        let habit = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| DbError::habit_not_found(id))?;

        patch.apply(habit);
        Ok(habit.clone())
    }

    async fn delete(&self, id: HabitId) -> Result<(), DbError> {
        let mut table = self.table.write().await;
        table
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DbError::habit_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HabitTitle;

    fn new_habit(title: &str, points: i32) -> NewHabit {
        NewHabit {
            title: HabitTitle::new(title).unwrap(),
            completed: false,
            points,
        }
    }

    #[tokio::test]
    async fn ids_are_unique_and_not_reused() {
        let store = MemoryHabitStore::new();
        let first = store.create(new_habit("Plant a tree", 5)).await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.create(new_habit("Carpool", 1)).await.unwrap();

        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let store = MemoryHabitStore::new();
        for title in ["a", "b", "c"] {
            store.create(new_habit(title, 0)).await.unwrap();
        }

        let ids: Vec<_> = store.list().await.unwrap().iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = MemoryHabitStore::new();
        let err = store.update(42, HabitPatch::default()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "habit", .. }));
    }
}
