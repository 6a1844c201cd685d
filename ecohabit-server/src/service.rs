//! Habit record service
//!
//! Wraps a [`HabitStore`] with the two per-call guards:
//! - a fixed deadline; an elapsed deadline drops the store future
//! - an optional admission gate of `connection_limit + queue_limit` permits

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::config::DatabaseConfig;
use crate::db::{DbError, HabitStore};
use crate::models::{Habit, HabitId, HabitPatch, NewHabit};

#[derive(Clone)]
struct AdmissionGate {
    permits: Arc<Semaphore>,
    capacity: usize,
}

/// CRUD operations over the habits table
#[derive(Clone)]
pub struct HabitService {
    store: Arc<dyn HabitStore>,
    timeout: Duration,
    gate: Option<AdmissionGate>,
}

impl HabitService {
    pub fn new(store: Arc<dyn HabitStore>, timeout: Duration) -> Self {
        Self {
            store,
            timeout,
            gate: None,
        }
    }

    /// Bound concurrent store calls to the pool size plus the queue limit.
    ///
    /// A queue limit of 0 leaves waiting unbounded.
    pub fn with_queue_limit(mut self, database: &DatabaseConfig) -> Self {
        self.gate = match database.queue_limit {
            0 => None,
            queue => {
                let capacity = database.connection_limit as usize + queue as usize;
                Some(AdmissionGate {
                    permits: Arc::new(Semaphore::new(capacity)),
                    capacity,
                })
            }
        };
        self
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub async fn list(&self) -> Result<Vec<Habit>, DbError> {
        self.guarded(self.store.list()).await
    }

    pub async fn create(&self, habit: NewHabit) -> Result<Habit, DbError> {
        self.guarded(self.store.create(habit)).await
    }

    pub async fn update(&self, id: HabitId, patch: HabitPatch) -> Result<Habit, DbError> {
        self.guarded(self.store.update(id, patch)).await
    }

    pub async fn delete(&self, id: HabitId) -> Result<(), DbError> {
        self.guarded(self.store.delete(id)).await
    }

    async fn guarded<T, F>(&self, call: F) -> Result<T, DbError>
    where
        F: Future<Output = Result<T, DbError>>,
    {
        // Held until the store call finishes or is dropped.
        let _permit = match &self.gate {
            Some(gate) => Some(gate.permits.clone().try_acquire_owned().map_err(|_| {
                DbError::QueueFull {
                    capacity: gate.capacity,
                }
            })?),
            None => None,
        };

        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| DbError::Timeout {
                after: self.timeout,
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::db::MemoryHabitStore;
    use crate::models::HabitTitle;

    /// Store whose calls never complete
    struct StalledStore;

    #[async_trait]
    impl HabitStore for StalledStore {
        fn backend(&self) -> &'static str {
            "stalled"
        }

        async fn list(&self) -> Result<Vec<Habit>, DbError> {
            std::future::pending().await
        }

        async fn create(&self, _habit: NewHabit) -> Result<Habit, DbError> {
            std::future::pending().await
        }

        async fn update(&self, _id: HabitId, _patch: HabitPatch) -> Result<Habit, DbError> {
            std::future::pending().await
        }

        async fn delete(&self, _id: HabitId) -> Result<(), DbError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_store_hits_deadline() {
        let service = HabitService::new(Arc::new(StalledStore), Duration::from_secs(5));

        let err = service.list().await.unwrap_err();
        assert!(matches!(err, DbError::Timeout { after } if after == Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn gate_rejects_beyond_pool_plus_queue() {
        let database = DatabaseConfig {
            connection_limit: 1,
            queue_limit: 1,
            ..Default::default()
        };
        let service = HabitService::new(Arc::new(StalledStore), Duration::from_secs(3600))
            .with_queue_limit(&database);
        let permits = service.gate.as_ref().unwrap().permits.clone();

        let mut stalled = Vec::new();
        for _ in 0..2 {
            let service = service.clone();
            stalled.push(tokio::spawn(async move { service.list().await }));
        }
        while permits.available_permits() > 0 {
            tokio::task::yield_now().await;
        }

        let err = service.list().await.unwrap_err();
        assert!(matches!(err, DbError::QueueFull { capacity: 2 }));

        for handle in stalled {
            handle.abort();
        }
    }

    #[tokio::test]
    async fn zero_queue_limit_means_no_gate() {
        let service = HabitService::new(Arc::new(MemoryHabitStore::new()), Duration::from_secs(5))
            .with_queue_limit(&DatabaseConfig::default());
        assert!(service.gate.is_none());

        let created = service
            .create(NewHabit {
                title: HabitTitle::new("Unplug chargers").unwrap(),
                completed: false,
                points: 1,
            })
            .await
            .unwrap();
        assert_eq!(service.list().await.unwrap(), vec![created]);
    }
}
