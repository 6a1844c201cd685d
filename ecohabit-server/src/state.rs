//! Application state shared across handlers

use std::sync::Arc;

use crate::service::HabitService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    habits: HabitService,
}

impl AppState {
    pub fn new(habits: HabitService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { habits }),
        }
    }

    pub fn habits(&self) -> &HabitService {
        &self.inner.habits
    }
}
