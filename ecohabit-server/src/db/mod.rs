//! Database layer - connection pool and habit stores
//!
//! # Design Principles
//!
//! - One pool per process, injected at startup; handlers never open connections
//! - One statement per operation, no multi-step transactions
//! - Not-found is detected from the statement result, not by check-then-write

pub mod pool;
pub mod repos;
pub mod store;

pub use pool::create_pool;
pub use repos::{HabitRepo, MemoryHabitStore};
pub use store::{DbError, HabitStore};
