//! Habit store implementations
//!
//! - `HabitRepo`: PostgreSQL, one parameterized statement per operation
//! - `MemoryHabitStore`: process-local map for tests and `--memory` mode

pub mod habits;
pub mod memory;

pub use habits::HabitRepo;
pub use memory::MemoryHabitStore;
