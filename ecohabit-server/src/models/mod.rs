//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod habit;
pub mod validation;

pub use habit::{Habit, HabitId, HabitPatch, HabitTitle, NewHabit};
pub use validation::ValidationError;
