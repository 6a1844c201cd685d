//! Habit record and its validated inputs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ValidationError;

/// Maximum length for habit titles
const MAX_TITLE_LEN: usize = 256;

/// Store-assigned habit identifier
pub type HabitId = i64;

/// A stored habit row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Habit {
    pub id: HabitId,
    pub title: String,
    pub completed: bool,
    pub points: i32,
}

/// Validated habit title, stored with surrounding whitespace trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitTitle(String);

impl HabitTitle {
    /// Create a new habit title.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Max 256 characters
    ///
    /// # Example
    /// ```
    /// use ecohabit_server::models::HabitTitle;
    ///
    /// assert!(HabitTitle::new("Cycle to work").is_ok());
    /// assert!(HabitTitle::new("").is_err());
    /// assert!(HabitTitle::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }

        if trimmed.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::TooLong {
                field: "title",
                max: MAX_TITLE_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for HabitTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Input for inserting a habit, with optional fields already defaulted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHabit {
    pub title: HabitTitle,
    pub completed: bool,
    pub points: i32,
}

impl NewHabit {
    /// Build from raw request fields.
    ///
    /// `title` is required; `completed` defaults to false and `points` to 0.
    pub fn from_parts(
        title: Option<&str>,
        completed: Option<bool>,
        points: Option<i32>,
    ) -> Result<Self, ValidationError> {
        let title = title.ok_or(ValidationError::Empty { field: "title" })?;

        Ok(Self {
            title: HabitTitle::new(title)?,
            completed: completed.unwrap_or(false),
            points: points.unwrap_or(0),
        })
    }
}

/// Partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitPatch {
    pub title: Option<HabitTitle>,
    pub completed: Option<bool>,
    pub points: Option<i32>,
}

impl HabitPatch {
    pub fn from_parts(
        title: Option<&str>,
        completed: Option<bool>,
        points: Option<i32>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            title: title.map(HabitTitle::new).transpose()?,
            completed,
            points,
        })
    }

    /// Apply the patch to an existing record in place.
    pub fn apply(&self, habit: &mut Habit) {
        if let Some(title) = &self.title {
            habit.title = title.as_str().to_owned();
        }
        if let Some(completed) = self.completed {
            habit.completed = completed;
        }
        if let Some(points) = self.points {
            habit.points = points;
        }
    }
}
