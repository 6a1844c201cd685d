//! Route handlers organized by resource

pub mod habits;
pub mod health;
