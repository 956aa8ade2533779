/// Domain module containing core business logic and data types
///
/// This module defines the core entities (User, Habit, CompletionEvent) and
/// the pure state machines that act on them: the completion recorder and the
/// reward engine. Everything here is deterministic - callers supply the clock.

pub mod badges;
pub mod event;
pub mod habit;
pub mod recorder;
pub mod rewards;
pub mod types;
pub mod user;

// Re-export public types for easy access
pub use badges::*;
pub use event::*;
pub use habit::*;
pub use recorder::*;
pub use rewards::*;
pub use types::*;
pub use user::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),
}
