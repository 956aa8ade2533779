/// Service layer - the operations exposed to callers
///
/// Each submodule implements one group of operations (accounts, habit CRUD,
/// completion recording, analytics) as free functions over a generic store.
/// This layer owns identifier parsing, ownership checks, the retry loops
/// around conditional writes, and shaping domain data into response DTOs.

pub mod analytics;
pub mod completion;
pub mod habits;
pub mod users;

pub use analytics::*;
pub use completion::*;
pub use habits::*;
pub use users::*;

use thiserror::Error;

use crate::ai::GenerationError;
use crate::domain::{DomainError, Habit, HabitId, UserId};
use crate::storage::{HabitStore, StorageError};

/// Errors surfaced by service operations
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Habit not found: {0}")]
    HabitNotFound(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Completion for habit {0} lost the write race too many times")]
    ConcurrentConflict(String),

    #[error("Assistant unavailable: {0}")]
    AssistantUnavailable(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UserNotFound { user_id } => ServiceError::UserNotFound(user_id),
            StorageError::HabitNotFound { habit_id } => ServiceError::HabitNotFound(habit_id),
            StorageError::EmailTaken { email } => ServiceError::EmailTaken(email),
            other => ServiceError::Storage(other),
        }
    }
}

impl From<GenerationError> for ServiceError {
    fn from(err: GenerationError) -> Self {
        ServiceError::AssistantUnavailable(err.to_string())
    }
}

/// Parse a raw user id string
pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, ServiceError> {
    UserId::from_string(raw.trim())
        .map_err(|_| ServiceError::InvalidIdentifier(format!("'{}' is not a valid user id", raw)))
}

/// Parse a raw habit id string
pub(crate) fn parse_habit_id(raw: &str) -> Result<HabitId, ServiceError> {
    HabitId::from_string(raw.trim())
        .map_err(|_| ServiceError::InvalidIdentifier(format!("'{}' is not a valid habit id", raw)))
}

/// Fetch a habit and verify it belongs to the given user
///
/// A habit owned by someone else reports as not found rather than forbidden,
/// so callers cannot probe which ids exist.
pub(crate) fn fetch_owned_habit<S: HabitStore>(
    store: &S,
    user_id: &UserId,
    habit_id: &HabitId,
) -> Result<Habit, ServiceError> {
    let habit = store.get_habit(habit_id)?;
    if habit.user_id != *user_id {
        return Err(ServiceError::HabitNotFound(habit_id.to_string()));
    }
    Ok(habit)
}
