/// Storage layer for persisting users, habits and completion events
///
/// This module handles all database operations using SQLite. It provides
/// a clean interface for storing and retrieving accounts, habit state and
/// the append-only completion ledger.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use crate::domain::{
    CompletionEvent, GamificationProfile, Habit, HabitId, User, UserId, UserSettings,
};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Email already registered: {email}")]
    EmailTaken { email: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Trait defining the storage interface for the habit service
///
/// This trait allows us to potentially swap out SQLite for other databases
/// in the future while keeping the same interface. The two conditional
/// writes (`update_completion_state` and `update_profile`) return whether
/// the write applied, which is what the service retry loops key off.
pub trait HabitStore: Send + Sync {
    /// Create a new user account
    fn create_user(&self, user: &User) -> Result<(), StorageError>;

    /// Get a user by ID
    fn get_user(&self, user_id: &UserId) -> Result<User, StorageError>;

    /// List every registered user
    fn list_users(&self) -> Result<Vec<User>, StorageError>;

    /// Replace a user's notification settings
    fn update_settings(&self, user_id: &UserId, settings: &UserSettings) -> Result<(), StorageError>;

    /// Conditionally replace a user's gamification profile
    ///
    /// The write only applies if the stored XP still equals `expected_xp`.
    /// Returns whether a row was updated.
    fn update_profile(
        &self,
        user_id: &UserId,
        expected_xp: u32,
        profile: &GamificationProfile,
    ) -> Result<bool, StorageError>;

    /// Create a new habit
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get a habit by ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// List one user's habits, oldest first
    fn list_habits_for_user(&self, user_id: &UserId) -> Result<Vec<Habit>, StorageError>;

    /// Update a habit's descriptive and reminder fields
    ///
    /// Streak state is deliberately not written here; that path goes through
    /// `update_completion_state` so concurrent completions cannot be lost.
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Conditionally write a habit's streak state
    ///
    /// Applies the habit's streak, last-completed marker and history only if
    /// the stored streak and marker still match the expected values read
    /// before the transition. Returns whether a row was updated.
    fn update_completion_state(
        &self,
        habit: &Habit,
        expected_streak: u32,
        expected_marker: Option<&str>,
    ) -> Result<bool, StorageError>;

    /// Delete a habit permanently
    ///
    /// Completion events are kept; they outlive the habit on purpose.
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError>;

    /// List habits whose reminder is enabled and due at or before `now`
    fn list_due_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Habit>, StorageError>;

    /// Append a completion event to the ledger
    fn append_event(&self, event: &CompletionEvent) -> Result<(), StorageError>;

    /// Get a user's completion events, optionally only from `since` onwards
    fn events_for_user(
        &self,
        user_id: &UserId,
        since: Option<NaiveDate>,
    ) -> Result<Vec<CompletionEvent>, StorageError>;
}
