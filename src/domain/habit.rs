/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents something a user
/// wants to do regularly, along with validation and update rules. The streak
/// transition logic itself lives in the recorder module.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{DomainError, Frequency, HabitId, UserId};

/// A habit represents something the user wants to do regularly
///
/// Each habit belongs to exactly one user and carries its own streak state:
/// the current run length, the day marker of the most recent completion, and
/// the full list of day markers ever recorded. Markers are kept as raw
/// strings because imported data may hold legacy timestamp forms; they are
/// interpreted leniently at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Owner of this habit
    pub user_id: UserId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// How often this habit should be performed
    pub frequency: Frequency,
    /// Current run of consecutive completion days
    pub streak: u32,
    /// Day marker of the most recent completion, None if never completed
    pub last_completed: Option<String>,
    /// Every day marker ever recorded, oldest first
    pub completion_history: Vec<String>,
    /// Whether reminder delivery is switched on for this habit
    pub reminder_enabled: bool,
    /// Preferred reminder time of day in HH:MM, if any
    pub reminder_time: Option<String>,
    /// When the next reminder is due to be sent
    pub next_reminder_at: Option<DateTime<Utc>>,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    /// When this habit was last modified
    pub updated_at: DateTime<Utc>,
}

impl Habit {
    /// Create a new habit with validation
    ///
    /// This is the main constructor that validates all fields and returns
    /// an error if any validation fails. New habits start with no streak,
    /// no history, and reminders switched off.
    pub fn new(
        user_id: UserId,
        name: String,
        description: Option<String>,
        frequency: Frequency,
    ) -> Result<Self, DomainError> {
        Self::validate_name(&name)?;
        Self::validate_description(&description)?;

        let now = Utc::now();
        Ok(Self {
            id: HabitId::new(),
            user_id,
            name,
            description,
            frequency,
            streak: 0,
            last_completed: None,
            completion_history: Vec::new(),
            reminder_enabled: false,
            reminder_time: None,
            next_reminder_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Create a habit from existing data (used when loading from database)
    ///
    /// This constructor assumes data is already validated and is mainly used
    /// by the storage layer when loading habits from the database.
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: HabitId,
        user_id: UserId,
        name: String,
        description: Option<String>,
        frequency: Frequency,
        streak: u32,
        last_completed: Option<String>,
        completion_history: Vec<String>,
        reminder_enabled: bool,
        reminder_time: Option<String>,
        next_reminder_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            name,
            description,
            frequency,
            streak,
            last_completed,
            completion_history,
            reminder_enabled,
            reminder_time,
            next_reminder_at,
            created_at,
            updated_at,
        }
    }

    /// Update the habit's descriptive properties with validation
    ///
    /// Only the profile of the habit changes here. Streak state is owned by
    /// the completion recorder and is never touched by an update.
    pub fn apply_update(
        &mut self,
        name: Option<String>,
        description: Option<String>,
        frequency: Option<Frequency>,
    ) -> Result<(), DomainError> {
        // Validate new values before applying any of them
        if let Some(ref new_name) = name {
            Self::validate_name(new_name)?;
        }
        if description.is_some() {
            Self::validate_description(&description)?;
        }

        if let Some(new_name) = name {
            self.name = new_name;
        }
        if let Some(new_description) = description {
            self.description = Some(new_description);
        }
        if let Some(new_frequency) = frequency {
            self.frequency = new_frequency;
        }
        self.updated_at = Utc::now();

        Ok(())
    }

    /// Validate habit name according to business rules
    fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if trimmed.len() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(())
    }

    /// Validate optional description
    fn validate_description(description: &Option<String>) -> Result<(), DomainError> {
        if let Some(desc) = description {
            if desc.len() > 500 {
                return Err(DomainError::Validation {
                    message: "Description cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }
}
