/// Completion event entity
///
/// A completion event is the immutable record written every time a completion
/// is accepted. Events survive habit deletion so historical analytics stay
/// truthful, which is why each event carries a denormalized habit name.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::{EventId, Habit, HabitId, UserId};

/// An accepted completion, pinned to the calendar day it counted for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionEvent {
    /// Unique identifier for this event
    pub id: EventId,
    /// Owner of the habit at the time of recording
    pub user_id: UserId,
    /// Habit this completion belongs to (the habit may since be deleted)
    pub habit_id: HabitId,
    /// Habit name captured at recording time
    pub habit_name: String,
    /// Exact instant the completion was accepted
    pub recorded_at: DateTime<Utc>,
    /// Calendar day (UTC) the completion counted for
    pub completed_on: NaiveDate,
}

impl CompletionEvent {
    /// Record a completion of the given habit at the given instant
    pub fn new(habit: &Habit, recorded_at: DateTime<Utc>) -> Self {
        Self {
            id: EventId::new(),
            user_id: habit.user_id.clone(),
            habit_id: habit.id.clone(),
            habit_name: habit.name.clone(),
            recorded_at,
            completed_on: recorded_at.date_naive(),
        }
    }

    /// Create an event from existing data (used when loading from database)
    pub fn from_existing(
        id: EventId,
        user_id: UserId,
        habit_id: HabitId,
        habit_name: String,
        recorded_at: DateTime<Utc>,
        completed_on: NaiveDate,
    ) -> Self {
        Self {
            id,
            user_id,
            habit_id,
            habit_name,
            recorded_at,
            completed_on,
        }
    }
}
