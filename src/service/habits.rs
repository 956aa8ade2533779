/// Habit CRUD operations and reminder scheduling
///
/// Habit-scoped operations always take the owner's id alongside the habit id
/// and report someone else's habit as not found. Deleting a habit is
/// permanent for the habit row itself, but its completion events remain in
/// the ledger.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveTime, Utc};
use tracing::info;

use crate::domain::{DomainError, Frequency, Habit};
use crate::service::{fetch_owned_habit, parse_habit_id, parse_user_id, ServiceError};
use crate::storage::HabitStore;

/// Parameters for creating a habit
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    pub user_id: String,
    /// Display name (e.g., "Morning Run")
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// One of: daily, weekly, weekdays, weekends
    pub frequency: String,
    /// Switch reminders on right away (defaults to off)
    pub reminder_enabled: Option<bool>,
    /// Reminder time of day in HH:MM (UTC)
    pub reminder_time: Option<String>,
}

/// Response from creating a habit
#[derive(Debug, Clone, Serialize)]
pub struct CreateHabitResponse {
    pub habit_id: String,
    pub message: String,
}

/// Create a new habit for a user
pub fn create_habit<S: HabitStore>(
    store: &S,
    params: CreateHabitParams,
    now: DateTime<Utc>,
) -> Result<CreateHabitResponse, ServiceError> {
    let user_id = parse_user_id(&params.user_id)?;
    // The owner has to exist before we hang a habit off them
    let user = store.get_user(&user_id)?;

    let frequency = Frequency::parse(&params.frequency)?;
    let mut habit = Habit::new(user.id, params.name, params.description, frequency)?;

    if params.reminder_enabled.is_some() || params.reminder_time.is_some() {
        configure_reminder(
            &mut habit,
            params.reminder_enabled.unwrap_or(false),
            params.reminder_time,
            now,
        )?;
    }

    store.create_habit(&habit)?;

    info!("Created habit {} ({})", habit.name, habit.id.to_string());

    Ok(CreateHabitResponse {
        habit_id: habit.id.to_string(),
        message: format!("✨ Habit created: {}. Time to build momentum!", habit.name),
    })
}

/// Habit data shaped for responses
#[derive(Debug, Clone, Serialize)]
pub struct HabitView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub streak: u32,
    pub last_completed: Option<String>,
    pub reminder_enabled: bool,
    pub reminder_time: Option<String>,
    pub next_reminder_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl HabitView {
    pub fn from_habit(habit: &Habit) -> Self {
        Self {
            id: habit.id.to_string(),
            name: habit.name.clone(),
            description: habit.description.clone(),
            frequency: habit.frequency.as_str().to_string(),
            streak: habit.streak,
            last_completed: habit.last_completed.clone(),
            reminder_enabled: habit.reminder_enabled,
            reminder_time: habit.reminder_time.clone(),
            next_reminder_at: habit.next_reminder_at.map(|t| t.to_rfc3339()),
            created_at: habit.created_at.to_rfc3339(),
            updated_at: habit.updated_at.to_rfc3339(),
        }
    }
}

/// List a user's habits, oldest first
pub fn list_habits<S: HabitStore>(
    store: &S,
    user_id: &str,
) -> Result<Vec<HabitView>, ServiceError> {
    let id = parse_user_id(user_id)?;
    store.get_user(&id)?;

    let habits = store.list_habits_for_user(&id)?;
    Ok(habits.iter().map(HabitView::from_habit).collect())
}

/// Get a single habit owned by the user
pub fn get_habit<S: HabitStore>(
    store: &S,
    user_id: &str,
    habit_id: &str,
) -> Result<HabitView, ServiceError> {
    let owner = parse_user_id(user_id)?;
    let id = parse_habit_id(habit_id)?;
    let habit = fetch_owned_habit(store, &owner, &id)?;
    Ok(HabitView::from_habit(&habit))
}

/// Parameters for updating a habit
///
/// Omitted fields keep their current value.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateHabitParams {
    pub user_id: String,
    pub habit_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<String>,
    pub reminder_enabled: Option<bool>,
    pub reminder_time: Option<String>,
}

/// Response from updating a habit
#[derive(Debug, Clone, Serialize)]
pub struct UpdateHabitResponse {
    pub habit: HabitView,
    pub message: String,
}

/// Update a habit's descriptive fields and reminder configuration
///
/// Streak state never changes here; that path belongs to completion
/// recording alone.
pub fn update_habit<S: HabitStore>(
    store: &S,
    params: UpdateHabitParams,
    now: DateTime<Utc>,
) -> Result<UpdateHabitResponse, ServiceError> {
    let owner = parse_user_id(&params.user_id)?;
    let id = parse_habit_id(&params.habit_id)?;
    let mut habit = fetch_owned_habit(store, &owner, &id)?;

    let frequency = params.frequency.as_deref().map(Frequency::parse).transpose()?;
    habit.apply_update(params.name, params.description, frequency)?;

    if params.reminder_enabled.is_some() || params.reminder_time.is_some() {
        // An omitted switch keeps the habit's current setting
        let enabled = params.reminder_enabled.unwrap_or(habit.reminder_enabled);
        configure_reminder(&mut habit, enabled, params.reminder_time, now)?;
    }

    store.update_habit(&habit)?;

    Ok(UpdateHabitResponse {
        message: format!("✏️ Habit updated: {}", habit.name),
        habit: HabitView::from_habit(&habit),
    })
}

/// Response from deleting a habit
#[derive(Debug, Clone, Serialize)]
pub struct DeleteHabitResponse {
    pub message: String,
}

/// Permanently delete a habit owned by the user
pub fn delete_habit<S: HabitStore>(
    store: &S,
    user_id: &str,
    habit_id: &str,
) -> Result<DeleteHabitResponse, ServiceError> {
    let owner = parse_user_id(user_id)?;
    let id = parse_habit_id(habit_id)?;
    let habit = fetch_owned_habit(store, &owner, &id)?;

    store.delete_habit(&id)?;

    info!("Deleted habit {} ({})", habit.name, id.to_string());

    Ok(DeleteHabitResponse {
        message: format!("🗑️ Habit deleted: {}. Your past completions are kept.", habit.name),
    })
}

/// Apply a reminder configuration change to a habit
///
/// Enabling requires a time of day, either passed now or already stored.
/// Disabling clears the due timestamp but keeps the stored time so the user
/// can switch reminders back on without retyping it.
fn configure_reminder(
    habit: &mut Habit,
    enabled: bool,
    time: Option<String>,
    now: DateTime<Utc>,
) -> Result<(), ServiceError> {
    if let Some(raw) = time {
        let trimmed = raw.trim().to_string();
        parse_reminder_time(&trimmed)?;
        habit.reminder_time = Some(trimmed);
    }

    habit.reminder_enabled = enabled;
    habit.next_reminder_at = match (enabled, habit.reminder_time.as_deref()) {
        (true, Some(stored)) => Some(next_occurrence(now, parse_reminder_time(stored)?)),
        (true, None) => {
            return Err(DomainError::Validation {
                message: "Reminder time is required when reminders are enabled".to_string(),
            }
            .into())
        }
        (false, _) => None,
    };

    Ok(())
}

fn parse_reminder_time(raw: &str) -> Result<NaiveTime, ServiceError> {
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| {
        ServiceError::Domain(DomainError::Validation {
            message: format!("Invalid reminder time '{}', expected HH:MM", raw),
        })
    })
}

/// Next instant the given wall-clock time occurs, strictly after `now`
fn next_occurrence(now: DateTime<Utc>, time: NaiveTime) -> DateTime<Utc> {
    let today_at = now.date_naive().and_time(time).and_utc();
    if today_at > now {
        today_at
    } else {
        today_at + chrono::Duration::days(1)
    }
}
