/// SQLite implementation of the habit store interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving users, habits and completion events. The connection is
/// wrapped in a mutex so the store can be shared across worker tasks, but
/// correctness under concurrent completions comes from the conditional
/// writes, not from the lock.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json;

use crate::domain::{
    CompletionEvent, EventId, Frequency, GamificationProfile, Habit, HabitId, User, UserId,
    UserSettings,
};
use crate::storage::{migrations, HabitStore, StorageError};

/// SQLite-based store implementation
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite store instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        migrations::initialize_database(&conn)?;

        tracing::info!("SQLite store initialized at: {:?}", db_path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a store backed by an in-memory database (used in tests)
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock only means another thread panicked mid-query;
        // the connection itself is still usable
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Map one row of the users table to a User
    fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        let id_str: String = row.get(0)?;
        let id = UserId::from_string(&id_str)
            .map_err(|_| invalid_text(0, "Invalid UUID"))?;

        let settings_json: String = row.get(3)?;
        let settings: UserSettings = serde_json::from_str(&settings_json)
            .map_err(|_| invalid_text(3, "Invalid settings"))?;

        let badges_json: String = row.get(6)?;
        let badges = serde_json::from_str(&badges_json)
            .map_err(|_| invalid_text(6, "Invalid badges"))?;

        let created_at_str: String = row.get(7)?;
        let created_at = parse_timestamp(7, &created_at_str)?;

        Ok(User::from_existing(
            id,
            row.get(1)?, // email
            row.get(2)?, // display_name
            settings,
            GamificationProfile {
                xp: row.get(4)?,
                level: row.get(5)?,
                badges,
            },
            created_at,
        ))
    }

    /// Map one row of the habits table to a Habit
    fn habit_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Habit> {
        let id_str: String = row.get(0)?;
        let id = HabitId::from_string(&id_str)
            .map_err(|_| invalid_text(0, "Invalid UUID"))?;

        let user_id_str: String = row.get(1)?;
        let user_id = UserId::from_string(&user_id_str)
            .map_err(|_| invalid_text(1, "Invalid UUID"))?;

        let frequency_str: String = row.get(4)?;
        let frequency = Frequency::parse(&frequency_str)
            .map_err(|_| invalid_text(4, "Invalid frequency"))?;

        let history_json: String = row.get(7)?;
        let completion_history: Vec<String> = serde_json::from_str(&history_json)
            .map_err(|_| invalid_text(7, "Invalid completion history"))?;

        let next_reminder_str: Option<String> = row.get(10)?;
        let next_reminder_at = match next_reminder_str {
            Some(raw) => Some(parse_timestamp(10, &raw)?),
            None => None,
        };

        let created_at_str: String = row.get(11)?;
        let created_at = parse_timestamp(11, &created_at_str)?;

        let updated_at_str: String = row.get(12)?;
        let updated_at = parse_timestamp(12, &updated_at_str)?;

        Ok(Habit::from_existing(
            id,
            user_id,
            row.get(2)?, // name
            row.get(3)?, // description
            frequency,
            row.get(5)?, // streak
            row.get(6)?, // last_completed
            completion_history,
            row.get(8)?, // reminder_enabled
            row.get(9)?, // reminder_time
            next_reminder_at,
            created_at,
            updated_at,
        ))
    }

    /// Map one row of the completion_events table to a CompletionEvent
    fn event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CompletionEvent> {
        let id_str: String = row.get(0)?;
        let id = EventId::from_string(&id_str)
            .map_err(|_| invalid_text(0, "Invalid UUID"))?;

        let user_id_str: String = row.get(1)?;
        let user_id = UserId::from_string(&user_id_str)
            .map_err(|_| invalid_text(1, "Invalid UUID"))?;

        let habit_id_str: String = row.get(2)?;
        let habit_id = HabitId::from_string(&habit_id_str)
            .map_err(|_| invalid_text(2, "Invalid UUID"))?;

        let recorded_at_str: String = row.get(4)?;
        let recorded_at = parse_timestamp(4, &recorded_at_str)?;

        let completed_on_str: String = row.get(5)?;
        let completed_on = NaiveDate::parse_from_str(&completed_on_str, "%Y-%m-%d")
            .map_err(|_| invalid_text(5, "Invalid date"))?;

        Ok(CompletionEvent::from_existing(
            id,
            user_id,
            habit_id,
            row.get(3)?, // habit_name
            recorded_at,
            completed_on,
        ))
    }
}

const HABIT_COLUMNS: &str = "id, user_id, name, description, frequency, streak, last_completed, \
                             completion_history, reminder_enabled, reminder_time, next_reminder_at, \
                             created_at, updated_at";

const USER_COLUMNS: &str = "id, email, display_name, settings, xp, level, badges, created_at";

const EVENT_COLUMNS: &str = "id, user_id, habit_id, habit_name, recorded_at, completed_on";

fn invalid_text(idx: usize, what: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(idx, what.to_string(), rusqlite::types::Type::Text)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| invalid_text(idx, "Invalid datetime"))
}

impl HabitStore for SqliteStore {
    /// Create a new user account
    fn create_user(&self, user: &User) -> Result<(), StorageError> {
        let settings_json = serde_json::to_string(&user.settings)?;
        let badges_json = serde_json::to_string(&user.profile.badges)?;

        let result = self.conn().execute(
            "INSERT INTO users (
                id, email, display_name, settings, xp, level, badges, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user.id.to_string(),
                user.email,
                user.display_name,
                settings_json,
                user.profile.xp,
                user.profile.level,
                badges_json,
                user.created_at.to_rfc3339()
            ],
        );

        match result {
            Ok(_) => {
                tracing::debug!("Created user: {} ({})", user.email, user.id.to_string());
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StorageError::EmailTaken {
                    email: user.email.clone(),
                })
            }
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// Get a user by ID
    fn get_user(&self, user_id: &UserId) -> Result<User, StorageError> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare(&format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS))?;

        let result = stmt.query_row(params![user_id.to_string()], Self::user_from_row);

        match result {
            Ok(user) => Ok(user),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::UserNotFound {
                user_id: user_id.to_string(),
            }),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// List every registered user
    fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY created_at ASC",
            USER_COLUMNS
        ))?;

        let user_iter = stmt.query_map([], Self::user_from_row)?;

        let mut users = Vec::new();
        for user in user_iter {
            users.push(user?);
        }

        Ok(users)
    }

    /// Replace a user's notification settings
    fn update_settings(
        &self,
        user_id: &UserId,
        settings: &UserSettings,
    ) -> Result<(), StorageError> {
        let settings_json = serde_json::to_string(settings)?;

        let rows_affected = self.conn().execute(
            "UPDATE users SET settings = ?1 WHERE id = ?2",
            params![settings_json, user_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::UserNotFound {
                user_id: user_id.to_string(),
            });
        }

        tracing::debug!("Updated settings for user: {}", user_id.to_string());
        Ok(())
    }

    /// Conditionally replace a user's gamification profile
    fn update_profile(
        &self,
        user_id: &UserId,
        expected_xp: u32,
        profile: &GamificationProfile,
    ) -> Result<bool, StorageError> {
        let badges_json = serde_json::to_string(&profile.badges)?;

        let rows_affected = self.conn().execute(
            "UPDATE users SET xp = ?1, level = ?2, badges = ?3
             WHERE id = ?4 AND xp = ?5",
            params![
                profile.xp,
                profile.level,
                badges_json,
                user_id.to_string(),
                expected_xp
            ],
        )?;

        Ok(rows_affected > 0)
    }

    /// Create a new habit in the database
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let history_json = serde_json::to_string(&habit.completion_history)?;

        self.conn().execute(
            "INSERT INTO habits (
                id, user_id, name, description, frequency, streak, last_completed,
                completion_history, reminder_enabled, reminder_time, next_reminder_at,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                habit.id.to_string(),
                habit.user_id.to_string(),
                habit.name,
                habit.description,
                habit.frequency.as_str(),
                habit.streak,
                habit.last_completed,
                history_json,
                habit.reminder_enabled,
                habit.reminder_time,
                habit.next_reminder_at.map(|t| t.to_rfc3339()),
                habit.created_at.to_rfc3339(),
                habit.updated_at.to_rfc3339()
            ],
        )?;

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id.to_string());
        Ok(())
    }

    /// Get a habit by its ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare(&format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS))?;

        let result = stmt.query_row(params![habit_id.to_string()], Self::habit_from_row);

        match result {
            Ok(habit) => Ok(habit),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            }),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// List one user's habits, oldest first
    fn list_habits_for_user(&self, user_id: &UserId) -> Result<Vec<Habit>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM habits WHERE user_id = ?1 ORDER BY created_at ASC",
            HABIT_COLUMNS
        ))?;

        let habit_iter = stmt.query_map(params![user_id.to_string()], Self::habit_from_row)?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            habits.push(habit?);
        }

        Ok(habits)
    }

    /// Update a habit's descriptive and reminder fields
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let rows_affected = self.conn().execute(
            "UPDATE habits SET
                name = ?2,
                description = ?3,
                frequency = ?4,
                reminder_enabled = ?5,
                reminder_time = ?6,
                next_reminder_at = ?7,
                updated_at = ?8
             WHERE id = ?1",
            params![
                habit.id.to_string(),
                habit.name,
                habit.description,
                habit.frequency.as_str(),
                habit.reminder_enabled,
                habit.reminder_time,
                habit.next_reminder_at.map(|t| t.to_rfc3339()),
                habit.updated_at.to_rfc3339()
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit.id.to_string(),
            });
        }

        tracing::debug!("Updated habit: {} ({})", habit.name, habit.id.to_string());
        Ok(())
    }

    /// Conditionally write a habit's streak state
    ///
    /// `IS` instead of `=` on the marker makes the comparison null-safe, so
    /// the guard also holds for habits that have never been completed.
    fn update_completion_state(
        &self,
        habit: &Habit,
        expected_streak: u32,
        expected_marker: Option<&str>,
    ) -> Result<bool, StorageError> {
        let history_json = serde_json::to_string(&habit.completion_history)?;

        let rows_affected = self.conn().execute(
            "UPDATE habits SET
                streak = ?1,
                last_completed = ?2,
                completion_history = ?3,
                updated_at = ?4
             WHERE id = ?5 AND streak = ?6 AND last_completed IS ?7",
            params![
                habit.streak,
                habit.last_completed,
                history_json,
                habit.updated_at.to_rfc3339(),
                habit.id.to_string(),
                expected_streak,
                expected_marker
            ],
        )?;

        Ok(rows_affected > 0)
    }

    /// Delete a habit permanently
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        let rows_affected = self.conn().execute(
            "DELETE FROM habits WHERE id = ?1",
            params![habit_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!("Deleted habit: {}", habit_id.to_string());
        Ok(())
    }

    /// List habits whose reminder is enabled and due at or before `now`
    fn list_due_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Habit>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM habits
             WHERE reminder_enabled = 1
               AND next_reminder_at IS NOT NULL
               AND next_reminder_at <= ?1
             ORDER BY next_reminder_at ASC",
            HABIT_COLUMNS
        ))?;

        let habit_iter = stmt.query_map(params![now.to_rfc3339()], Self::habit_from_row)?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            habits.push(habit?);
        }

        Ok(habits)
    }

    /// Append a completion event to the ledger
    fn append_event(&self, event: &CompletionEvent) -> Result<(), StorageError> {
        self.conn().execute(
            "INSERT INTO completion_events (
                id, user_id, habit_id, habit_name, recorded_at, completed_on
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                event.id.to_string(),
                event.user_id.to_string(),
                event.habit_id.to_string(),
                event.habit_name,
                event.recorded_at.to_rfc3339(),
                event.completed_on.to_string()
            ],
        )?;

        tracing::debug!(
            "Recorded completion event {} for habit {}",
            event.id.to_string(),
            event.habit_id.to_string()
        );
        Ok(())
    }

    /// Get a user's completion events, optionally only from `since` onwards
    fn events_for_user(
        &self,
        user_id: &UserId,
        since: Option<NaiveDate>,
    ) -> Result<Vec<CompletionEvent>, StorageError> {
        let conn = self.conn();

        let mut events = Vec::new();
        match since {
            Some(cutoff) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM completion_events
                     WHERE user_id = ?1 AND completed_on >= ?2
                     ORDER BY completed_on ASC, recorded_at ASC",
                    EVENT_COLUMNS
                ))?;
                let iter = stmt.query_map(
                    params![user_id.to_string(), cutoff.to_string()],
                    Self::event_from_row,
                )?;
                for event in iter {
                    events.push(event?);
                }
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM completion_events
                     WHERE user_id = ?1
                     ORDER BY completed_on ASC, recorded_at ASC",
                    EVENT_COLUMNS
                ))?;
                let iter = stmt.query_map(params![user_id.to_string()], Self::event_from_row)?;
                for event in iter {
                    events.push(event?);
                }
            }
        }

        Ok(events)
    }
}
