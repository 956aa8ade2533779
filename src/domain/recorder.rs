/// Completion recorder - the streak state machine
///
/// This module contains the single transition that turns "the user did the
/// habit now" into new streak state plus an immutable completion event. The
/// transition is pure: the caller supplies the clock, so every outcome is
/// reproducible in tests.
///
/// The calendar day is always derived from the supplied instant in UTC, which
/// keeps two completions at 23:59 and 00:01 on different days.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::{parse_day_marker, CompletionEvent, Habit};

/// Result of attempting to record a completion
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// The completion counted; the habit was mutated and an event produced
    Recorded(CompletionEvent),
    /// The habit was already completed today; nothing changed
    AlreadyToday,
}

/// Record a completion of `habit` at instant `now`
///
/// Streak rules, in order:
/// - never completed before: the streak starts at 1
/// - last completed today: rejected as a duplicate, habit untouched
/// - last completed yesterday: the streak extends by one
/// - last completed earlier than yesterday: the streak resets to 1
/// - marker in the future or unreadable: the streak restarts at 1
///
/// A corrupt or future marker is never an error. The user showed up to log a
/// completion; bad stored data must not block them, so the recorder logs the
/// problem and restarts the streak.
pub fn record_completion(habit: &mut Habit, now: DateTime<Utc>) -> RecordOutcome {
    let today = now.date_naive();
    let yesterday = today - chrono::Duration::days(1);

    let new_streak = match &habit.last_completed {
        None => 1,
        Some(marker) => match parse_day_marker(marker) {
            Some(last_day) if last_day == today => {
                return RecordOutcome::AlreadyToday;
            }
            Some(last_day) if last_day == yesterday => habit.streak + 1,
            Some(last_day) if last_day > today => {
                warn!(
                    "Habit {} has last_completed '{}' in the future, restarting streak",
                    habit.id.to_string(),
                    marker
                );
                1
            }
            Some(_) => 1,
            None => {
                warn!(
                    "Habit {} has unreadable last_completed '{}', restarting streak",
                    habit.id.to_string(),
                    marker
                );
                1
            }
        },
    };

    habit.streak = new_streak;
    habit.last_completed = Some(today.to_string());
    habit.completion_history.push(today.to_string());
    habit.updated_at = now;

    RecordOutcome::Recorded(CompletionEvent::new(habit, now))
}
