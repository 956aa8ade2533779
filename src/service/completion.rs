/// Completion recording - the write path that ties everything together
///
/// Recording a completion is read-transition-write: fetch the habit, run the
/// pure recorder, then write the new streak state back with a conditional
/// update keyed on the state we read. If another writer got there first the
/// write does not apply and the whole attempt restarts from a fresh read, so
/// two racing calls for the same day collapse into one accepted completion
/// and one duplicate.
///
/// The habit write is the durability point. The reward grant runs after it
/// with its own retry loop; if rewards cannot be applied the completion is
/// kept and the response simply reports nothing earned.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::domain::{
    apply_reward, record_completion, EarnedBadge, RecordOutcome, RewardOutcome, UserId,
};
use crate::service::{fetch_owned_habit, parse_habit_id, parse_user_id, ServiceError};
use crate::storage::HabitStore;

/// How many times a conditional write is retried before giving up
pub const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Parameters for recording a completion
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CompleteHabitParams {
    pub user_id: String,
    pub habit_id: String,
}

/// Response from recording a completion
#[derive(Debug, Clone, Serialize)]
pub struct CompleteHabitResponse {
    pub success: bool,
    /// True when today's completion was already logged; nothing changed
    pub already_completed: bool,
    /// Streak after this call
    pub streak: u32,
    pub xp_gained: u32,
    pub new_level: Option<u32>,
    pub new_badges: Vec<EarnedBadge>,
    pub message: String,
}

/// Record that the user completed a habit right now
pub fn complete_habit<S: HabitStore>(
    store: &S,
    params: CompleteHabitParams,
    now: DateTime<Utc>,
) -> Result<CompleteHabitResponse, ServiceError> {
    let owner = parse_user_id(&params.user_id)?;
    let habit_id = parse_habit_id(&params.habit_id)?;

    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        // Fresh read each attempt: a lost race or a concurrent deletion
        // must be seen, not assumed away
        let mut habit = fetch_owned_habit(store, &owner, &habit_id)?;
        let observed_streak = habit.streak;
        let observed_marker = habit.last_completed.clone();

        let event = match record_completion(&mut habit, now) {
            RecordOutcome::AlreadyToday => {
                let unit = if habit.streak == 1 { "day" } else { "days" };
                return Ok(CompleteHabitResponse {
                    success: true,
                    already_completed: true,
                    streak: habit.streak,
                    xp_gained: 0,
                    new_level: None,
                    new_badges: Vec::new(),
                    message: format!(
                        "✅ Already logged for today! Streak stays at {} {}.",
                        habit.streak, unit
                    ),
                });
            }
            RecordOutcome::Recorded(event) => event,
        };

        let applied =
            store.update_completion_state(&habit, observed_streak, observed_marker.as_deref())?;
        if !applied {
            debug!(
                "Completion write for habit {} lost the race (attempt {}), retrying",
                habit_id.to_string(),
                attempt
            );
            continue;
        }

        // The habit row is durable from here on; the ledger entry and the
        // reward follow it
        store.append_event(&event)?;
        let reward = grant_reward(store, &owner, habit.streak, now.date_naive());

        let unit = if habit.streak == 1 { "day" } else { "days" };
        let mut message = format!(
            "🔥 Completion recorded! Current streak: {} {}",
            habit.streak, unit
        );
        if let Some(level) = reward.new_level {
            message.push_str(&format!(" ⭐ Level {} reached!", level));
        }
        for badge in &reward.new_badges {
            message.push_str(&format!(" {} Badge earned: {}!", badge.icon, badge.name));
        }

        return Ok(CompleteHabitResponse {
            success: true,
            already_completed: false,
            streak: habit.streak,
            xp_gained: reward.xp_gained,
            new_level: reward.new_level,
            new_badges: reward.new_badges,
            message,
        });
    }

    Err(ServiceError::ConcurrentConflict(habit_id.to_string()))
}

/// Apply the reward for an accepted completion to the owner's profile
///
/// Runs its own conditional-write loop against the profile XP. Any failure
/// degrades to a zero reward: the completion itself is already saved and
/// must never be rolled back or double-applied over reward bookkeeping.
fn grant_reward<S: HabitStore>(
    store: &S,
    user_id: &UserId,
    streak: u32,
    today: NaiveDate,
) -> RewardOutcome {
    for _ in 0..MAX_WRITE_ATTEMPTS {
        let user = match store.get_user(user_id) {
            Ok(user) => user,
            Err(e) => {
                warn!(
                    "Completion saved but reward lookup failed for user {}: {}",
                    user_id.to_string(),
                    e
                );
                return RewardOutcome::none();
            }
        };

        let expected_xp = user.profile.xp;
        let mut profile = user.profile;
        let outcome = apply_reward(&mut profile, streak, today);

        match store.update_profile(user_id, expected_xp, &profile) {
            Ok(true) => return outcome,
            Ok(false) => continue,
            Err(e) => {
                warn!(
                    "Completion saved but reward write failed for user {}: {}",
                    user_id.to_string(),
                    e
                );
                return RewardOutcome::none();
            }
        }
    }

    warn!(
        "Reward for user {} lost the profile race too many times; completion kept without reward",
        user_id.to_string()
    );
    RewardOutcome::none()
}
