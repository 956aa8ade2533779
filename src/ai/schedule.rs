/// Schedule suggestions - when should each habit happen?
///
/// The generator gets a summary of when the user actually completed each
/// habit and is asked for one suggested time per habit. When it is
/// unavailable or returns something unusable we fall back to the modal
/// completion hour, which is the same signal stated less eloquently.

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ai::breakdown::strip_code_fences;
use crate::ai::TextGenerator;
use crate::domain::{CompletionEvent, Habit};
use crate::service::{parse_user_id, ServiceError};
use crate::storage::HabitStore;

/// One suggested slot for a habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSuggestion {
    pub habit_id: String,
    pub habit_name: String,
    /// HH:MM, 24-hour clock
    pub suggested_time: String,
    pub reason: String,
}

/// Response from the schedule advisor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub suggestions: Vec<ScheduleSuggestion>,
}

/// Suggest a time of day for each of the user's habits
pub async fn schedule_suggestions<S: HabitStore>(
    store: &S,
    generator: &dyn TextGenerator,
    user_id: &str,
) -> Result<ScheduleResponse, ServiceError> {
    let user_id = parse_user_id(user_id)?;
    store.get_user(&user_id)?;

    let habits = store.list_habits_for_user(&user_id)?;
    if habits.is_empty() {
        return Ok(ScheduleResponse {
            suggestions: Vec::new(),
        });
    }
    let events = store.events_for_user(&user_id, None)?;

    let prompt = schedule_prompt(&habits, &events);
    match generator.generate(&prompt).await {
        Ok(text) => match serde_json::from_str::<ScheduleResponse>(strip_code_fences(&text)) {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!("Schedule advisor returned unusable JSON, using history: {}", e);
                Ok(fallback_schedule(&habits, &events))
            }
        },
        Err(e) => {
            warn!("Schedule advisor unavailable, using history: {}", e);
            Ok(fallback_schedule(&habits, &events))
        }
    }
}

fn schedule_prompt(habits: &[Habit], events: &[CompletionEvent]) -> String {
    let mut lines = String::new();
    for habit in habits {
        let hours: Vec<String> = events
            .iter()
            .filter(|e| e.habit_id == habit.id)
            .map(|e| format!("{:02}:00", e.recorded_at.hour()))
            .collect();
        let history = if hours.is_empty() {
            "no completions yet".to_string()
        } else {
            hours.join(", ")
        };
        lines.push_str(&format!(
            "- {} (id {}): completed at {}\n",
            habit.name,
            habit.id.to_string(),
            history
        ));
    }

    format!(
        "You are a habit scheduling advisor. Based on when the user has actually \
         completed each habit, suggest the single best time of day for it.\n\
         \n\
         Habits and completion times:\n\
         {}\n\
         Respond with STRICT JSON only, no prose, in exactly this shape:\n\
         {{\"suggestions\": [{{\"habit_id\": \"...\", \"habit_name\": \"...\", \
         \"suggested_time\": \"HH:MM\", \"reason\": \"...\"}}]}}\n\
         \n\
         Include every habit exactly once. Times use the 24-hour clock.",
        lines
    )
}

/// Deterministic suggestions straight from completion history
fn fallback_schedule(habits: &[Habit], events: &[CompletionEvent]) -> ScheduleResponse {
    let suggestions = habits
        .iter()
        .map(|habit| {
            let hours: Vec<u32> = events
                .iter()
                .filter(|e| e.habit_id == habit.id)
                .map(|e| e.recorded_at.hour())
                .collect();
            match modal_hour(&hours) {
                Some(hour) => ScheduleSuggestion {
                    habit_id: habit.id.to_string(),
                    habit_name: habit.name.clone(),
                    suggested_time: format!("{:02}:00", hour),
                    reason: format!("You usually complete this around {:02}:00.", hour),
                },
                None => ScheduleSuggestion {
                    habit_id: habit.id.to_string(),
                    habit_name: habit.name.clone(),
                    suggested_time: "08:00".to_string(),
                    reason: "No completion history yet, so we suggest a morning start."
                        .to_string(),
                },
            }
        })
        .collect();

    ScheduleResponse { suggestions }
}

/// Most frequent hour, smallest hour wins ties
fn modal_hour(hours: &[u32]) -> Option<u32> {
    if hours.is_empty() {
        return None;
    }
    let mut counts = [0u32; 24];
    for &hour in hours {
        if let Some(slot) = counts.get_mut(hour as usize) {
            *slot += 1;
        }
    }
    let mut best = 0;
    for hour in 1..24 {
        if counts[hour] > counts[best] {
            best = hour;
        }
    }
    Some(best as u32)
}
