/// Analytics operations - loading data and shaping projections for callers
///
/// The heavy lifting is in the analytics module; this file owns the window
/// query, presentation rounding, and response DTOs.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};

use crate::analytics::{aggregate, heatmap, HabitShare, HabitStanding, HeatmapCell};
use crate::domain::Timeframe;
use crate::service::{parse_user_id, ServiceError};
use crate::storage::HabitStore;

/// Parameters for the analytics overview
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AnalyticsParams {
    pub user_id: String,
    /// One of: week, month, year
    pub timeframe: String,
}

/// Analytics overview over a trailing window
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsResponse {
    pub timeframe: String,
    /// Completions per calendar day, oldest day first
    pub daily_completions: Vec<u32>,
    pub habit_distribution: Vec<HabitShare>,
    pub best_performing: Vec<HabitStanding>,
    /// Mean live streak, rounded to one decimal
    pub average_streak: f64,
    /// Percentage of possible habit-days completed, rounded to a whole number
    pub success_rate: f64,
    pub total_completions: u32,
    pub active_days: u32,
}

/// Compute the analytics overview for a user
pub fn analytics_overview<S: HabitStore>(
    store: &S,
    params: AnalyticsParams,
    now: DateTime<Utc>,
) -> Result<AnalyticsResponse, ServiceError> {
    let user_id = parse_user_id(&params.user_id)?;
    store.get_user(&user_id)?;

    let timeframe = Timeframe::parse(&params.timeframe)?;
    let today = now.date_naive();
    let window_start = today - Duration::days(timeframe.window_days() as i64 - 1);

    let habits = store.list_habits_for_user(&user_id)?;
    let events = store.events_for_user(&user_id, Some(window_start))?;

    let snapshot = aggregate(&habits, &events, timeframe, today);

    Ok(AnalyticsResponse {
        timeframe: timeframe.as_str().to_string(),
        daily_completions: snapshot.daily_completions,
        habit_distribution: snapshot.habit_distribution,
        best_performing: snapshot.best_performing,
        average_streak: (snapshot.average_streak * 10.0).round() / 10.0,
        success_rate: snapshot.success_rate.round(),
        total_completions: snapshot.total_completions,
        active_days: snapshot.active_days,
    })
}

/// All-time completion heatmap
#[derive(Debug, Clone, Serialize)]
pub struct HeatmapResponse {
    /// One cell per day with at least one completion, ascending by date
    pub cells: Vec<HeatmapCell>,
}

/// Build the all-time heatmap for a user's habits
pub fn completion_heatmap<S: HabitStore>(
    store: &S,
    user_id: &str,
) -> Result<HeatmapResponse, ServiceError> {
    let id = parse_user_id(user_id)?;
    store.get_user(&id)?;

    let habits = store.list_habits_for_user(&id)?;
    Ok(HeatmapResponse {
        cells: heatmap(&habits),
    })
}
