/// Analytics engine - pure projections over habits and completion events
///
/// This module turns the event ledger and current habit state into the
/// dashboard projections: daily completion buckets, per-habit distribution,
/// best performers, summary rates, and the all-time heatmap. Everything here
/// is a pure function of its inputs; the service layer owns loading data and
/// rounding numbers for presentation.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use chrono::NaiveDate;
use tracing::warn;

use crate::domain::{parse_day_marker, CompletionEvent, Habit, HabitId, Timeframe};

/// Aggregated view of one user's activity over a trailing window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSnapshot {
    /// Completions per calendar day, oldest day first, one slot per window day
    pub daily_completions: Vec<u32>,
    /// Windowed completion counts per surviving habit
    pub habit_distribution: Vec<HabitShare>,
    /// Up to three habits with the longest current streaks
    pub best_performing: Vec<HabitStanding>,
    /// Mean streak across habits with a live streak, 0 if none
    pub average_streak: f64,
    /// Completions as a percentage of possible habit-days in the window
    pub success_rate: f64,
    /// Total completions recorded in the window
    pub total_completions: u32,
    /// Distinct calendar days with at least one completion in the window
    pub active_days: u32,
}

/// One habit's share of windowed completions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitShare {
    /// Identifier of the habit, stable across renames
    pub habit_id: HabitId,
    pub name: String,
    pub completions: u32,
}

/// A habit ranked by its current streak
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitStanding {
    pub habit_id: HabitId,
    pub name: String,
    pub streak: u32,
}

/// One day of the all-time completion heatmap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub count: u32,
}

/// Aggregate a user's habits and events over a trailing window ending today
///
/// The window covers `timeframe.window_days()` calendar days with today as
/// the last bucket. Events whose habit has since been deleted still count in
/// the daily buckets, totals and active days, but cannot appear in the
/// per-habit distribution.
pub fn aggregate(
    habits: &[Habit],
    events: &[CompletionEvent],
    timeframe: Timeframe,
    today: NaiveDate,
) -> AnalyticsSnapshot {
    let days = timeframe.window_days();

    let mut daily_completions = vec![0u32; days as usize];
    let mut per_habit: HashMap<&HabitId, u32> = HashMap::new();
    let mut days_seen: HashSet<NaiveDate> = HashSet::new();
    let mut total_completions = 0u32;

    for event in events {
        let age = (today - event.completed_on).num_days();
        if age < 0 || age >= days as i64 {
            continue;
        }

        // Oldest day lands in slot 0, today in the last slot
        let slot = (days as i64 - 1 - age) as usize;
        daily_completions[slot] += 1;
        total_completions += 1;
        days_seen.insert(event.completed_on);
        *per_habit.entry(&event.habit_id).or_insert(0) += 1;
    }

    let habit_distribution = habits
        .iter()
        .map(|habit| HabitShare {
            habit_id: habit.id.clone(),
            name: habit.name.clone(),
            completions: per_habit.get(&habit.id).copied().unwrap_or(0),
        })
        .collect();

    let mut best_performing: Vec<HabitStanding> = habits
        .iter()
        .map(|habit| HabitStanding {
            habit_id: habit.id.clone(),
            name: habit.name.clone(),
            streak: habit.streak,
        })
        .collect();
    // Stable sort keeps the incoming order for equal streaks
    best_performing.sort_by(|a, b| b.streak.cmp(&a.streak));
    best_performing.truncate(3);

    let live_streaks: Vec<u32> = habits
        .iter()
        .map(|h| h.streak)
        .filter(|s| *s > 0)
        .collect();
    let average_streak = if live_streaks.is_empty() {
        0.0
    } else {
        live_streaks.iter().sum::<u32>() as f64 / live_streaks.len() as f64
    };

    let success_rate = if habits.is_empty() {
        0.0
    } else {
        total_completions as f64 / (habits.len() as f64 * days as f64) * 100.0
    };

    AnalyticsSnapshot {
        daily_completions,
        habit_distribution,
        best_performing,
        average_streak,
        success_rate,
        total_completions,
        active_days: days_seen.len() as u32,
    }
}

/// Build the all-time completion heatmap from habit histories
///
/// Counts how many completions landed on each calendar day across every
/// habit the user still has. Unreadable history entries are logged and
/// skipped rather than failing the whole projection.
pub fn heatmap(habits: &[Habit]) -> Vec<HeatmapCell> {
    let mut counts: HashMap<NaiveDate, u32> = HashMap::new();

    for habit in habits {
        for marker in &habit.completion_history {
            match parse_day_marker(marker) {
                Some(date) => *counts.entry(date).or_insert(0) += 1,
                None => {
                    warn!(
                        "Skipping unreadable history entry '{}' on habit {}",
                        marker,
                        habit.id.to_string()
                    );
                }
            }
        }
    }

    let mut cells: Vec<HeatmapCell> = counts
        .into_iter()
        .map(|(date, count)| HeatmapCell { date, count })
        .collect();
    cells.sort_by_key(|cell| cell.date);
    cells
}
