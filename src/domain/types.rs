/// Core identifier and enum types used throughout the domain layer
///
/// This module defines the fundamental types like UserId, HabitId, Frequency,
/// and Timeframe that are used by Habit, CompletionEvent, and the analytics
/// projections.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

/// Unique identifier for a user account
///
/// This is a wrapper around UUID to provide type safety - you can't accidentally
/// pass a user ID where a habit ID is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a user ID from a string (useful for database loading)
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Convert to string representation
    pub fn to_string(&self) -> String {
        self.0.to_string()
    }
}

/// Unique identifier for a habit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HabitId(pub Uuid);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a habit ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Convert to string representation
    pub fn to_string(&self) -> String {
        self.0.to_string()
    }
}

/// Unique identifier for a completion event
///
/// Similar to HabitId but for the immutable completion records that feed
/// the analytics projections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Generate a new random event ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an event ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Convert to string representation
    pub fn to_string(&self) -> String {
        self.0.to_string()
    }
}

/// How often a habit is intended to be performed
///
/// The cadence is descriptive: streaks always count consecutive calendar
/// days no matter which frequency the habit declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every single day
    Daily,
    /// Once or more per week
    Weekly,
    /// Monday through Friday only
    Weekdays,
    /// Saturday and Sunday only
    Weekends,
}

impl Frequency {
    /// Parse a frequency from its string form
    pub fn parse(s: &str) -> Result<Self, crate::domain::DomainError> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "weekdays" => Ok(Frequency::Weekdays),
            "weekends" => Ok(Frequency::Weekends),
            other => Err(crate::domain::DomainError::InvalidFrequency(format!(
                "Invalid frequency '{}'. Valid options: daily, weekly, weekdays, weekends",
                other
            ))),
        }
    }

    /// Get the storage/display string for this frequency
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Weekdays => "weekdays",
            Frequency::Weekends => "weekends",
        }
    }
}

/// Trailing analytics window selector
///
/// Each timeframe maps to a fixed number of calendar days ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Week,
    Month,
    Year,
}

impl Timeframe {
    /// Parse a timeframe from its string form
    pub fn parse(s: &str) -> Result<Self, crate::domain::DomainError> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(Timeframe::Week),
            "month" => Ok(Timeframe::Month),
            "year" => Ok(Timeframe::Year),
            other => Err(crate::domain::DomainError::InvalidTimeframe(format!(
                "Invalid timeframe '{}'. Valid options: week, month, year",
                other
            ))),
        }
    }

    /// Number of calendar days covered by this timeframe
    pub fn window_days(&self) -> u32 {
        match self {
            Timeframe::Week => 7,
            Timeframe::Month => 30,
            Timeframe::Year => 365,
        }
    }

    /// Get the string form of this timeframe
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Week => "week",
            Timeframe::Month => "month",
            Timeframe::Year => "year",
        }
    }
}

/// Interpret a stored day marker as a calendar date
///
/// Completion markers are written as bare `YYYY-MM-DD` strings, but records
/// imported from older exports may hold a full timestamp instead. Every
/// recognized form resolves to the calendar date it names; anything else
/// returns None.
pub fn parse_day_marker(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt.date());
    }

    None
}
