/// User entity, notification settings and the gamification profile
///
/// A user owns habits and accumulates a gamification profile (XP, level,
/// earned badges) as completions are recorded. Settings gate which background
/// notifications the user receives.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{DomainError, EarnedBadge, UserId};

/// Per-user notification switches
///
/// Every switch defaults to on. The master `notifications` switch gates all
/// delivery; the others select individual notification kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Master switch for all outgoing notifications
    pub notifications: bool,
    /// Per-habit reminder messages
    pub habit_reminders: bool,
    /// Celebration messages on streak milestones
    pub streak_alerts: bool,
    /// Weekly digest with a personalized insight
    pub ai_insights: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            notifications: true,
            habit_reminders: true,
            streak_alerts: true,
            ai_insights: true,
        }
    }
}

/// Accumulated rewards for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamificationProfile {
    /// Total experience points earned
    pub xp: u32,
    /// Current level, derived from XP
    pub level: u32,
    /// Badges earned so far, in the order they were earned
    pub badges: Vec<EarnedBadge>,
}

impl GamificationProfile {
    /// Fresh profile for a newly registered user
    pub fn new() -> Self {
        Self {
            xp: 0,
            level: 1,
            badges: Vec::new(),
        }
    }

    /// Whether a badge with the given catalog id has already been earned
    pub fn has_badge(&self, badge_id: &str) -> bool {
        self.badges.iter().any(|b| b.id == badge_id)
    }
}

impl Default for GamificationProfile {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered account that owns habits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for this user
    pub id: UserId,
    /// Contact address, unique across all users
    pub email: String,
    /// Name shown in messages and digests
    pub display_name: String,
    /// Notification switches
    pub settings: UserSettings,
    /// XP, level and badges
    pub profile: GamificationProfile,
    /// When this account was registered
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Register a new user with validation
    pub fn new(email: String, display_name: String) -> Result<Self, DomainError> {
        Self::validate_email(&email)?;
        Self::validate_display_name(&display_name)?;

        Ok(Self {
            id: UserId::new(),
            email,
            display_name,
            settings: UserSettings::default(),
            profile: GamificationProfile::new(),
            created_at: Utc::now(),
        })
    }

    /// Create a user from existing data (used when loading from database)
    pub fn from_existing(
        id: UserId,
        email: String,
        display_name: String,
        settings: UserSettings,
        profile: GamificationProfile,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            display_name,
            settings,
            profile,
            created_at,
        }
    }

    /// Validate an email address
    ///
    /// This is deliberately loose: a non-empty local part, an '@', and a
    /// non-empty domain. Full RFC validation is not worth the trouble here.
    fn validate_email(email: &str) -> Result<(), DomainError> {
        let trimmed = email.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidEmail(
                "Email cannot be empty".to_string()
            ));
        }
        if trimmed.len() > 254 {
            return Err(DomainError::InvalidEmail(
                "Email cannot be longer than 254 characters".to_string()
            ));
        }

        match trimmed.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(DomainError::InvalidEmail(format!(
                "'{}' is not a valid email address",
                trimmed
            ))),
        }
    }

    /// Validate the display name
    fn validate_display_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::Validation {
                message: "Display name cannot be empty".to_string()
            });
        }
        if trimmed.len() > 100 {
            return Err(DomainError::Validation {
                message: "Display name cannot be longer than 100 characters".to_string()
            });
        }

        Ok(())
    }
}
