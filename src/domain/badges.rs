/// Badge catalog and earned-badge records
///
/// The catalog is a fixed list of streak milestones, ordered by the streak
/// they require. Earning is monotonic: once a badge is on a profile it is
/// never removed, and re-reaching the threshold never duplicates it.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

/// A badge definition in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeSpec {
    /// Stable identifier, also used for duplicate checks
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Short description of the achievement
    pub description: &'static str,
    /// Emoji shown next to the badge
    pub icon: &'static str,
    /// Streak length that earns this badge
    pub required_streak: u32,
}

/// All badges that can be earned, ordered by required streak
pub const BADGE_CATALOG: &[BadgeSpec] = &[
    BadgeSpec {
        id: "first_step",
        name: "First Step",
        description: "Completed a habit for the first time",
        icon: "🌱",
        required_streak: 1,
    },
    BadgeSpec {
        id: "streak_master",
        name: "Streak Master",
        description: "Held a 7-day streak on a single habit",
        icon: "🔥",
        required_streak: 7,
    },
    BadgeSpec {
        id: "consistency_king",
        name: "Consistency King",
        description: "Held a 30-day streak on a single habit",
        icon: "👑",
        required_streak: 30,
    },
];

/// A badge that has been earned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarnedBadge {
    /// Catalog id of the badge
    pub id: String,
    /// Display name
    pub name: String,
    /// Short description of the achievement
    pub description: String,
    /// Emoji shown next to the badge
    pub icon: String,
    /// Calendar day the badge was earned
    pub date_earned: NaiveDate,
}

impl EarnedBadge {
    /// Materialize a catalog entry as earned on the given day
    pub fn from_spec(spec: &BadgeSpec, date_earned: NaiveDate) -> Self {
        Self {
            id: spec.id.to_string(),
            name: spec.name.to_string(),
            description: spec.description.to_string(),
            icon: spec.icon.to_string(),
            date_earned,
        }
    }
}
