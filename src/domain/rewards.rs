/// Reward engine - XP, levels and badge awards
///
/// Applied once per accepted completion. Rejected duplicates earn nothing,
/// so rewards cannot be farmed by re-logging the same day.

use serde::Serialize;
use chrono::NaiveDate;

use crate::domain::{EarnedBadge, GamificationProfile, BADGE_CATALOG};

/// XP granted per accepted completion
pub const XP_PER_COMPLETION: u32 = 10;

/// XP required to advance one level
pub const XP_PER_LEVEL: u32 = 100;

/// Level implied by a total XP amount
///
/// Levels start at 1 and advance every 100 XP: 0-99 is level 1, 100-199 is
/// level 2, and so on.
pub fn level_for_xp(xp: u32) -> u32 {
    xp / XP_PER_LEVEL + 1
}

/// What a single accepted completion earned
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardOutcome {
    /// XP added by this completion
    pub xp_gained: u32,
    /// New level if the completion caused a level-up
    pub new_level: Option<u32>,
    /// Badges earned by this completion, in catalog order
    pub new_badges: Vec<EarnedBadge>,
}

impl RewardOutcome {
    /// Outcome for a completion that earned nothing
    pub fn none() -> Self {
        Self {
            xp_gained: 0,
            new_level: None,
            new_badges: Vec::new(),
        }
    }
}

/// Apply the reward for one accepted completion to a profile
///
/// Grants the flat XP amount, recomputes the level, and awards every catalog
/// badge whose threshold the habit's new streak has reached and that the
/// profile does not already hold. A long-standing streak can therefore earn
/// several badges in one call when the profile is catching up.
pub fn apply_reward(
    profile: &mut GamificationProfile,
    habit_streak: u32,
    today: NaiveDate,
) -> RewardOutcome {
    let level_before = profile.level;

    profile.xp += XP_PER_COMPLETION;
    profile.level = level_for_xp(profile.xp);

    let mut new_badges = Vec::new();
    for spec in BADGE_CATALOG {
        if habit_streak >= spec.required_streak && !profile.has_badge(spec.id) {
            let earned = EarnedBadge::from_spec(spec, today);
            profile.badges.push(earned.clone());
            new_badges.push(earned);
        }
    }

    RewardOutcome {
        xp_gained: XP_PER_COMPLETION,
        new_level: (profile.level > level_before).then_some(profile.level),
        new_badges,
    }
}
