//! Skill-tier progression: cumulative hours mapped to discrete tiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hours required to reach the Skill tier.
pub const SKILL_THRESHOLD_HOURS: f64 = 20.0;

/// Hours required to reach the Expertise tier.
pub const EXPERTISE_THRESHOLD_HOURS: f64 = 100.0;

/// Hours required to reach the Mastery tier.
pub const MASTERY_THRESHOLD_HOURS: f64 = 1000.0;

/// Discrete mastery bucket for a skill, keyed by cumulative hours.
///
/// Boundaries are inclusive on the lower bound of each tier: exactly
/// 20 hours is already `Skill`, exactly 1000 is already `Mastery`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum SkillTier {
    /// Fewer than 20 hours practiced.
    #[default]
    None,

    /// 20+ hours.
    Skill,

    /// 100+ hours.
    Expertise,

    /// 1000+ hours.
    Mastery,
}

impl SkillTier {
    /// Maps cumulative hours to a tier.
    pub fn for_hours(total_hours: f64) -> Self {
        if total_hours >= MASTERY_THRESHOLD_HOURS {
            Self::Mastery
        } else if total_hours >= EXPERTISE_THRESHOLD_HOURS {
            Self::Expertise
        } else if total_hours >= SKILL_THRESHOLD_HOURS {
            Self::Skill
        } else {
            Self::None
        }
    }

    /// Returns the display label for this tier.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "-",
            Self::Skill => "Skill",
            Self::Expertise => "Expertise",
            Self::Mastery => "Mastery",
        }
    }
}

impl fmt::Display for SkillTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Progress toward the next tier boundary, for progress-bar rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierProgress {
    /// Hours accumulated past the current tier's lower bound.
    pub current: f64,
    /// Width of the current tier band in hours.
    pub target: f64,
    /// `current / target` as a percentage.
    pub percentage: f64,
}

/// Returns the next tier boundary the skill has not yet reached,
/// or `None` once mastery is achieved.
pub fn next_tier_threshold(total_hours: f64) -> Option<f64> {
    if total_hours < SKILL_THRESHOLD_HOURS {
        Some(SKILL_THRESHOLD_HOURS)
    } else if total_hours < EXPERTISE_THRESHOLD_HOURS {
        Some(EXPERTISE_THRESHOLD_HOURS)
    } else if total_hours < MASTERY_THRESHOLD_HOURS {
        Some(MASTERY_THRESHOLD_HOURS)
    } else {
        None
    }
}

/// Returns progress within the current tier band, or `None` at mastery.
pub fn tier_progress(total_hours: f64) -> Option<TierProgress> {
    let next = next_tier_threshold(total_hours)?;

    let previous = if next == MASTERY_THRESHOLD_HOURS {
        EXPERTISE_THRESHOLD_HOURS
    } else if next == EXPERTISE_THRESHOLD_HOURS {
        SKILL_THRESHOLD_HOURS
    } else {
        0.0
    };

    let current = total_hours - previous;
    let target = next - previous;

    Some(TierProgress {
        current,
        target,
        percentage: current / target * 100.0,
    })
}
