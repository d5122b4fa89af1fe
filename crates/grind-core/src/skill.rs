//! Skill entities: trackable activities that accumulate practice hours.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::attribute::AttributeId;
use crate::progression::SkillTier;

/// Unique identifier for a skill.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(String);

impl SkillId {
    /// Creates a new SkillId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the underlying string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SkillId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SkillId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for SkillId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A trackable activity that accumulates hours and progresses through tiers.
///
/// `total_hours` is monotonically non-decreasing; `tier` is derived from it
/// whenever hours are recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    /// Unique identifier.
    pub id: SkillId,

    /// Display name.
    pub name: String,

    /// Image reference shown by display layers.
    pub image_url: String,

    /// Attributes this skill is linked to (awarded XP alongside it).
    pub attribute_ids: Vec<AttributeId>,

    /// Cumulative practice hours.
    pub total_hours: f64,

    /// Derived mastery tier.
    pub tier: SkillTier,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Skill {
    /// Creates a fresh skill with no hours.
    pub fn new(
        id: SkillId,
        name: impl Into<String>,
        image_url: impl Into<String>,
        attribute_ids: Vec<AttributeId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            image_url: image_url.into(),
            attribute_ids,
            total_hours: 0.0,
            tier: SkillTier::None,
            created_at,
        }
    }

    /// Adds practice hours and re-derives the tier.
    ///
    /// Negative or non-finite input is ignored; hours never decrease.
    /// Returns the new tier if the skill was promoted.
    pub fn record_hours(&mut self, hours: f64) -> Option<SkillTier> {
        if !hours.is_finite() || hours <= 0.0 {
            return None;
        }

        let previous_tier = self.tier;
        self.total_hours += hours;
        self.tier = SkillTier::for_hours(self.total_hours);

        if self.tier > previous_tier {
            debug!(
                skill = %self.id,
                total_hours = self.total_hours,
                tier = %self.tier,
                "Skill promoted"
            );
            Some(self.tier)
        } else {
            None
        }
    }

    /// Removes a link to the given attribute, if present.
    pub fn unlink_attribute(&mut self, attribute_id: &AttributeId) {
        self.attribute_ids.retain(|id| id != attribute_id);
    }
}
