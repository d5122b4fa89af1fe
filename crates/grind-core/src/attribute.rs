//! Attribute entities: leveled stat categories that accumulate XP.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::xp::{self, BASE_LEVEL_COST};

/// Identifiers of the two permanent default attributes.
///
/// These are created for every new profile and cannot be deleted.
pub const PROTECTED_ATTRIBUTE_IDS: [&str; 2] = ["strength", "intelligence"];

/// Unique identifier for an attribute.
///
/// The two defaults use the fixed slugs `strength` and `intelligence`;
/// user-created attributes get a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeId(String);

impl AttributeId {
    /// Creates a new AttributeId from a string.
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

    /// Returns true if this is one of the permanent default attributes.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        PROTECTED_ATTRIBUTE_IDS.contains(&self.0.as_str())
    }
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AttributeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AttributeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for AttributeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A leveled stat category (e.g. Strength, Intelligence).
///
/// Invariant: `current_xp < xp_to_next_level` after any update; XP overflow
/// rolls into level-ups. Mutated only through [`Attribute::award_xp`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Unique identifier.
    pub id: AttributeId,

    /// Display name.
    pub name: String,

    /// Current level (>= 1).
    pub level: u32,

    /// XP accumulated within the current level.
    pub current_xp: f64,

    /// XP threshold to clear the current level.
    pub xp_to_next_level: f64,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Attribute {
    /// Creates a fresh attribute at level 1 with no XP.
    pub fn new(id: AttributeId, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            level: 1,
            current_xp: 0.0,
            xp_to_next_level: BASE_LEVEL_COST,
            created_at,
        }
    }

    /// The permanent Strength default.
    pub fn strength(created_at: DateTime<Utc>) -> Self {
        Self::new(AttributeId::new("strength"), "Strength", created_at)
    }

    /// The permanent Intelligence default.
    pub fn intelligence(created_at: DateTime<Utc>) -> Self {
        Self::new(AttributeId::new("intelligence"), "Intelligence", created_at)
    }

    /// Awards XP, rolling overflow into level-ups.
    ///
    /// The attribute's lifetime XP is reconstructed exactly from its level
    /// and within-level progress, the award is added, and the level fields
    /// are re-derived. Returns the number of levels gained.
    pub fn award_xp(&mut self, xp: f64) -> u32 {
        let previous_level = self.level;
        let total = xp::cumulative_xp(self.level, self.current_xp) + xp.max(0.0);
        let info = xp::level_from_xp(total);

        self.level = info.level;
        self.current_xp = info.current_xp;
        self.xp_to_next_level = info.xp_to_next;

        let gained = self.level.saturating_sub(previous_level);
        if gained > 0 {
            debug!(
                attribute = %self.id,
                level = self.level,
                gained = gained,
                "Attribute leveled up"
            );
        }
        gained
    }
}
