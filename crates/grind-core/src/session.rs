//! Session records: immutable results of completed timer runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::attribute::AttributeId;
use crate::skill::SkillId;

/// Unique identifier for a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a new SessionId from a string.
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

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A contiguous span of focus minutes: the unit of bonus XP computation.
///
/// Segments never interact; a broken streak restarts the bonus curve with
/// the next segment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StreakSegment {
    /// Contiguous focus minutes in this segment.
    pub minutes: f64,
}

/// Breaks consumed during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BreaksUsed {
    /// Short breaks entered.
    pub short_breaks: u32,

    /// Long breaks entered.
    pub long_breaks: u32,

    /// Whether any break overran its allowance. Never set yet; reserved
    /// for streak-break accounting.
    pub over_limit: bool,
}

/// Immutable record of one completed timer run.
///
/// Created exactly once when the timer is stopped with an open session,
/// then appended to the profile's history and never mutated, except that
/// `total_xp` is stamped by the XP engine when the session is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier.
    pub id: SessionId,

    /// When the session was opened.
    pub start_time: DateTime<Utc>,

    /// When the session was stopped (`end_time >= start_time`).
    pub end_time: DateTime<Utc>,

    /// Total focus minutes accumulated, including partial blocks.
    pub focus_minutes_total: f64,

    /// Number of full 25-minute focus blocks completed.
    pub completed_focus_blocks: u32,

    /// Breaks consumed during the run.
    pub breaks_used: BreaksUsed,

    /// Streak breakdown used for bonus XP.
    pub streak_segments: Vec<StreakSegment>,

    /// Total XP awarded; zero until the XP engine fills it in.
    pub total_xp: f64,

    /// Attributes that received this session's XP.
    pub attribute_ids_awarded_to: Vec<AttributeId>,

    /// Skill credited with the focus hours, if one was selected.
    pub skill_id: Option<SkillId>,
}

impl Session {
    /// Focus hours represented by this session.
    pub fn focus_hours(&self) -> f64 {
        self.focus_minutes_total / 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_serde_round_trips_timestamps() {
        let session = Session {
            id: SessionId::new("s-1"),
            start_time: "2026-08-07T10:00:00Z".parse().expect("valid timestamp"),
            end_time: "2026-08-07T11:30:00Z".parse().expect("valid timestamp"),
            focus_minutes_total: 75.0,
            completed_focus_blocks: 3,
            breaks_used: BreaksUsed {
                short_breaks: 2,
                long_breaks: 0,
                over_limit: false,
            },
            streak_segments: vec![StreakSegment { minutes: 75.0 }],
            total_xp: 875.0,
            attribute_ids_awarded_to: vec![AttributeId::new("strength")],
            skill_id: Some(SkillId::new("guitar")),
        };

        let json = serde_json::to_string(&session).expect("serializes");
        let restored: Session = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(restored, session);
        assert!(json.contains("2026-08-07T10:00:00Z"));
    }

    #[test]
    fn test_focus_hours() {
        let mut session = Session {
            id: SessionId::generate(),
            start_time: Utc::now(),
            end_time: Utc::now(),
            focus_minutes_total: 90.0,
            completed_focus_blocks: 3,
            breaks_used: BreaksUsed::default(),
            streak_segments: Vec::new(),
            total_xp: 0.0,
            attribute_ids_awarded_to: Vec::new(),
            skill_id: None,
        };
        assert!((session.focus_hours() - 1.5).abs() < 1e-9);

        session.focus_minutes_total = 0.0;
        assert_eq!(session.focus_hours(), 0.0);
    }
}
