//! The user profile aggregate: attributes, skills, and session history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::attribute::{Attribute, AttributeId};
use crate::session::Session;
use crate::skill::{Skill, SkillId};
use crate::xp::{self, XpAward};

/// The user's domain record.
///
/// Owns all attributes, skills, and the append-only session history.
/// Sessions are recorded through [`UserProfile::record_session`], which is
/// the only path that mutates attribute levels and skill hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable profile identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Optional avatar reference for display layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    /// Leveled stat categories, including the two permanent defaults.
    #[serde(default)]
    pub attributes: Vec<Attribute>,

    /// Trackable activities.
    #[serde(default)]
    pub skills: Vec<Skill>,

    /// Append-only history of completed sessions.
    #[serde(default)]
    pub sessions: Vec<Session>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Creates the first-run default profile: the two permanent attributes
    /// at level 1, no skills, no history.
    pub fn default_user(now: DateTime<Utc>) -> Self {
        Self {
            id: "default-user".to_string(),
            name: "Adventurer".to_string(),
            avatar_url: None,
            attributes: vec![Attribute::strength(now), Attribute::intelligence(now)],
            skills: Vec::new(),
            sessions: Vec::new(),
            created_at: now,
        }
    }

    /// Looks up an attribute by id.
    pub fn attribute(&self, id: &AttributeId) -> Option<&Attribute> {
        self.attributes.iter().find(|a| &a.id == id)
    }

    /// Looks up a skill by id.
    pub fn skill(&self, id: &SkillId) -> Option<&Skill> {
        self.skills.iter().find(|s| &s.id == id)
    }

    /// Adds a new attribute at level 1 and returns its id.
    pub fn create_attribute(&mut self, name: impl Into<String>, now: DateTime<Utc>) -> AttributeId {
        let attribute = Attribute::new(AttributeId::generate(), name, now);
        let id = attribute.id.clone();
        info!(attribute = %id, name = %attribute.name, "Attribute created");
        self.attributes.push(attribute);
        id
    }

    /// Deletes an attribute and strips its links from every skill.
    ///
    /// The two permanent defaults cannot be deleted; attempting to is a
    /// silent no-op. Returns true if the attribute was removed.
    pub fn delete_attribute(&mut self, id: &AttributeId) -> bool {
        if id.is_protected() {
            debug!(attribute = %id, "Ignoring deletion of protected attribute");
            return false;
        }

        let before = self.attributes.len();
        self.attributes.retain(|a| &a.id != id);
        if self.attributes.len() == before {
            return false;
        }

        for skill in &mut self.skills {
            skill.unlink_attribute(id);
        }

        info!(attribute = %id, "Attribute deleted");
        true
    }

    /// Adds a new skill with no hours and returns its id.
    pub fn create_skill(
        &mut self,
        name: impl Into<String>,
        image_url: impl Into<String>,
        attribute_ids: Vec<AttributeId>,
        now: DateTime<Utc>,
    ) -> SkillId {
        let skill = Skill::new(SkillId::generate(), name, image_url, attribute_ids, now);
        let id = skill.id.clone();
        info!(skill = %id, name = %skill.name, "Skill created");
        self.skills.push(skill);
        id
    }

    /// Deletes a skill entirely. No cascading effect on attributes.
    ///
    /// Returns true if the skill was removed.
    pub fn delete_skill(&mut self, id: &SkillId) -> bool {
        let before = self.skills.len();
        self.skills.retain(|s| &s.id != id);
        let removed = self.skills.len() != before;
        if removed {
            info!(skill = %id, "Skill deleted");
        }
        removed
    }

    /// Records a completed session: computes its XP award, levels the
    /// selected attributes, credits the linked skill's hours, and appends
    /// the session to history.
    ///
    /// Attribute or skill ids that no longer exist are skipped silently.
    /// Returns the computed award.
    pub fn record_session(&mut self, mut session: Session) -> XpAward {
        let award = xp::session_xp(session.focus_minutes_total, &session.streak_segments);
        session.total_xp = award.total_xp;

        for attribute_id in &session.attribute_ids_awarded_to {
            if let Some(attribute) = self.attributes.iter_mut().find(|a| &a.id == attribute_id) {
                attribute.award_xp(award.total_xp);
            } else {
                debug!(attribute = %attribute_id, "Skipping XP award for unknown attribute");
            }
        }

        if let Some(skill_id) = &session.skill_id {
            if let Some(skill) = self.skills.iter_mut().find(|s| &s.id == skill_id) {
                skill.record_hours(session.focus_hours());
            } else {
                debug!(skill = %skill_id, "Skipping hours for unknown skill");
            }
        }

        info!(
            session = %session.id,
            focus_minutes = format!("{:.1}", session.focus_minutes_total),
            xp = format!("{:.0}", award.total_xp),
            "Session recorded"
        );

        self.sessions.push(session);
        award
    }
}
