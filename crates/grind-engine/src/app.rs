//! Application state coordinator.
//!
//! `AppService` owns the user profile and settings, folds completed
//! sessions into them through the XP engine, and keeps everything
//! persisted through the storage collaborator. Persistence failures are
//! logged and degrade gracefully to in-memory-only state - never fatal.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use grind_core::{
    AttributeId, NotificationSettings, Session, SkillId, UserProfile, XpAward,
};

use crate::storage::Storage;

/// Owns the mutable user domain record and its settings.
///
/// All mutations persist immediately; a failing store leaves the in-memory
/// state authoritative for the rest of the run.
pub struct AppService {
    storage: Arc<dyn Storage>,
    profile: UserProfile,
    settings: NotificationSettings,
}

impl AppService {
    /// Loads the profile and settings from storage.
    ///
    /// Absent data is a normal first run and initializes the default
    /// profile (the two permanent attributes at level 1) and default
    /// settings, both persisted right away. Load failures are logged and
    /// degrade to the same defaults.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let profile = match storage.load_profile() {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                info!("No stored profile, initializing default user");
                let profile = UserProfile::default_user(Utc::now());
                if let Err(e) = storage.save_profile(&profile) {
                    warn!(error = %e, "Failed to persist default profile");
                }
                profile
            }
            Err(e) => {
                warn!(error = %e, "Failed to load profile, using default user");
                UserProfile::default_user(Utc::now())
            }
        };

        let settings = match storage.load_settings() {
            Ok(Some(settings)) => settings,
            Ok(None) => NotificationSettings::default(),
            Err(e) => {
                warn!(error = %e, "Failed to load settings, using defaults");
                NotificationSettings::default()
            }
        };

        Self {
            storage,
            profile,
            settings,
        }
    }

    /// Returns the current profile.
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Returns the current settings.
    pub fn settings(&self) -> NotificationSettings {
        self.settings
    }

    /// Creates a new attribute and returns its id.
    pub fn create_attribute(&mut self, name: impl Into<String>) -> AttributeId {
        let id = self.profile.create_attribute(name, Utc::now());
        self.persist_profile();
        id
    }

    /// Deletes an attribute, stripping its links from every skill.
    ///
    /// The two permanent defaults are never deleted; attempting to is a
    /// silent no-op. Returns true if the attribute was removed.
    pub fn delete_attribute(&mut self, id: &AttributeId) -> bool {
        let removed = self.profile.delete_attribute(id);
        if removed {
            self.persist_profile();
        }
        removed
    }

    /// Creates a new skill and returns its id.
    pub fn create_skill(
        &mut self,
        name: impl Into<String>,
        image_url: impl Into<String>,
        attribute_ids: Vec<AttributeId>,
    ) -> SkillId {
        let id = self.profile.create_skill(name, image_url, attribute_ids, Utc::now());
        self.persist_profile();
        id
    }

    /// Deletes a skill entirely. Returns true if it was removed.
    pub fn delete_skill(&mut self, id: &SkillId) -> bool {
        let removed = self.profile.delete_skill(id);
        if removed {
            self.persist_profile();
        }
        removed
    }

    /// Updates the display name and/or avatar.
    pub fn update_profile(&mut self, name: Option<String>, avatar_url: Option<String>) {
        if let Some(name) = name {
            self.profile.name = name;
        }
        if let Some(avatar_url) = avatar_url {
            self.profile.avatar_url = Some(avatar_url);
        }
        self.persist_profile();
    }

    /// Replaces the notification settings.
    pub fn update_settings(&mut self, settings: NotificationSettings) {
        self.settings = settings;
        if let Err(e) = self.storage.save_settings(&self.settings) {
            warn!(error = %e, "Failed to persist settings");
        }
    }

    /// Folds a completed session into the profile: computes its XP award,
    /// levels the selected attributes, credits the linked skill's hours,
    /// appends the session to history, and persists.
    ///
    /// Returns the computed award for display.
    pub fn complete_session(&mut self, session: Session) -> XpAward {
        let award = self.profile.record_session(session);
        self.persist_profile();
        award
    }

    /// Persists the profile, logging rather than propagating failures.
    fn persist_profile(&self) {
        if let Err(e) = self.storage.save_profile(&self.profile) {
            warn!(error = %e, "Failed to persist profile");
        }
    }
}
