//! User-adjustable notification settings.
//!
//! Consumed by display layers only; the core never plays audio itself.

use serde::{Deserialize, Serialize};

/// Notification preferences persisted alongside the profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Whether phase-change audio cues are enabled.
    pub audio_enabled: bool,

    /// Playback volume, 0.0 to 1.0.
    pub volume: f64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            audio_enabled: true,
            volume: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = NotificationSettings::default();
        assert!(settings.audio_enabled);
        assert!((settings.volume - 0.5).abs() < f64::EPSILON);
    }
}
