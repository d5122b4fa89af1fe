//! Persistence collaborator: the storage seam the engine writes through.
//!
//! Three independent slots are persisted: the user profile, the
//! notification settings, and the live timer-state snapshot. Absent data is
//! a valid non-error state (first run) and surfaces as `Ok(None)`.
//!
//! Callers treat storage as fire-and-forget: failures are logged at the
//! call site and never propagate into timer or profile logic.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use grind_core::{NotificationSettings, TimerState, UserProfile};

/// File names for the three storage slots.
const PROFILE_FILE: &str = "profile.json";
const SETTINGS_FILE: &str = "settings.json";
const TIMER_STATE_FILE: &str = "timer_state.json";

/// Errors that can occur at the storage boundary.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying filesystem failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Data could not be encoded or decoded.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The in-memory store's lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    LockPoisoned,
}

/// The persistence collaborator.
///
/// Implementations must be cheap and local: the engine calls these
/// synchronously from its actor task and never awaits them.
pub trait Storage: Send + Sync {
    /// Persists the user profile.
    fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError>;

    /// Loads the user profile; `Ok(None)` on first run.
    fn load_profile(&self) -> Result<Option<UserProfile>, StorageError>;

    /// Persists the notification settings.
    fn save_settings(&self, settings: &NotificationSettings) -> Result<(), StorageError>;

    /// Loads the notification settings; `Ok(None)` on first run.
    fn load_settings(&self) -> Result<Option<NotificationSettings>, StorageError>;

    /// Persists a snapshot of the live timer state.
    fn save_timer_state(&self, state: &TimerState) -> Result<(), StorageError>;

    /// Loads the timer-state snapshot; `Ok(None)` on first run.
    fn load_timer_state(&self) -> Result<Option<TimerState>, StorageError>;

    /// Removes all stored data.
    fn clear(&self) -> Result<(), StorageError>;
}

// ============================================================================
// JSON File Storage
// ============================================================================

/// File-backed storage: one pretty-printed JSON file per slot under a data
/// directory. Timestamps round-trip as ISO-8601 strings via chrono's serde
/// support.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    /// Creates storage rooted at the given directory.
    ///
    /// The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates storage under the platform data directory
    /// (`~/.local/share/grind` on Linux), falling back to `/tmp/grind`.
    pub fn default_location() -> Self {
        let dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("grind");
        Self::new(dir)
    }

    /// Returns the directory this storage writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_slot<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)?;
        debug!(path = %path.display(), "Storage slot written");
        Ok(())
    }

    fn read_slot<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>, StorageError> {
        let path = self.dir.join(file);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }
}

impl Storage for JsonFileStorage {
    fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        self.write_slot(PROFILE_FILE, profile)
    }

    fn load_profile(&self) -> Result<Option<UserProfile>, StorageError> {
        self.read_slot(PROFILE_FILE)
    }

    fn save_settings(&self, settings: &NotificationSettings) -> Result<(), StorageError> {
        self.write_slot(SETTINGS_FILE, settings)
    }

    fn load_settings(&self) -> Result<Option<NotificationSettings>, StorageError> {
        self.read_slot(SETTINGS_FILE)
    }

    fn save_timer_state(&self, state: &TimerState) -> Result<(), StorageError> {
        self.write_slot(TIMER_STATE_FILE, state)
    }

    fn load_timer_state(&self) -> Result<Option<TimerState>, StorageError> {
        self.read_slot(TIMER_STATE_FILE)
    }

    fn clear(&self) -> Result<(), StorageError> {
        for file in [PROFILE_FILE, SETTINGS_FILE, TIMER_STATE_FILE] {
            let path = self.dir.join(file);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

// ============================================================================
// In-Memory Storage
// ============================================================================

/// In-memory storage for tests and ephemeral runs.
///
/// Values are held as serialized JSON so that the same encode/decode path
/// is exercised as with file storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    profile: Mutex<Option<String>>,
    settings: Mutex<Option<String>>,
    timer_state: Mutex<Option<String>>,
}

impl MemoryStorage {
    /// Creates empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn store<T: Serialize>(
        slot: &Mutex<Option<String>>,
        value: &T,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        let mut guard = slot.lock().map_err(|_| StorageError::LockPoisoned)?;
        *guard = Some(json);
        Ok(())
    }

    fn fetch<T: DeserializeOwned>(
        slot: &Mutex<Option<String>>,
    ) -> Result<Option<T>, StorageError> {
        let guard = slot.lock().map_err(|_| StorageError::LockPoisoned)?;
        match guard.as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }
}

impl Storage for MemoryStorage {
    fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        Self::store(&self.profile, profile)
    }

    fn load_profile(&self) -> Result<Option<UserProfile>, StorageError> {
        Self::fetch(&self.profile)
    }

    fn save_settings(&self, settings: &NotificationSettings) -> Result<(), StorageError> {
        Self::store(&self.settings, settings)
    }

    fn load_settings(&self) -> Result<Option<NotificationSettings>, StorageError> {
        Self::fetch(&self.settings)
    }

    fn save_timer_state(&self, state: &TimerState) -> Result<(), StorageError> {
        Self::store(&self.timer_state, state)
    }

    fn load_timer_state(&self) -> Result<Option<TimerState>, StorageError> {
        Self::fetch(&self.timer_state)
    }

    fn clear(&self) -> Result<(), StorageError> {
        for slot in [&self.profile, &self.settings, &self.timer_state] {
            let mut guard = slot.lock().map_err(|_| StorageError::LockPoisoned)?;
            *guard = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn exercise_storage(storage: &dyn Storage) {
        // First run: every slot is empty, not an error.
        assert!(storage.load_profile().expect("load ok").is_none());
        assert!(storage.load_settings().expect("load ok").is_none());
        assert!(storage.load_timer_state().expect("load ok").is_none());

        let profile = UserProfile::default_user(Utc::now());
        storage.save_profile(&profile).expect("save ok");
        let restored = storage
            .load_profile()
            .expect("load ok")
            .expect("profile present");
        assert_eq!(restored, profile);

        let settings = NotificationSettings {
            audio_enabled: false,
            volume: 0.8,
        };
        storage.save_settings(&settings).expect("save ok");
        assert_eq!(
            storage.load_settings().expect("load ok"),
            Some(settings)
        );

        let mut state = TimerState::new();
        state.start(Utc::now());
        storage.save_timer_state(&state).expect("save ok");
        let restored = storage
            .load_timer_state()
            .expect("load ok")
            .expect("state present");
        assert_eq!(restored, state);

        storage.clear().expect("clear ok");
        assert!(storage.load_profile().expect("load ok").is_none());
        assert!(storage.load_timer_state().expect("load ok").is_none());
    }

    #[test]
    fn test_memory_storage_round_trip() {
        exercise_storage(&MemoryStorage::new());
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        exercise_storage(&JsonFileStorage::new(dir.path()));
    }

    #[test]
    fn test_file_storage_writes_iso8601_timestamps() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = JsonFileStorage::new(dir.path());

        let profile = UserProfile::default_user(
            "2026-08-07T09:00:00Z".parse().expect("valid timestamp"),
        );
        storage.save_profile(&profile).expect("save ok");

        let raw = std::fs::read_to_string(dir.path().join("profile.json")).expect("file exists");
        assert!(raw.contains("2026-08-07T09:00:00Z"));
    }

    #[test]
    fn test_file_storage_corrupt_slot_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = JsonFileStorage::new(dir.path());

        std::fs::write(dir.path().join("profile.json"), "not json").expect("write ok");
        assert!(matches!(
            storage.load_profile(),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn test_clear_on_empty_storage_is_fine() {
        let dir = tempfile::tempdir().expect("tempdir");
        JsonFileStorage::new(dir.path()).clear().expect("clear ok");
        MemoryStorage::new().clear().expect("clear ok");
    }
}
