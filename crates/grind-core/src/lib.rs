//! Grind Core - domain types for the gamified focus tracker
//!
//! This crate provides the pure domain logic shared between
//! the runtime engine (grind-engine) and the CLI (grind):
//! the XP calculation engine, skill-tier progression, the Pomodoro
//! state machine, and the user profile aggregate.
//!
//! Everything here is synchronous and I/O-free. All code follows the
//! panic-free policy: no `.unwrap()`, `.expect()`, `panic!()`,
//! `unreachable!()`, `todo!()`, or direct indexing `[i]`.

pub mod attribute;
pub mod profile;
pub mod progression;
pub mod session;
pub mod settings;
pub mod skill;
pub mod timer;
pub mod xp;

// Re-exports for convenience
pub use attribute::{Attribute, AttributeId, PROTECTED_ATTRIBUTE_IDS};
pub use profile::UserProfile;
pub use progression::{SkillTier, TierProgress};
pub use session::{BreaksUsed, Session, SessionId, StreakSegment};
pub use settings::NotificationSettings;
pub use skill::{Skill, SkillId};
pub use timer::{TimerPhase, TimerState};
pub use xp::{LevelInfo, XpAward, XpBreakdown};
