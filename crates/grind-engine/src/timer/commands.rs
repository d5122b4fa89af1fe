//! Timer actor commands, errors, and events.
//!
//! Message types for communicating with the `TimerActor`:
//! - `TimerCommand`: commands sent to the actor
//! - `TimerError`: errors surfaced to callers
//! - `TimerEvent`: events published for observers

use thiserror::Error;
use tokio::sync::oneshot;

use grind_core::{AttributeId, Session, SkillId, TimerPhase, TimerState};

// ============================================================================
// Timer Commands
// ============================================================================

/// Commands sent to the timer actor.
///
/// Each command carries a oneshot channel for the response, enabling
/// request-response patterns in async code without blocking.
#[derive(Debug)]
pub enum TimerCommand {
    /// Start or resume the countdown. Opens a session if none is open.
    /// No-op if already running.
    Start {
        /// Channel to confirm the command was applied
        respond_to: oneshot::Sender<()>,
    },

    /// Pause the countdown. No-op if not running.
    Pause {
        /// Channel to confirm the command was applied
        respond_to: oneshot::Sender<()>,
    },

    /// Stop the session, synthesizing its record and resetting the engine.
    ///
    /// Responds with `None` when no session was open ("nothing to
    /// report"); state is left unchanged in that case.
    Stop {
        /// Channel to send the synthesized session, if any
        respond_to: oneshot::Sender<Option<Box<Session>>>,
    },

    /// Skip the rest of the current break. No-op while focused.
    SkipBreak {
        /// Channel to confirm the command was applied
        respond_to: oneshot::Sender<()>,
    },

    /// Reset all timer state to initial values.
    Reset {
        /// Channel to confirm the command was applied
        respond_to: oneshot::Sender<()>,
    },

    /// Overwrite the pending XP-attribution target.
    SetSelection {
        /// Skill credited when the session completes
        skill: Option<SkillId>,
        /// Attributes awarded XP when the session completes
        attributes: Vec<AttributeId>,
        /// Channel to confirm the command was applied
        respond_to: oneshot::Sender<()>,
    },

    /// Get a snapshot of the current timer state.
    GetState {
        /// Channel to send the snapshot (boxed for size optimization)
        respond_to: oneshot::Sender<Box<TimerState>>,
    },
}

// ============================================================================
// Timer Errors
// ============================================================================

/// Errors that can occur when talking to the timer actor.
#[derive(Debug, Clone, Error)]
pub enum TimerError {
    /// The response channel was closed before receiving a response.
    ///
    /// This typically indicates the actor was shut down.
    #[error("timer channel closed")]
    ChannelClosed,
}

// ============================================================================
// Timer Events
// ============================================================================

/// Events published by the timer actor to subscribers.
///
/// Delivered synchronously from the actor task; lagging receivers miss
/// events rather than slowing the engine down.
#[derive(Debug, Clone)]
pub enum TimerEvent {
    /// One second elapsed; carries the fresh state snapshot.
    ///
    /// The state is boxed to reduce enum size variance.
    Tick {
        /// Snapshot after the tick was applied
        state: Box<TimerState>,
    },

    /// The countdown expired (or a break was skipped) and the phase changed.
    PhaseChanged {
        /// The phase just entered
        phase: TimerPhase,
    },

    /// A session was stopped and its record synthesized.
    ///
    /// The session is boxed to reduce enum size variance.
    SessionCompleted {
        /// The synthesized session (XP not yet computed)
        session: Box<Session>,
    },
}
