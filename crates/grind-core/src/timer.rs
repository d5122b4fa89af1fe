//! Pomodoro state machine: phases, focus-time accounting, streak tracking.
//!
//! This module holds the pure transition logic. Scheduling (the 1-second
//! tick source) and persistence live in grind-engine, which owns the single
//! live [`TimerState`] inside an actor task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::attribute::AttributeId;
use crate::session::{BreaksUsed, Session, SessionId, StreakSegment};
use crate::skill::SkillId;

/// Length of one focus block in seconds (25 minutes).
pub const FOCUS_DURATION_SECS: u32 = 25 * 60;

/// Length of a short break in seconds (5 minutes).
pub const SHORT_BREAK_SECS: u32 = 5 * 60;

/// Length of a long break in seconds (15 minutes).
pub const LONG_BREAK_SECS: u32 = 15 * 60;

/// A long break triggers after every this many completed focus blocks.
pub const BLOCKS_PER_LONG_BREAK: u32 = 4;

/// Pause allowance during focus before the streak counts as broken.
/// Reserved: streak-break accounting is not implemented yet, see
/// [`TimerState::streak_broken`].
pub const BREAK_OVERRUN_SECS: u32 = 60;

// ============================================================================
// Phase
// ============================================================================

/// Current phase of the Pomodoro cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerPhase {
    /// Focused work; the only phase that accumulates focus minutes.
    #[default]
    Focus,

    /// 5-minute break between focus blocks.
    ShortBreak,

    /// 15-minute break after every 4th focus block.
    LongBreak,
}

impl TimerPhase {
    /// Returns the display label for this phase.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::ShortBreak => "short break",
            Self::LongBreak => "long break",
        }
    }

    /// Countdown length for this phase in seconds.
    pub fn duration_secs(&self) -> u32 {
        match self {
            Self::Focus => FOCUS_DURATION_SECS,
            Self::ShortBreak => SHORT_BREAK_SECS,
            Self::LongBreak => LONG_BREAK_SECS,
        }
    }

    /// Returns true for either break phase.
    #[must_use]
    pub fn is_break(&self) -> bool {
        matches!(self, Self::ShortBreak | Self::LongBreak)
    }
}

impl fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Timer State
// ============================================================================

/// Live state of the Pomodoro machine.
///
/// Exactly one instance exists per running engine; it is the sole source of
/// truth for in-progress session accounting. `is_running` and `is_paused`
/// are never both true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerState {
    /// Whether the countdown is ticking.
    pub is_running: bool,

    /// Whether the countdown was explicitly paused.
    pub is_paused: bool,

    /// Current phase.
    pub phase: TimerPhase,

    /// Seconds remaining in the current phase.
    pub time_remaining: u32,

    /// Full focus blocks completed this session.
    pub focus_blocks_completed: u32,

    /// When the open session started; `None` when no session is open.
    pub session_start: Option<DateTime<Utc>>,

    /// Focus minutes accumulated this session, including partial blocks.
    pub total_focus_minutes: f64,

    /// Current streak length in hours (`total_focus_minutes / 60`).
    pub current_streak_hours: f64,

    /// Whether the streak was broken. Part of the state shape but never
    /// set yet.
    /// TODO: track pause duration during focus and set this once the pause
    /// exceeds BREAK_OVERRUN_SECS, emitting a fresh streak segment.
    pub streak_broken: bool,

    /// Short breaks entered this session.
    pub short_breaks_taken: u32,

    /// Long breaks entered this session.
    pub long_breaks_taken: u32,

    /// Skill credited when the session completes.
    pub selected_skill: Option<SkillId>,

    /// Attributes awarded XP when the session completes.
    pub selected_attributes: Vec<AttributeId>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            is_running: false,
            is_paused: false,
            phase: TimerPhase::Focus,
            time_remaining: FOCUS_DURATION_SECS,
            focus_blocks_completed: 0,
            session_start: None,
            total_focus_minutes: 0.0,
            current_streak_hours: 0.0,
            streak_broken: false,
            short_breaks_taken: 0,
            long_breaks_taken: 0,
            selected_skill: None,
            selected_attributes: Vec::new(),
        }
    }
}

impl TimerState {
    /// Creates the initial state: stopped, fresh focus phase, no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a session is open.
    #[must_use]
    pub fn session_open(&self) -> bool {
        self.session_start.is_some()
    }

    /// Starts (or resumes) the countdown. No-op if already running.
    ///
    /// Opens a session by stamping `now` if none is open yet.
    /// Returns true if the state changed.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_running {
            return false;
        }

        self.is_running = true;
        self.is_paused = false;

        if self.session_start.is_none() {
            self.session_start = Some(now);
        }
        true
    }

    /// Pauses the countdown. No-op if not running.
    ///
    /// Returns true if the state changed.
    pub fn pause(&mut self) -> bool {
        if !self.is_running {
            return false;
        }

        self.is_running = false;
        self.is_paused = true;
        true
    }

    /// Advances the countdown by one second.
    ///
    /// While in focus, recomputes the focus-minute total and streak from
    /// block progress. When the countdown expires, performs the phase
    /// transition and returns the new phase.
    pub fn tick(&mut self) -> Option<TimerPhase> {
        self.time_remaining = self.time_remaining.saturating_sub(1);

        if self.phase == TimerPhase::Focus {
            self.total_focus_minutes = self.live_focus_minutes();
            self.current_streak_hours = self.total_focus_minutes / 60.0;
        }

        if self.time_remaining == 0 {
            Some(self.advance_phase())
        } else {
            None
        }
    }

    /// Performs the countdown-expiry transition and returns the new phase.
    ///
    /// Leaving focus increments the block count and picks a long break on
    /// every 4th block; leaving either break returns to focus
    /// unconditionally; breaks do not chain.
    fn advance_phase(&mut self) -> TimerPhase {
        if self.phase == TimerPhase::Focus {
            self.focus_blocks_completed += 1;

            if self.focus_blocks_completed % BLOCKS_PER_LONG_BREAK == 0 {
                self.phase = TimerPhase::LongBreak;
                self.long_breaks_taken += 1;
            } else {
                self.phase = TimerPhase::ShortBreak;
                self.short_breaks_taken += 1;
            }
        } else {
            self.phase = TimerPhase::Focus;
        }

        self.time_remaining = self.phase.duration_secs();
        self.phase
    }

    /// Skips the rest of the current break, returning straight to focus.
    ///
    /// No-op while in focus. Returns true if the state changed.
    pub fn skip_break(&mut self) -> bool {
        if self.phase == TimerPhase::Focus {
            return false;
        }

        self.phase = TimerPhase::Focus;
        self.time_remaining = FOCUS_DURATION_SECS;
        true
    }

    /// Restores every field to its initial value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Overwrites the pending XP-attribution target.
    pub fn set_selection(&mut self, skill: Option<SkillId>, attributes: Vec<AttributeId>) {
        self.selected_skill = skill;
        self.selected_attributes = attributes;
    }

    /// Applies the restore policy to a persisted snapshot: a saved running
    /// timer never auto-resumes against a fresh scheduler.
    #[must_use]
    pub fn restored(mut self) -> Self {
        self.is_running = false;
        self.is_paused = false;
        self
    }

    /// Focus minutes accumulated so far: full completed blocks plus
    /// progress into the current block while focused.
    pub fn live_focus_minutes(&self) -> f64 {
        let block_minutes = f64::from(FOCUS_DURATION_SECS) / 60.0;
        let completed = f64::from(self.focus_blocks_completed) * block_minutes;

        if self.phase == TimerPhase::Focus {
            let into_block =
                f64::from(FOCUS_DURATION_SECS.saturating_sub(self.time_remaining)) / 60.0;
            completed + into_block
        } else {
            completed
        }
    }

    /// Synthesizes the session record for a stop at `now`.
    ///
    /// Returns `None` when no session is open. The whole session is emitted
    /// as a single streak segment, and `total_xp` is left at zero for the
    /// XP engine to fill in downstream.
    pub fn make_session(&self, now: DateTime<Utc>) -> Option<Session> {
        let start_time = self.session_start?;
        let focus_minutes = self.live_focus_minutes();

        Some(Session {
            id: SessionId::generate(),
            start_time,
            end_time: now,
            focus_minutes_total: focus_minutes,
            completed_focus_blocks: self.focus_blocks_completed,
            breaks_used: BreaksUsed {
                short_breaks: self.short_breaks_taken,
                long_breaks: self.long_breaks_taken,
                over_limit: false,
            },
            streak_segments: vec![StreakSegment {
                minutes: focus_minutes,
            }],
            total_xp: 0.0,
            attribute_ids_awarded_to: self.selected_attributes.clone(),
            skill_id: self.selected_skill.clone(),
        })
    }
}

/// Formats a second count as `MM:SS` for display.
pub fn format_time(seconds: u32) -> String {
    let mins = seconds / 60;
    let secs = seconds % 60;
    format!("{mins:02}:{secs:02}")
}
