//! Timer actor - owns the live Pomodoro state and processes commands.
//!
//! The TimerActor is the single owner of timer state in the system. It
//! receives commands via an mpsc channel, ticks on a 1-second interval
//! while running, and publishes events via broadcast. Commands and ticks
//! are serialized through one task, so no locking is needed and state
//! mutations are atomic with respect to each other.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{self, Interval};
use tracing::{debug, info, warn};

use grind_core::{Session, TimerState};

use crate::storage::Storage;

use super::commands::{TimerCommand, TimerEvent};

/// Tick cadence of the countdown.
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// The timer actor - owns the live timer state.
///
/// # Ownership
///
/// The actor owns:
/// - `state`: the single live `TimerState`
/// - `storage`: the persistence collaborator, written fire-and-forget
///
/// # Thread Safety
///
/// The actor runs in a single task and processes commands sequentially.
/// All state mutations happen within this single task.
pub struct TimerActor {
    /// Command receiver
    receiver: mpsc::Receiver<TimerCommand>,

    /// The live timer state
    state: TimerState,

    /// Event publisher for observers (UI layers)
    event_publisher: broadcast::Sender<TimerEvent>,

    /// Persistence collaborator; every mutation snapshots through it
    storage: Arc<dyn Storage>,
}

impl TimerActor {
    /// Creates a new timer actor, restoring any persisted snapshot.
    ///
    /// The restore policy forces `is_running`/`is_paused` false: a saved
    /// running timer never auto-resumes against a fresh scheduler.
    pub fn new(
        receiver: mpsc::Receiver<TimerCommand>,
        event_publisher: broadcast::Sender<TimerEvent>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let state = match storage.load_timer_state() {
            Ok(Some(saved)) => {
                debug!("Restored timer state from storage");
                saved.restored()
            }
            Ok(None) => TimerState::new(),
            Err(e) => {
                warn!(error = %e, "Failed to restore timer state, starting fresh");
                TimerState::new()
            }
        };

        Self {
            receiver,
            state,
            event_publisher,
            storage,
        }
    }

    /// Runs the actor event loop.
    ///
    /// Processes commands until the channel closes (all senders dropped).
    /// The tick branch is gated on `is_running`, and the interval is
    /// re-armed whenever the timer transitions into running, so a tick
    /// queued before a stop or reset never lands afterwards.
    pub async fn run(mut self) {
        info!("Timer actor starting");

        let mut ticker = time::interval_at(time::Instant::now() + TICK_PERIOD, TICK_PERIOD);

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    match cmd {
                        Some(cmd) => self.handle_command(cmd, &mut ticker),
                        None => break,
                    }
                }

                _ = ticker.tick(), if self.state.is_running => {
                    self.handle_tick();
                }
            }
        }

        info!("Timer actor stopped");
    }

    /// Dispatches a command to the appropriate handler.
    fn handle_command(&mut self, cmd: TimerCommand, ticker: &mut Interval) {
        match cmd {
            TimerCommand::Start { respond_to } => {
                let was_running = self.state.is_running;
                self.handle_start();
                if !was_running && self.state.is_running {
                    // Re-arm the interval so the first second is a full one.
                    ticker.reset();
                }
                // Ignore send error - caller may have dropped the receiver
                let _ = respond_to.send(());
            }
            TimerCommand::Pause { respond_to } => {
                self.handle_pause();
                let _ = respond_to.send(());
            }
            TimerCommand::Stop { respond_to } => {
                let session = self.handle_stop();
                let _ = respond_to.send(session.map(Box::new));
            }
            TimerCommand::SkipBreak { respond_to } => {
                self.handle_skip_break();
                let _ = respond_to.send(());
            }
            TimerCommand::Reset { respond_to } => {
                self.handle_reset();
                let _ = respond_to.send(());
            }
            TimerCommand::SetSelection {
                skill,
                attributes,
                respond_to,
            } => {
                self.state.set_selection(skill, attributes);
                self.persist();
                let _ = respond_to.send(());
            }
            TimerCommand::GetState { respond_to } => {
                let _ = respond_to.send(Box::new(self.state.clone()));
            }
        }
    }

    // ========================================================================
    // Command Handlers
    // ========================================================================

    /// Handles start: opens a session if none is open, begins ticking.
    fn handle_start(&mut self) {
        if !self.state.start(Utc::now()) {
            debug!("Start ignored: timer already running");
            return;
        }

        info!(
            phase = %self.state.phase,
            time_remaining = self.state.time_remaining,
            "Timer started"
        );
        self.persist();
    }

    /// Handles pause: stops ticking without closing the session.
    fn handle_pause(&mut self) {
        if !self.state.pause() {
            debug!("Pause ignored: timer not running");
            return;
        }

        info!(
            phase = %self.state.phase,
            time_remaining = self.state.time_remaining,
            "Timer paused"
        );
        self.persist();
    }

    /// Handles stop: synthesizes the session record and resets the engine.
    ///
    /// Returns `None` without touching state when no session is open.
    fn handle_stop(&mut self) -> Option<Session> {
        let session = match self.state.make_session(Utc::now()) {
            Some(session) => session,
            None => {
                debug!("Stop ignored: no open session");
                return None;
            }
        };

        self.state.reset();
        self.persist();

        info!(
            session = %session.id,
            focus_minutes = format!("{:.1}", session.focus_minutes_total),
            blocks = session.completed_focus_blocks,
            "Session completed"
        );

        // Publish event (ignore if no subscribers)
        let _ = self.event_publisher.send(TimerEvent::SessionCompleted {
            session: Box::new(session.clone()),
        });

        Some(session)
    }

    /// Handles skipping the current break.
    fn handle_skip_break(&mut self) {
        if !self.state.skip_break() {
            debug!("Skip ignored: not in a break");
            return;
        }

        info!("Break skipped, back to focus");
        let _ = self.event_publisher.send(TimerEvent::PhaseChanged {
            phase: self.state.phase,
        });
        self.persist();
    }

    /// Handles a full reset to initial state.
    fn handle_reset(&mut self) {
        self.state.reset();
        info!("Timer reset");
        self.persist();
    }

    /// Handles one tick of the 1-second interval.
    fn handle_tick(&mut self) {
        if let Some(phase) = self.state.tick() {
            info!(
                phase = %phase,
                focus_blocks = self.state.focus_blocks_completed,
                "Phase changed"
            );
            let _ = self.event_publisher.send(TimerEvent::PhaseChanged { phase });
        }

        let _ = self.event_publisher.send(TimerEvent::Tick {
            state: Box::new(self.state.clone()),
        });

        self.persist();
    }

    /// Snapshots the state through the storage collaborator.
    ///
    /// Fire-and-forget: failures are logged and never propagate.
    fn persist(&self) {
        if let Err(e) = self.storage.save_timer_state(&self.state) {
            warn!(error = %e, "Failed to persist timer state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageError};
    use grind_core::{AttributeId, SkillId, TimerPhase};
    use tokio::sync::oneshot;

    /// Storage stub whose writes always fail.
    struct FailingStorage;

    impl Storage for FailingStorage {
        fn save_profile(&self, _: &grind_core::UserProfile) -> Result<(), StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }
        fn load_profile(&self) -> Result<Option<grind_core::UserProfile>, StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }
        fn save_settings(&self, _: &grind_core::NotificationSettings) -> Result<(), StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }
        fn load_settings(&self) -> Result<Option<grind_core::NotificationSettings>, StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }
        fn save_timer_state(&self, _: &TimerState) -> Result<(), StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }
        fn load_timer_state(&self) -> Result<Option<TimerState>, StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }
        fn clear(&self) -> Result<(), StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }
    }

    fn create_actor() -> (
        mpsc::Sender<TimerCommand>,
        TimerActor,
        broadcast::Receiver<TimerEvent>,
    ) {
        create_actor_with(Arc::new(MemoryStorage::new()))
    }

    fn create_actor_with(
        storage: Arc<dyn Storage>,
    ) -> (
        mpsc::Sender<TimerCommand>,
        TimerActor,
        broadcast::Receiver<TimerEvent>,
    ) {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        // Tests drain events after running many ticks without a live reader,
        // so the buffer must retain every emitted event (one per tick) to
        // avoid the receiver lagging. Sized well above the largest tick count.
        let (event_tx, event_rx) = broadcast::channel(4096);
        let actor = TimerActor::new(cmd_rx, event_tx, storage);
        (cmd_tx, actor, event_rx)
    }

    fn ticker() -> Interval {
        time::interval(TICK_PERIOD)
    }

    fn start(actor: &mut TimerActor, ticker: &mut Interval) {
        let (tx, _rx) = oneshot::channel();
        actor.handle_command(TimerCommand::Start { respond_to: tx }, ticker);
    }

    #[tokio::test]
    async fn test_start_opens_session() {
        let (_, mut actor, _) = create_actor();
        let mut ticker = ticker();

        assert!(!actor.state.session_open());
        start(&mut actor, &mut ticker);

        assert!(actor.state.is_running);
        assert!(!actor.state.is_paused);
        assert!(actor.state.session_open());
    }

    #[tokio::test]
    async fn test_start_while_running_keeps_session() {
        let (_, mut actor, _) = create_actor();
        let mut ticker = ticker();

        start(&mut actor, &mut ticker);
        let opened = actor.state.session_start;
        start(&mut actor, &mut ticker);

        assert_eq!(actor.state.session_start, opened);
    }

    #[tokio::test]
    async fn test_pause_without_running_is_noop() {
        let (_, mut actor, _) = create_actor();
        let mut ticker = ticker();

        let (tx, _rx) = oneshot::channel();
        actor.handle_command(TimerCommand::Pause { respond_to: tx }, &mut ticker);

        assert!(!actor.state.is_running);
        assert!(!actor.state.is_paused);
    }

    #[tokio::test]
    async fn test_stop_without_session_reports_nothing() {
        let (_, mut actor, _) = create_actor();
        let mut ticker = ticker();

        let before = actor.state.clone();
        let (tx, rx) = oneshot::channel();
        actor.handle_command(TimerCommand::Stop { respond_to: tx }, &mut ticker);

        let result = rx.await.expect("response received");
        assert!(result.is_none());
        assert_eq!(actor.state, before);
    }

    #[tokio::test]
    async fn test_stop_synthesizes_session_and_resets() {
        let (_, mut actor, mut event_rx) = create_actor();
        let mut ticker = ticker();

        start(&mut actor, &mut ticker);
        for _ in 0..120 {
            actor.handle_tick();
        }

        let (tx, rx) = oneshot::channel();
        actor.handle_command(TimerCommand::Stop { respond_to: tx }, &mut ticker);

        let session = rx
            .await
            .expect("response received")
            .expect("session synthesized");
        assert!((session.focus_minutes_total - 2.0).abs() < 1e-9);
        assert_eq!(session.streak_segments.len(), 1);
        assert_eq!(session.total_xp, 0.0);

        // Engine fully reset afterwards.
        assert_eq!(actor.state, TimerState::new());

        // A SessionCompleted event was published (after the tick events).
        let mut saw_completion = false;
        while let Ok(event) = event_rx.try_recv() {
            if matches!(event, TimerEvent::SessionCompleted { .. }) {
                saw_completion = true;
            }
        }
        assert!(saw_completion);
    }

    #[tokio::test]
    async fn test_tick_counts_down_and_transitions() {
        let (_, mut actor, mut event_rx) = create_actor();
        let mut ticker = ticker();

        start(&mut actor, &mut ticker);
        for _ in 0..1500 {
            actor.handle_tick();
        }

        assert_eq!(actor.state.phase, TimerPhase::ShortBreak);
        assert_eq!(actor.state.time_remaining, 300);
        assert_eq!(actor.state.focus_blocks_completed, 1);

        let mut saw_phase_change = false;
        while let Ok(event) = event_rx.try_recv() {
            if let TimerEvent::PhaseChanged { phase } = event {
                assert_eq!(phase, TimerPhase::ShortBreak);
                saw_phase_change = true;
            }
        }
        assert!(saw_phase_change);
    }

    #[tokio::test]
    async fn test_skip_break() {
        let (_, mut actor, _) = create_actor();
        let mut ticker = ticker();

        start(&mut actor, &mut ticker);
        for _ in 0..1500 {
            actor.handle_tick();
        }
        assert!(actor.state.phase.is_break());

        let (tx, _rx) = oneshot::channel();
        actor.handle_command(TimerCommand::SkipBreak { respond_to: tx }, &mut ticker);

        assert_eq!(actor.state.phase, TimerPhase::Focus);
        assert_eq!(actor.state.time_remaining, 1500);
    }

    #[tokio::test]
    async fn test_set_selection() {
        let (_, mut actor, _) = create_actor();
        let mut ticker = ticker();

        let (tx, _rx) = oneshot::channel();
        actor.handle_command(
            TimerCommand::SetSelection {
                skill: Some(SkillId::new("guitar")),
                attributes: vec![AttributeId::new("strength")],
                respond_to: tx,
            },
            &mut ticker,
        );

        assert_eq!(actor.state.selected_skill, Some(SkillId::new("guitar")));
        assert_eq!(
            actor.state.selected_attributes,
            vec![AttributeId::new("strength")]
        );
    }

    #[tokio::test]
    async fn test_reset_restores_initial_state() {
        let (_, mut actor, _) = create_actor();
        let mut ticker = ticker();

        start(&mut actor, &mut ticker);
        for _ in 0..500 {
            actor.handle_tick();
        }

        let (tx, _rx) = oneshot::channel();
        actor.handle_command(TimerCommand::Reset { respond_to: tx }, &mut ticker);

        assert_eq!(actor.state, TimerState::new());
    }

    #[tokio::test]
    async fn test_restore_never_resumes_running() {
        let storage = Arc::new(MemoryStorage::new());

        let mut saved = TimerState::new();
        saved.start(Utc::now());
        for _ in 0..90 {
            saved.tick();
        }
        storage.save_timer_state(&saved).expect("save ok");

        let (_, actor, _) = create_actor_with(storage);
        assert!(!actor.state.is_running);
        assert!(!actor.state.is_paused);
        assert_eq!(actor.state.time_remaining, saved.time_remaining);
        assert_eq!(actor.state.session_start, saved.session_start);
    }

    #[tokio::test]
    async fn test_storage_failures_never_break_the_actor() {
        let (_, mut actor, _) = create_actor_with(Arc::new(FailingStorage));
        let mut ticker = ticker();

        // Restore failed, so we start fresh.
        assert_eq!(actor.state, TimerState::new());

        // Every mutation persists and every persist fails; the actor
        // keeps going regardless.
        start(&mut actor, &mut ticker);
        for _ in 0..10 {
            actor.handle_tick();
        }
        assert_eq!(actor.state.time_remaining, 1490);

        let (tx, rx) = oneshot::channel();
        actor.handle_command(TimerCommand::Stop { respond_to: tx }, &mut ticker);
        assert!(rx.await.expect("response received").is_some());
    }
}
