//! Client interface for interacting with the TimerActor.
//!
//! The `TimerHandle` provides a cheap-to-clone interface for sending
//! commands to the timer actor and subscribing to timer events. Channel
//! errors are mapped to `TimerError::ChannelClosed`.

use tokio::sync::{broadcast, mpsc, oneshot};

use grind_core::{AttributeId, Session, SkillId, TimerState};

use super::commands::{TimerCommand, TimerError, TimerEvent};

/// Handle for interacting with the timer actor.
///
/// Cheap to clone and shareable across tasks. All methods are async and
/// communicate with the actor via channels.
///
/// # Usage
///
/// ```ignore
/// handle.set_selection(Some(skill_id), vec![attr_id]).await?;
/// handle.start().await?;
///
/// let mut events = handle.subscribe();
/// while let Ok(event) = events.recv().await {
///     // Render the tick / phase change / completed session
/// }
/// ```
#[derive(Clone)]
pub struct TimerHandle {
    /// Command sender to the actor
    sender: mpsc::Sender<TimerCommand>,

    /// Event broadcaster for subscribing to updates
    event_sender: broadcast::Sender<TimerEvent>,
}

impl TimerHandle {
    /// Create a new timer handle.
    pub fn new(
        sender: mpsc::Sender<TimerCommand>,
        event_sender: broadcast::Sender<TimerEvent>,
    ) -> Self {
        Self {
            sender,
            event_sender,
        }
    }

    /// Start or resume the countdown. No-op if already running.
    ///
    /// # Errors
    ///
    /// - `TimerError::ChannelClosed` if the actor has shut down
    pub async fn start(&self) -> Result<(), TimerError> {
        self.send_simple(|respond_to| TimerCommand::Start { respond_to })
            .await
    }

    /// Pause the countdown. No-op if not running.
    ///
    /// # Errors
    ///
    /// - `TimerError::ChannelClosed` if the actor has shut down
    pub async fn pause(&self) -> Result<(), TimerError> {
        self.send_simple(|respond_to| TimerCommand::Pause { respond_to })
            .await
    }

    /// Stop the session and return its synthesized record.
    ///
    /// Returns `Ok(None)` when no session was open - nothing to report,
    /// and state is left unchanged.
    ///
    /// # Errors
    ///
    /// - `TimerError::ChannelClosed` if the actor has shut down
    pub async fn stop(&self) -> Result<Option<Session>, TimerError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(TimerCommand::Stop { respond_to: tx })
            .await
            .map_err(|_| TimerError::ChannelClosed)?;

        let session = rx.await.map_err(|_| TimerError::ChannelClosed)?;
        Ok(session.map(|boxed| *boxed))
    }

    /// Skip the rest of the current break. No-op while focused.
    ///
    /// # Errors
    ///
    /// - `TimerError::ChannelClosed` if the actor has shut down
    pub async fn skip_break(&self) -> Result<(), TimerError> {
        self.send_simple(|respond_to| TimerCommand::SkipBreak { respond_to })
            .await
    }

    /// Reset all timer state to initial values.
    ///
    /// # Errors
    ///
    /// - `TimerError::ChannelClosed` if the actor has shut down
    pub async fn reset(&self) -> Result<(), TimerError> {
        self.send_simple(|respond_to| TimerCommand::Reset { respond_to })
            .await
    }

    /// Overwrite the pending XP-attribution target.
    ///
    /// # Errors
    ///
    /// - `TimerError::ChannelClosed` if the actor has shut down
    pub async fn set_selection(
        &self,
        skill: Option<SkillId>,
        attributes: Vec<AttributeId>,
    ) -> Result<(), TimerError> {
        self.send_simple(|respond_to| TimerCommand::SetSelection {
            skill,
            attributes,
            respond_to,
        })
        .await
    }

    /// Get a snapshot of the current timer state.
    ///
    /// # Errors
    ///
    /// - `TimerError::ChannelClosed` if the actor has shut down
    pub async fn state(&self) -> Result<TimerState, TimerError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(TimerCommand::GetState { respond_to: tx })
            .await
            .map_err(|_| TimerError::ChannelClosed)?;

        let state = rx.await.map_err(|_| TimerError::ChannelClosed)?;
        Ok(*state)
    }

    /// Subscribe to timer events.
    ///
    /// Returns a broadcast receiver that will receive all events (ticks,
    /// phase changes, session completions) published by the actor.
    ///
    /// This is a synchronous operation - it doesn't communicate with the
    /// actor.
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_sender.subscribe()
    }

    /// Check if the actor is still running.
    ///
    /// Returns `true` if the command channel is still open.
    pub fn is_connected(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Sends a command whose response is a bare acknowledgement.
    async fn send_simple<F>(&self, make: F) -> Result<(), TimerError>
    where
        F: FnOnce(oneshot::Sender<()>) -> TimerCommand,
    {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(make(tx))
            .await
            .map_err(|_| TimerError::ChannelClosed)?;

        rx.await.map_err(|_| TimerError::ChannelClosed)
    }
}
