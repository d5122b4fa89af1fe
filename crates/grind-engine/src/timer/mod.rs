//! Timer engine using the actor pattern.
//!
//! The actor is the single owner of the live Pomodoro state. It receives
//! commands via a tokio mpsc channel, ticks on a 1-second interval while
//! running, and publishes state events via broadcast.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌───────────────────┐
//! │ TimerHandle  │────▶│  TimerActor  │────▶│ Broadcast Channel │
//! └──────────────┘     └──────────────┘     └───────────────────┘
//!        │                     │                      │
//!        │   TimerCommand      │   TimerEvent         ▼
//!        │   (mpsc channel)    │   (broadcast)   Observers (UI)
//!        ▼                     ▼
//!   start/pause/stop      TimerState +
//!   skip/reset/select     Storage snapshot
//! ```
//!
//! Because ticks and user commands are serialized through one task, no
//! locking is needed and a tick queued before a stop or reset can never
//! mutate state afterwards.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::storage::Storage;

mod actor;
mod commands;
mod handle;

pub use actor::TimerActor;
pub use commands::{TimerCommand, TimerError, TimerEvent};
pub use handle::TimerHandle;

/// Channel buffer sizes
const COMMAND_BUFFER: usize = 100;
const EVENT_BUFFER: usize = 100;

/// Spawn the timer actor and return a handle for interaction.
///
/// A previously persisted timer snapshot is restored from `storage`, with
/// `is_running`/`is_paused` forced false: a saved running timer never
/// auto-resumes against a fresh scheduler.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use grind_engine::storage::MemoryStorage;
/// use grind_engine::timer::spawn_timer;
///
/// #[tokio::main]
/// async fn main() {
///     let handle = spawn_timer(Arc::new(MemoryStorage::new()));
///
///     handle.start().await.ok();
///     let state = handle.state().await;
/// }
/// ```
pub fn spawn_timer(storage: Arc<dyn Storage>) -> TimerHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
    let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

    let actor = TimerActor::new(cmd_rx, event_tx.clone(), storage);
    tokio::spawn(actor.run());

    TimerHandle::new(cmd_tx, event_tx)
}
