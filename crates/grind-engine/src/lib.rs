//! Grind Engine - runtime for the gamified focus tracker
//!
//! Hosts the stateful pieces around the pure grind-core logic:
//! - the timer actor (single owner of the live `TimerState`, driven by a
//!   1-second tokio interval),
//! - the `Storage` persistence collaborator with JSON-file and in-memory
//!   implementations,
//! - the `AppService` coordinator that folds completed sessions into the
//!   user profile.
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

pub mod app;
pub mod storage;
pub mod timer;

// Re-exports for convenience
pub use app::AppService;
pub use storage::{JsonFileStorage, MemoryStorage, Storage, StorageError};
pub use timer::{spawn_timer, TimerCommand, TimerError, TimerEvent, TimerHandle};
