//! Error taxonomy for the engine and its transport seam.

use thiserror::Error;

/// Failure reported by a chat transport call.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("chat request failed: {0}")]
    Request(String),
}

/// Failure while handling one chat event.
///
/// None of these crash the event loop; the runtime logs them and keeps
/// consuming events for other users.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no task named `{task}`")]
    TaskNotFound { task: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("weighted selection failed: {0}")]
    Selection(String),
    #[error("user registry lock poisoned")]
    RegistryPoisoned,
}
