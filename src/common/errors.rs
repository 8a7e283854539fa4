//! Error types for the strategy core

use thiserror::Error;

/// Result type alias using our StrategyError
pub type Result<T> = std::result::Result<T, StrategyError>;

/// Main error type for the reactive strategy core
///
/// Cancellation is deliberately absent: a cancelled watch or run is a
/// normal outcome (`Ok(false)` / `Ok(())`), not a fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    /// An upstream event producer reported an error
    #[error("producer fault: {0}")]
    Producer(String),

    /// A per-item or trade action callback failed
    #[error("action fault: {0}")]
    Action(String),

    /// `start` was called while a previous run is still active
    #[error("strategy already started")]
    AlreadyStarted,

    /// The strategy task panicked or was aborted out from under us
    #[error("strategy task failed: {0}")]
    Join(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl StrategyError {
    /// Wrap an arbitrary upstream error as a producer fault
    pub fn producer(err: impl std::fmt::Display) -> Self {
        StrategyError::Producer(err.to_string())
    }

    /// Wrap an arbitrary callback error as an action fault
    pub fn action(err: impl std::fmt::Display) -> Self {
        StrategyError::Action(err.to_string())
    }
}

impl From<tokio::task::JoinError> for StrategyError {
    fn from(err: tokio::task::JoinError) -> Self {
        StrategyError::Join(err.to_string())
    }
}
