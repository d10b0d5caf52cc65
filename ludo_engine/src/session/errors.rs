//! Session layer error types.

use thiserror::Error;

use crate::game::{Chips, GameError, SessionId};

/// Errors from the session actor layer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Rule engine rejection
    #[error(transparent)]
    Game(#[from] GameError),

    /// No session with this ID
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    /// Session actor has shut down
    #[error("Session is closed")]
    Closed,

    /// Stake is not one of the configured stakes
    #[error("Stake {0} is not offered")]
    StakeNotAllowed(Chips),

    /// Manager configuration rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SessionError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            SessionError::Game(e) => e.client_message(),
            SessionError::NotFound(_) => "Game not found".to_string(),
            SessionError::Closed => "Game is over".to_string(),
            SessionError::InvalidConfig(_) => "Internal server error".to_string(),
            SessionError::StakeNotAllowed(_) => self.to_string(),
        }
    }
}

/// Result type for session layer operations
pub type SessionResult<T> = Result<T, SessionError>;
