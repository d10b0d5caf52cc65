//! Engine error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::Color;

/// The two rejection classes callers have to distinguish.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Out of turn or out of order. The caller should resequence and retry.
    IllegalAction,
    /// A bad slot, color, amount or table. Indicates a caller bug.
    InvalidArgument,
}

/// Errors returned by board and session operations.
///
/// Every rejection leaves the session untouched.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("not your turn: {expected} to play, {got} attempted")]
    NotYourTurn { expected: Color, got: Color },
    #[error("dice already rolled, a move is pending")]
    AlreadyRolled,
    #[error("roll the dice before moving")]
    NotRolled,
    #[error("invalid dice value {0}")]
    InvalidDiceValue(u8),
    #[error("session is not being played")]
    SessionNotPlaying,
    #[error("cannot end a session into the playing state")]
    InvalidTransition,
    #[error("color {0} is not part of this match")]
    UnknownColor(Color),
    #[error("pawn slot {slot} out of range (0..{max})")]
    InvalidPawnSlot { slot: usize, max: usize },
    #[error("player id is {len} characters long, at most {max} allowed")]
    InvalidPlayerId { len: usize, max: usize },
    #[error("a match needs 2 or 4 players, got {0}")]
    InvalidPlayerCount(usize),
    #[error("bet amount must not be negative, got {0}")]
    NegativeBet(i64),
    #[error("invalid board: {0}")]
    InvalidBoard(String),
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

impl GameError {
    /// Which rejection class this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotYourTurn { .. }
            | Self::AlreadyRolled
            | Self::NotRolled
            | Self::InvalidDiceValue(_)
            | Self::SessionNotPlaying
            | Self::InvalidTransition => ErrorKind::IllegalAction,
            Self::UnknownColor(_)
            | Self::InvalidPawnSlot { .. }
            | Self::InvalidPlayerId { .. }
            | Self::InvalidPlayerCount(_)
            | Self::NegativeBet(_)
            | Self::InvalidBoard(_)
            | Self::InvalidSnapshot(_) => ErrorKind::InvalidArgument,
        }
    }

    #[must_use]
    pub fn is_illegal_action(&self) -> bool {
        self.kind() == ErrorKind::IllegalAction
    }

    /// Get a message that is safe to relay to an end user
    ///
    /// Caller bugs are collapsed into a generic message so internal
    /// table layouts and snapshot details don't leak into chat replies.
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidBoard(_) | Self::InvalidSnapshot(_) => "Internal game error".to_string(),
            Self::NotYourTurn { .. } => "Not your turn".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for engine operations
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(GameError::AlreadyRolled.kind(), ErrorKind::IllegalAction);
        assert_eq!(GameError::InvalidDiceValue(0).kind(), ErrorKind::IllegalAction);
        assert_eq!(
            GameError::InvalidPawnSlot { slot: 4, max: 4 }.kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            GameError::UnknownColor(Color::Blue).kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn test_client_message_hides_internals() {
        let err = GameError::InvalidSnapshot("positions for red have 3 pawns".to_string());
        assert_eq!(err.client_message(), "Internal game error");

        let err = GameError::NotYourTurn {
            expected: Color::Red,
            got: Color::Yellow,
        };
        assert_eq!(err.client_message(), "Not your turn");
        assert!(err.to_string().contains("red"));
    }
}
