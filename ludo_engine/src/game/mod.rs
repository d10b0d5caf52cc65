//! Ludo game engine: session state machine, dice and rule constants.
//!
//! This module provides:
//! - The per-match session with roll/move resolution
//! - Capture, safe-step and scoring rules
//! - Owned snapshots for storage and rendering collaborators

pub mod constants;
pub mod dice;
pub mod entities;
pub mod errors;
pub mod session;

pub use dice::{DiceRoller, SystemDice};
pub use entities::{
    CapturedPawn, Chips, MoveOutcome, SessionId, SessionSnapshot, SessionStatus, TurnPhase,
};
pub use errors::{ErrorKind, GameError, GameResult};
pub use session::{GameSession, GameSettings};
