//! # Ludo Engine
//!
//! A server-authoritative rules engine for a Ludo variant played for stakes.
//!
//! Dice are always thrown by the engine, each match is an isolated
//! [`GameSession`], and every accepted action leaves the session in a state
//! that can be snapshotted, persisted and rendered.
//!
//! ## Rules
//!
//! - Two or four colors take turns in fixed order (red, green, yellow, blue)
//! - A turn is one roll followed by exactly one move of any pawn
//! - Leaving base lands a pawn on its color's entry step and scores 1 point
//! - Otherwise a pawn advances by the die value and scores that many points
//! - Landing on an unsafe step occupied by opponents sends them back to base
//!   and costs each captured color 5 points (never below zero)
//! - A 6 grants another roll; anything else passes the turn
//!
//! ## Core Modules
//!
//! - [`board`]: Board topology, colors and pawn positions
//! - [`game`]: Session state machine, dice and rule errors
//! - [`render`]: Mapping from logical positions to grid cells and pixels
//! - [`session`]: Async actors hosting many concurrent sessions
//!
//! ## Example
//!
//! ```
//! use ludo_engine::{BoardTopology, Color, GameSession};
//!
//! let board = BoardTopology::standard();
//! let mut game = GameSession::two_player("alice", "bob", 100).unwrap();
//!
//! let dice = game.roll(Color::Red).unwrap();
//! let outcome = game.apply_move(Color::Red, 0, board).unwrap();
//! assert_eq!(outcome.dice, dice);
//! ```

/// Board topology and the types that describe pawns on it.
pub mod board;
pub use board::{BoardTopology, Cell, Color, PawnPosition, PlayerId};

/// Core game logic, entities, and session state machine.
pub mod game;
pub use game::{
    Chips, DiceRoller, GameError, GameResult, GameSession, GameSettings, MoveOutcome,
    SessionSnapshot, SessionStatus, SystemDice,
    constants::{self, CAPTURE_PENALTY, PAWNS_PER_COLOR},
};

/// Coordinate mapping for renderers.
pub mod render;

/// Concurrent session hosting.
pub mod session;
pub use session::{SessionConfig, SessionError, SessionManager};
