//! Session module running each match inside its own async actor.
//!
//! This module implements:
//! - SessionActor: owns one `GameSession` and applies requests one at a time
//! - SessionManager: spawns actors and routes requests by session id
//! - Message-based communication with tokio channels
//!
//! ## Architecture
//!
//! Each session runs in a separate Tokio task with an mpsc inbox, so
//! concurrent roll/move requests against one session are serialized while
//! distinct sessions proceed independently. The actor also drives the
//! match clock and pushes [`SessionEvent`]s to subscribers.
//!
//! ## Example
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use ludo_engine::board::{Color, PlayerId};
//! use ludo_engine::session::{SessionConfig, SessionManager};
//!
//! # async fn demo() -> Result<(), ludo_engine::session::SessionError> {
//! let manager = SessionManager::new(SessionConfig::default())?;
//! let players = BTreeMap::from([
//!     (Color::Red, PlayerId::new("alice")),
//!     (Color::Yellow, PlayerId::new("bob")),
//! ]);
//! let id = manager.create_session(players, 100).await?;
//! let dice = manager.roll(&id, Color::Red).await?;
//! let result = manager.move_pawn(&id, Color::Red, 0).await?;
//! println!("rolled {dice}: {}", result.outcome);
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod config;
pub mod errors;
pub mod manager;
pub mod messages;

pub use actor::{SessionActor, SessionHandle};
pub use config::SessionConfig;
pub use errors::{SessionError, SessionResult};
pub use manager::{SessionManager, SessionMetadata};
pub use messages::{MoveResult, SessionEvent, SessionMessage};
