//! Session actor message types.

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::board::Color;
use crate::game::{GameResult, MoveOutcome, SessionSnapshot, SessionStatus};

/// Messages that can be sent to a SessionActor
#[derive(Debug)]
pub enum SessionMessage {
    /// Throw the die for `color`
    Roll {
        color: Color,
        response: oneshot::Sender<GameResult<u8>>,
    },

    /// Move a pawn by the pending die value
    Move {
        color: Color,
        slot: usize,
        response: oneshot::Sender<GameResult<MoveResult>>,
    },

    /// Get an owned copy of the session
    Snapshot {
        response: oneshot::Sender<SessionSnapshot>,
    },

    /// End the match as finished or abandoned
    End {
        status: SessionStatus,
        response: oneshot::Sender<GameResult<SessionSnapshot>>,
    },

    /// Internal: advance the match clock (called by timer)
    Tick { elapsed_secs: u32 },

    /// Subscribe to session events
    Subscribe {
        subscriber_id: u64,
        sender: mpsc::Sender<SessionEvent>,
    },

    /// Unsubscribe from session events
    Unsubscribe { subscriber_id: u64 },

    /// Stop the actor
    Close { response: oneshot::Sender<()> },
}

/// Reply to a successful move
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveResult {
    pub outcome: MoveOutcome,
    pub snapshot: SessionSnapshot,
}

/// Event broadcast to subscribers after state changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    DiceRolled { color: Color, value: u8 },
    PawnMoved(MoveOutcome),
    SessionEnded(SessionSnapshot),
}
