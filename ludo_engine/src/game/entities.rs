use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

use crate::board::{Color, PawnPosition, PlayerId};

/// Money in minor units (cents). Bets of `0.5` are stored as `50`.
pub type Chips = i64;

/// Unique per match. Generated as a UUID v4 string.
pub type SessionId = String;

/// Lifecycle of a match. Only collaborators (timers, admins) move a
/// session out of `Playing`.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Playing,
    Finished,
    Abandoned,
}

impl SessionStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Playing)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Playing => "playing",
            Self::Finished => "finished",
            Self::Abandoned => "abandoned",
        };
        write!(f, "{repr}")
    }
}

/// Sub-state of the current turn.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    NoRoll,
    AwaitingMove,
}

/// Owned copy of a session. This is what gets persisted, rendered or sent
/// to chat; the live session never leaves its owner.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub players: BTreeMap<Color, PlayerId>,
    pub turn: Color,
    /// `0` until the current player rolls.
    pub dice: u8,
    pub awaiting_move: bool,
    /// Serialised as integers: `-1` for base, otherwise the path step.
    pub positions: BTreeMap<Color, Vec<PawnPosition>>,
    pub scores: BTreeMap<Color, u32>,
    pub time_left_secs: u32,
    pub bet_amount: Chips,
    pub prize_amount: Chips,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn position(&self, color: Color, slot: usize) -> Option<PawnPosition> {
        self.positions.get(&color)?.get(slot).copied()
    }

    pub fn score(&self, color: Color) -> Option<u32> {
        self.scores.get(&color).copied()
    }
}

/// A pawn sent back to base by a move.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CapturedPawn {
    pub color: Color,
    pub slot: usize,
    pub step: usize,
}

/// Everything a single move did.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MoveOutcome {
    pub color: Color,
    pub slot: usize,
    pub dice: u8,
    pub from: PawnPosition,
    pub to: usize,
    pub points: u32,
    pub captures: Vec<CapturedPawn>,
    /// Colors that lost points to the capture penalty.
    pub penalized: Vec<Color>,
    pub extra_turn: bool,
    pub next_turn: Color,
}

impl MoveOutcome {
    #[must_use]
    pub fn captured(&self) -> bool {
        !self.captures.is_empty()
    }
}

impl fmt::Display for MoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pawn {} rolled {}: {} -> step {} (+{})",
            self.color, self.slot, self.dice, self.from, self.to, self.points
        )?;
        for capture in &self.captures {
            write!(f, ", captured {} pawn {}", capture.color, capture.slot)?;
        }
        if self.extra_turn {
            write!(f, ", rolls again")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameSession;

    #[test]
    fn test_snapshot_wire_format() {
        let mut snapshot = GameSession::two_player("alice", "bob", 50).unwrap().snapshot();
        let mut red = vec![PawnPosition::Base; 4];
        red[0] = PawnPosition::Step(13);
        snapshot.positions.insert(Color::Red, red);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["positions"]["red"], serde_json::json!([13, -1, -1, -1]));
        assert_eq!(json["players"]["yellow"], "bob");
        assert_eq!(json["status"], "playing");
        assert_eq!(json["prize_amount"], 100);

        let parsed: SessionSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_rejects_garbage_positions() {
        let snapshot = GameSession::two_player("alice", "bob", 0).unwrap().snapshot();
        let mut json = serde_json::to_value(&snapshot).unwrap();
        json["positions"]["red"] = serde_json::json!([-3, -1, -1, -1]);
        assert!(serde_json::from_value::<SessionSnapshot>(json).is_err());
    }

    #[test]
    fn test_move_outcome_display() {
        let outcome = MoveOutcome {
            color: Color::Red,
            slot: 0,
            dice: 4,
            from: PawnPosition::Step(6),
            to: 10,
            points: 4,
            captures: vec![CapturedPawn {
                color: Color::Yellow,
                slot: 2,
                step: 10,
            }],
            penalized: vec![Color::Yellow],
            extra_turn: true,
            next_turn: Color::Red,
        };
        assert_eq!(
            outcome.to_string(),
            "red pawn 0 rolled 4: step 6 -> step 10 (+4), captured yellow pawn 2, rolls again"
        );
    }
}
