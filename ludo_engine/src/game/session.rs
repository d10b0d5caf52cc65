//! Game session state machine.
//!
//! A session moves between two sub-states inside the current turn:
//!
//! - **NoRoll**: the player whose turn it is may roll.
//! - **AwaitingMove**: a die value is pending; the same player must pick a pawn.
//!
//! Every operation validates fully before touching state, so a rejected
//! call leaves the session exactly as it was.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use super::{
    constants::{BONUS_ROLL, CAPTURE_PENALTY, DEFAULT_TIME_LIMIT_SECS, ENTRY_POINTS, PAWNS_PER_COLOR},
    dice::{DiceRoller, SystemDice, is_valid_face},
    entities::{
        CapturedPawn, Chips, MoveOutcome, SessionId, SessionSnapshot, SessionStatus, TurnPhase,
    },
    errors::{GameError, GameResult},
};
use crate::board::{BoardTopology, Color, PawnPosition, PlayerId};

const BPS_DENOMINATOR: i128 = 10_000;

/// Per-match settings that are fixed at creation.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameSettings {
    pub time_limit_secs: u32,
    /// House cut of the pot, in basis points.
    pub rake_bps: u16,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_LIMIT_SECS, 0)
    }
}

impl GameSettings {
    #[must_use]
    pub const fn new(time_limit_secs: u32, rake_bps: u16) -> Self {
        Self {
            time_limit_secs,
            rake_bps,
        }
    }

    /// Prize paid out of the pot once the house takes its cut.
    #[must_use]
    pub fn prize_for(&self, bet_amount: Chips, player_count: usize) -> Chips {
        let pot = i128::from(bet_amount) * player_count as i128;
        let rake = pot * i128::from(self.rake_bps) / BPS_DENOMINATOR;
        Chips::try_from(pot - rake).unwrap_or(Chips::MAX)
    }
}

/// One match's mutable state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GameSession {
    id: SessionId,
    /// Keyed by color, so iteration order is play order.
    players: BTreeMap<Color, PlayerId>,
    turn: Color,
    dice: u8,
    awaiting_move: bool,
    /// Steps are stored wrapped onto the lap.
    positions: BTreeMap<Color, [PawnPosition; PAWNS_PER_COLOR]>,
    scores: BTreeMap<Color, u32>,
    time_left_secs: u32,
    bet_amount: Chips,
    prize_amount: Chips,
    status: SessionStatus,
    created_at: DateTime<Utc>,
}

impl GameSession {
    /// Create a match with default settings.
    pub fn new(players: BTreeMap<Color, PlayerId>, bet_amount: Chips) -> GameResult<Self> {
        Self::with_settings(players, bet_amount, &GameSettings::default())
    }

    pub fn with_settings(
        players: BTreeMap<Color, PlayerId>,
        bet_amount: Chips,
        settings: &GameSettings,
    ) -> GameResult<Self> {
        if players.len() != 2 && players.len() != 4 {
            return Err(GameError::InvalidPlayerCount(players.len()));
        }
        if bet_amount < 0 {
            return Err(GameError::NegativeBet(bet_amount));
        }

        let turn = *players
            .keys()
            .next()
            .ok_or(GameError::InvalidPlayerCount(0))?;
        let positions = players
            .keys()
            .map(|&color| (color, [PawnPosition::Base; PAWNS_PER_COLOR]))
            .collect();
        let scores = players.keys().map(|&color| (color, 0)).collect();
        let prize_amount = settings.prize_for(bet_amount, players.len());

        let session = Self {
            id: Uuid::new_v4().to_string(),
            players,
            turn,
            dice: 0,
            awaiting_move: false,
            positions,
            scores,
            time_left_secs: settings.time_limit_secs,
            bet_amount,
            prize_amount,
            status: SessionStatus::Playing,
            created_at: Utc::now(),
        };

        log::info!(
            "Session {} created: {} players, bet {}, prize {}",
            session.id,
            session.players.len(),
            session.bet_amount,
            session.prize_amount
        );

        Ok(session)
    }

    /// Standard two-player match: the first id plays red, the second yellow.
    pub fn two_player(
        red: impl Into<PlayerId>,
        yellow: impl Into<PlayerId>,
        bet_amount: Chips,
    ) -> GameResult<Self> {
        let players = BTreeMap::from([(Color::Red, red.into()), (Color::Yellow, yellow.into())]);
        Self::new(players, bet_amount)
    }

    /// Rebuild a session from a persisted snapshot.
    ///
    /// # Errors
    ///
    /// `InvalidSnapshot` when the snapshot breaks any session invariant or
    /// uses a color `topology` does not know.
    pub fn from_snapshot(snapshot: SessionSnapshot, topology: &BoardTopology) -> GameResult<Self> {
        let invalid = |reason: String| -> GameResult<Self> { Err(GameError::InvalidSnapshot(reason)) };

        let count = snapshot.players.len();
        if count != 2 && count != 4 {
            return invalid(format!("{count} players"));
        }
        if let Some(color) = snapshot.players.keys().find(|&&c| !topology.supports(c)) {
            return invalid(format!("{color} is not on this board"));
        }
        if !snapshot.players.contains_key(&snapshot.turn) {
            return invalid(format!("turn belongs to absent color {}", snapshot.turn));
        }
        if snapshot.awaiting_move != is_valid_face(snapshot.dice)
            || (!snapshot.awaiting_move && snapshot.dice != 0)
        {
            return invalid(format!(
                "dice {} with awaiting_move {}",
                snapshot.dice, snapshot.awaiting_move
            ));
        }
        if snapshot.status.is_terminal() && snapshot.awaiting_move {
            return invalid(format!(
                "{} session still holds dice {}",
                snapshot.status, snapshot.dice
            ));
        }
        if snapshot.bet_amount < 0 || snapshot.prize_amount < 0 {
            return invalid("negative amount".to_string());
        }

        let mut positions = BTreeMap::new();
        for &color in snapshot.players.keys() {
            let Some(pawns) = snapshot.positions.get(&color) else {
                return invalid(format!("no positions for {color}"));
            };
            let Ok(pawns) = <[PawnPosition; PAWNS_PER_COLOR]>::try_from(pawns.as_slice()) else {
                return invalid(format!("{color} has {} pawns", pawns.len()));
            };
            if let Some(step) = pawns
                .iter()
                .filter_map(|p| p.step())
                .find(|&s| s >= topology.path_len())
            {
                return invalid(format!("{color} pawn at step {step} off the path"));
            }
            positions.insert(color, pawns);
        }
        if snapshot.positions.len() != count {
            return invalid("positions for colors not in play".to_string());
        }

        if snapshot.scores.len() != count
            || snapshot.players.keys().any(|c| !snapshot.scores.contains_key(c))
        {
            return invalid("scores do not match players".to_string());
        }

        Ok(Self {
            id: snapshot.id,
            players: snapshot.players,
            turn: snapshot.turn,
            dice: snapshot.dice,
            awaiting_move: snapshot.awaiting_move,
            positions,
            scores: snapshot.scores,
            time_left_secs: snapshot.time_left_secs,
            bet_amount: snapshot.bet_amount,
            prize_amount: snapshot.prize_amount,
            status: snapshot.status,
            created_at: snapshot.created_at,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn players(&self) -> &BTreeMap<Color, PlayerId> {
        &self.players
    }

    pub fn player(&self, color: Color) -> Option<&PlayerId> {
        self.players.get(&color)
    }

    /// Colors in play, in play order.
    pub fn play_order(&self) -> impl Iterator<Item = Color> + '_ {
        self.players.keys().copied()
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Current die value, `0` when nobody has rolled this turn.
    pub fn dice(&self) -> u8 {
        self.dice
    }

    pub fn awaiting_move(&self) -> bool {
        self.awaiting_move
    }

    pub fn phase(&self) -> TurnPhase {
        if self.awaiting_move {
            TurnPhase::AwaitingMove
        } else {
            TurnPhase::NoRoll
        }
    }

    pub fn position(&self, color: Color, slot: usize) -> GameResult<PawnPosition> {
        let pawns = self
            .positions
            .get(&color)
            .ok_or(GameError::UnknownColor(color))?;
        pawns.get(slot).copied().ok_or(GameError::InvalidPawnSlot {
            slot,
            max: PAWNS_PER_COLOR,
        })
    }

    pub fn score(&self, color: Color) -> Option<u32> {
        self.scores.get(&color).copied()
    }

    pub fn time_left_secs(&self) -> u32 {
        self.time_left_secs
    }

    pub fn bet_amount(&self) -> Chips {
        self.bet_amount
    }

    pub fn prize_amount(&self) -> Chips {
        self.prize_amount
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Highest score; ties go to the color earliest in play order.
    pub fn leader(&self) -> Color {
        self.scores
            .iter()
            .fold(None, |best: Option<(Color, u32)>, (&color, &score)| match best {
                Some((_, top)) if top >= score => best,
                _ => Some((color, score)),
            })
            .map_or(self.turn, |(color, _)| color)
    }

    /// Throw the die for `color` using the server RNG.
    pub fn roll(&mut self, color: Color) -> GameResult<u8> {
        self.roll_with(color, &mut SystemDice)
    }

    /// Throw the die for `color` with the given source.
    ///
    /// # Errors
    ///
    /// `IllegalAction` class errors when the session is over, it is not
    /// `color`'s turn, a move is already pending, or the roller produced a
    /// value outside `1..=6`. `UnknownColor` when `color` is not playing.
    pub fn roll_with<R>(&mut self, color: Color, roller: &mut R) -> GameResult<u8>
    where
        R: DiceRoller + ?Sized,
    {
        self.ensure_turn(color)?;
        if self.awaiting_move {
            return Err(GameError::AlreadyRolled);
        }

        let value = roller.roll_die();
        if !is_valid_face(value) {
            log::warn!("Session {}: dice source produced {}", self.id, value);
            return Err(GameError::InvalidDiceValue(value));
        }

        self.dice = value;
        self.awaiting_move = true;
        log::debug!("Session {}: {} rolled {}", self.id, color, value);

        Ok(value)
    }

    /// Move pawn `slot` of `color` by the pending die value.
    ///
    /// Resolution order: destination (entry step when leaving base), score,
    /// captures on non-safe steps, capture penalty, turn retention on a six
    /// or a capture, then the die is cleared.
    ///
    /// # Errors
    ///
    /// `IllegalAction` class errors when the session is over, it is not
    /// `color`'s turn or nothing was rolled. `InvalidArgument` class errors
    /// for an unknown color or an out-of-range slot.
    pub fn apply_move(
        &mut self,
        color: Color,
        slot: usize,
        topology: &BoardTopology,
    ) -> GameResult<MoveOutcome> {
        self.ensure_turn(color)?;
        if !self.awaiting_move {
            return Err(GameError::NotRolled);
        }
        if !is_valid_face(self.dice) {
            return Err(GameError::InvalidDiceValue(self.dice));
        }

        let dice = self.dice;
        let from = self.position(color, slot)?;
        let to = topology.destination(color, from, dice)?;
        let points = if from.is_base() {
            ENTRY_POINTS
        } else {
            u32::from(dice)
        };

        let mut captures = Vec::new();
        if !topology.is_safe(to) {
            for (&other, pawns) in self.positions.iter().filter(|&(&c, _)| c != color) {
                for (i, pawn) in pawns.iter().enumerate() {
                    if let Some(step) = pawn.step()
                        && topology.normalize(step) == to
                    {
                        captures.push(CapturedPawn {
                            color: other,
                            slot: i,
                            step,
                        });
                    }
                }
            }
        }
        let penalized: Vec<Color> = captures
            .iter()
            .map(|c| c.color)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        // Validation is done; nothing below can fail.
        if let Some(pawns) = self.positions.get_mut(&color) {
            pawns[slot] = PawnPosition::Step(to);
        }
        if let Some(score) = self.scores.get_mut(&color) {
            *score = score.saturating_add(points);
        }
        for capture in &captures {
            if let Some(pawns) = self.positions.get_mut(&capture.color) {
                pawns[capture.slot] = PawnPosition::Base;
            }
        }
        for victim in &penalized {
            if let Some(score) = self.scores.get_mut(victim) {
                *score = score.saturating_sub(CAPTURE_PENALTY);
            }
        }

        let extra_turn = dice == BONUS_ROLL || !captures.is_empty();
        if !extra_turn {
            self.turn = self.next_color(color);
        }
        self.dice = 0;
        self.awaiting_move = false;

        let outcome = MoveOutcome {
            color,
            slot,
            dice,
            from,
            to,
            points,
            captures,
            penalized,
            extra_turn,
            next_turn: self.turn,
        };

        if outcome.captured() {
            log::info!("Session {}: {}", self.id, outcome);
        } else {
            log::debug!("Session {}: {}", self.id, outcome);
        }

        Ok(outcome)
    }

    /// Run the match clock down by `secs`. Returns true once it reads zero.
    ///
    /// The status is left alone; whoever drives the clock decides what an
    /// expired match means.
    pub fn advance_clock(&mut self, secs: u32) -> bool {
        self.time_left_secs = self.time_left_secs.saturating_sub(secs);
        self.time_left_secs == 0
    }

    /// Close the match as `Finished` or `Abandoned`.
    pub fn end(&mut self, status: SessionStatus) -> GameResult<()> {
        if !status.is_terminal() {
            return Err(GameError::InvalidTransition);
        }
        if self.status.is_terminal() {
            return Err(GameError::SessionNotPlaying);
        }

        self.status = status;
        self.dice = 0;
        self.awaiting_move = false;
        log::info!("Session {} {}", self.id, status);

        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            players: self.players.clone(),
            turn: self.turn,
            dice: self.dice,
            awaiting_move: self.awaiting_move,
            positions: self
                .positions
                .iter()
                .map(|(&color, pawns)| (color, pawns.to_vec()))
                .collect(),
            scores: self.scores.clone(),
            time_left_secs: self.time_left_secs,
            bet_amount: self.bet_amount,
            prize_amount: self.prize_amount,
            status: self.status,
            created_at: self.created_at,
        }
    }

    fn ensure_turn(&self, color: Color) -> GameResult<()> {
        if self.status.is_terminal() {
            return Err(GameError::SessionNotPlaying);
        }
        if !self.players.contains_key(&color) {
            return Err(GameError::UnknownColor(color));
        }
        if color != self.turn {
            return Err(GameError::NotYourTurn {
                expected: self.turn,
                got: color,
            });
        }
        Ok(())
    }

    fn next_color(&self, color: Color) -> Color {
        self.players
            .range(color..)
            .map(|(&c, _)| c)
            .find(|&c| c != color)
            .or_else(|| self.players.keys().next().copied())
            .unwrap_or(color)
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, color: Color, slot: usize, position: PawnPosition) {
        if let Some(pawns) = self.positions.get_mut(&color) {
            pawns[slot] = position;
        }
    }

    #[cfg(test)]
    pub(crate) fn set_score(&mut self, color: Color, score: u32) {
        self.scores.insert(color, score);
    }
}
