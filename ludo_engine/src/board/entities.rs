use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::{
    constants::MAX_PLAYER_ID_LENGTH,
    errors::{GameError, GameResult},
};

/// Pawn colors. Declaration order is the clockwise play order.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    pub const ALL: [Self; 4] = [Self::Red, Self::Green, Self::Yellow, Self::Blue];

    /// Colors seated in a two-player match. They sit opposite each other.
    pub const TWO_PLAYER: [Self; 2] = [Self::Red, Self::Yellow];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Yellow => 2,
            Self::Blue => 3,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
        };
        write!(f, "{repr}")
    }
}

impl std::str::FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "red" => Ok(Self::Red),
            "green" => Ok(Self::Green),
            "yellow" => Ok(Self::Yellow),
            "blue" => Ok(Self::Blue),
            other => Err(format!("unknown color '{other}'")),
        }
    }
}

/// Identifier of the person controlling a color, as issued by the chat
/// or account layer.
///
/// Whitespace is trimmed at the ends and replaced by `_` inside. Ids
/// arriving from outside (deserialised snapshots, [`PlayerId::try_new`])
/// are rejected when longer than [`MAX_PLAYER_ID_LENGTH`] characters.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerId(String);

impl PlayerId {
    /// Normalise `s`, keeping at most [`MAX_PLAYER_ID_LENGTH`] characters.
    pub fn new(s: &str) -> Self {
        Self(Self::normalize(s).take(MAX_PLAYER_ID_LENGTH).collect())
    }

    /// Normalise `s`, rejecting it when it is too long.
    ///
    /// # Errors
    ///
    /// `InvalidPlayerId` when the normalised id exceeds
    /// [`MAX_PLAYER_ID_LENGTH`] characters.
    pub fn try_new(s: &str) -> GameResult<Self> {
        let len = Self::normalize(s).count();
        if len > MAX_PLAYER_ID_LENGTH {
            return Err(GameError::InvalidPlayerId {
                len,
                max: MAX_PLAYER_ID_LENGTH,
            });
        }
        Ok(Self(Self::normalize(s).collect()))
    }

    fn normalize(s: &str) -> impl Iterator<Item = char> + '_ {
        s.trim()
            .chars()
            .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlayerId {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(&value)
    }
}

impl From<PlayerId> for String {
    fn from(value: PlayerId) -> Self {
        value.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A square on the 15x15 board grid. `x` is the column, `y` the row.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Cell {
    pub x: u8,
    pub y: u8,
}

impl Cell {
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Where a pawn is.
///
/// On the wire (snapshots, renderer input) a position is a plain integer:
/// `-1` for base, otherwise the step on the shared path.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum PawnPosition {
    #[default]
    Base,
    Step(usize),
}

impl PawnPosition {
    pub const BASE_RAW: i32 = -1;

    #[must_use]
    pub fn is_base(self) -> bool {
        matches!(self, Self::Base)
    }

    #[must_use]
    pub fn step(self) -> Option<usize> {
        match self {
            Self::Base => None,
            Self::Step(step) => Some(step),
        }
    }

    #[must_use]
    pub fn to_raw(self) -> i32 {
        match self {
            Self::Base => Self::BASE_RAW,
            Self::Step(step) => i32::try_from(step).unwrap_or(i32::MAX),
        }
    }

    /// Parse the integer form. Anything below `-1` has no meaning.
    #[must_use]
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            Self::BASE_RAW => Some(Self::Base),
            r if r >= 0 => usize::try_from(r).ok().map(Self::Step),
            _ => None,
        }
    }
}

impl From<PawnPosition> for i32 {
    fn from(value: PawnPosition) -> Self {
        value.to_raw()
    }
}

impl TryFrom<i32> for PawnPosition {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::from_raw(value).ok_or_else(|| format!("invalid pawn position {value}"))
    }
}

impl fmt::Display for PawnPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "base"),
            Self::Step(step) => write!(f, "step {step}"),
        }
    }
}
