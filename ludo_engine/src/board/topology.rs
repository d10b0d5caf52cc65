//! Static description of the race track.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use super::entities::{Cell, Color, PawnPosition};
use crate::game::{
    constants::{PAWNS_PER_COLOR, STANDARD_PATH_LEN},
    errors::{GameError, GameResult},
};

static STANDARD: LazyLock<BoardTopology> = LazyLock::new(BoardTopology::build_standard);

/// Immutable board layout: the circular path, safe steps, entry offsets
/// and home cells. Sessions only ever borrow it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardTopology {
    path: Vec<Cell>,
    safe_steps: BTreeSet<usize>,
    entry_offsets: HashMap<Color, usize>,
    home_cells: HashMap<Color, [Cell; PAWNS_PER_COLOR]>,
}

impl BoardTopology {
    /// Build a topology, checking that every entry offset and safe step
    /// lies on the path and that every color has a home for each pawn.
    pub fn new(
        path: Vec<Cell>,
        safe_steps: impl IntoIterator<Item = usize>,
        entry_offsets: HashMap<Color, usize>,
        home_cells: HashMap<Color, Vec<Cell>>,
    ) -> GameResult<Self> {
        let len = path.len();
        if len == 0 {
            return Err(GameError::InvalidBoard("path is empty".to_string()));
        }

        let safe_steps: BTreeSet<usize> = safe_steps.into_iter().collect();
        if let Some(step) = safe_steps.iter().find(|&&s| s >= len) {
            return Err(GameError::InvalidBoard(format!(
                "safe step {step} outside path of length {len}"
            )));
        }

        for (color, &offset) in &entry_offsets {
            if offset >= len {
                return Err(GameError::InvalidBoard(format!(
                    "entry offset {offset} for {color} outside path of length {len}"
                )));
            }
        }

        let mut homes = HashMap::with_capacity(home_cells.len());
        for (color, cells) in home_cells {
            if !entry_offsets.contains_key(&color) {
                return Err(GameError::InvalidBoard(format!(
                    "{color} has home cells but no entry offset"
                )));
            }
            let count = cells.len();
            let cells: [Cell; PAWNS_PER_COLOR] = cells.try_into().map_err(|_| {
                GameError::InvalidBoard(format!(
                    "{color} has {count} home cells, expected {PAWNS_PER_COLOR}"
                ))
            })?;
            homes.insert(color, cells);
        }

        if let Some(color) = entry_offsets.keys().find(|c| !homes.contains_key(c)) {
            return Err(GameError::InvalidBoard(format!(
                "{color} has an entry offset but no home cells"
            )));
        }

        Ok(Self {
            path,
            safe_steps,
            entry_offsets,
            home_cells: homes,
        })
    }

    /// The classic 52-step, four-color board, built once per process.
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    fn build_standard() -> Self {
        let mut path = Vec::with_capacity(STANDARD_PATH_LEN);
        path.extend((1..=5).map(|x| Cell::new(x, 6)));
        path.extend((0..=5).rev().map(|y| Cell::new(6, y)));
        path.push(Cell::new(7, 0));
        path.extend((0..=5).map(|y| Cell::new(8, y)));
        path.extend((9..=14).map(|x| Cell::new(x, 6)));
        path.push(Cell::new(14, 7));
        path.extend((9..=14).rev().map(|x| Cell::new(x, 8)));
        path.extend((9..=14).map(|y| Cell::new(8, y)));
        path.push(Cell::new(7, 14));
        path.extend((9..=14).rev().map(|y| Cell::new(6, y)));
        path.extend((0..=5).rev().map(|x| Cell::new(x, 8)));
        path.push(Cell::new(0, 7));
        path.push(Cell::new(0, 6));

        let entry_offsets = HashMap::from([
            (Color::Red, 0),
            (Color::Green, 13),
            (Color::Yellow, 26),
            (Color::Blue, 39),
        ]);

        // Entry squares plus the star squares eight steps past each entry.
        let safe_steps = [0, 8, 13, 21, 26, 34, 39, 47];

        let yard = |x: u8, y: u8| {
            [
                Cell::new(x, y),
                Cell::new(x, y + 1),
                Cell::new(x + 1, y),
                Cell::new(x + 1, y + 1),
            ]
        };
        let home_cells = HashMap::from([
            (Color::Red, yard(2, 2)),
            (Color::Green, yard(11, 2)),
            (Color::Yellow, yard(11, 11)),
            (Color::Blue, yard(2, 11)),
        ]);

        Self {
            path,
            safe_steps: safe_steps.into_iter().collect(),
            entry_offsets,
            home_cells,
        }
    }

    /// Number of steps in one lap.
    pub fn path_len(&self) -> usize {
        self.path.len()
    }

    /// Wrap a step onto the lap.
    pub fn normalize(&self, step: usize) -> usize {
        step % self.path.len()
    }

    pub fn cell_for(&self, step: usize) -> Cell {
        self.path[self.normalize(step)]
    }

    pub fn is_safe(&self, step: usize) -> bool {
        self.safe_steps.contains(&self.normalize(step))
    }

    pub fn safe_steps(&self) -> impl Iterator<Item = usize> + '_ {
        self.safe_steps.iter().copied()
    }

    /// Whether this board has a yard and entry for `color`.
    pub fn supports(&self, color: Color) -> bool {
        self.entry_offsets.contains_key(&color)
    }

    /// Step a pawn is placed on when it leaves base.
    pub fn entry_step(&self, color: Color) -> GameResult<usize> {
        self.entry_offsets
            .get(&color)
            .copied()
            .ok_or(GameError::UnknownColor(color))
    }

    /// Step a pawn of `color` reaches from `from` with a roll of `dice`.
    ///
    /// A pawn leaving base always lands on its entry step, whatever the
    /// roll. There is no finishing lane: a pawn keeps lapping.
    pub fn destination(&self, color: Color, from: PawnPosition, dice: u8) -> GameResult<usize> {
        let entry = self.entry_step(color)?;
        Ok(match from {
            PawnPosition::Base => entry,
            PawnPosition::Step(step) => self.normalize(step + usize::from(dice)),
        })
    }

    /// Resting cell of pawn `slot` while it sits in base.
    pub fn home_cell(&self, color: Color, slot: usize) -> GameResult<Cell> {
        let cells = self
            .home_cells
            .get(&color)
            .ok_or(GameError::UnknownColor(color))?;
        cells.get(slot).copied().ok_or(GameError::InvalidPawnSlot {
            slot,
            max: PAWNS_PER_COLOR,
        })
    }
}
