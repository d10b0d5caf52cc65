//! Board layout: colors, grid cells, pawn positions and the track topology.

mod entities;
mod topology;

pub use entities::{Cell, Color, PawnPosition, PlayerId};
pub use topology::BoardTopology;
