//! Coordinate mapping for board renderers.
//!
//! Renderers draw from a [`SessionSnapshot`] and never see the live
//! session. This module turns logical pawn positions into grid cells and
//! pixel coordinates; drawing and image encoding stay with the renderer.

use serde::{Deserialize, Serialize};

use crate::board::{BoardTopology, Cell, Color, PawnPosition};
use crate::game::SessionSnapshot;

/// Board centre. Pawns whose position can't be resolved are drawn here.
pub const FALLBACK_CELL: Cell = Cell::new(7, 7);

/// Pixel point on the board image.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Pixel {
    pub x: i32,
    pub y: i32,
}

/// Calibration of the board image.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RenderConfig {
    /// Edge of one grid square in pixels
    pub cell_size_px: u32,

    /// Pixel position of grid cell (0, 0)
    pub origin_px: Pixel,

    /// Token radius as a fraction of the cell size
    pub token_radius_fraction: f32,

    /// Shift per pawn slot so stacked tokens stay visible
    pub per_pawn_pixel_offset: i32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cell_size_px: 66,
            origin_px: Pixel { x: 50, y: 50 },
            token_radius_fraction: 0.3,
            per_pawn_pixel_offset: 5,
        }
    }
}

impl RenderConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.cell_size_px == 0 {
            return Err("Cell size must be greater than 0".to_string());
        }

        if !(self.token_radius_fraction > 0.0 && self.token_radius_fraction <= 0.5) {
            return Err("Token radius fraction must be in (0, 0.5]".to_string());
        }

        Ok(())
    }

    pub fn token_radius_px(&self) -> i32 {
        // Truncation matches the calibration images.
        (self.cell_size_px as f32 * self.token_radius_fraction) as i32
    }
}

/// One pawn as the renderer should draw it.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TokenPlacement {
    pub color: Color,
    pub slot: usize,
    pub cell: Cell,
    /// Centre after the per-slot offset.
    pub center: Pixel,
    pub radius: i32,
    pub fill: (u8, u8, u8),
}

/// Fill color for a pawn.
pub fn token_color(color: Color) -> (u8, u8, u8) {
    match color {
        Color::Red => (255, 0, 0),
        Color::Green => (0, 255, 0),
        Color::Yellow => (255, 215, 0),
        Color::Blue => (0, 0, 255),
    }
}

pub fn grid_to_pixel(cell: Cell, cell_size_px: u32, origin_px: Pixel) -> Pixel {
    let size = i32::try_from(cell_size_px).unwrap_or(i32::MAX);
    Pixel {
        x: origin_px.x.saturating_add(i32::from(cell.x).saturating_mul(size)),
        y: origin_px.y.saturating_add(i32::from(cell.y).saturating_mul(size)),
    }
}

/// Resolve the raw position of a pawn to a grid cell.
///
/// `-1` maps to the pawn's home cell, a path step to its track cell.
/// Anything unresolvable (negative garbage, a color or slot the board
/// doesn't know) falls back to [`FALLBACK_CELL`]; this never fails.
pub fn logical_to_cell(color: Color, slot: usize, position: i32, topology: &BoardTopology) -> Cell {
    match PawnPosition::from_raw(position) {
        Some(PawnPosition::Base) => topology.home_cell(color, slot).unwrap_or(FALLBACK_CELL),
        Some(PawnPosition::Step(step)) if topology.supports(color) => topology.cell_for(step),
        _ => FALLBACK_CELL,
    }
}

/// Placement of every pawn in `snapshot`.
pub fn token_placements(
    snapshot: &SessionSnapshot,
    topology: &BoardTopology,
    config: &RenderConfig,
) -> Vec<TokenPlacement> {
    let radius = config.token_radius_px();
    let mut placements = Vec::new();

    for (&color, pawns) in &snapshot.positions {
        for (slot, position) in pawns.iter().enumerate() {
            let cell = logical_to_cell(color, slot, position.to_raw(), topology);
            let base = grid_to_pixel(cell, config.cell_size_px, config.origin_px);
            let offset = i32::try_from(slot)
                .unwrap_or(0)
                .saturating_mul(config.per_pawn_pixel_offset);

            placements.push(TokenPlacement {
                color,
                slot,
                cell,
                center: Pixel {
                    x: base.x.saturating_add(offset),
                    y: base.y.saturating_add(offset),
                },
                radius,
                fill: token_color(color),
            });
        }
    }

    placements
}
