//! Pawn choice for self-played matches.

use ludo_engine::{BoardTopology, Color, SessionSnapshot};
use rand::Rng;

/// Pick the pawn `color` should move with `dice`.
///
/// Preference: a move that captures, then one that leaves base, then one
/// that lands on a safe step, otherwise any pawn at random. Returns `None`
/// when `color` has no pawns in the snapshot.
pub fn choose_pawn<R>(
    snapshot: &SessionSnapshot,
    color: Color,
    dice: u8,
    topology: &BoardTopology,
    rng: &mut R,
) -> Option<usize>
where
    R: Rng + ?Sized,
{
    let pawns = snapshot.positions.get(&color)?;
    if pawns.is_empty() {
        return None;
    }

    let landings: Vec<(usize, usize)> = pawns
        .iter()
        .enumerate()
        .filter_map(|(slot, &from)| {
            topology
                .destination(color, from, dice)
                .ok()
                .map(|to| (slot, to))
        })
        .collect();

    let captures = |to: usize| {
        !topology.is_safe(to)
            && snapshot
                .positions
                .iter()
                .filter(|&(&other, _)| other != color)
                .flat_map(|(_, pawns)| pawns)
                .any(|p| p.step().is_some_and(|s| topology.normalize(s) == to))
    };

    if let Some(&(slot, _)) = landings.iter().find(|&&(_, to)| captures(to)) {
        return Some(slot);
    }
    if let Some(slot) = pawns.iter().position(|p| p.is_base()) {
        return Some(slot);
    }
    if let Some(&(slot, _)) = landings.iter().find(|&&(_, to)| topology.is_safe(to)) {
        return Some(slot);
    }

    Some(rng.random_range(0..pawns.len()))
}
