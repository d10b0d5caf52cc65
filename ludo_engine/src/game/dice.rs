//! Die source.
//!
//! The die is always thrown server side. Callers choose the *source* of
//! randomness, never the value.

use rand::Rng;

use super::constants::DIE_FACES;

/// Something that throws a single six-sided die.
pub trait DiceRoller {
    fn roll_die(&mut self) -> u8;
}

/// Thread-local CSPRNG backed die. This is the only roller production
/// code should use.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemDice;

impl DiceRoller for SystemDice {
    fn roll_die(&mut self) -> u8 {
        rand::rng().random_range(1..=DIE_FACES)
    }
}

impl<R: DiceRoller + ?Sized> DiceRoller for Box<R> {
    fn roll_die(&mut self) -> u8 {
        (**self).roll_die()
    }
}

#[must_use]
pub fn is_valid_face(value: u8) -> bool {
    (1..=DIE_FACES).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_dice_range() {
        let mut dice = SystemDice;
        let mut seen = [false; 6];
        for _ in 0..1000 {
            let value = dice.roll_die();
            assert!(is_valid_face(value));
            seen[usize::from(value - 1)] = true;
        }
        // 1000 throws miss a face with probability ~6 * (5/6)^1000.
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_valid_faces() {
        assert!(!is_valid_face(0));
        assert!(is_valid_face(1));
        assert!(is_valid_face(6));
        assert!(!is_valid_face(7));
    }
}
