/// Pawns each color races with.
pub const PAWNS_PER_COLOR: usize = 4;

/// Steps in one lap of the standard board.
pub const STANDARD_PATH_LEN: usize = 52;

pub const DIE_FACES: u8 = 6;

/// Rolling this keeps the turn with the roller.
pub const BONUS_ROLL: u8 = 6;

/// Points for bringing a pawn out of base.
pub const ENTRY_POINTS: u32 = 1;

/// Points taken from a color that loses pawns to a capture.
pub const CAPTURE_PENALTY: u32 = 5;

pub const MAX_PLAYER_ID_LENGTH: usize = 64;

/// Default match clock.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 900;
