//! Fixed game constants.

pub const BOARD_SIZE: u8 = 5;
pub const CELL_COUNT: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);

pub const INITIAL_BLACK_TILES: u8 = 3;
pub const INITIAL_GRAY_TILES: u8 = 1;

/// The number of snapshots kept for the network input, including the current position.
pub const HISTORY_SIZE: usize = 8;
/// Normalizer for the move counter plane of the network input.
pub const MAX_STEPS: u32 = 200;

/// Positions are only counted for repetition from this move on.
pub const REPETITION_START_MOVE: u32 = 50;
/// The number of occurrences of the same position that ends the game in a draw.
pub const REPETITION_LIMIT: u32 = 5;

/// `1` for no placement, then one entry per cell for black and one per cell for gray.
pub const TILE_CHOICES: usize = 1 + 2 * CELL_COUNT;
pub const MOVE_CHOICES: usize = CELL_COUNT * CELL_COUNT;
pub const ACTION_COUNT: usize = MOVE_CHOICES * TILE_CHOICES;
