/// Game configuration constants.
///
/// This module defines the gameplay parameters of the snake arena such as the
/// tick period, board dimensions and consumable targets.
pub const TICK_INTERVAL_MS: u64 = 200; // Duration of one simulation tick in milliseconds.

/// Number of columns of the snake arena.
pub const ARENA_WIDTH: i32 = 30;

/// Number of rows of the snake arena.
pub const ARENA_HEIGHT: i32 = 20;

/// Score granted by one food pickup.
pub const FOOD_VALUE: u32 = 10;

/// Number of food items kept on the board.
pub const FOOD_TARGET: usize = 3;

/// Number of poison items kept on the board.
pub const POISON_TARGET: usize = 1;

/// Body segments trailing the head when a snake spawns.
pub const START_BODY_LEN: usize = 2;
