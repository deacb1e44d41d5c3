/// Matchmaking configuration constants.
///
/// This module defines parameters for the wait queues and the polling matchmaker.
pub const MATCHMAKING_INTERVAL_MS: u64 = 1000; // Delay between two queue polls (in milliseconds).

/// Game id of the turn-based board game.
pub const TICTACTOE_ID: &str = "tic-tac-toe";

/// Game id of the tick-based snake arena.
pub const SNAKE_ID: &str = "snake";

/// Number of participants required to form a snake match.
pub const SNAKE_PLAYERS: usize = 2;
