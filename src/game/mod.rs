//! Game rules module.
//!
//! This module holds the engine capability, the game catalog and the two
//! rule sets: turn-based tic-tac-toe and the tick-based snake arena.

pub mod catalog;
pub mod engine;
pub mod snake;
pub mod tictactoe;
pub mod types;

pub use catalog::{GameCatalog, GameInfo};
pub use engine::{Engine, GameRules, GameSnapshot};
