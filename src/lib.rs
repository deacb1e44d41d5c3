//! Backend for small multiplayer games.
//!
//! Players join per-game wait queues over HTTP, the matchmaker turns the
//! oldest waiting players into matches, and each match is played over a
//! WebSocket session that relays moves, chat and state snapshots.

pub mod config;
pub mod error;
pub mod game;
pub mod server;
