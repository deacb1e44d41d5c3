// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the backend server components:
//! - Application state management
//! - HTTP/WebSocket routing and the queue admission API
//! - Matchmaking (wait queues, match formation)
//! - Match registry (records, lifecycle, persistence)
//! - Live game sessions (connections, broadcast, tick loop)

pub mod admission;
pub mod anti_spam;
pub mod game_session;
pub mod matchmaking;
pub mod registry;
pub mod router;
pub mod state;
pub mod ws_error;
