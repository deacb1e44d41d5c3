/// Live match sessions: connection registry, per-match session actors and
/// the player WebSocket endpoint.

pub mod messages;
pub mod registry;
pub mod server;
pub mod session;

pub use server::{MatchHub, MatchSession, SessionTimings};
