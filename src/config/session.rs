/// Live session configuration constants.
///
/// Heartbeat and timeout values for match WebSocket connections, in seconds.
pub const HEARTBEAT_INTERVAL: u64 = 30; // Protocol ping period.

/// Time without any heartbeat before a connection is dropped.
pub const CLIENT_TIMEOUT: u64 = 60;

/// Time a running match may spend with nobody connected before it is
/// ended as abandoned.
pub const ABANDON_TIMEOUT: u64 = 60;

/// Upper bound on the period of the per-match sweep that evicts stale connections.
pub const SWEEP_INTERVAL: u64 = 15;

/// Maximum accepted length of a chat message, in characters.
pub const CHAT_MAX_LEN: usize = 500;
