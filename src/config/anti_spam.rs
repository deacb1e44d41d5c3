/// Configuration for inbound flood protection on live connections.
/// All values are counts per second or counts.
pub const MAX_FRAMES_PER_SECOND: u32 = 20;
pub const MAX_FLOOD_STRIKES: u32 = 3;
