use std::time::{Duration, Instant};

use log::warn;

use crate::config::anti_spam::{MAX_FLOOD_STRIKES, MAX_FRAMES_PER_SECOND};

/// What to do with an inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloodVerdict {
    Accept,
    /// Drop the frame. `notify` is set for the first dropped frame of a window.
    Drop { notify: bool },
    /// Too many offending windows: close the connection.
    Disconnect,
}

/// Tracks inbound frame rate for a single connection.
pub struct FloodGuard {
    // Start of the current one-second window
    window_start: Instant,
    frames_this_window: u32,
    // Windows in which the limit was exceeded
    strikes: u32,
    max_frames: u32,
    max_strikes: u32,
}

impl FloodGuard {
    pub fn new(now: Instant) -> Self {
        Self::with_limits(now, MAX_FRAMES_PER_SECOND, MAX_FLOOD_STRIKES)
    }

    pub fn with_limits(now: Instant, max_frames: u32, max_strikes: u32) -> Self {
        Self {
            window_start: now,
            frames_this_window: 0,
            strikes: 0,
            max_frames,
            max_strikes,
        }
    }

    /// Call for every incoming text or binary frame.
    pub fn record_frame(&mut self, now: Instant, player: &str) -> FloodVerdict {
        self.tick(now);
        self.frames_this_window += 1;
        if self.frames_this_window <= self.max_frames {
            return FloodVerdict::Accept;
        }
        let first_excess = self.frames_this_window == self.max_frames + 1;
        if first_excess {
            self.strikes += 1;
            warn!(
                "[AntiSpam] Player {} exceeded {} frames/s (strike {}/{})",
                player, self.max_frames, self.strikes, self.max_strikes
            );
        }
        if self.strikes >= self.max_strikes {
            return FloodVerdict::Disconnect;
        }
        FloodVerdict::Drop { notify: first_excess }
    }

    pub fn strikes(&self) -> u32 {
        self.strikes
    }

    /// Reset the per-second counter if a new second has started.
    fn tick(&mut self, now: Instant) {
        if now.saturating_duration_since(self.window_start) >= Duration::from_secs(1) {
            self.window_start = now;
            self.frames_this_window = 0;
        }
    }
}
