//! Live connections of one match.
//!
//! Tracks which participant is connected through which connection, and
//! whether the match loop is running. All mutations go through `&mut self`;
//! the owning session actor is the only writer.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::error::SessionError;
use crate::game::types::{MatchId, PlayerId};
use crate::server::registry::Match;

/// Identifies one physical connection. A reconnecting player gets a new one.
pub type ConnectionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

#[derive(Debug, Clone)]
pub struct Connection<C> {
    pub id: ConnectionId,
    pub handle: C,
    pub connected_at: Instant,
    pub last_heartbeat: Instant,
}

/// Result of a successful attach.
#[derive(Debug)]
pub struct Attached<C> {
    /// Previous connection of the same player, now superseded.
    pub replaced: Option<Connection<C>>,
    /// Set for exactly one caller: the one that has to start the match loop.
    pub start_loop: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detached {
    /// Last connection gone while the loop was running.
    pub stop_loop: bool,
}

pub struct SessionRegistry<C> {
    match_id: MatchId,
    participants: Vec<PlayerId>,
    needs_loop: bool,
    connections: HashMap<PlayerId, Connection<C>>,
    loop_state: LoopState,
}

impl<C: Clone> SessionRegistry<C> {
    pub fn new(record: &Match, needs_loop: bool) -> Self {
        Self {
            match_id: record.id,
            participants: record.players.clone(),
            needs_loop,
            connections: HashMap::new(),
            loop_state: LoopState::Idle,
        }
    }

    /// Register a connection for `player`. Non-participants are rejected
    /// without touching the registry. A second connection of the same player
    /// replaces the first one, which is handed back to be closed.
    pub fn attach(
        &mut self,
        player: &str,
        id: ConnectionId,
        handle: C,
        now: Instant,
    ) -> Result<Attached<C>, SessionError> {
        if !self.participants.iter().any(|p| p == player) {
            return Err(SessionError::NotParticipant {
                match_id: self.match_id,
                player: player.to_string(),
            });
        }
        let replaced = self.connections.insert(
            player.to_string(),
            Connection {
                id,
                handle,
                connected_at: now,
                last_heartbeat: now,
            },
        );
        let start_loop = self.needs_loop && self.loop_state == LoopState::Idle;
        if start_loop {
            self.loop_state = LoopState::Running;
        }
        Ok(Attached { replaced, start_loop })
    }

    /// Remove `player`'s connection, but only if it still is connection `id`:
    /// a late detach from a replaced connection must not drop its successor.
    pub fn detach(&mut self, player: &str, id: ConnectionId) -> Option<Detached> {
        if !self.is_current(player, id) {
            return None;
        }
        self.connections.remove(player);
        let stop_loop = self.connections.is_empty() && self.loop_state == LoopState::Running;
        if stop_loop {
            self.loop_state = LoopState::Idle;
        }
        Some(Detached { stop_loop })
    }

    pub fn is_current(&self, player: &str, id: ConnectionId) -> bool {
        self.connections.get(player).is_some_and(|c| c.id == id)
    }

    pub fn touch(&mut self, player: &str, id: ConnectionId, now: Instant) {
        if let Some(conn) = self.connections.get_mut(player) {
            if conn.id == id {
                conn.last_heartbeat = now;
            }
        }
    }

    /// Connections silent for longer than `timeout`.
    pub fn stale(&self, now: Instant, timeout: Duration) -> Vec<(PlayerId, ConnectionId)> {
        self.connections
            .iter()
            .filter(|(_, c)| now.saturating_duration_since(c.last_heartbeat) > timeout)
            .map(|(player, c)| (player.clone(), c.id))
            .collect()
    }

    pub fn get(&self, player: &str) -> Option<&Connection<C>> {
        self.connections.get(player)
    }

    pub fn handles(&self) -> impl Iterator<Item = &C> {
        self.connections.values().map(|c| &c.handle)
    }

    pub fn handles_except<'a>(&'a self, player: &'a str) -> impl Iterator<Item = &'a C> + 'a {
        self.connections
            .iter()
            .filter(move |(p, _)| p.as_str() != player)
            .map(|(_, c)| &c.handle)
    }

    /// Force the loop state back to idle once the match is over. Returns
    /// whether a loop was running.
    pub fn halt_loop(&mut self) -> bool {
        let was_running = self.loop_state == LoopState::Running;
        self.loop_state = LoopState::Idle;
        self.needs_loop = false;
        was_running
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    pub fn connected(&self) -> Vec<PlayerId> {
        let mut players: Vec<PlayerId> = self.connections.keys().cloned().collect();
        players.sort();
        players
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
