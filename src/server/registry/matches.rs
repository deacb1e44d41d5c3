//! Match records and the registry that owns them.
//!
//! The registry is the source of truth for "who plays in which match". Every
//! lifecycle change is written through the [`MatchStore`] before it becomes
//! visible to readers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MatchError;
use crate::game::types::{GameId, MatchId, Outcome, PlayerId};
use crate::server::registry::store::MatchStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchState {
    Created,
    Running,
    Ended,
}

impl MatchState {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchState::Created => "Created",
            MatchState::Running => "Running",
            MatchState::Ended => "Ended",
        }
    }
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[serde(rename = "matchId")]
    pub id: MatchId,
    pub game_id: GameId,
    /// Participants in matchmaking order. The order fixes turn order and
    /// starting positions.
    pub players: Vec<PlayerId>,
    pub state: MatchState,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Seconds between creation and end.
    #[serde(rename = "duration")]
    pub duration_secs: Option<f64>,
    pub outcome: Option<Outcome>,
}

impl Match {
    pub fn new(game_id: GameId, players: Vec<PlayerId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_id,
            players,
            state: MatchState::Created,
            created_at: Utc::now(),
            ended_at: None,
            duration_secs: None,
            outcome: None,
        }
    }

    pub fn has_player(&self, player: &str) -> bool {
        self.players.iter().any(|p| p == player)
    }

    pub fn is_active(&self) -> bool {
        self.state != MatchState::Ended
    }

    /// Created -> Running.
    pub fn start(&mut self) -> Result<(), MatchError> {
        match self.state {
            MatchState::Created => {
                self.state = MatchState::Running;
                Ok(())
            }
            MatchState::Ended => Err(MatchError::AlreadyEnded(self.id)),
            from => Err(MatchError::InvalidTransition {
                id: self.id,
                from: from.as_str(),
                to: MatchState::Running.as_str(),
            }),
        }
    }

    /// Created | Running -> Ended. Stamps the end time and duration.
    pub fn end(&mut self, outcome: Outcome) -> Result<(), MatchError> {
        if self.state == MatchState::Ended {
            return Err(MatchError::AlreadyEnded(self.id));
        }
        let now = Utc::now();
        self.state = MatchState::Ended;
        self.ended_at = Some(now);
        self.duration_secs = Some((now - self.created_at).num_milliseconds() as f64 / 1000.0);
        self.outcome = Some(outcome);
        Ok(())
    }
}

#[derive(Default)]
struct Inner {
    matches: HashMap<MatchId, Match>,
    /// Non-ended match of each player.
    active: HashMap<PlayerId, MatchId>,
}

pub struct MatchRegistry {
    inner: RwLock<Inner>,
    store: Arc<dyn MatchStore>,
}

impl MatchRegistry {
    pub fn new(store: Arc<dyn MatchStore>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            store,
        }
    }

    /// Persist and register a new match. Fails on an id already used during
    /// the registry's lifetime or when a participant is in another active
    /// match. Nothing is registered if persistence fails.
    pub fn create(&self, record: Match) -> Result<(), MatchError> {
        let mut inner = self.inner.write();
        if inner.matches.contains_key(&record.id) {
            return Err(MatchError::IdCollision(record.id));
        }
        if let Some(busy) = record.players.iter().find(|p| inner.active.contains_key(*p)) {
            return Err(MatchError::PlayerBusy(busy.clone()));
        }
        self.store.save(&record)?;

        if record.is_active() {
            for player in &record.players {
                inner.active.insert(player.clone(), record.id);
            }
        }
        info!(
            "[MatchRegistry] Created match {} for game {} with players {:?}",
            record.id, record.game_id, record.players
        );
        inner.matches.insert(record.id, record);
        Ok(())
    }

    pub fn get(&self, match_id: MatchId) -> Option<Match> {
        self.inner.read().matches.get(&match_id).cloned()
    }

    /// The non-ended match containing `player`, if any.
    pub fn get_for_player(&self, player: &str) -> Option<Match> {
        let inner = self.inner.read();
        inner
            .active
            .get(player)
            .and_then(|id| inner.matches.get(id))
            .cloned()
    }

    pub fn is_in_match(&self, player: &str) -> bool {
        self.inner.read().active.contains_key(player)
    }

    /// Matches ordered by creation time, optionally filtered by state.
    pub fn list(&self, state: Option<MatchState>) -> Vec<Match> {
        let mut matches: Vec<Match> = self
            .inner
            .read()
            .matches
            .values()
            .filter(|m| state.is_none_or(|s| m.state == s))
            .cloned()
            .collect();
        matches.sort_by_key(|m| m.created_at);
        matches
    }

    /// Created -> Running. The transition is undone if it cannot be persisted.
    pub fn start(&self, match_id: MatchId) -> Result<Match, MatchError> {
        let mut inner = self.inner.write();
        let record = inner
            .matches
            .get_mut(&match_id)
            .ok_or(MatchError::NotFound(match_id))?;
        let previous = record.clone();
        record.start()?;
        if let Err(e) = self.store.save(record) {
            *record = previous;
            return Err(e.into());
        }
        Ok(record.clone())
    }

    /// Finish a match. The in-memory record is ended even when the store
    /// write fails; the failure is logged.
    pub fn end(&self, match_id: MatchId, outcome: Outcome) -> Result<Match, MatchError> {
        let mut inner = self.inner.write();
        let record = inner
            .matches
            .get_mut(&match_id)
            .ok_or(MatchError::NotFound(match_id))?;
        record.end(outcome)?;
        if let Err(e) = self.store.save(record) {
            warn!("[MatchRegistry] Failed to persist end of match {}: {}", match_id, e);
        }
        let ended = record.clone();
        for player in &ended.players {
            if inner.active.get(player) == Some(&match_id) {
                inner.active.remove(player);
            }
        }
        info!(
            "[MatchRegistry] Match {} ended after {:?}s: {:?}",
            match_id, ended.duration_secs, ended.outcome
        );
        Ok(ended)
    }

    /// Roll back a match that never reached its players. Ended matches are
    /// history and cannot be discarded.
    pub fn discard(&self, match_id: MatchId) -> Result<(), MatchError> {
        let mut inner = self.inner.write();
        match inner.matches.get(&match_id) {
            None => return Err(MatchError::NotFound(match_id)),
            Some(m) if !m.is_active() => return Err(MatchError::AlreadyEnded(match_id)),
            Some(_) => {}
        }
        if let Some(record) = inner.matches.remove(&match_id) {
            for player in &record.players {
                if inner.active.get(player) == Some(&match_id) {
                    inner.active.remove(player);
                }
            }
        }
        if let Err(e) = self.store.remove(match_id) {
            warn!(
                "[MatchRegistry] Failed to remove discarded match {} from store: {}",
                match_id, e
            );
        }
        warn!("[MatchRegistry] Discarded match {}", match_id);
        Ok(())
    }
}
