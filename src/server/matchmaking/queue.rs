//! Per-game FIFO wait queues.
//!
//! A single lock guards the whole queue map, which is what makes "a player
//! waits in at most one queue" hold across games.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::error::AdmissionError;
use crate::game::types::{GameId, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub enqueued_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct QueueManager {
    queues: RwLock<BTreeMap<GameId, VecDeque<QueueEntry>>>,
}

fn position_of(
    queues: &BTreeMap<GameId, VecDeque<QueueEntry>>,
    player: &str,
) -> Option<(GameId, usize)> {
    queues.iter().find_map(|(game, queue)| {
        queue
            .iter()
            .position(|e| e.player_id == player)
            .map(|idx| (game.clone(), idx))
    })
}

impl QueueManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `player` to the queue of `game_id`. `admit` runs under the
    /// queue lock after the duplicate check, so an external condition (such
    /// as "not already in a match") is evaluated atomically with the insert.
    pub fn enqueue_with(
        &self,
        game_id: &str,
        player: &str,
        admit: impl FnOnce() -> Result<(), AdmissionError>,
    ) -> Result<QueueEntry, AdmissionError> {
        let mut queues = self.queues.write();
        if position_of(&queues, player).is_some() {
            return Err(AdmissionError::AlreadyQueued(player.to_string()));
        }
        admit()?;
        let entry = QueueEntry {
            game_id: game_id.to_string(),
            player_id: player.to_string(),
            enqueued_at: Utc::now(),
        };
        queues
            .entry(game_id.to_string())
            .or_default()
            .push_back(entry.clone());
        Ok(entry)
    }

    pub fn enqueue(&self, game_id: &str, player: &str) -> Result<QueueEntry, AdmissionError> {
        self.enqueue_with(game_id, player, || Ok(()))
    }

    /// Remove `player` from whichever queue holds it.
    pub fn dequeue(&self, player: &str) -> Result<QueueEntry, AdmissionError> {
        let mut queues = self.queues.write();
        let (game, idx) = position_of(&queues, player)
            .ok_or_else(|| AdmissionError::NotInQueue(player.to_string()))?;
        queues
            .get_mut(&game)
            .and_then(|queue| queue.remove(idx))
            .ok_or_else(|| AdmissionError::NotInQueue(player.to_string()))
    }

    /// FIFO-ordered copy of the players waiting for `game_id`.
    pub fn snapshot(&self, game_id: &str) -> Vec<PlayerId> {
        self.queues
            .read()
            .get(game_id)
            .map(|queue| queue.iter().map(|e| e.player_id.clone()).collect())
            .unwrap_or_default()
    }

    /// Copy of every queue, for observability.
    pub fn get_all(&self) -> BTreeMap<GameId, Vec<QueueEntry>> {
        self.queues
            .read()
            .iter()
            .map(|(game, queue)| (game.clone(), queue.iter().cloned().collect()))
            .collect()
    }

    pub fn queued_game(&self, player: &str) -> Option<GameId> {
        position_of(&self.queues.read(), player).map(|(game, _)| game)
    }

    pub fn len(&self, game_id: &str) -> usize {
        self.queues.read().get(game_id).map_or(0, VecDeque::len)
    }

    /// All-or-nothing removal of the `count` oldest players of `game_id`.
    ///
    /// Returns `Ok(None)` without calling `commit` when fewer players wait.
    /// Otherwise `commit` receives the selected players while the queue lock
    /// is held; they leave the queue only if it returns `Ok`.
    pub fn take_quorum<T, E>(
        &self,
        game_id: &str,
        count: usize,
        commit: impl FnOnce(&[PlayerId]) -> Result<T, E>,
    ) -> Result<Option<T>, E> {
        let mut queues = self.queues.write();
        let Some(queue) = queues.get_mut(game_id) else {
            return Ok(None);
        };
        if count == 0 || queue.len() < count {
            return Ok(None);
        }
        let selected: Vec<PlayerId> = queue
            .iter()
            .take(count)
            .map(|e| e.player_id.clone())
            .collect();
        let value = commit(&selected)?;
        queue.drain(..count);
        Ok(Some(value))
    }
}
