//! Admission service: the queue operations exposed to clients.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::info;

use crate::error::AdmissionError;
use crate::game::GameCatalog;
use crate::game::types::{GameId, MatchId};
use crate::server::matchmaking::queue::{QueueEntry, QueueManager};
use crate::server::registry::MatchRegistry;

pub struct Lobby {
    catalog: Arc<GameCatalog>,
    queues: Arc<QueueManager>,
    registry: Arc<MatchRegistry>,
}

impl Lobby {
    pub fn new(
        catalog: Arc<GameCatalog>,
        queues: Arc<QueueManager>,
        registry: Arc<MatchRegistry>,
    ) -> Self {
        Self {
            catalog,
            queues,
            registry,
        }
    }

    /// Put `player` in the wait queue of `game_id`.
    pub fn enqueue(&self, player: &str, game_id: &str) -> Result<QueueEntry, AdmissionError> {
        if self.catalog.get(game_id).is_none() {
            return Err(AdmissionError::UnknownGame(game_id.to_string()));
        }
        let entry = self.queues.enqueue_with(game_id, player, || {
            if self.registry.is_in_match(player) {
                Err(AdmissionError::AlreadyInMatch(player.to_string()))
            } else {
                Ok(())
            }
        })?;
        info!("[Lobby] Player {} joined queue for game {}", player, game_id);
        Ok(entry)
    }

    pub fn leave(&self, player: &str) -> Result<QueueEntry, AdmissionError> {
        let entry = self.queues.dequeue(player)?;
        info!("[Lobby] Player {} left queue for game {}", player, entry.game_id);
        Ok(entry)
    }

    pub fn current_match(&self, player: &str) -> Option<MatchId> {
        self.registry.get_for_player(player).map(|m| m.id)
    }

    pub fn queues(&self) -> BTreeMap<GameId, Vec<QueueEntry>> {
        self.queues.get_all()
    }
}
