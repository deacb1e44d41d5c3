//! Registered game types, resolved once at startup.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::game::engine::Engine;
use crate::game::snake::{ArenaConfig, SnakeArena};
use crate::game::tictactoe::TicTacToe;

/// Public description of a game type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    pub id: String,
    pub title: String,
    pub required_players: usize,
    pub tick_based: bool,
}

pub struct GameCatalog {
    games: BTreeMap<String, Arc<Engine>>,
}

impl GameCatalog {
    pub fn new() -> Self {
        Self {
            games: BTreeMap::new(),
        }
    }

    /// The games shipped with the server.
    pub fn standard(arena: ArenaConfig) -> Self {
        let mut catalog = Self::new();
        catalog.register(Engine::TicTacToe(TicTacToe::new()));
        catalog.register(Engine::Snake(SnakeArena::new(arena)));
        catalog
    }

    /// Register an engine under its own id, replacing any previous one.
    pub fn register(&mut self, engine: Engine) {
        self.games.insert(engine.id().to_string(), Arc::new(engine));
    }

    pub fn get(&self, game_id: &str) -> Option<Arc<Engine>> {
        self.games.get(game_id).cloned()
    }

    /// All engines, ordered by game id.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Engine>> {
        self.games.values()
    }

    pub fn describe(&self) -> Vec<GameInfo> {
        self.iter()
            .map(|engine| GameInfo {
                id: engine.id().to_string(),
                title: engine.title().to_string(),
                required_players: engine.required_players(),
                tick_based: engine.is_tick_based(),
            })
            .collect()
    }
}

impl Default for GameCatalog {
    fn default() -> Self {
        Self::standard(ArenaConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::matchmaking::{SNAKE_ID, TICTACTOE_ID};

    #[test]
    fn test_standard_catalog() {
        let catalog = GameCatalog::default();
        let infos = catalog.describe();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].id, SNAKE_ID);
        assert!(infos[0].tick_based);
        assert_eq!(infos[1].id, TICTACTOE_ID);
        assert_eq!(infos[1].required_players, 2);
        assert!(catalog.get("chess").is_none());
    }
}
