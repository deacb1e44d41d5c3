// src/server/state.rs

//! Application state for the backend server.
//!
//! Holds the shared services (game catalog, queues, match registry) and the
//! main actor addresses. Used to share state between HTTP/WebSocket handlers
//! and the actor system.

use actix::{Actor, Addr};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::game::GameCatalog;
use crate::game::snake::ArenaConfig;
use crate::server::game_session::{MatchHub, SessionTimings};
use crate::server::matchmaking::lobby::Lobby;
use crate::server::matchmaking::queue::QueueManager;
use crate::server::matchmaking::server::Matchmaker;
use crate::server::registry::{MatchRegistry, MatchStore};

/// Shared application state, injected into HTTP/WebSocket handlers.
pub struct AppState {
    pub catalog: Arc<GameCatalog>,
    pub lobby: Arc<Lobby>,
    pub registry: Arc<MatchRegistry>,
    /// Address of the hub owning every live match session.
    pub hub: Addr<MatchHub>,
    /// Address of the matchmaking actor (periodic match formation).
    pub matchmaker: Addr<Matchmaker>,
    pub config: ServerConfig,
}

impl AppState {
    /// Wire the services together and start the actors. Must run inside an
    /// actix system.
    pub fn start(config: ServerConfig, store: Arc<dyn MatchStore>) -> Self {
        let catalog = Arc::new(GameCatalog::standard(ArenaConfig::default()));
        let queues = Arc::new(QueueManager::new());
        let registry = Arc::new(MatchRegistry::new(store));
        let lobby = Arc::new(Lobby::new(catalog.clone(), queues.clone(), registry.clone()));

        let hub = MatchHub::new(
            catalog.clone(),
            registry.clone(),
            SessionTimings::new(
                config.tick_interval,
                config.client_timeout,
                config.abandon_timeout,
            ),
        )
        .start();
        let matchmaker = Matchmaker::new(
            catalog.clone(),
            queues,
            registry.clone(),
            config.matchmaking_interval,
        )
        .with_watcher(hub.clone().recipient())
        .start();

        AppState {
            catalog,
            lobby,
            registry,
            hub,
            matchmaker,
            config,
        }
    }
}
