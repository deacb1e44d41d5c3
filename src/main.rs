//! Main entry point for the backend server.
//!
//! Initializes logging and configuration, starts the actor system and
//! launches the HTTP server with the admission API and live match endpoint.

use std::io;
use std::sync::Arc;

use actix_web::{App, HttpServer, middleware, web};
use log::info;

use arena_backend::config::ServerConfig;
use arena_backend::server::registry::{InMemoryMatchStore, JsonLinesMatchStore, MatchStore};
use arena_backend::server::router;
use arena_backend::server::state::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize logger from environment variable (default to info level).
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env();

    let store: Arc<dyn MatchStore> = match &config.match_log_path {
        Some(path) => {
            let store = JsonLinesMatchStore::open(path).map_err(io::Error::other)?;
            info!("[Main] Persisting matches to {}", store.path().display());
            Arc::new(store)
        }
        None => {
            info!("[Main] MATCH_LOG_PATH not set, matches are kept in memory only");
            Arc::new(InMemoryMatchStore::new())
        }
    };

    let bind = (config.host.clone(), config.port);
    // Shared application state; starts the matchmaker and session hub actors.
    let state = web::Data::new(AppState::start(config, store));
    info!("[Main] Listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(
                middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*")),
            )
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(router::config)
    })
    .bind(bind)?
    .run()
    .await
}
