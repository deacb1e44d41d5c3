//! HTTP and WebSocket routing configuration.
//!
//! Queue admission and observability endpoints are plain JSON handlers; the
//! live match endpoint upgrades to a WebSocket handled by its own actor.

use actix_web::web;

use crate::server::admission::{
    current_match, get_match, join_queue, leave_queue, list_games, list_matches, list_queues, ping,
};
use crate::server::game_session::session::ws_match;

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ping").route(web::get().to(ping)))
        .service(web::resource("/games").route(web::get().to(list_games)))
        .service(web::resource("/queue").route(web::get().to(list_queues)))
        .service(web::resource("/queue/join").route(web::post().to(join_queue)))
        .service(web::resource("/queue/leave").route(web::post().to(leave_queue)))
        .service(web::resource("/matches").route(web::get().to(list_matches)))
        .service(web::resource("/match/player/{player_id}").route(web::get().to(current_match)))
        .service(web::resource("/match/{match_id}").route(web::get().to(get_match)))
        .service(web::resource("/ws/match/{match_id}/{player_id}").to(ws_match));
}
