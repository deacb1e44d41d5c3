//! Queue admission and observability HTTP handlers.
//!
//! Request and response bodies use camelCase JSON; errors use the shared
//! `{"error": {"code", "message", "context"}}` body.

use actix_web::{HttpResponse, Responder, http::StatusCode, web};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AdmissionError;
use crate::game::types::{GameId, MatchId, PlayerId};
use crate::server::registry::MatchState;
use crate::server::state::AppState;
use crate::server::ws_error::http_error_response;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinQueueRequest {
    pub player_id: PlayerId,
    pub game_id: GameId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveQueueRequest {
    pub player_id: PlayerId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CurrentMatch {
    match_id: MatchId,
}

#[derive(Debug, Deserialize)]
pub struct MatchFilter {
    pub state: Option<MatchState>,
}

fn admission_error_response(e: &AdmissionError, player: &str) -> HttpResponse {
    let status = match e {
        AdmissionError::AlreadyQueued(_) | AdmissionError::AlreadyInMatch(_) => {
            StatusCode::CONFLICT
        }
        AdmissionError::NotInQueue(_) | AdmissionError::UnknownGame(_) => StatusCode::NOT_FOUND,
    };
    http_error_response(e.code(), &e.to_string(), Some(player), status)
}

/// `POST /queue/join`
pub async fn join_queue(
    data: web::Data<AppState>,
    body: web::Json<JoinQueueRequest>,
) -> HttpResponse {
    let JoinQueueRequest { player_id, game_id } = body.into_inner();
    match data.lobby.enqueue(&player_id, &game_id) {
        Ok(entry) => HttpResponse::Ok().json(entry),
        Err(e) => {
            debug!("[Admission] Join refused for {}: {}", player_id, e);
            admission_error_response(&e, &player_id)
        }
    }
}

/// `POST /queue/leave`
pub async fn leave_queue(
    data: web::Data<AppState>,
    body: web::Json<LeaveQueueRequest>,
) -> HttpResponse {
    match data.lobby.leave(&body.player_id) {
        Ok(entry) => HttpResponse::Ok().json(entry),
        Err(e) => admission_error_response(&e, &body.player_id),
    }
}

/// `GET /match/player/{player_id}`
pub async fn current_match(data: web::Data<AppState>, path: web::Path<PlayerId>) -> HttpResponse {
    let player_id = path.into_inner();
    match data.lobby.current_match(&player_id) {
        Some(match_id) => HttpResponse::Ok().json(CurrentMatch { match_id }),
        None => http_error_response(
            "NO_ACTIVE_MATCH",
            "player has no active match",
            Some(&player_id),
            StatusCode::NOT_FOUND,
        ),
    }
}

/// `GET /match/{match_id}`
pub async fn get_match(data: web::Data<AppState>, path: web::Path<MatchId>) -> HttpResponse {
    let match_id = path.into_inner();
    match data.registry.get(match_id) {
        Some(record) => HttpResponse::Ok().json(record),
        None => http_error_response(
            "MATCH_NOT_FOUND",
            &format!("match {} not found", match_id),
            None,
            StatusCode::NOT_FOUND,
        ),
    }
}

/// `GET /matches?state=Running`
pub async fn list_matches(
    data: web::Data<AppState>,
    query: web::Query<MatchFilter>,
) -> HttpResponse {
    HttpResponse::Ok().json(data.registry.list(query.state))
}

/// `GET /games`
pub async fn list_games(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.catalog.describe())
}

/// `GET /queue`
pub async fn list_queues(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.lobby.queues())
}

pub async fn ping() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
