//! Error taxonomy shared by the admission API, the match registry, the game
//! engines and the live-session transport.
//!
//! Every error exposes a stable machine-readable `code()` that ends up in the
//! `code` field of HTTP and WebSocket error bodies.

use thiserror::Error;
use uuid::Uuid;

use crate::game::types::{Direction, PlayerId};

/// Rejections of the queue admission API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("player {0} is already waiting in a queue")]
    AlreadyQueued(PlayerId),
    #[error("player {0} is already in an active match")]
    AlreadyInMatch(PlayerId),
    #[error("player {0} is not waiting in any queue")]
    NotInQueue(PlayerId),
    #[error("unknown game {0}")]
    UnknownGame(String),
}

impl AdmissionError {
    pub fn code(&self) -> &'static str {
        match self {
            AdmissionError::AlreadyQueued(_) => "ALREADY_QUEUED",
            AdmissionError::AlreadyInMatch(_) => "ALREADY_IN_MATCH",
            AdmissionError::NotInQueue(_) => "NOT_IN_QUEUE",
            AdmissionError::UnknownGame(_) => "UNKNOWN_GAME",
        }
    }
}

/// Failures of the persistence backend behind the match registry.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("match store I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("match record encoding failure: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("match store unavailable: {0}")]
    Unavailable(String),
}

/// Match registry and lifecycle errors.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("match {0} not found")]
    NotFound(Uuid),
    #[error("match {0} has already ended")]
    AlreadyEnded(Uuid),
    #[error("match id {0} is already taken")]
    IdCollision(Uuid),
    #[error("player {0} already has an active match")]
    PlayerBusy(PlayerId),
    #[error("match {id} cannot go from {from} to {to}")]
    InvalidTransition {
        id: Uuid,
        from: &'static str,
        to: &'static str,
    },
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl MatchError {
    pub fn code(&self) -> &'static str {
        match self {
            MatchError::NotFound(_) => "MATCH_NOT_FOUND",
            MatchError::AlreadyEnded(_) => "MATCH_ENDED",
            MatchError::IdCollision(_) => "MATCH_ID_COLLISION",
            MatchError::PlayerBusy(_) => "PLAYER_BUSY",
            MatchError::InvalidTransition { .. } => "INVALID_TRANSITION",
            MatchError::Persistence(_) => "PERSISTENCE_FAILURE",
        }
    }
}

/// Rejections of a move (or a tick) by a game engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("match {0} not found")]
    MatchNotFound(Uuid),
    #[error("game is over")]
    GameOver,
    #[error("not player's turn")]
    NotYourTurn,
    #[error("cell {0} is out of range")]
    InvalidCell(i64),
    #[error("cell {0} is already occupied")]
    CellOccupied(usize),
    #[error("cannot turn from {current:?} to {requested:?}")]
    InvalidDirection {
        current: Direction,
        requested: Direction,
    },
    #[error("player {0} is not a participant of this match")]
    NotParticipant(PlayerId),
    #[error("player {0} has collided and is out of the game")]
    Collision(PlayerId),
    #[error("malformed move payload: {0}")]
    Malformed(String),
}

impl MoveError {
    pub fn code(&self) -> &'static str {
        match self {
            MoveError::MatchNotFound(_) => "MATCH_NOT_FOUND",
            MoveError::GameOver => "GAME_OVER",
            MoveError::NotYourTurn => "NOT_YOUR_TURN",
            MoveError::InvalidCell(_) => "INVALID_CELL",
            MoveError::CellOccupied(_) => "CELL_OCCUPIED",
            MoveError::InvalidDirection { .. } => "INVALID_DIRECTION",
            MoveError::NotParticipant(_) => "NOT_PARTICIPANT",
            MoveError::Collision(_) => "ELIMINATED",
            MoveError::Malformed(_) => "MALFORMED_MOVE",
        }
    }
}

/// Failures while setting up per-match engine state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("game {game} needs {expected} players, got {actual}")]
    WrongPlayerCount {
        game: String,
        expected: usize,
        actual: usize,
    },
    #[error("state for match {0} already exists")]
    AlreadyInitialized(Uuid),
    #[error("board too small to place {0} players")]
    BoardTooSmall(usize),
}

/// Live connection failures. Each one only ever affects its own connection.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket upgrade failed: {0}")]
    UpgradeFailed(String),
    #[error("no heartbeat for {0} seconds")]
    ReadTimeout(u64),
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
}

impl TransportError {
    pub fn code(&self) -> &'static str {
        match self {
            TransportError::UpgradeFailed(_) => "UPGRADE_FAILED",
            TransportError::ReadTimeout(_) => "READ_TIMEOUT",
            TransportError::MalformedFrame(_) => "MALFORMED_FRAME",
        }
    }
}

/// Reasons a live session refuses a connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("match {0} not found")]
    MatchNotFound(Uuid),
    #[error("match {0} has already ended")]
    MatchEnded(Uuid),
    #[error("player {player} is not in match {match_id}")]
    NotParticipant { match_id: Uuid, player: PlayerId },
}

impl SessionError {
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::MatchNotFound(_) => "MATCH_NOT_FOUND",
            SessionError::MatchEnded(_) => "MATCH_ENDED",
            SessionError::NotParticipant { .. } => "NOT_PARTICIPANT",
        }
    }
}

/// Why a match-formation attempt for one game type was abandoned. The queue
/// is left untouched in every case.
#[derive(Debug, Error)]
pub enum MatchmakingError {
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}
