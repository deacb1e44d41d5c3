//! Game capability and its dispatch table.
//!
//! [`GameRules`] is the contract every rule set implements, with its own
//! strongly typed move and state. [`Engine`] is the closed set of rule sets
//! the server knows about; it decodes the untyped `data` of a client frame
//! into the right move type once, at the boundary.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, MoveError};
use crate::game::snake::{ArenaState, SnakeArena};
use crate::game::tictactoe::{BoardState, TicTacToe};
use crate::game::types::{MatchId, MoveOutcome, PlayerId};

pub trait GameRules: Send + Sync {
    type Move: DeserializeOwned;
    type State: Clone + Serialize;

    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn required_players(&self) -> usize;

    fn initialize_state(&self, match_id: MatchId, players: &[PlayerId]) -> Result<(), EngineError>;
    fn handle_move(
        &self,
        match_id: MatchId,
        player: &str,
        mv: Self::Move,
    ) -> Result<MoveOutcome, MoveError>;
    /// Copy of the current state, never a reference into the engine.
    fn get_state(&self, match_id: MatchId) -> Option<Self::State>;
    /// Drop the state of a match that is over.
    fn discard(&self, match_id: MatchId);
}

/// Per-match state storage. The outer lock only guards the map; each match
/// has its own mutex so unrelated matches never contend.
pub struct StateTable<S> {
    states: RwLock<HashMap<MatchId, Arc<Mutex<S>>>>,
}

impl<S: Clone> StateTable<S> {
    pub fn new() -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, match_id: MatchId, state: S) -> Result<(), EngineError> {
        let mut states = self.states.write();
        if states.contains_key(&match_id) {
            return Err(EngineError::AlreadyInitialized(match_id));
        }
        states.insert(match_id, Arc::new(Mutex::new(state)));
        Ok(())
    }

    /// Run `f` with the match state locked.
    pub fn with_state<R>(
        &self,
        match_id: MatchId,
        f: impl FnOnce(&mut S) -> Result<R, MoveError>,
    ) -> Result<R, MoveError> {
        let slot = self
            .states
            .read()
            .get(&match_id)
            .cloned()
            .ok_or(MoveError::MatchNotFound(match_id))?;
        let mut state = slot.lock();
        f(&mut state)
    }

    pub fn snapshot(&self, match_id: MatchId) -> Option<S> {
        let slot = self.states.read().get(&match_id).cloned()?;
        let state = slot.lock();
        Some(state.clone())
    }

    pub fn remove(&self, match_id: MatchId) {
        self.states.write().remove(&match_id);
    }
}

impl<S: Clone> Default for StateTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable snapshot of any game's state, tagged by game kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameSnapshot {
    TicTacToe(BoardState),
    Snake(ArenaState),
}

/// The registered rule sets.
pub enum Engine {
    TicTacToe(TicTacToe),
    Snake(SnakeArena),
}

fn decode<M: DeserializeOwned>(data: serde_json::Value) -> Result<M, MoveError> {
    serde_json::from_value(data).map_err(|e| MoveError::Malformed(e.to_string()))
}

impl Engine {
    pub fn id(&self) -> &str {
        match self {
            Engine::TicTacToe(g) => g.id(),
            Engine::Snake(g) => g.id(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Engine::TicTacToe(g) => g.title(),
            Engine::Snake(g) => g.title(),
        }
    }

    pub fn required_players(&self) -> usize {
        match self {
            Engine::TicTacToe(g) => g.required_players(),
            Engine::Snake(g) => g.required_players(),
        }
    }

    /// Tick-based games need a live loop driving [`Engine::tick`].
    pub fn is_tick_based(&self) -> bool {
        matches!(self, Engine::Snake(_))
    }

    pub fn initialize_state(
        &self,
        match_id: MatchId,
        players: &[PlayerId],
    ) -> Result<(), EngineError> {
        match self {
            Engine::TicTacToe(g) => g.initialize_state(match_id, players),
            Engine::Snake(g) => g.initialize_state(match_id, players),
        }
    }

    pub fn handle_move(
        &self,
        match_id: MatchId,
        player: &str,
        data: serde_json::Value,
    ) -> Result<MoveOutcome, MoveError> {
        match self {
            Engine::TicTacToe(g) => g.handle_move(match_id, player, decode(data)?),
            Engine::Snake(g) => g.handle_move(match_id, player, decode(data)?),
        }
    }

    /// Advance a tick-based match by one step. Turn-based games have nothing
    /// to do and report an ongoing match.
    pub fn tick(&self, match_id: MatchId) -> Result<MoveOutcome, MoveError> {
        match self {
            Engine::TicTacToe(_) => Ok(MoveOutcome::ongoing()),
            Engine::Snake(g) => g.tick(match_id),
        }
    }

    pub fn get_state(&self, match_id: MatchId) -> Option<GameSnapshot> {
        match self {
            Engine::TicTacToe(g) => g.get_state(match_id).map(GameSnapshot::TicTacToe),
            Engine::Snake(g) => g.get_state(match_id).map(GameSnapshot::Snake),
        }
    }

    pub fn discard(&self, match_id: MatchId) {
        match self {
            Engine::TicTacToe(g) => g.discard(match_id),
            Engine::Snake(g) => g.discard(match_id),
        }
    }
}
