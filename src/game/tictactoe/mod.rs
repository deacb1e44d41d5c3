//! Turn-based tic-tac-toe on a 3x3 board for two participants.
//!
//! The first participant plays `X` and moves first.

pub mod rules;
pub mod state;

use log::info;

pub use state::{BoardState, Mark, PlaceMark};

use crate::config::matchmaking::TICTACTOE_ID;
use crate::error::{EngineError, MoveError};
use crate::game::engine::{GameRules, StateTable};
use crate::game::types::{MatchId, MoveOutcome, PlayerId};

pub struct TicTacToe {
    states: StateTable<BoardState>,
}

impl TicTacToe {
    pub fn new() -> Self {
        Self {
            states: StateTable::new(),
        }
    }
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRules for TicTacToe {
    type Move = PlaceMark;
    type State = BoardState;

    fn id(&self) -> &str {
        TICTACTOE_ID
    }

    fn title(&self) -> &str {
        "Tic Tac Toe"
    }

    fn required_players(&self) -> usize {
        2
    }

    fn initialize_state(&self, match_id: MatchId, players: &[PlayerId]) -> Result<(), EngineError> {
        if players.len() != self.required_players() {
            return Err(EngineError::WrongPlayerCount {
                game: self.id().to_string(),
                expected: self.required_players(),
                actual: players.len(),
            });
        }
        self.states.insert(match_id, BoardState::new(players.to_vec()))
    }

    fn handle_move(
        &self,
        match_id: MatchId,
        player: &str,
        mv: PlaceMark,
    ) -> Result<MoveOutcome, MoveError> {
        let finished = self
            .states
            .with_state(match_id, |state| rules::apply_move(state, player, mv.index))?;
        info!(
            "[TicTacToe] Move processed for match {} by player {}: index {}",
            match_id, player, mv.index
        );
        Ok(MoveOutcome { finished })
    }

    fn get_state(&self, match_id: MatchId) -> Option<BoardState> {
        self.states.snapshot(match_id)
    }

    fn discard(&self, match_id: MatchId) {
        self.states.remove(match_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::Outcome;
    use std::sync::Arc;
    use std::thread;
    use uuid::Uuid;

    fn setup() -> (TicTacToe, MatchId) {
        let game = TicTacToe::new();
        let match_id = Uuid::new_v4();
        game.initialize_state(match_id, &["alice".to_string(), "bob".to_string()])
            .unwrap();
        (game, match_id)
    }

    #[test]
    fn test_initialize_requires_two_players() {
        let game = TicTacToe::new();
        let err = game
            .initialize_state(Uuid::new_v4(), &["solo".to_string()])
            .unwrap_err();
        assert!(matches!(err, EngineError::WrongPlayerCount { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_first_participant_starts() {
        let (game, match_id) = setup();
        let state = game.get_state(match_id).unwrap();
        assert_eq!(state.turn, "alice");
        assert_eq!(state.board, [None; 9]);
    }

    #[test]
    fn test_unknown_match() {
        let game = TicTacToe::new();
        let missing = Uuid::new_v4();
        assert_eq!(
            game.handle_move(missing, "alice", PlaceMark { index: 0 }),
            Err(MoveError::MatchNotFound(missing))
        );
    }

    #[test]
    fn test_win_reports_outcome() {
        let (game, match_id) = setup();
        for (player, index) in [("alice", 6), ("bob", 0), ("alice", 7), ("bob", 1)] {
            assert_eq!(
                game.handle_move(match_id, player, PlaceMark { index }),
                Ok(MoveOutcome::ongoing())
            );
        }
        let done = game.handle_move(match_id, "alice", PlaceMark { index: 8 }).unwrap();
        assert_eq!(done.finished, Some(Outcome::Winner("alice".to_string())));
    }

    #[test]
    fn test_racing_players_first_validated_wins() {
        let (game, match_id) = setup();
        let game = Arc::new(game);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let game = Arc::clone(&game);
                thread::spawn(move || game.handle_move(match_id, "alice", PlaceMark { index: i }))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| *e == MoveError::NotYourTurn)
        );
        assert_eq!(game.get_state(match_id).unwrap().moves, 1);
    }
}
