//! Tick-based snake arena.
//!
//! Input only changes headings; positions move on the scheduled tick driven
//! by the match's live session.

pub mod entities;
pub mod movement;
pub mod rules;
pub mod state;

use log::info;

pub use state::{ArenaConfig, ArenaState, Consumable, ConsumableKind, SnakeEntity, SteerMove};

use crate::config::matchmaking::SNAKE_ID;
use crate::error::{EngineError, MoveError};
use crate::game::engine::{GameRules, StateTable};
use crate::game::types::{MatchId, MoveOutcome, PlayerId};

pub struct SnakeArena {
    config: ArenaConfig,
    states: StateTable<ArenaState>,
}

impl SnakeArena {
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            config,
            states: StateTable::new(),
        }
    }

    /// One simulation step for `match_id`, under the match lock.
    pub fn tick(&self, match_id: MatchId) -> Result<MoveOutcome, MoveError> {
        self.states.with_state(match_id, |state| {
            if state.is_over {
                return Err(MoveError::GameOver);
            }
            let finished = rules::advance(state, &mut rand::rng());
            if let Some(outcome) = &finished {
                info!(
                    "[Snake] Match {} finished after {} ticks: {:?}",
                    match_id, state.tick, outcome
                );
            }
            Ok(MoveOutcome { finished })
        })
    }
}

impl GameRules for SnakeArena {
    type Move = SteerMove;
    type State = ArenaState;

    fn id(&self) -> &str {
        SNAKE_ID
    }

    fn title(&self) -> &str {
        "Snake Arena"
    }

    fn required_players(&self) -> usize {
        self.config.players
    }

    fn initialize_state(&self, match_id: MatchId, players: &[PlayerId]) -> Result<(), EngineError> {
        if players.len() != self.required_players() {
            return Err(EngineError::WrongPlayerCount {
                game: self.id().to_string(),
                expected: self.required_players(),
                actual: players.len(),
            });
        }
        let mut state = ArenaState::empty(&self.config);
        state.snakes = entities::spawn_snakes(&self.config, players)?;
        entities::replenish(&mut state, &mut rand::rng());
        self.states.insert(match_id, state)
    }

    fn handle_move(
        &self,
        match_id: MatchId,
        player: &str,
        mv: SteerMove,
    ) -> Result<MoveOutcome, MoveError> {
        self.states
            .with_state(match_id, |state| movement::steer(state, player, mv.direction))?;
        Ok(MoveOutcome::ongoing())
    }

    fn get_state(&self, match_id: MatchId) -> Option<ArenaState> {
        self.states.snapshot(match_id)
    }

    fn discard(&self, match_id: MatchId) {
        self.states.remove(match_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::{Direction, Position};
    use uuid::Uuid;

    fn setup() -> (SnakeArena, MatchId) {
        let arena = SnakeArena::new(ArenaConfig::default());
        let match_id = Uuid::new_v4();
        arena
            .initialize_state(match_id, &["alice".to_string(), "bob".to_string()])
            .unwrap();
        (arena, match_id)
    }

    #[test]
    fn test_initial_state() {
        let (arena, match_id) = setup();
        let state = arena.get_state(match_id).unwrap();
        assert_eq!(state.snakes.len(), 2);
        assert!(state.snakes.iter().all(|s| s.alive && s.score == 0));
        assert_eq!(state.count(ConsumableKind::Food), ArenaConfig::default().food_target);
        assert_eq!(
            arena.initialize_state(match_id, &["alice".to_string(), "bob".to_string()]),
            Err(EngineError::AlreadyInitialized(match_id))
        );
    }

    #[test]
    fn test_heading_applies_on_next_tick() {
        let (arena, match_id) = setup();
        let start = arena.get_state(match_id).unwrap().snakes[0].head;

        arena
            .handle_move(match_id, "alice", SteerMove { direction: Direction::Down })
            .unwrap();
        assert_eq!(arena.get_state(match_id).unwrap().snakes[0].head, start);

        arena.tick(match_id).unwrap();
        let moved = arena.get_state(match_id).unwrap().snakes[0].clone();
        assert_eq!(moved.head, Position::new(start.x, start.y + 1));
        assert_eq!(moved.last_moved, Direction::Down);
    }

    #[test]
    fn test_runs_until_someone_hits_a_wall() {
        let (arena, match_id) = setup();
        let mut finished = None;
        for _ in 0..ArenaConfig::default().width * 2 {
            match arena.tick(match_id) {
                Ok(outcome) if outcome.finished.is_some() => {
                    finished = outcome.finished;
                    break;
                }
                Ok(_) => {}
                Err(e) => panic!("tick failed: {}", e),
            }
        }
        assert!(finished.is_some());
        assert_eq!(arena.tick(match_id), Err(MoveError::GameOver));
        assert_eq!(
            arena.handle_move(match_id, "alice", SteerMove { direction: Direction::Up }),
            Err(MoveError::GameOver)
        );
    }
}
