//! Steering input.

use crate::error::MoveError;
use crate::game::snake::state::ArenaState;
use crate::game::types::Direction;

/// Change the heading of `player`'s snake. Only quarter turns relative to the
/// current heading are accepted, and never one that reverses the last step
/// actually taken. The new heading is applied by the next tick.
pub fn steer(state: &mut ArenaState, player: &str, requested: Direction) -> Result<(), MoveError> {
    if state.is_over {
        return Err(MoveError::GameOver);
    }
    let snake = state
        .snake_mut(player)
        .ok_or_else(|| MoveError::NotParticipant(player.to_string()))?;
    if !snake.alive {
        return Err(MoveError::Collision(player.to_string()));
    }
    if !requested.is_orthogonal_to(snake.heading) || requested == snake.last_moved.opposite() {
        return Err(MoveError::InvalidDirection {
            current: snake.heading,
            requested,
        });
    }
    snake.heading = requested;
    Ok(())
}
