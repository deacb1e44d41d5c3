//! Per-tick simulation: movement, collisions, pickups and the end condition.

use log::debug;
use rand::Rng;

use crate::game::snake::entities::replenish;
use crate::game::snake::state::{ArenaState, Consumable, ConsumableKind};
use crate::game::types::Outcome;

/// Advance every alive snake by one step, in participant order, then refill
/// consumables and evaluate the end condition. Returns the outcome when this
/// tick ended the game.
pub fn advance<R: Rng + ?Sized>(state: &mut ArenaState, rng: &mut R) -> Option<Outcome> {
    if state.is_over {
        return None;
    }
    state.tick += 1;

    for i in 0..state.snakes.len() {
        if !state.snakes[i].alive {
            continue;
        }
        let next = state.snakes[i].head.step(state.snakes[i].heading);
        if !state.in_bounds(next) || state.is_blocked(next) {
            debug!("[Snake] {} collided at {:?}", state.snakes[i].player_id, next);
            state.snakes[i].alive = false;
            continue;
        }

        let eaten = state
            .consumables
            .iter()
            .position(|c| c.pos == next)
            .map(|idx| state.consumables.remove(idx));

        let snake = &mut state.snakes[i];
        snake.body.insert(0, snake.head);
        snake.head = next;
        snake.last_moved = snake.heading;
        match eaten {
            Some(Consumable { kind: ConsumableKind::Food, value, .. }) => {
                // the tail stays: one more segment
                snake.score += value;
            }
            Some(Consumable { kind: ConsumableKind::Poison, .. }) => {
                snake.body.pop();
                snake.alive = false;
            }
            None => {
                snake.body.pop();
            }
        }
    }

    replenish(state, rng);

    let outcome = verdict(state)?;
    state.is_over = true;
    if let Outcome::Winner(player) = &outcome {
        state.winner = Some(player.clone());
    }
    Some(outcome)
}

/// With several participants the last snake standing wins. Once every snake
/// is dead the unique top scorer wins, otherwise it is a draw.
pub fn verdict(state: &ArenaState) -> Option<Outcome> {
    let alive: Vec<_> = state.snakes.iter().filter(|s| s.alive).collect();
    match alive.len() {
        1 if state.snakes.len() > 1 => Some(Outcome::Winner(alive[0].player_id.clone())),
        0 if !state.snakes.is_empty() => {
            let best = state.snakes.iter().map(|s| s.score).max().unwrap_or(0);
            let mut leaders = state.snakes.iter().filter(|s| s.score == best);
            match (leaders.next(), leaders.next()) {
                (Some(leader), None) => Some(Outcome::Winner(leader.player_id.clone())),
                _ => Some(Outcome::Draw),
            }
        }
        _ => None,
    }
}
