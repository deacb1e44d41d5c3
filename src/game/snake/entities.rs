//! Spawning of snakes and consumables.

use log::warn;
use rand::Rng;
use rand::seq::IteratorRandom;

use crate::error::EngineError;
use crate::game::snake::state::{ArenaConfig, ArenaState, Consumable, ConsumableKind, SnakeEntity};
use crate::game::types::{Direction, PlayerId, Position};

/// Place one snake per participant on fixed starting lanes. Even indices
/// start on the left heading right, odd indices on the right heading left,
/// so the layout only depends on the participant ordering.
pub fn spawn_snakes(
    config: &ArenaConfig,
    players: &[PlayerId],
) -> Result<Vec<SnakeEntity>, EngineError> {
    let lanes = players.len().div_ceil(2) as i32;
    let margin = config.start_body_len as i32;
    if config.width < 2 * (margin + 1) + 1 || config.height < lanes + 1 {
        return Err(EngineError::BoardTooSmall(players.len()));
    }

    let snakes = players
        .iter()
        .enumerate()
        .map(|(i, player)| {
            let lane = (i / 2) as i32;
            let y = (lane + 1) * config.height / (lanes + 1);
            let (x, heading) = if i % 2 == 0 {
                (margin, Direction::Right)
            } else {
                (config.width - 1 - margin, Direction::Left)
            };
            SnakeEntity::new(player.clone(), Position::new(x, y), heading, config.start_body_len)
        })
        .collect();
    Ok(snakes)
}

/// Pick a random free cell, if any is left.
pub fn free_cell<R: Rng + ?Sized>(state: &ArenaState, rng: &mut R) -> Option<Position> {
    (0..state.height)
        .flat_map(|y| (0..state.width).map(move |x| Position::new(x, y)))
        .filter(|pos| state.is_free(*pos))
        .choose(rng)
}

/// Top consumables back up to their target counts.
pub fn replenish<R: Rng + ?Sized>(state: &mut ArenaState, rng: &mut R) {
    for (kind, target, value) in [
        (ConsumableKind::Food, state.food_target, state.food_value),
        (ConsumableKind::Poison, state.poison_target, 0),
    ] {
        while state.count(kind) < target {
            match free_cell(state, rng) {
                Some(pos) => state.consumables.push(Consumable { pos, kind, value }),
                None => {
                    warn!("[Snake] No free tile to place a {:?}", kind);
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn players(n: usize) -> Vec<PlayerId> {
        (0..n).map(|i| format!("p{}", i)).collect()
    }

    #[test]
    fn test_spawn_layout_is_deterministic_and_disjoint() {
        let config = ArenaConfig::default();
        let snakes = spawn_snakes(&config, &players(4)).unwrap();
        assert_eq!(snakes, spawn_snakes(&config, &players(4)).unwrap());
        for (i, a) in snakes.iter().enumerate() {
            assert_eq!(a.len(), config.start_body_len + 1);
            for b in snakes.iter().skip(i + 1) {
                assert!(!a.occupies(b.head));
                assert!(b.body.iter().all(|pos| !a.occupies(*pos)));
            }
        }
        assert_eq!(snakes[0].heading, Direction::Right);
        assert_eq!(snakes[1].heading, Direction::Left);
    }

    #[test]
    fn test_spawn_rejects_tiny_board() {
        let config = ArenaConfig { width: 4, height: 2, ..ArenaConfig::default() };
        assert_eq!(spawn_snakes(&config, &players(2)), Err(EngineError::BoardTooSmall(2)));
    }

    #[test]
    fn test_replenish_uses_free_cells_only() {
        let config = ArenaConfig::default();
        let mut state = ArenaState::empty(&config);
        state.snakes = spawn_snakes(&config, &players(2)).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        replenish(&mut state, &mut rng);
        assert_eq!(state.count(ConsumableKind::Food), config.food_target);
        assert_eq!(state.count(ConsumableKind::Poison), config.poison_target);
        for item in &state.consumables {
            assert!(!state.is_blocked(item.pos));
            assert!(state.in_bounds(item.pos));
        }
    }

    #[test]
    fn test_replenish_stops_when_board_is_full() {
        let config = ArenaConfig {
            width: 2,
            height: 1,
            food_target: 5,
            poison_target: 0,
            ..ArenaConfig::default()
        };
        let mut state = ArenaState::empty(&config);
        let mut rng = StdRng::seed_from_u64(1);
        replenish(&mut state, &mut rng);
        assert_eq!(state.consumables.len(), 2);
    }
}
