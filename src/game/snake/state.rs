use serde::{Deserialize, Serialize};

use crate::config::game::{
    ARENA_HEIGHT, ARENA_WIDTH, FOOD_TARGET, FOOD_VALUE, POISON_TARGET, START_BODY_LEN,
};
use crate::config::matchmaking::SNAKE_PLAYERS;
use crate::game::types::{Direction, PlayerId, Position};

/// Tunables of one arena. Fixed for the lifetime of the engine.
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    pub width: i32,
    pub height: i32,
    pub players: usize,
    pub food_value: u32,
    pub food_target: usize,
    pub poison_target: usize,
    pub start_body_len: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            players: SNAKE_PLAYERS,
            food_value: FOOD_VALUE,
            food_target: FOOD_TARGET,
            poison_target: POISON_TARGET,
            start_body_len: START_BODY_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnakeEntity {
    pub player_id: PlayerId,
    pub head: Position,
    /// Trailing segments, nearest to the head first.
    pub body: Vec<Position>,
    /// Direction applied at the next tick.
    pub heading: Direction,
    /// Direction of the last step actually taken.
    pub last_moved: Direction,
    pub alive: bool,
    pub score: u32,
}

impl SnakeEntity {
    pub fn new(player_id: PlayerId, head: Position, heading: Direction, body_len: usize) -> Self {
        let back = heading.opposite();
        let body = (0..body_len)
            .scan(head, |pos, _| {
                *pos = pos.step(back);
                Some(*pos)
            })
            .collect();
        Self {
            player_id,
            head,
            body,
            heading,
            last_moved: heading,
            alive: true,
            score: 0,
        }
    }

    pub fn occupies(&self, pos: Position) -> bool {
        self.head == pos || self.body.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.body.len() + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumableKind {
    Food,
    Poison,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumable {
    pub pos: Position,
    pub kind: ConsumableKind,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaState {
    pub width: i32,
    pub height: i32,
    /// One entity per participant, in participant order. Dead entities stay.
    pub snakes: Vec<SnakeEntity>,
    pub consumables: Vec<Consumable>,
    pub tick: u64,
    pub food_value: u32,
    pub food_target: usize,
    pub poison_target: usize,
    pub winner: Option<PlayerId>,
    pub is_over: bool,
}

impl ArenaState {
    /// Empty arena using the board settings of `config`.
    pub fn empty(config: &ArenaConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            snakes: Vec::new(),
            consumables: Vec::new(),
            tick: 0,
            food_value: config.food_value,
            food_target: config.food_target,
            poison_target: config.poison_target,
            winner: None,
            is_over: false,
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// True if any entity, alive or dead, covers `pos`.
    pub fn is_blocked(&self, pos: Position) -> bool {
        self.snakes.iter().any(|s| s.occupies(pos))
    }

    pub fn is_free(&self, pos: Position) -> bool {
        self.in_bounds(pos)
            && !self.is_blocked(pos)
            && !self.consumables.iter().any(|c| c.pos == pos)
    }

    pub fn snake_mut(&mut self, player: &str) -> Option<&mut SnakeEntity> {
        self.snakes.iter_mut().find(|s| s.player_id == player)
    }

    pub fn count(&self, kind: ConsumableKind) -> usize {
        self.consumables.iter().filter(|c| c.kind == kind).count()
    }
}

/// Client payload of a snake move.
#[derive(Debug, Clone, Deserialize)]
pub struct SteerMove {
    pub direction: Direction,
}
