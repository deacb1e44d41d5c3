use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, externally issued player identifier.
pub type PlayerId = String;

/// Identifier of a registered game type (e.g. "tic-tac-toe").
pub type GameId = String;

pub type MatchId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self { x: self.x + dx, y: self.y + dy }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Grid offset of one step. `y` grows downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_orthogonal_to(self, other: Direction) -> bool {
        self != other && self != other.opposite()
    }
}

/// Final verdict of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "player", rename_all = "snake_case")]
pub enum Outcome {
    Winner(PlayerId),
    Draw,
    /// Ended without a verdict from the rules.
    Abandoned,
}

/// What a successful move or tick did to the match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Set when the transition ended the game.
    pub finished: Option<Outcome>,
}

impl MoveOutcome {
    pub fn ongoing() -> Self {
        Self::default()
    }

    pub fn finished(outcome: Outcome) -> Self {
        Self { finished: Some(outcome) }
    }
}
