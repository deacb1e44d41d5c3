use serde::{Deserialize, Serialize};

use crate::game::types::PlayerId;

pub const BOARD_CELLS: usize = 9;

/// Symbol placed on a cell. Fixed by participant index for the whole match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn for_index(index: usize) -> Self {
        if index == 0 { Mark::X } else { Mark::O }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardState {
    pub board: [Option<Mark>; BOARD_CELLS],
    /// Player expected to move next.
    pub turn: PlayerId,
    pub winner: Option<PlayerId>,
    pub is_draw: bool,
    pub players: Vec<PlayerId>,
    pub moves: u32,
}

impl BoardState {
    pub fn new(players: Vec<PlayerId>) -> Self {
        Self {
            board: [None; BOARD_CELLS],
            turn: players[0].clone(),
            winner: None,
            is_draw: false,
            players,
            moves: 0,
        }
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some() || self.is_draw
    }

    pub fn mark_of(&self, player: &str) -> Option<Mark> {
        self.players.iter().position(|p| p == player).map(Mark::for_index)
    }
}

/// Client payload of a tic-tac-toe move.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceMark {
    /// Cell index, row-major from the top-left corner.
    pub index: i64,
}
