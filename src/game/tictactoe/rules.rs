//! Board rules: move validation, line detection and turn rotation.

use crate::error::MoveError;
use crate::game::tictactoe::state::{BOARD_CELLS, BoardState, Mark};
use crate::game::types::Outcome;

#[rustfmt::skip]
const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2], [3, 4, 5], [6, 7, 8], // rows
    [0, 3, 6], [1, 4, 7], [2, 5, 8], // columns
    [0, 4, 8], [2, 4, 6],            // diagonals
];

/// Mark of a completed line, if any.
pub fn winning_mark(board: &[Option<Mark>; BOARD_CELLS]) -> Option<Mark> {
    WIN_LINES.iter().find_map(|&[a, b, c]| match board[a] {
        Some(mark) if board[b] == Some(mark) && board[c] == Some(mark) => Some(mark),
        _ => None,
    })
}

/// Validate and apply one move. Checks run in a fixed order so the first
/// failing rule decides the error.
pub fn apply_move(
    state: &mut BoardState,
    player: &str,
    index: i64,
) -> Result<Option<Outcome>, MoveError> {
    if state.is_over() {
        return Err(MoveError::GameOver);
    }
    if state.turn != player {
        return Err(MoveError::NotYourTurn);
    }
    let cell = usize::try_from(index)
        .ok()
        .filter(|&i| i < BOARD_CELLS)
        .ok_or(MoveError::InvalidCell(index))?;
    if state.board[cell].is_some() {
        return Err(MoveError::CellOccupied(cell));
    }
    let mark = state
        .mark_of(player)
        .ok_or_else(|| MoveError::NotParticipant(player.to_string()))?;

    state.board[cell] = Some(mark);
    state.moves += 1;

    if winning_mark(&state.board).is_some() {
        state.winner = Some(player.to_string());
        return Ok(Some(Outcome::Winner(player.to_string())));
    }
    if state.board.iter().all(Option::is_some) {
        state.is_draw = true;
        return Ok(Some(Outcome::Draw));
    }

    let next = state
        .players
        .iter()
        .find(|p| p.as_str() != player)
        .cloned()
        .unwrap_or_else(|| player.to_string());
    state.turn = next;
    Ok(None)
}
