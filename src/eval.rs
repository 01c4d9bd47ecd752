//! Position evaluation
//!
//! Every score is seen from the side to move. Decided positions get a
//! sentinel beyond any heuristic value; the remaining search depth is added
//! to it so that quicker wins and slower losses are preferred.

use crate::board::Board;
use crate::game::Game;
use crate::rules::{Rules, Status};

// ============================================================================
// SENTINELS
// ============================================================================

/// Score of a won position at depth 0
pub const WIN: i32 = 1_000_000;
/// Score of a lost position at depth 0, the lowest value `evaluate` returns at a leaf
pub const LOSS: i32 = -WIN;
pub const DRAW: i32 = 0;
/// Heuristic scores are clamped to this magnitude
pub const HEURISTIC_LIMIT: i32 = WIN / 2;

/// Evaluate `game`'s position for the side to move
///
/// `depth` is the search depth still remaining at this node (0 for a plain
/// query). A checkmated side to move gets `LOSS` at depth 0.
pub fn evaluate(game: &Game, depth: u8) -> i32 {
    evaluate_board(game.rules(), game.board(), depth)
}

/// Same as [`evaluate`] for a bare board
pub fn evaluate_board(rules: &Rules, board: &Board, depth: u8) -> i32 {
    let moves = rules.generate_moves(board);
    score_status(rules, board, rules.status_with(board, &moves), depth)
}

/// Score a position whose status is already known
pub(crate) fn score_status(rules: &Rules, board: &Board, status: Status, depth: u8) -> i32 {
    let side = board.side();
    match status {
        Status::Won(winner) if winner == side => WIN + depth as i32,
        Status::Won(_) => -(WIN + depth as i32),
        Status::Drawn => DRAW,
        Status::Ongoing => heuristic(rules, board),
    }
}

/// Variant heuristic for the side to move, kept inside the sentinels
pub fn heuristic(rules: &Rules, board: &Board) -> i32 {
    rules
        .heuristic(board, board.side())
        .clamp(-HEURISTIC_LIMIT, HEURISTIC_LIMIT)
}

/// Whether `score` reports a decided game
pub fn is_decisive(score: i32) -> bool {
    score.abs() >= WIN
}
