//! Ugolki ("corners"): each side races its nine stones into the opposite corner.
//!
//! A stone steps to an orthogonally adjacent empty square, or makes a chain
//! of orthogonal jumps over single stones of either side. A chain is one
//! move; every distinct landing square of a chain is offered once.

use std::collections::VecDeque;

use crate::board::{Board, Move, Piece, PieceKind, Side, Square};
use crate::utils::{manhattan, ORTHOGONAL};

use super::{Family, KindInfo, RuleOptions, Verdict};

pub const STONE: PieceKind = PieceKind(0);

static KINDS: [KindInfo; 1] = [KindInfo {
    name: "stone",
    symbol: 'S',
    value: 0,
    leaps: &ORTHOGONAL,
    slides: &[],
}];

const SIZE: usize = 8;
const CORNER: usize = 3;

pub(super) struct Ugolki;

pub(super) static UGOLKI: Ugolki = Ugolki;

impl Ugolki {
    fn in_home(board: &Board, sq: Square, side: Side) -> bool {
        let (file, rank) = board.coords(sq);
        match side {
            Side::Near => file < CORNER && rank < CORNER,
            Side::Far => file >= SIZE - CORNER && rank >= SIZE - CORNER,
        }
    }

    // Far corner each side is heading for
    fn target(side: Side) -> (usize, usize) {
        match side {
            Side::Near => (SIZE - 1, SIZE - 1),
            Side::Far => (0, 0),
        }
    }

    fn jumps_from(board: &Board, origin: Square, moves: &mut Vec<Move>) {
        let mut seen = vec![false; board.size()];
        seen[origin] = true;
        let mut queue = VecDeque::from([origin]);
        while let Some(cur) = queue.pop_front() {
            for &(df, dr) in ORTHOGONAL.iter() {
                let Some(over) = board.offset(cur, df, dr) else {
                    continue;
                };
                let Some(land) = board.offset(over, df, dr) else {
                    continue;
                };
                // the moving stone has left its origin
                let stone_between = over != origin && !board.is_empty_at(over);
                if stone_between && board.is_empty_at(land) && !seen[land] {
                    seen[land] = true;
                    queue.push_back(land);
                    moves.push(Move::new(origin, land));
                }
            }
        }
    }

    fn distance(board: &Board, side: Side) -> i32 {
        let target = Self::target(side);
        board
            .pieces(side)
            .map(|(sq, _)| manhattan(board.coords(sq), target))
            .sum()
    }
}

impl Family for Ugolki {
    fn dimensions(&self) -> (usize, usize) {
        (SIZE, SIZE)
    }

    fn kinds(&self) -> &'static [KindInfo] {
        &KINDS
    }

    fn setup(&self, board: &mut Board, _options: &RuleOptions) {
        for side in Side::BOTH {
            for rank in 0..SIZE {
                for file in 0..SIZE {
                    if let Some(sq) = board.square(file, rank) {
                        if Self::in_home(board, sq, side) {
                            board.set_piece(sq, Some(Piece::new(STONE, side)));
                        }
                    }
                }
            }
        }
    }

    fn generate(&self, board: &Board, _options: &RuleOptions) -> Vec<Move> {
        let mut moves = Vec::new();
        for (sq, _) in board.pieces(board.side()) {
            for &(df, dr) in ORTHOGONAL.iter() {
                if let Some(to) = board.offset(sq, df, dr) {
                    if board.is_empty_at(to) {
                        moves.push(Move::new(sq, to));
                    }
                }
            }
            Self::jumps_from(board, sq, &mut moves);
        }
        moves
    }

    fn decided(&self, board: &Board) -> Option<Side> {
        Side::BOTH.into_iter().find(|&side| {
            board.count(side) > 0
                && board
                    .pieces(side)
                    .all(|(sq, _)| Self::in_home(board, sq, side.opponent()))
        })
    }

    fn blocked(&self, board: &Board) -> Verdict {
        Verdict::Win(board.side().opponent())
    }

    fn drawn(&self, _board: &Board, _options: &RuleOptions) -> bool {
        false
    }

    fn heuristic(&self, board: &Board, side: Side) -> i32 {
        let arrived = |s: Side| {
            board
                .pieces(s)
                .filter(|&(sq, _)| Self::in_home(board, sq, s.opponent()))
                .count() as i32
        };
        let score = |s: Side| arrived(s) * 15 - Self::distance(board, s) * 10;
        score(side) - score(side.opponent())
    }
}
