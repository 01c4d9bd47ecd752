//! Draughts family: checkers, suicide checkers, shashki and Canadian draughts
//!
//! A capture is played one jump at a time. When the same piece can jump
//! again after landing, the jump carries `FLAG_CONTINUES`; the board then
//! keeps the turn and records the chain square, and the only legal moves are
//! that piece's next jumps.

use crate::board::{Board, Move, Piece, PieceKind, Side, Square, FLAG_CONTINUES, FLAG_ZEROING};
use crate::utils::{chebyshev, DIAGONAL};

use super::{Family, KindInfo, RuleOptions, Verdict};

pub const MAN: PieceKind = PieceKind(0);
pub const KING: PieceKind = PieceKind(1);

const NONE: &[(i8, i8)] = &[];
const NEAR_FORWARD: [(i8, i8); 2] = [(1, 1), (-1, 1)];
const FAR_FORWARD: [(i8, i8); 2] = [(1, -1), (-1, -1)];

static SHORT_KINDS: [KindInfo; 2] = [
    KindInfo { name: "man", symbol: 'M', value: 100, leaps: &DIAGONAL, slides: NONE },
    KindInfo { name: "king", symbol: 'K', value: 300, leaps: &DIAGONAL, slides: NONE },
];

static FLYING_KINDS: [KindInfo; 2] = [
    KindInfo { name: "man", symbol: 'M', value: 100, leaps: &DIAGONAL, slides: NONE },
    KindInfo { name: "king", symbol: 'K', value: 450, leaps: NONE, slides: &DIAGONAL },
];

/// When a man reaching the last rank during a capture is crowned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Crowning {
    /// Crowned, and the move ends there
    EndsMove,
    /// Crowned at once and keeps capturing as a king
    Immediate,
    /// Keeps capturing as a man if it can, crowned only where the capture ends
    AtEnd,
}

pub(super) struct DraughtsFamily {
    size: usize,
    rows: usize,
    men_capture_backward: bool,
    flying_kings: bool,
    crowning: Crowning,
    /// Losing all pieces or moves wins
    misere: bool,
}

pub(super) static CHECKERS: DraughtsFamily = CHECKERS_SHAPE;

pub(super) static SUICIDE: DraughtsFamily = DraughtsFamily {
    misere: true,
    ..CHECKERS_SHAPE
};

pub(super) static SHASHKI: DraughtsFamily = DraughtsFamily {
    size: 8,
    rows: 3,
    men_capture_backward: true,
    flying_kings: true,
    crowning: Crowning::Immediate,
    misere: false,
};

pub(super) static CANADIAN: DraughtsFamily = DraughtsFamily {
    size: 12,
    rows: 5,
    men_capture_backward: true,
    flying_kings: true,
    crowning: Crowning::AtEnd,
    misere: false,
};

const CHECKERS_SHAPE: DraughtsFamily = DraughtsFamily {
    size: 8,
    rows: 3,
    men_capture_backward: false,
    flying_kings: false,
    crowning: Crowning::EndsMove,
    misere: false,
};

impl DraughtsFamily {
    fn forward(side: Side) -> &'static [(i8, i8)] {
        match side {
            Side::Near => &NEAR_FORWARD,
            Side::Far => &FAR_FORWARD,
        }
    }

    fn jump_dirs(&self, piece: Piece) -> &'static [(i8, i8)] {
        if piece.kind == KING || self.men_capture_backward {
            &DIAGONAL
        } else {
            Self::forward(piece.side)
        }
    }

    fn step_dirs(piece: Piece) -> &'static [(i8, i8)] {
        if piece.kind == KING {
            &DIAGONAL
        } else {
            Self::forward(piece.side)
        }
    }

    fn is_flying(&self, piece: Piece) -> bool {
        piece.kind == KING && self.flying_kings
    }

    /// Single capturing jumps of the piece on `sq`, before continuation is decided
    fn raw_jumps(&self, board: &Board, sq: Square, piece: Piece) -> Vec<Move> {
        let mut out = Vec::new();
        let enemy = piece.side.opponent();
        for &(df, dr) in self.jump_dirs(piece) {
            if self.is_flying(piece) {
                let mut cur = sq;
                let victim = loop {
                    match board.offset(cur, df, dr) {
                        Some(next) if board.is_empty_at(next) => cur = next,
                        other => break other,
                    }
                };
                let Some(victim) = victim else {
                    continue;
                };
                if board.piece_on(victim).map(|p| p.side) != Some(enemy) {
                    continue;
                }
                let mut land = victim;
                while let Some(next) = board.offset(land, df, dr) {
                    if !board.is_empty_at(next) {
                        break;
                    }
                    out.push(Move::new(sq, next).with_capture(victim));
                    land = next;
                }
            } else {
                let Some(victim) = board.offset(sq, df, dr) else {
                    continue;
                };
                let Some(land) = board.offset(victim, df, dr) else {
                    continue;
                };
                if board.piece_on(victim).is_some_and(|p| p.side == enemy) && board.is_empty_at(land) {
                    out.push(Move::new(sq, land).with_capture(victim));
                }
            }
        }
        if piece.kind == MAN {
            for mv in &mut out {
                mv.flags |= FLAG_ZEROING;
            }
        }
        out
    }

    // Would `piece`, having made the jump `mv`, be able to jump again?
    fn can_continue(&self, board: &Board, mv: &Move, piece: Piece) -> bool {
        let mut scratch = board.clone();
        for &c in &mv.captured {
            scratch.set_piece(c, None);
        }
        scratch.set_piece(mv.from, None);
        scratch.set_piece(mv.to, Some(piece));
        !self.raw_jumps(&scratch, mv.to, piece).is_empty()
    }

    fn finish_jump(&self, board: &Board, mv: Move, piece: Piece) -> Move {
        let crowned = Piece::new(KING, piece.side);
        let reaches_last = piece.kind == MAN && board.rank_of(mv.to) == board.promotion_rank(piece.side);
        if !reaches_last {
            return if self.can_continue(board, &mv, piece) {
                mv.with_flags(FLAG_CONTINUES)
            } else {
                mv
            };
        }
        match self.crowning {
            Crowning::EndsMove => mv.with_promotion(KING),
            Crowning::Immediate => {
                let mv = mv.with_promotion(KING);
                if self.can_continue(board, &mv, crowned) {
                    mv.with_flags(FLAG_CONTINUES)
                } else {
                    mv
                }
            }
            Crowning::AtEnd => {
                if self.can_continue(board, &mv, piece) {
                    mv.with_flags(FLAG_CONTINUES)
                } else {
                    mv.with_promotion(KING)
                }
            }
        }
    }

    fn jumps_of(&self, board: &Board, sq: Square, piece: Piece) -> Vec<Move> {
        self.raw_jumps(board, sq, piece)
            .into_iter()
            .map(|mv| self.finish_jump(board, mv, piece))
            .collect()
    }

    fn steps_of(&self, board: &Board, sq: Square, piece: Piece, out: &mut Vec<Move>) {
        for &(df, dr) in Self::step_dirs(piece) {
            let mut cur = sq;
            while let Some(to) = board.offset(cur, df, dr) {
                if !board.is_empty_at(to) {
                    break;
                }
                let mv = Move::new(sq, to);
                if piece.kind == MAN {
                    let mv = mv.with_flags(FLAG_ZEROING);
                    if board.rank_of(to) == board.promotion_rank(piece.side) {
                        out.push(mv.with_promotion(KING));
                    } else {
                        out.push(mv);
                    }
                } else {
                    out.push(mv);
                }
                if !self.is_flying(piece) {
                    break;
                }
                cur = to;
            }
        }
    }

    /// Captures in this jump sequence if it starts with `mv`
    fn chain_length(&self, board: &Board, mv: &Move) -> usize {
        if !mv.continues() {
            return 1;
        }
        let mut scratch = board.clone();
        if scratch.apply(mv).is_none() {
            return 1;
        }
        let Some(piece) = scratch.piece_on(mv.to) else {
            return 1;
        };
        let longest = self
            .jumps_of(&scratch, mv.to, piece)
            .iter()
            .map(|next| self.chain_length(&scratch, next))
            .max()
            .unwrap_or(0);
        1 + longest
    }

    fn select(&self, board: &Board, jumps: Vec<Move>, options: &RuleOptions) -> Vec<Move> {
        if !options.majority_capture || jumps.len() < 2 {
            return jumps;
        }
        let lengths: Vec<usize> = jumps.iter().map(|mv| self.chain_length(board, mv)).collect();
        let best = lengths.iter().copied().max().unwrap_or(0);
        jumps
            .into_iter()
            .zip(lengths)
            .filter(|(_, len)| *len == best)
            .map(|(mv, _)| mv)
            .collect()
    }

    fn advancement(&self, board: &Board, sq: Square, side: Side) -> i32 {
        let rank = board.rank_of(sq);
        match side {
            Side::Near => rank as i32,
            Side::Far => (self.size - 1 - rank) as i32,
        }
    }
}

impl Family for DraughtsFamily {
    fn dimensions(&self) -> (usize, usize) {
        (self.size, self.size)
    }

    fn kinds(&self) -> &'static [KindInfo] {
        if self.flying_kings {
            &FLYING_KINDS
        } else {
            &SHORT_KINDS
        }
    }

    fn setup(&self, board: &mut Board, _options: &RuleOptions) {
        for rank in 0..self.size {
            let side = if rank < self.rows {
                Side::Near
            } else if rank >= self.size - self.rows {
                Side::Far
            } else {
                continue;
            };
            for file in (0..self.size).filter(|f| (f + rank) % 2 == 0) {
                if let Some(sq) = board.square(file, rank) {
                    board.set_piece(sq, Some(Piece::new(MAN, side)));
                }
            }
        }
    }

    fn generate(&self, board: &Board, options: &RuleOptions) -> Vec<Move> {
        if let Some(sq) = board.chain() {
            return match board.piece_on(sq) {
                Some(piece) => {
                    let jumps = self.jumps_of(board, sq, piece);
                    self.select(board, jumps, options)
                }
                None => Vec::new(),
            };
        }

        let mut jumps = Vec::new();
        let mut quiet = Vec::new();
        for (sq, piece) in board.pieces(board.side()) {
            jumps.extend(self.jumps_of(board, sq, piece));
            self.steps_of(board, sq, piece, &mut quiet);
        }
        if jumps.is_empty() {
            return quiet;
        }
        let mut moves = self.select(board, jumps, options);
        if !options.mandatory_capture {
            moves.extend(quiet);
        }
        moves
    }

    fn decided(&self, board: &Board) -> Option<Side> {
        let loser = match (board.count(Side::Near), board.count(Side::Far)) {
            (0, far) if far > 0 => Side::Near,
            (near, 0) if near > 0 => Side::Far,
            _ => return None,
        };
        Some(if self.misere { loser } else { loser.opponent() })
    }

    fn blocked(&self, board: &Board) -> Verdict {
        let side = board.side();
        if self.misere {
            Verdict::Win(side)
        } else {
            Verdict::Win(side.opponent())
        }
    }

    fn drawn(&self, board: &Board, options: &RuleOptions) -> bool {
        options
            .quiet_move_limit
            .is_some_and(|limit| board.halfmove >= limit)
    }

    fn heuristic(&self, board: &Board, side: Side) -> i32 {
        let kinds = self.kinds();
        let mut score = [0i32; 2];
        let mut material = [0i32; 2];
        for (sq, piece) in board.occupied() {
            let value = kinds.get(piece.kind.index()).map_or(0, |k| k.value);
            material[piece.side.index()] += value;
            score[piece.side.index()] += value;
            if piece.kind == MAN {
                score[piece.side.index()] += self.advancement(board, sq, piece.side) * 3;
            }
        }

        // The stronger side's kings close in on the remaining enemy pieces
        for strong in Side::BOTH {
            let weak = strong.opponent();
            if material[strong.index()] <= material[weak.index()] {
                continue;
            }
            let targets: Vec<Square> = board.pieces(weak).map(|(sq, _)| sq).collect();
            for (sq, piece) in board.pieces(strong) {
                if piece.kind != KING {
                    continue;
                }
                let nearest = targets
                    .iter()
                    .map(|&t| chebyshev(board.coords(sq), board.coords(t)))
                    .min()
                    .unwrap_or(0);
                score[strong.index()] -= nearest * 2;
            }
        }

        let total = score[side.index()] - score[side.opponent().index()];
        if self.misere {
            -total
        } else {
            total
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Rules, Status, Variant};

    fn place(board: &mut Board, file: usize, rank: usize, kind: PieceKind, side: Side) -> Square {
        let sq = board.square(file, rank).unwrap();
        board.set_piece(sq, Some(Piece::new(kind, side)));
        sq
    }

    #[test]
    fn flying_king_lands_anywhere_beyond() {
        let rules = Rules::new(Variant::Shashki);
        let mut board = rules.empty_board();
        place(&mut board, 0, 0, KING, Side::Near);
        let victim = place(&mut board, 3, 3, MAN, Side::Far);
        let moves = rules.generate_moves(&board);
        assert_eq!(moves.len(), 4);
        assert!(moves.iter().all(|m| m.captured == vec![victim]));
        assert!(moves.iter().all(|m| !m.continues()));
    }

    #[test]
    fn majority_capture_keeps_longest_sequence() {
        let rules = Rules::new(Variant::CanadianDraughts);
        let mut board = rules.empty_board();
        place(&mut board, 2, 2, MAN, Side::Near);
        place(&mut board, 1, 3, MAN, Side::Far);
        place(&mut board, 3, 3, MAN, Side::Far);
        place(&mut board, 5, 5, MAN, Side::Far);
        let moves = rules.generate_moves(&board);
        assert_eq!(moves.len(), 1);
        assert_eq!(rules.move_to_string(&board, &moves[0]), "c3xe5");
        assert!(moves[0].continues());

        // Without the majority rule both first jumps are legal
        let checkers = Rules::new(Variant::Checkers);
        let mut small = checkers.empty_board();
        place(&mut small, 2, 2, MAN, Side::Near);
        place(&mut small, 1, 3, MAN, Side::Far);
        place(&mut small, 3, 3, MAN, Side::Far);
        place(&mut small, 5, 5, MAN, Side::Far);
        assert_eq!(checkers.generate_moves(&small).len(), 2);
    }

    #[test]
    fn crowning_ends_checkers_capture_but_not_shashki() {
        for (variant, continues) in [(Variant::Checkers, false), (Variant::Shashki, true)] {
            let rules = Rules::new(variant);
            let mut board = rules.empty_board();
            place(&mut board, 1, 5, MAN, Side::Near);
            place(&mut board, 2, 6, MAN, Side::Far);
            place(&mut board, 4, 6, MAN, Side::Far);
            let moves = rules.generate_moves(&board);
            assert_eq!(moves.len(), 1, "{variant}");
            assert_eq!(moves[0].promotion, Some(KING), "{variant}");
            assert_eq!(moves[0].continues(), continues, "{variant}");
        }
    }

    #[test]
    fn suicide_inverts_the_winner() {
        let rules = Rules::new(Variant::Suicide);
        let mut board = rules.empty_board();
        place(&mut board, 4, 4, MAN, Side::Far);
        assert_eq!(rules.status(&board), Status::Won(Side::Near));

        let normal = Rules::new(Variant::Checkers);
        assert_eq!(normal.status(&board), Status::Won(Side::Far));
    }

    #[test]
    fn blocked_side_loses() {
        let rules = Rules::new(Variant::Checkers);
        let mut board = rules.empty_board();
        // Near man on a7, its only step blocked and the jump running off the board
        place(&mut board, 0, 6, MAN, Side::Near);
        place(&mut board, 1, 7, MAN, Side::Far);
        place(&mut board, 7, 7, MAN, Side::Far);
        assert!(rules.generate_moves(&board).is_empty());
        assert_eq!(rules.status(&board), Status::Won(Side::Far));
    }

    #[test]
    fn quiet_move_limit_draws() {
        let rules = Rules::new(Variant::Checkers);
        let mut board = rules.empty_board();
        place(&mut board, 0, 0, KING, Side::Near);
        place(&mut board, 7, 7, KING, Side::Far);
        board.halfmove = 80;
        assert_eq!(rules.status(&board), Status::Drawn);
    }
}
