//! Chess family: orthodox chess and the 10x8 dragon variant
//!
//! Moves are generated pseudo-legally from the kind table (leaps and slides)
//! and then filtered by playing each one on a scratch board and checking that
//! the mover's king is not left attacked.

use crate::board::{
    Board, Move, Piece, PieceKind, Side, Square, CASTLE_ALL, CASTLE_FAR_KING, CASTLE_FAR_QUEEN,
    CASTLE_NEAR_KING, CASTLE_NEAR_QUEEN, FLAG_CASTLE_KING, FLAG_CASTLE_QUEEN, FLAG_DOUBLE_PUSH,
    FLAG_EN_PASSANT, FLAG_KING_MOVE, FLAG_ZEROING,
};
use crate::error::{GameError, GameResult};
use crate::utils::{chebyshev, parse_square, DIAGONAL, KING_STEPS, KNIGHT_LEAPS, ORTHOGONAL};

use super::{Family, KindInfo, RuleOptions, Verdict};

pub const PAWN: PieceKind = PieceKind(0);
pub const KNIGHT: PieceKind = PieceKind(1);
pub const BISHOP: PieceKind = PieceKind(2);
pub const ROOK: PieceKind = PieceKind(3);
pub const QUEEN: PieceKind = PieceKind(4);
pub const KING: PieceKind = PieceKind(5);
/// Knight leaps plus bishop slides
pub const DRAGON: PieceKind = PieceKind(6);

const NONE: &[(i8, i8)] = &[];

static CHESS_KINDS: [KindInfo; 6] = [
    KindInfo { name: "pawn", symbol: 'P', value: 100, leaps: NONE, slides: NONE },
    KindInfo { name: "knight", symbol: 'N', value: 320, leaps: &KNIGHT_LEAPS, slides: NONE },
    KindInfo { name: "bishop", symbol: 'B', value: 330, leaps: NONE, slides: &DIAGONAL },
    KindInfo { name: "rook", symbol: 'R', value: 500, leaps: NONE, slides: &ORTHOGONAL },
    KindInfo { name: "queen", symbol: 'Q', value: 900, leaps: NONE, slides: &KING_STEPS },
    KindInfo { name: "king", symbol: 'K', value: 0, leaps: &KING_STEPS, slides: NONE },
];

static DRAGON_KINDS: [KindInfo; 7] = [
    KindInfo { name: "pawn", symbol: 'P', value: 100, leaps: NONE, slides: NONE },
    KindInfo { name: "knight", symbol: 'N', value: 320, leaps: &KNIGHT_LEAPS, slides: NONE },
    KindInfo { name: "bishop", symbol: 'B', value: 330, leaps: NONE, slides: &DIAGONAL },
    KindInfo { name: "rook", symbol: 'R', value: 500, leaps: NONE, slides: &ORTHOGONAL },
    KindInfo { name: "queen", symbol: 'Q', value: 900, leaps: NONE, slides: &KING_STEPS },
    KindInfo { name: "king", symbol: 'K', value: 0, leaps: &KING_STEPS, slides: NONE },
    KindInfo { name: "dragon", symbol: 'D', value: 700, leaps: &KNIGHT_LEAPS, slides: &DIAGONAL },
];

pub(super) struct ChessFamily {
    width: usize,
    back_rank: &'static [PieceKind],
    kinds: &'static [KindInfo],
    promotions: &'static [PieceKind],
}

pub(super) static CHESS: ChessFamily = ChessFamily {
    width: 8,
    back_rank: &[ROOK, KNIGHT, BISHOP, QUEEN, KING, BISHOP, KNIGHT, ROOK],
    kinds: &CHESS_KINDS,
    promotions: &[QUEEN, ROOK, BISHOP, KNIGHT],
};

pub(super) static DRAGON_CHESS: ChessFamily = ChessFamily {
    width: 10,
    back_rank: &[ROOK, KNIGHT, BISHOP, DRAGON, QUEEN, KING, DRAGON, BISHOP, KNIGHT, ROOK],
    kinds: &DRAGON_KINDS,
    promotions: &[QUEEN, DRAGON, ROOK, BISHOP, KNIGHT],
};

const HEIGHT: usize = 8;

impl ChessFamily {
    fn home_rank(side: Side) -> usize {
        match side {
            Side::Near => 0,
            Side::Far => HEIGHT - 1,
        }
    }

    fn king_home_file(&self) -> Option<usize> {
        self.back_rank.iter().position(|&k| k == KING)
    }

    fn is_attacked(&self, board: &Board, sq: Square, attacker: Side) -> bool {
        attacked_by(board, self.kinds, sq, attacker)
    }

    fn king_square(board: &Board, side: Side) -> Option<Square> {
        board.find(Piece::new(KING, side))
    }

    fn pseudo_moves(&self, board: &Board, options: &RuleOptions) -> Vec<Move> {
        let side = board.side();
        let mut moves = Vec::with_capacity(64);
        for (sq, piece) in board.pieces(side) {
            if piece.kind == PAWN {
                self.pawn_moves(board, sq, side, &mut moves);
                continue;
            }
            let Some(info) = self.kinds.get(piece.kind.index()) else {
                continue;
            };
            let extra = if piece.kind == KING { FLAG_KING_MOVE } else { 0 };
            for &(df, dr) in info.leaps {
                if let Some(to) = board.offset(sq, df, dr) {
                    push_target(board, sq, to, side, extra, &mut moves);
                }
            }
            for &(df, dr) in info.slides {
                let mut cur = sq;
                while let Some(to) = board.offset(cur, df, dr) {
                    push_target(board, sq, to, side, extra, &mut moves);
                    if board.piece_on(to).is_some() {
                        break;
                    }
                    cur = to;
                }
            }
            if piece.kind == KING && options.castling {
                self.castling_moves(board, sq, side, &mut moves);
            }
        }
        moves
    }

    fn pawn_moves(&self, board: &Board, sq: Square, side: Side, moves: &mut Vec<Move>) {
        let fwd = side.forward();
        let last = board.promotion_rank(side);
        let start = match side {
            Side::Near => 1,
            Side::Far => HEIGHT - 2,
        };
        let mut push = |mv: Move| {
            if board.rank_of(mv.to) == last {
                for &kind in self.promotions {
                    moves.push(mv.clone().with_promotion(kind));
                }
            } else {
                moves.push(mv);
            }
        };

        if let Some(one) = board.offset(sq, 0, fwd) {
            if board.is_empty_at(one) {
                push(Move::new(sq, one).with_flags(FLAG_ZEROING));
                if board.rank_of(sq) == start {
                    if let Some(two) = board.offset(one, 0, fwd) {
                        if board.is_empty_at(two) {
                            push(Move::new(sq, two).with_flags(FLAG_ZEROING | FLAG_DOUBLE_PUSH));
                        }
                    }
                }
            }
        }
        for df in [-1, 1] {
            let Some(to) = board.offset(sq, df, fwd) else {
                continue;
            };
            match board.piece_on(to) {
                Some(p) if p.side != side => {
                    push(Move::new(sq, to).with_capture(to).with_flags(FLAG_ZEROING));
                }
                None if board.ep() == Some(to) => {
                    if let Some(victim) = board.offset(to, 0, -fwd) {
                        if board.piece_on(victim) == Some(Piece::new(PAWN, side.opponent())) {
                            push(
                                Move::new(sq, to)
                                    .with_capture(victim)
                                    .with_flags(FLAG_ZEROING | FLAG_EN_PASSANT),
                            );
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn castling_moves(&self, board: &Board, king_sq: Square, side: Side, moves: &mut Vec<Move>) {
        let rank = Self::home_rank(side);
        let Some(home) = self.king_home_file() else {
            return;
        };
        if board.square(home, rank) != Some(king_sq) {
            return;
        }
        let (king_right, queen_right) = match side {
            Side::Near => (CASTLE_NEAR_KING, CASTLE_NEAR_QUEEN),
            Side::Far => (CASTLE_FAR_KING, CASTLE_FAR_QUEEN),
        };
        let enemy = side.opponent();
        if self.is_attacked(board, king_sq, enemy) {
            return;
        }
        let width = board.width();
        // (right, rook file, king destination file, flag)
        let wings = [
            (king_right, width - 1, width - 2, FLAG_CASTLE_KING),
            (queen_right, 0, 2, FLAG_CASTLE_QUEEN),
        ];
        for (right, rook_file, king_to, flag) in wings {
            if board.castling() & right == 0 {
                continue;
            }
            let (Some(rook_sq), Some(to)) = (board.square(rook_file, rank), board.square(king_to, rank))
            else {
                continue;
            };
            if board.piece_on(rook_sq) != Some(Piece::new(ROOK, side)) {
                continue;
            }
            let (lo, hi) = (home.min(rook_file), home.max(rook_file));
            let clear = (lo + 1..hi)
                .filter_map(|f| board.square(f, rank))
                .all(|s| board.is_empty_at(s));
            if !clear {
                continue;
            }
            let (a, b) = (home.min(king_to), home.max(king_to));
            let safe = (a..=b)
                .filter_map(|f| board.square(f, rank))
                .all(|s| s == king_sq || !self.is_attacked(board, s, enemy));
            if safe {
                moves.push(Move::new(king_sq, to).with_flags(flag | FLAG_KING_MOVE));
            }
        }
    }

    fn material(&self, board: &Board, side: Side) -> i32 {
        board
            .pieces(side)
            .map(|(_, p)| self.kinds.get(p.kind.index()).map_or(0, |k| k.value))
            .sum()
    }

    fn insufficient_material(&self, board: &Board) -> bool {
        let mut minors: Vec<(Side, PieceKind, Square)> = Vec::new();
        for (sq, piece) in board.occupied() {
            match piece.kind {
                KING => {}
                KNIGHT | BISHOP => minors.push((piece.side, piece.kind, sq)),
                _ => return false,
            }
        }
        match minors.as_slice() {
            [] | [_] => true,
            [(s1, BISHOP, a), (s2, BISHOP, b)] if s1 != s2 => {
                let colour = |sq: Square| (board.file_of(sq) + board.rank_of(sq)) % 2;
                colour(*a) == colour(*b)
            }
            _ => false,
        }
    }

    // Distance from the board centre, scaled so even widths work
    fn centre_distance(board: &Board, sq: Square) -> i32 {
        let (file, rank) = board.coords(sq);
        let dx = (2 * file as i32 - (board.width() as i32 - 1)).abs();
        let dy = (2 * rank as i32 - (board.height() as i32 - 1)).abs();
        (dx + dy) / 2
    }
}

fn push_target(board: &Board, from: Square, to: Square, side: Side, extra: u32, moves: &mut Vec<Move>) {
    match board.piece_on(to) {
        None => moves.push(Move::new(from, to).with_flags(extra)),
        Some(p) if p.side != side => moves.push(Move::new(from, to).with_capture(to).with_flags(extra)),
        Some(_) => {}
    }
}

/// Whether `attacker` attacks `sq` with any piece of the kind table
pub(crate) fn attacked_by(board: &Board, kinds: &[KindInfo], sq: Square, attacker: Side) -> bool {
    let attacker_on = |target: Option<Square>| {
        target
            .and_then(|t| board.piece_on(t))
            .filter(|p| p.side == attacker)
    };

    // Pawns capture towards their forward direction
    let back = -attacker.forward();
    for df in [-1, 1] {
        if attacker_on(board.offset(sq, df, back)).is_some_and(|p| p.kind == PAWN) {
            return true;
        }
    }

    for (index, info) in kinds.iter().enumerate() {
        let kind = PieceKind(index as u8);
        for &(df, dr) in info.leaps {
            if attacker_on(board.offset(sq, -df, -dr)).is_some_and(|p| p.kind == kind) {
                return true;
            }
        }
    }

    for &(df, dr) in KING_STEPS.iter() {
        let mut cur = sq;
        while let Some(next) = board.offset(cur, df, dr) {
            if let Some(p) = board.piece_on(next) {
                if p.side == attacker {
                    let slides = kinds.get(p.kind.index()).map_or(NONE, |k| k.slides);
                    if slides.contains(&(-df, -dr)) {
                        return true;
                    }
                }
                break;
            }
            cur = next;
        }
    }
    false
}

impl Family for ChessFamily {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, HEIGHT)
    }

    fn kinds(&self) -> &'static [KindInfo] {
        self.kinds
    }

    fn setup(&self, board: &mut Board, options: &RuleOptions) {
        for (file, &kind) in self.back_rank.iter().enumerate() {
            for side in Side::BOTH {
                let home = Self::home_rank(side);
                let pawn_rank = match side {
                    Side::Near => 1,
                    Side::Far => HEIGHT - 2,
                };
                if let Some(sq) = board.square(file, home) {
                    board.set_piece(sq, Some(Piece::new(kind, side)));
                }
                if let Some(sq) = board.square(file, pawn_rank) {
                    board.set_piece(sq, Some(Piece::new(PAWN, side)));
                }
            }
        }
        board.set_castling(if options.castling { CASTLE_ALL } else { 0 });
    }

    fn generate(&self, board: &Board, options: &RuleOptions) -> Vec<Move> {
        let side = board.side();
        let pseudo = self.pseudo_moves(board, options);
        let mut scratch = board.clone();
        pseudo
            .into_iter()
            .filter(|mv| match scratch.apply(mv) {
                Some(undo) => {
                    let safe = match Self::king_square(&scratch, side) {
                        Some(k) => !self.is_attacked(&scratch, k, side.opponent()),
                        None => true,
                    };
                    scratch.unmake_move(undo);
                    safe
                }
                None => false,
            })
            .collect()
    }

    fn decided(&self, board: &Board) -> Option<Side> {
        let near = Self::king_square(board, Side::Near).is_some();
        let far = Self::king_square(board, Side::Far).is_some();
        match (near, far) {
            (true, false) => Some(Side::Near),
            (false, true) => Some(Side::Far),
            _ => None,
        }
    }

    fn blocked(&self, board: &Board) -> Verdict {
        let side = board.side();
        if self.in_check(board, side) {
            Verdict::Win(side.opponent())
        } else {
            Verdict::Draw
        }
    }

    fn drawn(&self, board: &Board, options: &RuleOptions) -> bool {
        if options.fifty_move_rule && board.halfmove >= 100 {
            return true;
        }
        self.insufficient_material(board)
    }

    fn heuristic(&self, board: &Board, side: Side) -> i32 {
        let mut score = [0i32; 2];
        for (sq, piece) in board.occupied() {
            let s = &mut score[piece.side.index()];
            let centre = Self::centre_distance(board, sq);
            match piece.kind {
                PAWN => {
                    let advance = match piece.side {
                        Side::Near => board.rank_of(sq) as i32 - 1,
                        Side::Far => (HEIGHT - 2) as i32 - board.rank_of(sq) as i32,
                    };
                    *s += advance * 6;
                }
                KNIGHT | BISHOP | DRAGON => *s -= centre * 4,
                QUEEN => *s -= centre * 2,
                _ => {}
            }
        }
        let material = [self.material(board, Side::Near), self.material(board, Side::Far)];
        score[0] += material[0];
        score[1] += material[1];

        // Drive the lone king to the edge when clearly ahead
        for strong in Side::BOTH {
            let weak = strong.opponent();
            if material[strong.index()] - material[weak.index()] < 300 {
                continue;
            }
            if let (Some(sk), Some(wk)) = (
                Self::king_square(board, strong),
                Self::king_square(board, weak),
            ) {
                let kings = chebyshev(board.coords(sk), board.coords(wk));
                score[strong.index()] += Self::centre_distance(board, wk) * 10 - kings * 4;
            }
        }

        score[side.index()] - score[side.opponent().index()]
    }

    fn in_check(&self, board: &Board, side: Side) -> bool {
        Self::king_square(board, side)
            .is_some_and(|k| self.is_attacked(board, k, side.opponent()))
    }
}

/// Build an 8x8 chess board from a FEN string
pub fn board_from_fen(fen: &str) -> GameResult<Board> {
    let bad = |reason: &str| GameError::format(1, format!("{reason} in FEN '{fen}'"));
    let mut fields = fen.split_whitespace();
    let placement = fields.next().ok_or_else(|| bad("missing placement"))?;
    let mut board = Board::new(8, 8);

    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != 8 {
        return Err(bad("expected 8 ranks"));
    }
    for (i, row) in rows.iter().enumerate() {
        let rank = 7 - i;
        let mut file = 0usize;
        for ch in row.chars() {
            if let Some(skip) = ch.to_digit(10) {
                file += skip as usize;
                continue;
            }
            let kind = match ch.to_ascii_lowercase() {
                'p' => PAWN,
                'n' => KNIGHT,
                'b' => BISHOP,
                'r' => ROOK,
                'q' => QUEEN,
                'k' => KING,
                _ => return Err(bad("unknown piece")),
            };
            let side = if ch.is_ascii_uppercase() { Side::Near } else { Side::Far };
            let sq = board.square(file, rank).ok_or_else(|| bad("rank too long"))?;
            board.set_piece(sq, Some(Piece::new(kind, side)));
            file += 1;
        }
        if file != 8 {
            return Err(bad("rank has wrong length"));
        }
    }

    let side = match fields.next().unwrap_or("w") {
        "w" => Side::Near,
        "b" => Side::Far,
        _ => return Err(bad("invalid side to move")),
    };
    board.set_side(side);

    let mut castling = 0u8;
    for ch in fields.next().unwrap_or("-").chars() {
        castling |= match ch {
            'K' => CASTLE_NEAR_KING,
            'Q' => CASTLE_NEAR_QUEEN,
            'k' => CASTLE_FAR_KING,
            'q' => CASTLE_FAR_QUEEN,
            '-' => 0,
            _ => return Err(bad("invalid castling rights")),
        };
    }
    board.set_castling(castling);

    match fields.next().unwrap_or("-") {
        "-" => {}
        ep => {
            let sq = parse_square(ep, 8, 8).map_err(bad)?;
            board.set_ep(Some(sq));
        }
    }

    board.halfmove = fields
        .next()
        .map(|h| h.parse::<u16>().map_err(|_| bad("invalid halfmove clock")))
        .transpose()?
        .unwrap_or(0);
    let fullmove = fields
        .next()
        .map(|f| f.parse::<u32>().map_err(|_| bad("invalid move number")))
        .transpose()?
        .unwrap_or(1)
        .max(1);
    board.ply = (fullmove - 1) * 2 + u32::from(side == Side::Far);
    board.reset_history();
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Rules, Status, Variant};

    #[test]
    fn fool_mate_is_checkmate() {
        let rules = Rules::new(Variant::Chess);
        let mut board = rules.setup_board();
        for text in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            let mv = rules.parse_move(&board, text).unwrap();
            board.make_move(&mv).unwrap();
        }
        assert!(rules.in_check(&board, Side::Near));
        assert!(rules.generate_moves(&board).is_empty());
        assert_eq!(rules.status(&board), Status::Won(Side::Far));
    }

    #[test]
    fn castling_both_wings() {
        let rules = Rules::new(Variant::Chess);
        let board = board_from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let moves = rules.generate_moves(&board);
        let castles: Vec<_> = moves
            .iter()
            .filter(|m| m.has_flag(FLAG_CASTLE_KING | FLAG_CASTLE_QUEEN))
            .map(|m| rules.move_to_string(&board, m))
            .collect();
        assert_eq!(castles, vec!["e1-g1", "e1-c1"]);
    }

    #[test]
    fn no_castling_through_attack() {
        let rules = Rules::new(Variant::Chess);
        // Far rook on f8 covers f1
        let board = board_from_fen("k4r2/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let castles = rules
            .generate_moves(&board)
            .iter()
            .filter(|m| m.has_flag(FLAG_CASTLE_KING))
            .count();
        assert_eq!(castles, 0);
    }

    #[test]
    fn en_passant_is_generated() {
        let rules = Rules::new(Variant::Chess);
        let board = board_from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        let ep: Vec<_> = rules
            .generate_moves(&board)
            .into_iter()
            .filter(|m| m.has_flag(FLAG_EN_PASSANT))
            .collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(rules.move_to_string(&board, &ep[0]), "e5xd6");
    }

    #[test]
    fn promotion_offers_every_piece() {
        let rules = Rules::new(Variant::Chess);
        let board = board_from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let promos = rules
            .generate_moves(&board)
            .into_iter()
            .filter(|m| m.promotion.is_some())
            .count();
        assert_eq!(promos, 4);
        let mv = rules.parse_move(&board, "a7a8n").unwrap();
        assert_eq!(mv.promotion, Some(KNIGHT));
    }

    #[test]
    fn dragon_moves_like_knight_and_bishop() {
        let rules = Rules::new(Variant::DragonChess);
        let mut board = rules.empty_board();
        board.set_piece(0, Some(Piece::new(KING, Side::Near)));
        board.set_piece(79, Some(Piece::new(KING, Side::Far)));
        let d = board.square(4, 3).unwrap();
        board.set_piece(d, Some(Piece::new(DRAGON, Side::Near)));
        let from_dragon = rules
            .generate_moves(&board)
            .into_iter()
            .filter(|m| m.from == d)
            .count();
        // 8 knight leaps and 4 open diagonals from e4 on a 10x8 board
        let diagonals = 4 + 4 + 3 + 3;
        assert_eq!(from_dragon, 8 + diagonals);
    }

    #[test]
    fn dragon_chess_start_position() {
        let rules = Rules::new(Variant::DragonChess);
        let board = rules.setup_board();
        assert_eq!(rules.generate_moves(&board).len(), 28);
    }

    #[test]
    fn fen_errors_are_format_errors() {
        assert!(matches!(
            board_from_fen("8/8/8 w - - 0 1"),
            Err(GameError::Format { .. })
        ));
        assert!(matches!(
            board_from_fen("8/8/8/8/8/8/8/7X w - - 0 1"),
            Err(GameError::Format { .. })
        ));
    }
}
