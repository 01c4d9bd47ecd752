//! Variant-agnostic board model
//!
//! A `Board` is a rectangular grid (at most 12x12) of squares, each empty or
//! holding one `Piece`. Besides placement it carries the per-position state
//! every variant needs: side to move, castling rights, en-passant square, the
//! square of a piece that must keep jumping, clocks and the Zobrist hash.
//!
//! Squares are indexed `rank * width + file`, rank 0 being Near's back rank.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::utils::square_name;
use crate::zobrist::{self, MAX_KINDS, MAX_SQUARES};

pub type Square = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Near = 0,
    Far = 1,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Near, Side::Far];

    pub fn opponent(self) -> Side {
        match self {
            Side::Near => Side::Far,
            Side::Far => Side::Near,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Rank direction this side advances in
    #[inline]
    pub fn forward(self) -> i8 {
        match self {
            Side::Near => 1,
            Side::Far => -1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Near => "near",
            Side::Far => "far",
        }
    }

    pub fn from_name(name: &str) -> Option<Side> {
        match name.trim().to_ascii_lowercase().as_str() {
            "near" => Some(Side::Near),
            "far" => Some(Side::Far),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Small per-variant piece identifier; its meaning comes from the variant's kind table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceKind(pub u8);

impl PieceKind {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
}

impl Piece {
    pub const fn new(kind: PieceKind, side: Side) -> Self {
        Self { kind, side }
    }
}

// Move flags
pub const FLAG_NONE: u32 = 0;
pub const FLAG_CAPTURE: u32 = 1 << 0;
pub const FLAG_PROMOTION: u32 = 1 << 1;
/// The moving piece must keep jumping; the turn does not pass
pub const FLAG_CONTINUES: u32 = 1 << 2;
pub const FLAG_EN_PASSANT: u32 = 1 << 3;
pub const FLAG_DOUBLE_PUSH: u32 = 1 << 4;
pub const FLAG_CASTLE_KING: u32 = 1 << 5;
pub const FLAG_CASTLE_QUEEN: u32 = 1 << 6;
/// Moving piece is a castling king: clears that side's rights
pub const FLAG_KING_MOVE: u32 = 1 << 7;
/// Resets the half-move clock (pawn or man moves)
pub const FLAG_ZEROING: u32 = 1 << 8;

// Castling rights bits
pub const CASTLE_NEAR_KING: u8 = 0b0001;
pub const CASTLE_NEAR_QUEEN: u8 = 0b0010;
pub const CASTLE_FAR_KING: u8 = 0b0100;
pub const CASTLE_FAR_QUEEN: u8 = 0b1000;
pub const CASTLE_ALL: u8 = 0b1111;

fn castle_mask(side: Side) -> u8 {
    match side {
        Side::Near => CASTLE_NEAR_KING | CASTLE_NEAR_QUEEN,
        Side::Far => CASTLE_FAR_KING | CASTLE_FAR_QUEEN,
    }
}

/// A move as produced by a rules implementation.
///
/// `captured` lists the squares emptied by the move; for draughts a move is a
/// single jump and `FLAG_CONTINUES` marks that the same piece jumps again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub captured: Vec<Square>,
    pub promotion: Option<PieceKind>,
    pub flags: u32,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            captured: Vec::new(),
            promotion: None,
            flags: FLAG_NONE,
        }
    }

    pub fn with_capture(mut self, sq: Square) -> Self {
        self.captured.push(sq);
        self.flags |= FLAG_CAPTURE;
        self
    }

    pub fn with_promotion(mut self, kind: PieceKind) -> Self {
        self.promotion = Some(kind);
        self.flags |= FLAG_PROMOTION;
        self
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        !self.captured.is_empty()
    }

    #[inline]
    pub fn continues(&self) -> bool {
        self.has_flag(FLAG_CONTINUES)
    }

    /// Square part of the move text, e.g. "e2-e4" or "c3xe5"
    pub fn notation(&self, width: usize) -> String {
        let sep = if self.is_capture() { 'x' } else { '-' };
        format!(
            "{}{}{}",
            square_name(self.from, width),
            sep,
            square_name(self.to, width)
        )
    }
}

/// Undo entry for rollback
#[derive(Debug, Clone)]
pub struct Undo {
    pub from: Square,
    pub to: Square,
    pub flags: u32,
    pub moved: Piece,
    pub captured: Vec<(Square, Piece)>,
    pub rook: Option<(Square, Square)>,
    pub prev_side: Side,
    pub prev_castling: u8,
    pub prev_ep: Option<Square>,
    pub prev_chain: Option<Square>,
    pub prev_halfmove: u16,
    pub prev_zobrist: u64,
}

#[derive(Clone, Debug)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Option<Piece>>,
    side: Side,
    castling: u8,
    ep: Option<Square>,
    chain: Option<Square>,
    /// Plies since the last capture or zeroing move
    pub halfmove: u16,
    /// Plies played since setup
    pub ply: u32,
    zobrist: u64,
    counts: [usize; 2],
    // Hashes of the positions before each move, for repetition detection
    history: Vec<u64>,
}

impl Board {
    /// Empty board with Near to move
    pub fn new(width: usize, height: usize) -> Self {
        assert!(
            width > 0 && height > 0 && width <= 12 && height <= 12,
            "board must be between 1x1 and 12x12, got {width}x{height}"
        );
        debug_assert!(width * height <= MAX_SQUARES);
        let mut board = Self {
            width,
            height,
            cells: vec![None; width * height],
            side: Side::Near,
            castling: 0,
            ep: None,
            chain: None,
            halfmove: 0,
            ply: 0,
            zobrist: 0,
            counts: [0; 2],
            history: Vec::with_capacity(256),
        };
        board.zobrist = board.recalc_zobrist();
        board
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of squares
    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn square(&self, file: usize, rank: usize) -> Option<Square> {
        if file < self.width && rank < self.height {
            Some(rank * self.width + file)
        } else {
            None
        }
    }

    #[inline]
    pub fn coords(&self, sq: Square) -> (usize, usize) {
        (sq % self.width, sq / self.width)
    }

    #[inline]
    pub fn file_of(&self, sq: Square) -> usize {
        sq % self.width
    }

    #[inline]
    pub fn rank_of(&self, sq: Square) -> usize {
        sq / self.width
    }

    /// Square reached by stepping (df, dr) from `sq`, if still on the board
    #[inline]
    pub fn offset(&self, sq: Square, df: i8, dr: i8) -> Option<Square> {
        let file = (sq % self.width) as isize + df as isize;
        let rank = (sq / self.width) as isize + dr as isize;
        if file < 0 || rank < 0 || file >= self.width as isize || rank >= self.height as isize {
            None
        } else {
            Some(rank as usize * self.width + file as usize)
        }
    }

    /// Last rank in the direction `side` advances
    #[inline]
    pub fn promotion_rank(&self, side: Side) -> usize {
        match side {
            Side::Near => self.height - 1,
            Side::Far => 0,
        }
    }

    #[inline]
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.cells.get(sq).copied().flatten()
    }

    #[inline]
    pub fn is_empty_at(&self, sq: Square) -> bool {
        self.piece_on(sq).is_none()
    }

    // Place or remove a piece keeping hash and counts in sync
    fn put(&mut self, sq: Square, piece: Option<Piece>) {
        if let Some(old) = self.cells[sq] {
            self.zobrist ^= zobrist::piece_key(old, sq);
            self.counts[old.side.index()] -= 1;
        }
        if let Some(new) = piece {
            self.zobrist ^= zobrist::piece_key(new, sq);
            self.counts[new.side.index()] += 1;
        }
        self.cells[sq] = piece;
    }

    /// Put `piece` on `sq` (or empty it with `None`)
    pub fn set_piece(&mut self, sq: Square, piece: Option<Piece>) {
        assert!(sq < self.cells.len(), "square {sq} outside the board");
        if let Some(p) = piece {
            assert!(p.kind.index() < MAX_KINDS, "piece kind {} out of range", p.kind.0);
        }
        self.put(sq, piece);
    }

    /// Remove every piece and reset the position state
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
        self.counts = [0; 2];
        self.side = Side::Near;
        self.castling = 0;
        self.ep = None;
        self.chain = None;
        self.halfmove = 0;
        self.ply = 0;
        self.history.clear();
        self.zobrist = self.recalc_zobrist();
    }

    #[inline]
    pub fn count(&self, side: Side) -> usize {
        self.counts[side.index()]
    }

    /// All pieces of `side` with their squares, in square order
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.occupied().filter(move |(_, p)| p.side == side)
    }

    pub fn occupied(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(sq, c)| c.map(|p| (sq, p)))
    }

    /// First square holding `piece`
    pub fn find(&self, piece: Piece) -> Option<Square> {
        self.cells.iter().position(|c| *c == Some(piece))
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn castling(&self) -> u8 {
        self.castling
    }

    #[inline]
    pub fn ep(&self) -> Option<Square> {
        self.ep
    }

    #[inline]
    pub fn chain(&self) -> Option<Square> {
        self.chain
    }

    #[inline]
    pub fn zobrist(&self) -> u64 {
        self.zobrist
    }

    fn state_hash(&self) -> u64 {
        zobrist::state_key(self.side, self.castling, self.ep, self.chain)
    }

    pub fn set_side(&mut self, side: Side) {
        self.zobrist ^= self.state_hash();
        self.side = side;
        self.zobrist ^= self.state_hash();
    }

    pub fn set_castling(&mut self, castling: u8) {
        self.zobrist ^= self.state_hash();
        self.castling = castling & CASTLE_ALL;
        self.zobrist ^= self.state_hash();
    }

    pub fn set_ep(&mut self, ep: Option<Square>) {
        self.zobrist ^= self.state_hash();
        self.ep = ep.filter(|&sq| sq < self.cells.len());
        self.zobrist ^= self.state_hash();
    }

    pub fn set_chain(&mut self, chain: Option<Square>) {
        self.zobrist ^= self.state_hash();
        self.chain = chain.filter(|&sq| sq < self.cells.len());
        self.zobrist ^= self.state_hash();
    }

    /// How many times the current position has occurred, counting now
    pub fn repetitions(&self) -> usize {
        1 + self.history.iter().filter(|&&h| h == self.zobrist).count()
    }

    /// Forget earlier positions (after manual edits)
    pub fn reset_history(&mut self) {
        self.history.clear();
    }

    pub fn recalc_zobrist(&self) -> u64 {
        self.occupied()
            .fold(self.state_hash(), |h, (sq, p)| h ^ zobrist::piece_key(p, sq))
    }

    // Castling right lost when a piece leaves or lands on a corner
    fn corner_right(&self, sq: Square) -> u8 {
        let (file, rank) = self.coords(sq);
        let last_file = self.width - 1;
        let last_rank = self.height - 1;
        match (file, rank) {
            (0, 0) => CASTLE_NEAR_QUEEN,
            (f, 0) if f == last_file => CASTLE_NEAR_KING,
            (0, r) if r == last_rank => CASTLE_FAR_QUEEN,
            (f, r) if f == last_file && r == last_rank => CASTLE_FAR_KING,
            _ => 0,
        }
    }

    // Rook origin and destination for a castling move
    fn castle_rook(&self, mv: &Move) -> Option<(Square, Square)> {
        let rank = self.rank_of(mv.from);
        let to_file = self.file_of(mv.to);
        if mv.has_flag(FLAG_CASTLE_KING) {
            Some((self.square(self.width - 1, rank)?, self.square(to_file.checked_sub(1)?, rank)?))
        } else if mv.has_flag(FLAG_CASTLE_QUEEN) {
            Some((self.square(0, rank)?, self.square(to_file + 1, rank)?))
        } else {
            None
        }
    }

    /// Check that `mv` can be applied to this position
    pub fn validate(&self, mv: &Move) -> GameResult<()> {
        let violation = |reason: String| Err(GameError::InvariantViolation(reason));
        let size = self.cells.len();
        if mv.from >= size || mv.to >= size || mv.captured.iter().any(|&sq| sq >= size) {
            return violation(format!("move {:?} leaves the board", mv));
        }
        let name = mv.notation(self.width);
        let Some(moved) = self.cells[mv.from] else {
            return violation(format!("{name}: no piece on the origin square"));
        };
        if moved.side != self.side {
            return violation(format!("{name}: piece does not belong to the side to move"));
        }
        if let Some(chain) = self.chain {
            if chain != mv.from {
                return violation(format!("{name}: the piece on {} must keep jumping", square_name(chain, self.width)));
            }
        }
        if mv.from == mv.to {
            return violation(format!("{name}: origin and destination coincide"));
        }
        for &sq in &mv.captured {
            match self.cells[sq] {
                Some(p) if p.side != moved.side => {}
                _ => return violation(format!("{name}: no enemy piece to capture on {}", square_name(sq, self.width))),
            }
        }
        if self.cells[mv.to].is_some() && !mv.captured.contains(&mv.to) {
            return violation(format!("{name}: destination is occupied"));
        }
        if let Some(kind) = mv.promotion {
            if kind.index() >= MAX_KINDS {
                return violation(format!("{name}: invalid promotion kind {}", kind.0));
            }
        }
        if mv.has_flag(FLAG_CASTLE_KING | FLAG_CASTLE_QUEEN) {
            match self.castle_rook(mv) {
                Some((rook_from, rook_to))
                    if matches!(self.cells[rook_from], Some(p) if p.side == moved.side)
                        && (self.cells[rook_to].is_none() || rook_to == mv.from) => {}
                _ => return violation(format!("{name}: castling rook missing")),
            }
        }
        Ok(())
    }

    /// Validate and apply a move, returning the undo record
    pub fn make_move(&mut self, mv: &Move) -> GameResult<Undo> {
        self.validate(mv)?;
        self.apply(mv).ok_or_else(|| {
            GameError::InvariantViolation(format!("could not apply {}", mv.notation(self.width)))
        })
    }

    /// Apply without validation. Only for moves generated from this very position.
    pub(crate) fn apply(&mut self, mv: &Move) -> Option<Undo> {
        let moved = self.cells.get(mv.from).copied().flatten()?;
        let prev_zobrist = self.zobrist;
        let prev_side = self.side;
        let prev_castling = self.castling;
        let prev_ep = self.ep;
        let prev_chain = self.chain;
        let prev_halfmove = self.halfmove;

        self.zobrist ^= self.state_hash();

        let mut captured = Vec::with_capacity(mv.captured.len());
        for &sq in &mv.captured {
            if let Some(p) = self.cells[sq] {
                captured.push((sq, p));
                self.put(sq, None);
            }
        }

        self.put(mv.from, None);
        let placed = match mv.promotion {
            Some(kind) => Piece::new(kind, moved.side),
            None => moved,
        };
        self.put(mv.to, Some(placed));

        let rook = match self.castle_rook(mv) {
            Some((rook_from, rook_to)) => match self.cells[rook_from] {
                Some(r) => {
                    self.put(rook_from, None);
                    self.put(rook_to, Some(r));
                    Some((rook_from, rook_to))
                }
                None => None,
            },
            None => None,
        };

        if mv.has_flag(FLAG_KING_MOVE) {
            self.castling &= !castle_mask(moved.side);
        }
        self.castling &= !self.corner_right(mv.from);
        self.castling &= !self.corner_right(mv.to);

        self.ep = if mv.has_flag(FLAG_DOUBLE_PUSH) {
            Some((mv.from + mv.to) / 2)
        } else {
            None
        };

        if mv.has_flag(FLAG_ZEROING) || !captured.is_empty() {
            self.halfmove = 0;
        } else {
            self.halfmove = self.halfmove.saturating_add(1);
        }
        self.ply += 1;
        self.history.push(prev_zobrist);

        if mv.continues() {
            self.chain = Some(mv.to);
        } else {
            self.chain = None;
            self.side = self.side.opponent();
        }

        self.zobrist ^= self.state_hash();

        Some(Undo {
            from: mv.from,
            to: mv.to,
            flags: mv.flags,
            moved,
            captured,
            rook,
            prev_side,
            prev_castling,
            prev_ep,
            prev_chain,
            prev_halfmove,
            prev_zobrist,
        })
    }

    /// Restore the position before the move recorded in `undo`
    pub fn unmake_move(&mut self, undo: Undo) {
        self.put(undo.to, None);
        self.put(undo.from, Some(undo.moved));
        if let Some((rook_from, rook_to)) = undo.rook {
            let rook = self.cells[rook_to];
            self.put(rook_to, None);
            self.put(rook_from, rook);
        }
        for &(sq, p) in undo.captured.iter().rev() {
            self.put(sq, Some(p));
        }
        self.side = undo.prev_side;
        self.castling = undo.prev_castling;
        self.ep = undo.prev_ep;
        self.chain = undo.prev_chain;
        self.halfmove = undo.prev_halfmove;
        self.ply = self.ply.saturating_sub(1);
        self.history.pop();
        self.zobrist = undo.prev_zobrist;
    }

    /// Text grid, top rank first, using `symbol` for each piece
    pub fn render(&self, symbol: impl Fn(Piece) -> char) -> String {
        let mut out = String::new();
        for rank in (0..self.height).rev() {
            out.push_str(&format!("{:>2}", rank + 1));
            for file in 0..self.width {
                let ch = match self.cells[rank * self.width + file] {
                    Some(p) => symbol(p),
                    None => '.',
                };
                out.push(' ');
                out.push(ch);
            }
            out.push('\n');
        }
        out.push_str("  ");
        for ch in crate::utils::FILES.chars().take(self.width) {
            out.push(' ');
            out.push(ch);
        }
        out.push('\n');
        out
    }
}
