//! Rules of the supported variants
//!
//! `Rules` binds a `Variant` to its `RuleOptions` and answers every question
//! the game and the search ask about a position: the start layout, the legal
//! moves, and whether the game is won or drawn. Each variant family plugs in
//! through the crate-private `Family` trait; the variants themselves are data
//! (board shape, kind table, flags) handed to one of three families.

mod chess;
mod draughts;
mod ugolki;

pub use chess::board_from_fen;

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{Board, Move, Piece, PieceKind, Side};
use crate::error::{GameError, GameResult};
use crate::game::Game;
use crate::utils::parse_move_text;

/// Kind identifiers of every family, for building positions by hand
pub mod kinds {
    pub use super::chess::{BISHOP, DRAGON, KING, KNIGHT, PAWN, QUEEN, ROOK};
    pub use super::draughts::{KING as DRAUGHTS_KING, MAN};
    pub use super::ugolki::STONE;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    Chess,
    DragonChess,
    Checkers,
    Suicide,
    Shashki,
    CanadianDraughts,
    Ugolki,
}

impl Variant {
    pub const ALL: [Variant; 7] = [
        Variant::Chess,
        Variant::DragonChess,
        Variant::Checkers,
        Variant::Suicide,
        Variant::Shashki,
        Variant::CanadianDraughts,
        Variant::Ugolki,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Chess => "chess",
            Variant::DragonChess => "dragon-chess",
            Variant::Checkers => "checkers",
            Variant::Suicide => "suicide",
            Variant::Shashki => "shashki",
            Variant::CanadianDraughts => "canadian-draughts",
            Variant::Ugolki => "ugolki",
        }
    }

    pub(crate) fn family(self) -> &'static dyn Family {
        match self {
            Variant::Chess => &chess::CHESS,
            Variant::DragonChess => &chess::DRAGON_CHESS,
            Variant::Checkers => &draughts::CHECKERS,
            Variant::Suicide => &draughts::SUICIDE,
            Variant::Shashki => &draughts::SHASHKI,
            Variant::CanadianDraughts => &draughts::CANADIAN,
            Variant::Ugolki => &ugolki::UGOLKI,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(|c: char| c == '_' || c == ' ', "-");
        match key.as_str() {
            "canadian" => return Ok(Variant::CanadianDraughts),
            "dragon" | "dragonchess" => return Ok(Variant::DragonChess),
            "russian" => return Ok(Variant::Shashki),
            "giveaway" => return Ok(Variant::Suicide),
            _ => {}
        }
        Variant::ALL
            .into_iter()
            .find(|v| v.name() == key)
            .ok_or_else(|| GameError::UnknownVariant(s.to_string()))
    }
}

/// Optional rules a variant can switch on or off
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleOptions {
    /// A capture must be played when one is available
    pub mandatory_capture: bool,
    /// Only captures starting a longest capture sequence are legal
    pub majority_capture: bool,
    pub castling: bool,
    /// Draw after 100 plies without a capture or pawn move
    pub fifty_move_rule: bool,
    /// Draw on the third occurrence of a position
    pub repetition_draw: bool,
    /// Draw after this many plies without a capture or man move
    pub quiet_move_limit: Option<u16>,
    /// Draw once this many plies have been played
    pub move_limit: Option<u32>,
}

impl RuleOptions {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Chess | Variant::DragonChess => Self {
                castling: true,
                fifty_move_rule: true,
                repetition_draw: true,
                ..Self::default()
            },
            Variant::Checkers | Variant::Suicide => Self {
                mandatory_capture: true,
                repetition_draw: true,
                quiet_move_limit: Some(80),
                ..Self::default()
            },
            Variant::Shashki => Self {
                mandatory_capture: true,
                repetition_draw: true,
                quiet_move_limit: Some(30),
                ..Self::default()
            },
            Variant::CanadianDraughts => Self {
                mandatory_capture: true,
                majority_capture: true,
                repetition_draw: true,
                quiet_move_limit: Some(50),
                ..Self::default()
            },
            Variant::Ugolki => Self {
                move_limit: Some(160),
                ..Self::default()
            },
        }
    }
}

/// Persisted rules configuration. Missing `options` means the variant defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    pub variant: Variant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<RuleOptions>,
}

/// Static description of one piece kind within a variant
#[derive(Debug, Clone, Copy)]
pub struct KindInfo {
    pub name: &'static str,
    /// Upper-case letter; Far pieces print in lower case
    pub symbol: char,
    pub value: i32,
    /// Single jumps (file, rank) the kind can make
    pub leaps: &'static [(i8, i8)],
    /// Directions the kind slides along until blocked
    pub slides: &'static [(i8, i8)],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ongoing,
    Won(Side),
    Drawn,
}

impl Status {
    pub fn is_over(self) -> bool {
        self != Status::Ongoing
    }
}

/// Result when the side to move has no legal move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    Win(Side),
    Draw,
}

/// Behaviour shared by the variants of one family
pub(crate) trait Family: Send + Sync {
    fn dimensions(&self) -> (usize, usize);

    fn kinds(&self) -> &'static [KindInfo];

    fn setup(&self, board: &mut Board, options: &RuleOptions);

    /// Legal moves of the side to move
    fn generate(&self, board: &Board, options: &RuleOptions) -> Vec<Move>;

    /// Winner fixed by the position alone
    fn decided(&self, board: &Board) -> Option<Side>;

    fn blocked(&self, board: &Board) -> Verdict;

    /// Family-specific draw rules
    fn drawn(&self, board: &Board, options: &RuleOptions) -> bool;

    /// Static score from `side`'s point of view
    fn heuristic(&self, board: &Board, side: Side) -> i32;

    fn in_check(&self, _board: &Board, _side: Side) -> bool {
        false
    }
}

/// Rules of one game: the variant plus its enabled options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rules {
    variant: Variant,
    options: RuleOptions,
}

impl Rules {
    /// Rules with the variant's default options
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            options: RuleOptions::for_variant(variant),
        }
    }

    pub fn with_options(variant: Variant, options: RuleOptions) -> Self {
        Self { variant, options }
    }

    pub fn from_config(config: RulesConfig) -> Self {
        let options = config
            .options
            .unwrap_or_else(|| RuleOptions::for_variant(config.variant));
        Self::with_options(config.variant, options)
    }

    pub fn config(&self) -> RulesConfig {
        RulesConfig {
            variant: self.variant,
            options: Some(self.options.clone()),
        }
    }

    #[inline]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    #[inline]
    pub fn options(&self) -> &RuleOptions {
        &self.options
    }

    #[inline]
    fn family(&self) -> &'static dyn Family {
        self.variant.family()
    }

    pub fn deep_copy(&self) -> Rules {
        self.clone()
    }

    /// Board dimensions (width, height)
    pub fn dimensions(&self) -> (usize, usize) {
        self.family().dimensions()
    }

    pub fn kinds(&self) -> &'static [KindInfo] {
        self.family().kinds()
    }

    pub fn kind_info(&self, kind: PieceKind) -> Option<&'static KindInfo> {
        self.kinds().get(kind.index())
    }

    /// Empty board of this variant's shape
    pub fn empty_board(&self) -> Board {
        let (width, height) = self.dimensions();
        Board::new(width, height)
    }

    /// Board holding the variant's starting position
    pub fn setup_board(&self) -> Board {
        let mut board = self.empty_board();
        self.family().setup(&mut board, &self.options);
        board.reset_history();
        board
    }

    /// Put the starting position on `game`'s board
    pub fn init(&self, game: &mut Game) {
        game.replace_board(self.setup_board());
    }

    /// Legal moves for the side to move in `game`
    pub fn compute_moves(&self, game: &Game) -> Vec<Move> {
        self.generate_moves(game.board())
    }

    /// Legal moves for the side to move on `board`; empty once a winner is decided
    pub fn generate_moves(&self, board: &Board) -> Vec<Move> {
        if self.family().decided(board).is_some() {
            return Vec::new();
        }
        self.family().generate(board, &self.options)
    }

    /// Game status given the legal moves of the side to move
    pub fn status_with(&self, board: &Board, moves: &[Move]) -> Status {
        let family = self.family();
        if let Some(winner) = family.decided(board) {
            return Status::Won(winner);
        }
        if moves.is_empty() {
            return match family.blocked(board) {
                Verdict::Win(side) => Status::Won(side),
                Verdict::Draw => Status::Drawn,
            };
        }
        if self.options.move_limit.is_some_and(|limit| board.ply >= limit) {
            return Status::Drawn;
        }
        if self.options.repetition_draw && board.repetitions() >= 3 {
            return Status::Drawn;
        }
        if family.drawn(board, &self.options) {
            return Status::Drawn;
        }
        Status::Ongoing
    }

    pub fn status(&self, board: &Board) -> Status {
        let moves = self.generate_moves(board);
        self.status_with(board, &moves)
    }

    /// Winner of the game on `game`'s board, `None` while undecided or drawn
    pub fn winner(&self, game: &Game) -> Option<Side> {
        self.winner_on(game.board())
    }

    pub fn winner_on(&self, board: &Board) -> Option<Side> {
        match self.status(board) {
            Status::Won(side) => Some(side),
            _ => None,
        }
    }

    pub fn is_draw(&self, game: &Game) -> bool {
        self.is_draw_on(game.board())
    }

    pub fn is_draw_on(&self, board: &Board) -> bool {
        self.status(board) == Status::Drawn
    }

    /// Whether `side`'s king is attacked (always false outside chess)
    pub fn in_check(&self, board: &Board, side: Side) -> bool {
        self.family().in_check(board, side)
    }

    pub fn heuristic(&self, board: &Board, side: Side) -> i32 {
        self.family().heuristic(board, side)
    }

    pub fn piece_symbol(&self, piece: Piece) -> char {
        let symbol = self
            .kind_info(piece.kind)
            .map(|info| info.symbol)
            .unwrap_or('?');
        match piece.side {
            Side::Near => symbol.to_ascii_uppercase(),
            Side::Far => symbol.to_ascii_lowercase(),
        }
    }

    pub fn piece_from_symbol(&self, symbol: char) -> Option<Piece> {
        let side = if symbol.is_ascii_uppercase() {
            Side::Near
        } else if symbol.is_ascii_lowercase() {
            Side::Far
        } else {
            return None;
        };
        let upper = symbol.to_ascii_uppercase();
        let kind = self.kinds().iter().position(|info| info.symbol == upper)?;
        Some(Piece::new(PieceKind(kind as u8), side))
    }

    /// Move text such as "e2-e4", "c3xe5" or "e7-e8q"
    pub fn move_to_string(&self, board: &Board, mv: &Move) -> String {
        let mut text = mv.notation(board.width());
        if let Some(kind) = mv.promotion {
            if let Some(info) = self.kind_info(kind) {
                text.push(info.symbol.to_ascii_lowercase());
            }
        }
        text
    }

    /// Resolve move text against the legal moves of `board`
    pub fn parse_move(&self, board: &Board, text: &str) -> GameResult<Move> {
        let moves = self.generate_moves(board);
        self.find_move(board, &moves, text)
    }

    /// Resolve move text against an already computed move list
    pub fn find_move(&self, board: &Board, moves: &[Move], text: &str) -> GameResult<Move> {
        let illegal = || GameError::IllegalMove {
            mv: text.trim().to_string(),
        };
        let parsed = parse_move_text(text).ok_or_else(illegal)?;
        let from = board
            .square(parsed.from.0, parsed.from.1)
            .ok_or_else(illegal)?;
        let to = board.square(parsed.to.0, parsed.to.1).ok_or_else(illegal)?;

        let mut candidates = moves.iter().filter(|m| m.from == from && m.to == to);
        let chosen = match parsed.promotion {
            Some(symbol) => candidates.find(|m| {
                m.promotion
                    .and_then(|kind| self.kind_info(kind))
                    .is_some_and(|info| info.symbol.to_ascii_lowercase() == symbol)
            }),
            None => {
                let all: Vec<&Move> = candidates.collect();
                all.iter()
                    .find(|m| m.promotion.is_none())
                    .or_else(|| all.first())
                    .copied()
            }
        };
        chosen.cloned().ok_or_else(illegal)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> GameResult<()> {
        let json = serde_json::to_string_pretty(&self.config())?;
        fs::write(path.as_ref(), json)?;
        debug!(path = %path.as_ref().display(), variant = %self.variant, "rules saved");
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> GameResult<Rules> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: RulesConfig = serde_json::from_str(&text)
            .map_err(|e| GameError::format(e.line(), format!("bad rules: {e}")))?;
        Ok(Self::from_config(config))
    }
}

/// Count leaf nodes of the legal move tree to `depth`
pub fn perft(rules: &Rules, board: &mut Board, depth: u8) -> GameResult<u64> {
    if depth == 0 {
        return Ok(1);
    }
    let moves = rules.generate_moves(board);
    if depth == 1 {
        return Ok(moves.len() as u64);
    }
    let mut nodes = 0;
    for mv in &moves {
        let undo = board.make_move(mv)?;
        nodes += perft(rules, board, depth - 1)?;
        board.unmake_move(undo);
    }
    Ok(nodes)
}
