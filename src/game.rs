//! Game state machine
//!
//! A `Game` owns one board, the active rules and the two player slots, and
//! drives play one step at a time through [`Game::run_game`]. It also owns
//! the text serialization used for save/load.

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::board::{
    Board, Move, Piece, Side, Square, Undo, CASTLE_FAR_KING, CASTLE_FAR_QUEEN, CASTLE_NEAR_KING,
    CASTLE_NEAR_QUEEN,
};
use crate::error::{GameError, GameResult};
use crate::player::{Choice, Player};
use crate::rules::{RuleOptions, Rules, Status, Variant};
use crate::utils::{parse_square, square_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// Position or players still being arranged
    Setup,
    InProgress,
    Won(Side),
    Drawn,
}

impl GameState {
    pub fn is_over(self) -> bool {
        matches!(self, GameState::Won(_) | GameState::Drawn)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameState::Setup => f.write_str("setup"),
            GameState::InProgress => f.write_str("in progress"),
            GameState::Won(side) => write!(f, "{side} wins"),
            GameState::Drawn => f.write_str("draw"),
        }
    }
}

/// Outcome of one `run_game` step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A player picked a piece and will name its destination next
    Selected(Square),
    Moved(Move),
    Finished(GameState),
}

/// Notification sent to listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Selected(Square),
    Moved { mv: Move, text: String },
    Finished(GameState),
}

pub type Listener = Box<dyn FnMut(&GameEvent) + Send>;

pub struct Game {
    board: Board,
    rules: Rules,
    players: [Option<Box<dyn Player>>; 2],
    history: Vec<Move>,
    undo_log: Vec<Undo>,
    selection: Option<Square>,
    state: GameState,
    in_check: bool,
    listeners: Vec<Listener>,
}

impl Game {
    /// Empty game: empty board of the variant's shape, no players
    pub fn new(rules: Rules) -> Self {
        let board = rules.empty_board();
        Self {
            board,
            rules,
            players: [None, None],
            history: Vec::new(),
            undo_log: Vec::new(),
            selection: None,
            state: GameState::Setup,
            in_check: false,
            listeners: Vec::new(),
        }
    }

    pub fn with_variant(variant: Variant) -> Self {
        Self::new(Rules::new(variant))
    }

    // ------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------

    /// Reset to the variant's starting position
    pub fn new_game(&mut self) {
        let rules = self.rules.clone();
        rules.init(self);
        self.refresh_game_state();
    }

    /// Install `board` as the current position, forgetting the move history
    pub(crate) fn replace_board(&mut self, board: Board) {
        self.board = board;
        self.history.clear();
        self.undo_log.clear();
        self.selection = None;
    }

    /// Empty the board; the position is then built with `set_piece`
    pub fn clear(&mut self) {
        let board = self.rules.empty_board();
        self.replace_board(board);
        self.refresh_game_state();
    }

    pub fn set_piece(&mut self, sq: Square, piece: Option<Piece>) -> GameResult<()> {
        if sq >= self.board.size() {
            return Err(GameError::InvariantViolation(format!(
                "square {sq} is outside the {}x{} board",
                self.board.width(),
                self.board.height()
            )));
        }
        if let Some(p) = piece {
            if self.rules.kind_info(p.kind).is_none() {
                return Err(GameError::InvariantViolation(format!(
                    "piece kind {} does not exist in {}",
                    p.kind.0,
                    self.rules.variant()
                )));
            }
        }
        self.board.set_piece(sq, piece);
        self.forget_history();
        Ok(())
    }

    pub fn set_turn(&mut self, side: Side) {
        self.board.set_side(side);
        self.board.set_chain(None);
        self.forget_history();
    }

    // Manual edits invalidate the undo log and repetition history
    fn forget_history(&mut self) {
        self.board.reset_history();
        self.history.clear();
        self.undo_log.clear();
        self.selection = None;
    }

    /// Replace the rules wholesale; the board is emptied to the new shape
    pub fn set_rules(&mut self, rules: Rules) {
        self.rules = rules;
        self.clear();
    }

    pub fn set_player(&mut self, side: Side, player: Option<Box<dyn Player>>) {
        self.players[side.index()] = player;
        self.refresh_game_state();
    }

    pub fn add_listener(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    fn notify(&mut self, event: GameEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Side to move
    #[inline]
    pub fn turn(&self) -> Side {
        self.board.side()
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Piece picked by the current player in a two-phase move entry
    pub fn selection(&self) -> Option<Square> {
        self.selection
    }

    /// Whether the side to move was in check at the last refresh
    pub fn in_check(&self) -> bool {
        self.in_check
    }

    pub fn player(&self, side: Side) -> Option<&dyn Player> {
        self.players[side.index()].as_deref()
    }

    pub fn compute_moves(&self) -> Vec<Move> {
        self.rules.compute_moves(self)
    }

    pub fn status(&self) -> Status {
        self.rules.status(&self.board)
    }

    pub fn is_game_over(&self) -> bool {
        self.winner().is_some() || self.is_draw()
    }

    pub fn winner(&self) -> Option<Side> {
        self.rules.winner(self)
    }

    pub fn is_draw(&self) -> bool {
        self.rules.is_draw(self)
    }

    pub fn move_to_string(&self, mv: &Move) -> String {
        self.rules.move_to_string(&self.board, mv)
    }

    // ------------------------------------------------------------------
    // Play
    // ------------------------------------------------------------------

    /// Recompute cached state (check flag, game state) without moving
    pub fn refresh_game_state(&mut self) {
        let was_over = self.state.is_over();
        let side = self.turn();
        self.in_check = self.rules.in_check(&self.board, side);
        self.state = match self.status() {
            Status::Won(winner) => GameState::Won(winner),
            Status::Drawn => GameState::Drawn,
            Status::Ongoing if self.players.iter().all(Option::is_some) => GameState::InProgress,
            Status::Ongoing => GameState::Setup,
        };
        if self.state.is_over() && !was_over {
            info!(variant = %self.rules.variant(), result = %self.state, plies = self.board.ply, "game finished");
            self.notify(GameEvent::Finished(self.state));
        }
    }

    /// Advance the game by one step: let the player to move pick a piece or a move
    pub fn run_game(&mut self) -> GameResult<Step> {
        let moves = self.compute_moves();
        let status = self.rules.status_with(&self.board, &moves);
        if status.is_over() {
            self.refresh_game_state();
            return Ok(Step::Finished(self.state));
        }

        let side = self.turn();
        let mut player = self.players[side.index()]
            .take()
            .ok_or(GameError::NoPlayer(side))?;
        let choice = player.choose_move(self, &moves);
        self.players[side.index()] = Some(player);

        match choice? {
            Choice::Select(sq) => {
                self.selection = Some(sq);
                self.notify(GameEvent::Selected(sq));
                Ok(Step::Selected(sq))
            }
            Choice::Move(mv) => {
                self.apply_checked(&mv, &moves)?;
                Ok(Step::Moved(mv))
            }
        }
    }

    /// Play `mv` if it is one of the current legal moves
    pub fn execute_move(&mut self, mv: &Move) -> GameResult<()> {
        let moves = self.compute_moves();
        self.apply_checked(mv, &moves)
    }

    /// Play the move named by `text` ("e2e4", "c3xe5")
    pub fn play(&mut self, text: &str) -> GameResult<Move> {
        let moves = self.compute_moves();
        if self.rules.status_with(&self.board, &moves).is_over() {
            return Err(GameError::GameOver);
        }
        let mv = self.rules.find_move(&self.board, &moves, text)?;
        self.apply_checked(&mv, &moves)?;
        Ok(mv)
    }

    fn apply_checked(&mut self, mv: &Move, moves: &[Move]) -> GameResult<()> {
        if self.rules.status_with(&self.board, moves).is_over() {
            return Err(GameError::GameOver);
        }
        if !moves.contains(mv) {
            return Err(GameError::IllegalMove {
                mv: self.move_to_string(mv),
            });
        }
        let text = self.move_to_string(mv);
        let side = self.turn();
        let undo = self.board.make_move(mv)?;
        self.undo_log.push(undo);
        self.history.push(mv.clone());
        self.selection = None;
        debug!(%side, mv = %text, ply = self.board.ply, "move executed");
        self.notify(GameEvent::Moved {
            mv: mv.clone(),
            text,
        });
        self.refresh_game_state();
        Ok(())
    }

    /// Take back the last executed move
    pub fn undo_move(&mut self) -> GameResult<Move> {
        let undo = self.undo_log.pop().ok_or(GameError::NoMove)?;
        self.board.unmake_move(undo);
        let mv = self.history.pop().ok_or(GameError::NoMove)?;
        self.selection = None;
        self.refresh_game_state();
        Ok(mv)
    }

    /// Fully independent copy. Players that cannot be cloned are left empty; listeners are not copied.
    pub fn deep_copy(&self) -> Game {
        Game {
            board: self.board.clone(),
            rules: self.rules.deep_copy(),
            players: [
                self.players[0].as_ref().and_then(|p| p.try_clone()),
                self.players[1].as_ref().and_then(|p| p.try_clone()),
            ],
            history: self.history.clone(),
            undo_log: self.undo_log.clone(),
            selection: self.selection,
            state: self.state,
            in_check: self.in_check,
            listeners: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    pub fn save(&self, path: impl AsRef<Path>) -> GameResult<()> {
        fs::write(path.as_ref(), self.to_string())?;
        debug!(path = %path.as_ref().display(), "game saved");
        Ok(())
    }

    /// Read a saved game. The returned game has no players.
    pub fn load(path: impl AsRef<Path>) -> GameResult<Game> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_text(&text)
    }

    /// Parse the text produced by `Display`
    pub fn from_text(text: &str) -> GameResult<Game> {
        let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));
        // Line a missing entry would have been on
        let end = text.lines().count() + 1;

        let (line, value) = field(&mut lines, end, "variant")?;
        let variant: Variant = value
            .parse()
            .map_err(|_| GameError::format(line, format!("unknown variant '{value}'")))?;

        let (line, value) = field(&mut lines, end, "options")?;
        let options: RuleOptions = serde_json::from_str(value)
            .map_err(|e| GameError::format(line, format!("bad options: {e}")))?;
        let rules = Rules::with_options(variant, options);

        let (line, value) = field(&mut lines, end, "turn")?;
        let side = Side::from_name(value)
            .ok_or_else(|| GameError::format(line, format!("bad side '{value}'")))?;

        let (line, value) = field(&mut lines, end, "castling")?;
        let castling = parse_castling(value).ok_or_else(|| GameError::format(line, "bad castling rights"))?;

        let (ep_line, ep) = field(&mut lines, end, "en-passant")?;
        let (chain_line, chain) = field(&mut lines, end, "chain")?;

        let (line, value) = field(&mut lines, end, "halfmove")?;
        let halfmove: u16 = value
            .parse()
            .map_err(|_| GameError::format(line, "bad halfmove clock"))?;
        let (line, value) = field(&mut lines, end, "ply")?;
        let ply: u32 = value.parse().map_err(|_| GameError::format(line, "bad ply count"))?;

        let (line, value) = field(&mut lines, end, "board")?;
        let (width, height) = value
            .split_once('x')
            .and_then(|(w, h)| Some((w.parse::<usize>().ok()?, h.parse::<usize>().ok()?)))
            .ok_or_else(|| GameError::format(line, "bad board size"))?;
        if (width, height) != rules.dimensions() {
            return Err(GameError::format(
                line,
                format!("{variant} is played on a {:?} board", rules.dimensions()),
            ));
        }

        let mut board = Board::new(width, height);
        for rank in (0..height).rev() {
            let (line, row) = lines
                .next()
                .ok_or_else(|| GameError::format(end, "board ends early"))?;
            let mut tokens = row.split_whitespace();
            let label = tokens.next().and_then(|t| t.parse::<usize>().ok());
            if label != Some(rank + 1) {
                return Err(GameError::format(line, format!("expected rank {}", rank + 1)));
            }
            let cells: Vec<&str> = tokens.collect();
            if cells.len() != width {
                return Err(GameError::format(line, format!("expected {width} squares")));
            }
            for (file, cell) in cells.iter().enumerate() {
                let mut chars = cell.chars();
                let (Some(ch), None) = (chars.next(), chars.next()) else {
                    return Err(GameError::format(line, format!("bad square '{cell}'")));
                };
                if ch == '.' {
                    continue;
                }
                let piece = rules
                    .piece_from_symbol(ch)
                    .ok_or_else(|| GameError::format(line, format!("unknown piece '{ch}'")))?;
                board.set_piece(rank * width + file, Some(piece));
            }
        }

        let square = |line: usize, value: &str| -> GameResult<Option<Square>> {
            if value == "-" {
                return Ok(None);
            }
            parse_square(value, width, height)
                .map(Some)
                .map_err(|reason| GameError::format(line, reason))
        };
        board.set_side(side);
        board.set_castling(castling);
        board.set_ep(square(ep_line, ep)?);
        board.set_chain(square(chain_line, chain)?);
        board.halfmove = halfmove;
        board.ply = ply;
        board.reset_history();

        let mut game = Game::new(rules);
        game.replace_board(board);
        game.refresh_game_state();
        Ok(game)
    }
}

// Next line, which must read "<key> <value>"
fn field<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
    end: usize,
    key: &str,
) -> GameResult<(usize, &'a str)> {
    let (line, text) = lines
        .next()
        .ok_or_else(|| GameError::format(end, format!("missing '{key}'")))?;
    match text.split_once(' ') {
        Some((k, value)) if k == key => Ok((line, value.trim())),
        _ => Err(GameError::format(line, format!("expected '{key}'"))),
    }
}

fn castling_text(rights: u8) -> String {
    let text: String = [
        (CASTLE_NEAR_KING, 'K'),
        (CASTLE_NEAR_QUEEN, 'Q'),
        (CASTLE_FAR_KING, 'k'),
        (CASTLE_FAR_QUEEN, 'q'),
    ]
    .iter()
    .filter(|(bit, _)| rights & bit != 0)
    .map(|&(_, c)| c)
    .collect();
    if text.is_empty() {
        "-".to_string()
    } else {
        text
    }
}

fn parse_castling(text: &str) -> Option<u8> {
    if text == "-" {
        return Some(0);
    }
    text.chars().try_fold(0u8, |acc, c| {
        let bit = match c {
            'K' => CASTLE_NEAR_KING,
            'Q' => CASTLE_NEAR_QUEEN,
            'k' => CASTLE_FAR_KING,
            'q' => CASTLE_FAR_QUEEN,
            _ => return None,
        };
        Some(acc | bit)
    })
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board = &self.board;
        let width = board.width();
        let optional = |sq: Option<Square>| sq.map_or_else(|| "-".to_string(), |s| square_name(s, width));
        let options = serde_json::to_string(self.rules.options()).map_err(|_| fmt::Error)?;
        writeln!(f, "variant {}", self.rules.variant())?;
        writeln!(f, "options {options}")?;
        writeln!(f, "turn {}", board.side())?;
        writeln!(f, "castling {}", castling_text(board.castling()))?;
        writeln!(f, "en-passant {}", optional(board.ep()))?;
        writeln!(f, "chain {}", optional(board.chain()))?;
        writeln!(f, "halfmove {}", board.halfmove)?;
        writeln!(f, "ply {}", board.ply)?;
        writeln!(f, "board {}x{}", width, board.height())?;
        f.write_str(&board.render(|p| self.rules.piece_symbol(p)))
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("variant", &self.rules.variant())
            .field("state", &self.state)
            .field("turn", &self.turn())
            .field("history", &self.history.len())
            .finish()
    }
}
