//! tavola: two-player board game engine with minimax/negamax search
//!
//! Variants (chess, dragon chess, checkers and its relatives, Ugolki) plug
//! into one rules contract; games, players and the search are generic over it.

pub mod board;
pub mod error;
pub mod eval;
pub mod game;
pub mod player;
pub mod rules;
pub mod search;
pub mod shell;
pub mod utils;
pub mod zobrist;

pub use board::{Board, Move, Piece, PieceKind, Side, Square};
pub use error::{GameError, GameResult};
pub use game::{Game, GameState, Step};
pub use player::{AiPlayer, Choice, Player, RandomPlayer, RelayPlayer, ScriptedPlayer};
pub use rules::{Rules, Status, Variant};
pub use search::{Algorithm, Search, SearchOutcome, SearchParams};
