//! Search engine for tavola
//!
//! Fixed-depth minimax and negamax over any variant's [`Rules`](crate::rules::Rules).

pub mod cache;
pub mod params;
pub mod search;
pub mod stats;
pub mod trace;

pub use self::cache::MoveCache;
pub use self::params::{Algorithm, SearchParams};
pub use self::search::{Search, SearchOutcome, INFINITE};
pub use self::stats::SearchStats;
pub use self::trace::{NoTrace, TraceNode, Tracer, TreeTrace};

use rand::Rng;

use crate::error::GameResult;
use crate::game::Game;

/// Search the current position of `game` with `params`
pub fn best_move<R: Rng>(game: &Game, params: SearchParams, rng: &mut R) -> GameResult<SearchOutcome> {
    let moves = game.compute_moves();
    Search::for_game(game, params).run(&moves, rng)
}
