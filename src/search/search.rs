//! Main search engine implementation
//!
//! Fixed-depth minimax or negamax with optional alpha-beta pruning, run on a
//! private copy of the board through make/unmake. Both algorithms walk the
//! tree in the same order with the same windows, so they visit the same
//! nodes and back up the same values.

use rand::Rng;
use tracing::trace;

use super::cache::MoveCache;
use super::params::{Algorithm, SearchParams};
use super::stats::SearchStats;
use super::trace::{NoTrace, TraceNode, Tracer, TreeTrace};
use crate::board::{Board, Move, Side};
use crate::error::{GameError, GameResult};
use crate::eval::score_status;
use crate::game::Game;
use crate::rules::Rules;

/// Bound wider than any score
pub const INFINITE: i32 = 10_000_000;

/// Result of one search invocation
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// `None` when the root position is already decided
    pub best_move: Option<Move>,
    /// Score of the chosen move from the searching side's view
    pub score: i32,
    /// Number of root moves sharing the best score
    pub ties: usize,
    pub stats: SearchStats,
    pub trace: Option<TraceNode>,
}

// Root moves (by generation index) whose exact value reached the running best
struct RootResult {
    best: i32,
    exact: Vec<(usize, i32)>,
}

/// Main search engine
pub struct Search<'a> {
    rules: &'a Rules,

    /// Private position, mutated by make/unmake during the search
    board: Board,

    params: SearchParams,

    stats: SearchStats,

    /// Best moves remembered by earlier iterations
    cache: MoveCache,

    /// Side the search is choosing a move for
    root_side: Side,
}

impl<'a> Search<'a> {
    pub fn new(rules: &'a Rules, board: &Board, params: SearchParams) -> Self {
        Self {
            rules,
            board: board.clone(),
            params,
            stats: SearchStats::new(),
            cache: MoveCache::new(),
            root_side: board.side(),
        }
    }

    pub fn for_game(game: &'a Game, params: SearchParams) -> Self {
        Self::new(game.rules(), game.board(), params)
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Get search statistics
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Choose a move among `root_moves`, the legal moves of the position
    ///
    /// Ties are broken by generation order, or with `rng` when
    /// `randomize_ties` is set. An empty list or a decided position gives
    /// no move.
    pub fn run<R: Rng>(&mut self, root_moves: &[Move], rng: &mut R) -> GameResult<SearchOutcome> {
        self.stats.reset();
        self.cache.clear();
        self.stats.start_timing();
        self.root_side = self.board.side();
        self.stats.root_moves = root_moves.len();

        let depth = self.params.max_depth.max(1);
        self.stats.depth = depth;

        let status = self.rules.status_with(&self.board, root_moves);
        if root_moves.is_empty() || status.is_over() {
            self.stats.inc_evaluation();
            let score = score_status(self.rules, &self.board, status, 0);
            self.stats.update_timing();
            return Ok(SearchOutcome {
                best_move: None,
                score,
                ties: 0,
                stats: self.stats.clone(),
                trace: None,
            });
        }

        if self.params.reorder_best_first {
            for shallow in 1..depth {
                self.search_root(root_moves, shallow, &mut NoTrace)?;
            }
        }

        let (root, trace) = if self.params.trace {
            let mut tracer = TreeTrace::new(self.board.zobrist());
            let root = self.search_root(root_moves, depth, &mut tracer)?;
            let best = root.best;
            (root, Some(tracer.finish(best)))
        } else {
            (self.search_root(root_moves, depth, &mut NoTrace)?, None)
        };

        let mut ties: Vec<usize> = root
            .exact
            .iter()
            .filter(|&&(_, value)| value == root.best)
            .map(|&(index, _)| index)
            .collect();
        ties.sort_unstable();
        ties.dedup();

        let pick = if self.params.randomize_ties && ties.len() > 1 {
            ties.get(rng.random_range(0..ties.len()))
        } else {
            ties.first()
        };
        let index = *pick.ok_or(GameError::NoMove)?;
        let best_move = root_moves.get(index).cloned().ok_or(GameError::NoMove)?;

        self.stats.update_timing();
        self.stats.log_summary();

        Ok(SearchOutcome {
            best_move: Some(best_move),
            score: root.best,
            ties: ties.len(),
            stats: self.stats.clone(),
            trace,
        })
    }

    // Score every root move; moves that reach the running best get exact values
    fn search_root<T: Tracer>(&mut self, moves: &[Move], depth: u8, tracer: &mut T) -> GameResult<RootResult> {
        let hash = self.board.zobrist();
        let order = self.order(hash, moves);
        let mut best = -INFINITE;
        let mut best_index = None;
        let mut exact = Vec::with_capacity(moves.len());

        for index in order {
            let mv = &moves[index];
            let undo = self.board.make_move(mv)?;
            tracer.enter(self.rules, &self.board, mv);

            let alpha = if self.params.alpha_beta { best - 1 } else { -INFINITE };
            let value = self.child_value(depth - 1, alpha, INFINITE, tracer)?;

            tracer.leave(value);
            self.board.unmake_move(undo);

            if value >= best {
                if value > best {
                    best = value;
                    best_index = Some(index);
                }
                exact.push((index, value));
            }
        }

        if let Some(index) = best_index {
            self.cache.store(hash, moves[index].clone());
        }
        Ok(RootResult { best, exact })
    }

    // Value of the position just reached, from the root side's view, within (alpha, beta)
    fn child_value<T: Tracer>(&mut self, depth: u8, alpha: i32, beta: i32, tracer: &mut T) -> GameResult<i32> {
        match self.params.algorithm {
            Algorithm::Minimax => self.minimax(depth, alpha, beta, tracer),
            Algorithm::Negamax => {
                if self.board.side() == self.root_side {
                    self.negamax(depth, alpha, beta, tracer)
                } else {
                    Ok(-self.negamax(depth, -beta, -alpha, tracer)?)
                }
            }
        }
    }

    fn order(&mut self, hash: u64, moves: &[Move]) -> Vec<usize> {
        if !self.params.reorder_best_first {
            return (0..moves.len()).collect();
        }
        let (order, hit) = self.cache.order(hash, moves);
        if hit {
            self.stats.inc_cache_hit();
            trace!(hash, "best move from cache tried first");
        }
        order
    }

    /// Score from the mover's view for a leaf or decided position
    fn leaf(&mut self, status: crate::rules::Status, depth: u8) -> i32 {
        self.stats.inc_evaluation();
        score_status(self.rules, &self.board, status, depth)
    }

    /// Minimax: values from the root side's view, maximizing where the root side moves
    fn minimax<T: Tracer>(&mut self, depth: u8, mut alpha: i32, mut beta: i32, tracer: &mut T) -> GameResult<i32> {
        self.stats.inc_node();
        let moves = self.rules.generate_moves(&self.board);
        let status = self.rules.status_with(&self.board, &moves);
        let side = self.board.side();
        if depth == 0 || status.is_over() {
            let value = self.leaf(status, depth);
            return Ok(if side == self.root_side { value } else { -value });
        }

        let hash = self.board.zobrist();
        let maximizing = side == self.root_side;
        let mut best = if maximizing { -INFINITE } else { INFINITE };
        let mut best_index = None;

        for index in self.order(hash, &moves) {
            let mv = &moves[index];
            let undo = self.board.make_move(mv)?;
            tracer.enter(self.rules, &self.board, mv);
            let value = self.minimax(depth - 1, alpha, beta, tracer)?;
            tracer.leave(value);
            self.board.unmake_move(undo);

            if maximizing {
                if value > best {
                    best = value;
                    best_index = Some(index);
                }
                if self.params.alpha_beta {
                    alpha = alpha.max(value);
                }
            } else {
                if value < best {
                    best = value;
                    best_index = Some(index);
                }
                if self.params.alpha_beta {
                    beta = beta.min(value);
                }
            }
            if self.params.alpha_beta && alpha >= beta {
                self.stats.inc_cutoff();
                break;
            }
        }

        if let Some(index) = best_index {
            self.cache.store(hash, moves[index].clone());
        }
        Ok(best)
    }

    /// Negamax: values from the mover's view; negated only where the turn passes
    fn negamax<T: Tracer>(&mut self, depth: u8, mut alpha: i32, beta: i32, tracer: &mut T) -> GameResult<i32> {
        self.stats.inc_node();
        let moves = self.rules.generate_moves(&self.board);
        let status = self.rules.status_with(&self.board, &moves);
        if depth == 0 || status.is_over() {
            return Ok(self.leaf(status, depth));
        }

        let hash = self.board.zobrist();
        let side = self.board.side();
        let mut best = -INFINITE;
        let mut best_index = None;

        for index in self.order(hash, &moves) {
            let mv = &moves[index];
            let undo = self.board.make_move(mv)?;
            tracer.enter(self.rules, &self.board, mv);
            // a continuing capture keeps the same mover
            let value = if self.board.side() == side {
                self.negamax(depth - 1, alpha, beta, tracer)?
            } else {
                -self.negamax(depth - 1, -beta, -alpha, tracer)?
            };
            tracer.leave(if side == self.root_side { value } else { -value });
            self.board.unmake_move(undo);

            if value > best {
                best = value;
                best_index = Some(index);
            }
            if self.params.alpha_beta {
                alpha = alpha.max(value);
                if alpha >= beta {
                    self.stats.inc_cutoff();
                    break;
                }
            }
        }

        if let Some(index) = best_index {
            self.cache.store(hash, moves[index].clone());
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Piece;
    use crate::eval::WIN;
    use crate::rules::kinds::{KING, ROOK};
    use crate::rules::Variant;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mate_in_one() -> (Rules, Board) {
        let rules = Rules::new(Variant::Chess);
        let mut board = rules.empty_board();
        board.set_piece(46, Some(Piece::new(KING, Side::Near)));
        board.set_piece(0, Some(Piece::new(ROOK, Side::Near)));
        board.set_piece(63, Some(Piece::new(KING, Side::Far)));
        (rules, board)
    }

    #[test]
    fn finds_mate_in_one() {
        let (rules, board) = mate_in_one();
        let moves = rules.generate_moves(&board);
        for algorithm in [Algorithm::Minimax, Algorithm::Negamax] {
            let params = SearchParams::new().algorithm(algorithm).max_depth(2);
            let mut search = Search::new(&rules, &board, params);
            let outcome = search.run(&moves, &mut StdRng::seed_from_u64(1)).unwrap();
            let mv = outcome.best_move.unwrap();
            assert_eq!(rules.move_to_string(&board, &mv), "a1-a8");
            assert!(outcome.score >= WIN);
        }
    }

    #[test]
    fn no_move_in_decided_position() {
        let rules = Rules::new(Variant::Checkers);
        let board = rules.empty_board();
        let mut search = Search::new(&rules, &board, SearchParams::new());
        let outcome = search.run(&[], &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(outcome.best_move.is_none());
    }

    #[test]
    fn stats_are_fresh_per_run() {
        let rules = Rules::new(Variant::Checkers);
        let board = rules.setup_board();
        let moves = rules.generate_moves(&board);
        let mut search = Search::new(&rules, &board, SearchParams::new().max_depth(3));
        let first = search.run(&moves, &mut StdRng::seed_from_u64(3)).unwrap();
        let second = search.run(&moves, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(first.stats.counters(), second.stats.counters());
        assert_eq!(first.best_move, second.best_move);
        assert!(first.stats.nodes > 0);
    }

    #[test]
    fn search_leaves_the_callers_board_alone() {
        let rules = Rules::new(Variant::Chess);
        let board = rules.setup_board();
        let hash = board.zobrist();
        let moves = rules.generate_moves(&board);
        let mut search = Search::new(&rules, &board, SearchParams::new().max_depth(2));
        search.run(&moves, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(board.zobrist(), hash);
        assert_eq!(search.board.zobrist(), hash);
    }
}
