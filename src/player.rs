//! Players: whoever picks the move for one side
//!
//! The game hands every player the legal move list it computed and the
//! player answers with a move, or with a piece selection when moves are
//! entered in two steps.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::board::{Move, Square};
use crate::error::{GameError, GameResult};
use crate::game::Game;
use crate::search::{Search, SearchOutcome, SearchParams};

/// A player's answer to `choose_move`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Move(Move),
    /// First half of a two-step entry: the piece to move
    Select(Square),
}

pub trait Player: Send {
    fn name(&self) -> &str;

    /// Pick one of `legal`, the moves the game computed for the side to move
    fn choose_move(&mut self, game: &Game, legal: &[Move]) -> GameResult<Choice>;

    /// Independent copy for `Game::deep_copy`; `None` when the player is tied to an outside source
    fn try_clone(&self) -> Option<Box<dyn Player>>;
}

// ============================================================================
// AI
// ============================================================================

/// Search-driven player
#[derive(Clone)]
pub struct AiPlayer {
    params: SearchParams,
    rng: StdRng,
    last: Option<SearchOutcome>,
}

impl AiPlayer {
    pub fn new(params: SearchParams) -> Self {
        Self::with_seed(params, rand::random())
    }

    /// Reproducible tie-breaking
    pub fn with_seed(params: SearchParams, seed: u64) -> Self {
        Self {
            params,
            rng: StdRng::seed_from_u64(seed),
            last: None,
        }
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn set_params(&mut self, params: SearchParams) {
        self.params = params;
    }

    /// Outcome of the most recent search, with its stats and trace
    pub fn last_outcome(&self) -> Option<&SearchOutcome> {
        self.last.as_ref()
    }
}

impl Player for AiPlayer {
    fn name(&self) -> &str {
        "ai"
    }

    fn choose_move(&mut self, game: &Game, legal: &[Move]) -> GameResult<Choice> {
        let mut search = Search::for_game(game, self.params.clone());
        let outcome = search.run(legal, &mut self.rng)?;
        let best = outcome.best_move.clone().ok_or(GameError::NoMove);
        self.last = Some(outcome);
        Ok(Choice::Move(best?))
    }

    fn try_clone(&self) -> Option<Box<dyn Player>> {
        Some(Box::new(self.clone()))
    }
}

// ============================================================================
// RANDOM
// ============================================================================

/// Uniform choice among the legal moves
#[derive(Clone)]
pub struct RandomPlayer {
    rng: StdRng,
}

impl RandomPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Player for RandomPlayer {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_move(&mut self, _game: &Game, legal: &[Move]) -> GameResult<Choice> {
        if legal.is_empty() {
            return Err(GameError::NoMove);
        }
        let index = self.rng.random_range(0..legal.len());
        Ok(Choice::Move(legal[index].clone()))
    }

    fn try_clone(&self) -> Option<Box<dyn Player>> {
        Some(Box::new(self.clone()))
    }
}

// ============================================================================
// SCRIPTED
// ============================================================================

/// Plays a fixed list of moves given in notation
#[derive(Debug, Clone, Default)]
pub struct ScriptedPlayer {
    script: VecDeque<String>,
}

impl ScriptedPlayer {
    pub fn new<I, S>(moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: moves.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Player for ScriptedPlayer {
    fn name(&self) -> &str {
        "scripted"
    }

    fn choose_move(&mut self, game: &Game, legal: &[Move]) -> GameResult<Choice> {
        let text = self.script.pop_front().ok_or(GameError::ScriptExhausted)?;
        match game.rules().find_move(game.board(), legal, &text) {
            Ok(mv) => Ok(Choice::Move(mv)),
            Err(e) => {
                warn!(mv = %text, "scripted move is not legal here");
                Err(e)
            }
        }
    }

    fn try_clone(&self) -> Option<Box<dyn Player>> {
        Some(Box::new(self.clone()))
    }
}

// ============================================================================
// RELAY
// ============================================================================

/// Human player behind a UI: squares clicked on the board arrive over a channel
///
/// The first click selects a piece, the second picks its destination. A
/// click on another own piece changes the selection.
pub struct RelayPlayer {
    picks: Receiver<Square>,
}

impl RelayPlayer {
    pub fn new(picks: Receiver<Square>) -> Self {
        Self { picks }
    }

    /// Player plus the sender the UI feeds clicks into
    pub fn channel() -> (Self, Sender<Square>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(rx), tx)
    }
}

impl Player for RelayPlayer {
    fn name(&self) -> &str {
        "relay"
    }

    fn choose_move(&mut self, game: &Game, legal: &[Move]) -> GameResult<Choice> {
        loop {
            let sq = self.picks.recv().map_err(|_| GameError::PlayerDisconnected)?;

            if let Some(from) = game.selection() {
                if let Some(mv) = legal.iter().find(|m| m.from == from && m.to == sq) {
                    return Ok(Choice::Move(mv.clone()));
                }
            }
            if legal.iter().any(|m| m.from == sq) {
                return Ok(Choice::Select(sq));
            }
            warn!(square = sq, "pick does not start or finish a legal move");
        }
    }

    fn try_clone(&self) -> Option<Box<dyn Player>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Side;
    use crate::game::Step;
    use crate::rules::Variant;

    fn chess() -> Game {
        let mut game = Game::with_variant(Variant::Chess);
        game.new_game();
        game
    }

    #[test]
    fn scripted_player_plays_its_moves_then_runs_dry() {
        let mut game = chess();
        let mut player = ScriptedPlayer::new(["e2e4"]);
        let legal = game.compute_moves();
        let Choice::Move(mv) = player.choose_move(&game, &legal).unwrap() else {
            panic!("expected a move");
        };
        assert_eq!(game.move_to_string(&mv), "e2-e4");
        game.execute_move(&mv).unwrap();
        let legal = game.compute_moves();
        assert!(matches!(
            player.choose_move(&game, &legal),
            Err(GameError::ScriptExhausted)
        ));
    }

    #[test]
    fn scripted_player_rejects_illegal_text() {
        let game = chess();
        let mut player = ScriptedPlayer::new(["e2e5"]);
        let legal = game.compute_moves();
        assert!(matches!(
            player.choose_move(&game, &legal),
            Err(GameError::IllegalMove { .. })
        ));
    }

    #[test]
    fn random_player_is_reproducible() {
        let game = chess();
        let legal = game.compute_moves();
        let a = RandomPlayer::new(5).choose_move(&game, &legal).unwrap();
        let b = RandomPlayer::new(5).choose_move(&game, &legal).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn relay_player_selects_then_moves() {
        let mut game = chess();
        let (relay, tx) = RelayPlayer::channel();
        game.set_player(Side::Near, Some(Box::new(relay)));
        game.set_player(Side::Far, Some(Box::new(RandomPlayer::new(1))));

        // e2 = 12, e4 = 28; h5 = 39 is not a legal destination and is skipped
        tx.send(12).unwrap();
        assert_eq!(game.run_game().unwrap(), Step::Selected(12));
        tx.send(39).unwrap();
        tx.send(28).unwrap();
        let Step::Moved(mv) = game.run_game().unwrap() else {
            panic!("expected a move");
        };
        assert_eq!((mv.from, mv.to), (12, 28));
        assert_eq!(game.turn(), Side::Far);
    }

    #[test]
    fn relay_player_reports_disconnect() {
        let game = chess();
        let (mut relay, tx) = RelayPlayer::channel();
        drop(tx);
        let legal = game.compute_moves();
        assert!(matches!(
            relay.choose_move(&game, &legal),
            Err(GameError::PlayerDisconnected)
        ));
        assert!(relay.try_clone().is_none());
    }

    #[test]
    fn ai_player_keeps_its_last_outcome() {
        let game = chess();
        let mut ai = AiPlayer::with_seed(SearchParams::new().max_depth(1), 3);
        let legal = game.compute_moves();
        assert!(matches!(ai.choose_move(&game, &legal).unwrap(), Choice::Move(_)));
        let outcome = ai.last_outcome().unwrap();
        assert_eq!(outcome.stats.root_moves, 20);
        assert!(ai.try_clone().is_some());
    }
}
