//! Best-move memory for move ordering
//!
//! Maps a position hash to the best move found there by an earlier,
//! shallower iteration. Lives for one search invocation only.

use std::collections::HashMap;

use crate::board::Move;

#[derive(Debug, Default, Clone)]
pub struct MoveCache {
    best: HashMap<u64, Move>,
}

impl MoveCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, hash: u64) -> Option<&Move> {
        self.best.get(&hash)
    }

    pub fn store(&mut self, hash: u64, mv: Move) {
        self.best.insert(hash, mv);
    }

    pub fn clear(&mut self) {
        self.best.clear();
    }

    /// Exploration order for `moves`: generation order with the remembered move moved to the front
    pub fn order(&self, hash: u64, moves: &[Move]) -> (Vec<usize>, bool) {
        let mut order: Vec<usize> = (0..moves.len()).collect();
        let hit = self
            .get(hash)
            .and_then(|best| moves.iter().position(|m| m == best));
        match hit {
            Some(pos) => {
                order[..=pos].rotate_right(1);
                (order, true)
            }
            None => (order, false),
        }
    }
}
