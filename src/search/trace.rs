//! Search tree tracing
//!
//! The search reports every move it plays and the score it backs up through
//! a [`Tracer`]. [`NoTrace`] compiles to nothing; [`TreeTrace`] builds the
//! explored tree for export as JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Move};
use crate::error::GameResult;
use crate::rules::Rules;

pub trait Tracer {
    /// A move was just played; `board` is the position after it
    fn enter(&mut self, rules: &Rules, board: &Board, mv: &Move);

    /// The subtree under the last entered move scored `score` (root side's view)
    fn leave(&mut self, score: i32);
}

/// Tracer that records nothing
pub struct NoTrace;

impl Tracer for NoTrace {
    #[inline(always)]
    fn enter(&mut self, _rules: &Rules, _board: &Board, _mv: &Move) {}

    #[inline(always)]
    fn leave(&mut self, _score: i32) {}
}

/// One explored position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceNode {
    /// Move leading here, `None` at the root
    pub mv: Option<String>,
    pub hash: u64,
    pub score: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TraceNode>,
}

impl TraceNode {
    /// Nodes in this subtree, itself included
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TraceNode::node_count).sum::<usize>()
    }

    pub fn to_json(&self) -> GameResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> GameResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Tracer building the full tree
pub struct TreeTrace {
    stack: Vec<TraceNode>,
}

impl TreeTrace {
    pub fn new(root_hash: u64) -> Self {
        Self {
            stack: vec![TraceNode {
                mv: None,
                hash: root_hash,
                score: 0,
                children: Vec::new(),
            }],
        }
    }

    /// Close the trace with the root's score
    pub fn finish(mut self, score: i32) -> TraceNode {
        // Unbalanced enter/leave only happens when the search bailed out with an error
        while self.stack.len() > 1 {
            self.leave(0);
        }
        let mut root = self.stack.pop().unwrap_or(TraceNode {
            mv: None,
            hash: 0,
            score: 0,
            children: Vec::new(),
        });
        root.score = score;
        root
    }
}

impl Tracer for TreeTrace {
    fn enter(&mut self, rules: &Rules, board: &Board, mv: &Move) {
        self.stack.push(TraceNode {
            mv: Some(rules.move_to_string(board, mv)),
            hash: board.zobrist(),
            score: 0,
            children: Vec::new(),
        });
    }

    fn leave(&mut self, score: i32) {
        if self.stack.len() < 2 {
            return;
        }
        if let Some(mut node) = self.stack.pop() {
            node.score = score;
            if let Some(parent) = self.stack.last_mut() {
                parent.children.push(node);
            }
        }
    }
}
