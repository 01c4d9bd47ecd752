//! Search parameters and configuration
//!
//! Controls which algorithm runs, how deep it looks and which of the
//! optional optimizations and diagnostics are switched on. A fresh copy is
//! handed to every search call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Scores kept from the root side's view, max and min nodes alternate
    Minimax,
    /// Scores kept from the mover's view and negated on the way up
    Negamax,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Minimax => f.write_str("minimax"),
            Algorithm::Negamax => f.write_str("negamax"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimax" => Ok(Algorithm::Minimax),
            "negamax" => Ok(Algorithm::Negamax),
            _ => Err(GameError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Search parameters for the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub algorithm: Algorithm,

    /// Search depth in plies
    pub max_depth: u8,

    /// Enable alpha-beta pruning
    pub alpha_beta: bool,

    /// Pick uniformly among equally scored best moves instead of the first generated
    pub randomize_ties: bool,

    /// Try the move remembered from shallower iterations first
    pub reorder_best_first: bool,

    /// Record the explored tree
    pub trace: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Negamax,
            max_depth: 4,
            alpha_beta: true,
            randomize_ties: false,
            reorder_best_first: true,
            trace: false,
        }
    }
}

impl SearchParams {
    /// Create new search params with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set maximum depth in plies
    pub fn max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn alpha_beta(mut self, enable: bool) -> Self {
        self.alpha_beta = enable;
        self
    }

    pub fn randomize_ties(mut self, enable: bool) -> Self {
        self.randomize_ties = enable;
        self
    }

    pub fn reorder_best_first(mut self, enable: bool) -> Self {
        self.reorder_best_first = enable;
        self
    }

    pub fn trace(mut self, enable: bool) -> Self {
        self.trace = enable;
        self
    }
}
