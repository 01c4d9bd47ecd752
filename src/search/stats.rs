//! Search statistics and performance metrics
//!
//! Counters for one search invocation: nodes expanded, leaves evaluated,
//! cutoffs, ordering cache hits and timing.

use std::time::{Duration, Instant};

use tracing::debug;

/// Search statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchStats {
    /// Positions visited below the root
    pub nodes: u64,

    /// Leaf evaluations (depth exhausted or game decided)
    pub evaluations: u64,

    /// Alpha-beta cutoffs
    pub cutoffs: u64,

    /// Nodes where the remembered best move was tried first
    pub cache_hits: u64,

    /// Legal moves at the root
    pub root_moves: usize,

    /// Depth of the final iteration
    pub depth: u8,

    /// Search start time
    pub start_time: Option<Instant>,

    /// Time spent searching
    pub search_time: Duration,

    /// Nodes per second rate
    pub nps: u64,
}

impl SearchStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_timing(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Update elapsed time and NPS
    pub fn update_timing(&mut self) {
        if let Some(start) = self.start_time {
            self.search_time = start.elapsed();
            let elapsed_ms = self.search_time.as_millis() as u64;
            if elapsed_ms > 0 {
                self.nps = (self.nodes * 1000) / elapsed_ms;
            }
        }
    }

    #[inline]
    pub fn inc_node(&mut self) {
        self.nodes += 1;
    }

    #[inline]
    pub fn inc_evaluation(&mut self) {
        self.evaluations += 1;
    }

    #[inline]
    pub fn inc_cutoff(&mut self) {
        self.cutoffs += 1;
    }

    #[inline]
    pub fn inc_cache_hit(&mut self) {
        self.cache_hits += 1;
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Counters only, without timing, for comparing two searches
    pub fn counters(&self) -> (u64, u64, u64, u64) {
        (self.nodes, self.evaluations, self.cutoffs, self.cache_hits)
    }

    pub fn log_summary(&self) {
        debug!(
            depth = self.depth,
            root_moves = self.root_moves,
            nodes = self.nodes,
            evaluations = self.evaluations,
            cutoffs = self.cutoffs,
            cache_hits = self.cache_hits,
            time_ms = self.search_time.as_millis() as u64,
            nps = self.nps,
            "search finished"
        );
    }
}
