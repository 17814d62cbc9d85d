//! Search statistics and performance metrics
//!
//! Tracks search performance including nodes searched, cutoffs,
//! cache hits, evaluator calls and timing information.

use std::time::{Duration, Instant};

/// Search statistics
#[derive(Debug, Default, Clone)]
pub struct SearchStats {
    /// Total nodes searched
    pub nodes: u64,

    /// Root moves scored across all passes
    pub root_nodes: u64,

    /// Static evaluations performed
    pub evals: u64,

    /// Transposition cache hits
    pub tt_hits: u64,

    /// Transposition cache stores
    pub tt_stores: u64,

    /// Alpha-beta cutoffs
    pub cutoffs: u64,

    /// Deepest fully completed iterative-deepening pass
    pub completed_depth: u8,

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

    /// Start timing
    pub fn start_timing(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Time since `start_timing`, zero if timing never started
    pub fn elapsed(&self) -> Duration {
        self.start_time.map(|t| t.elapsed()).unwrap_or_default()
    }

    /// Update search time and calculate NPS
    pub fn update_timing(&mut self) {
        self.search_time = self.elapsed();
        let elapsed_ms = self.search_time.as_millis() as u64;
        if elapsed_ms > 0 {
            self.nps = (self.nodes * 1000) / elapsed_ms;
        }
    }

    pub fn inc_node(&mut self) {
        self.nodes += 1;
    }

    pub fn inc_root_node(&mut self) {
        self.root_nodes += 1;
    }

    pub fn inc_eval(&mut self) {
        self.evals += 1;
    }

    pub fn inc_tt_hit(&mut self) {
        self.tt_hits += 1;
    }

    pub fn inc_tt_store(&mut self) {
        self.tt_stores += 1;
    }

    pub fn inc_cutoff(&mut self) {
        self.cutoffs += 1;
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Print formatted summary
    pub fn print_summary(&self) {
        println!("=== Search Statistics ===");
        println!("Completed depth: {}", self.completed_depth);
        println!("Nodes searched: {}", self.nodes);
        println!("Root nodes: {}", self.root_nodes);
        println!("Evaluations: {}", self.evals);
        println!(
            "Cache hits: {} ({:.1}% of nodes)",
            self.tt_hits,
            if self.nodes > 0 {
                (self.tt_hits as f64 / self.nodes as f64) * 100.0
            } else {
                0.0
            }
        );
        println!("Cache stores: {}", self.tt_stores);
        println!("Alpha-Beta cutoffs: {}", self.cutoffs);
        println!("Search time: {} ms", self.search_time.as_millis());
        println!("Nodes per second: {}", self.nps);
    }
}
