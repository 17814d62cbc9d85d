//! Search parameters and configuration
//!
//! Controls search behavior including time limits, depth limits,
//! cache keying and the Monte Carlo budget.

use super::tt::KeyMode;

/// Alpha-beta search parameters
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// First iterative-deepening depth in plies
    pub start_depth: u8,

    /// Maximum search depth in plies
    pub max_depth: u8,

    /// Time budget in milliseconds, checked between depths
    pub time_limit_ms: u64,

    /// Consult and fill the transposition cache
    pub use_cache: bool,

    /// How positions are keyed in the cache
    pub key_mode: KeyMode,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            start_depth: 1,
            max_depth: 20,
            time_limit_ms: 5000,
            use_cache: true,
            key_mode: KeyMode::Zobrist,
        }
    }
}

impl SearchParams {
    /// Create new search params with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the first depth of iterative deepening
    pub fn start_depth(mut self, depth: u8) -> Self {
        self.start_depth = depth.max(1);
        self
    }

    /// Set maximum depth in plies
    pub fn max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    /// Set time limit in milliseconds
    pub fn time_limit(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Enable or disable the transposition cache
    pub fn use_cache(mut self, enable: bool) -> Self {
        self.use_cache = enable;
        self
    }

    /// Choose between Zobrist and exact FEN cache keys
    pub fn key_mode(mut self, mode: KeyMode) -> Self {
        self.key_mode = mode;
        self
    }
}

/// Monte Carlo tree search parameters
#[derive(Debug, Clone)]
pub struct MctsParams {
    /// Select/expand/simulate/backpropagate rounds per request
    pub iterations: u32,

    /// UCT exploration constant
    pub exploration: f64,

    /// Rollouts longer than this are scored as draws
    pub max_rollout_plies: u32,
}

impl Default for MctsParams {
    fn default() -> Self {
        Self {
            iterations: 1000,
            exploration: 1.4,
            max_rollout_plies: 1000,
        }
    }
}

impl MctsParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of iterations
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the UCT exploration constant
    pub fn exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    /// Set the rollout ply cap
    pub fn max_rollout_plies(mut self, plies: u32) -> Self {
        self.max_rollout_plies = plies;
        self
    }
}

/// Search time management parameters
#[derive(Debug, Clone)]
pub struct TimeManagement {
    pub moves_to_go: u64,
    pub msec_per_move: u64,
}

impl Default for TimeManagement {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeManagement {
    pub fn new() -> Self {
        Self {
            moves_to_go: 40,
            msec_per_move: 5000, // Default 5 seconds per move
        }
    }
}
