//! Move search for the Alfiere engine
//!
//! Two strategies share one seam: depth-limited alpha-beta with iterative
//! deepening, and Monte Carlo tree search with random rollouts.

pub mod mcts;
pub mod params;
pub mod search;
pub mod stats;
pub mod tt;

use rand::RngCore;
use shakmaty::{Chess, Move};

use crate::error::EngineResult;

pub use self::mcts::{Mcts, MctsSearch};
pub use self::params::{MctsParams, SearchParams};
pub use self::search::{RootResult, Search};
pub use self::stats::SearchStats;
pub use self::tt::{KeyMode, PositionKey, TranspositionTable};

/// A strategy able to pick a move for the side to move
///
/// Randomness is injected so that seeded runs are reproducible.
pub trait MoveSearch {
    fn find_move(&mut self, pos: &Chess, rng: &mut dyn RngCore) -> EngineResult<Move>;
}
