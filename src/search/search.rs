//! Main search engine implementation
//!
//! Implements iterative deepening minimax with alpha-beta pruning on top of
//! a transposition cache. Moves are searched in the order the move generator
//! produces them.

use std::time::Duration;

use rand::RngCore;
use shakmaty::{Chess, Color, Move, Position};
use tracing::{debug, info, trace};

use super::params::SearchParams;
use super::stats::SearchStats;
use super::tt::{PositionKey, TranspositionTable};
use super::MoveSearch;
use crate::board::move_to_uci;
use crate::error::{EngineError, EngineResult};
use crate::eval::{Evaluate, Evaluator, INFINITE};

/// Outcome of a root search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootResult {
    pub best_move: Move,
    pub score: i32,
    /// Depth of the last completed pass
    pub depth: u8,
}

/// Main search engine
pub struct Search<E: Evaluate = Evaluator> {
    /// Static evaluation used at the leaves
    evaluator: E,

    /// Transposition cache, lives as long as the engine
    tt: TranspositionTable,

    /// Search parameters
    params: SearchParams,

    /// Search statistics
    stats: SearchStats,

    /// Result of the most recent request
    last: Option<RootResult>,
}

impl Search<Evaluator> {
    /// Create search with the default evaluator
    pub fn with_params(params: SearchParams) -> Self {
        Self::new(Evaluator::new(), params)
    }
}

impl<E: Evaluate> Search<E> {
    /// Create new search engine
    ///
    /// # Arguments
    /// * `evaluator` - leaf evaluation
    /// * `params` - search parameters
    pub fn new(evaluator: E, params: SearchParams) -> Self {
        Self {
            evaluator,
            tt: TranspositionTable::new(params.key_mode),
            params,
            stats: SearchStats::new(),
            last: None,
        }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Swap the evaluator; cached scores came from the old one and are dropped
    pub fn set_evaluator(&mut self, evaluator: E) {
        self.evaluator = evaluator;
        self.tt.clear();
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Replace the parameters; the cache is kept unless the key mode changes
    pub fn set_params(&mut self, params: SearchParams) {
        self.tt.set_key_mode(params.key_mode);
        self.params = params;
    }

    /// Get search statistics
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn last_result(&self) -> Option<&RootResult> {
        self.last.as_ref()
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Forget every cached score (new game)
    pub fn clear_cache(&mut self) {
        self.tt.clear();
    }

    /// Iterative deepening driven by the configured parameters
    pub fn get_best_move(&mut self, pos: &Chess, maximizing: bool) -> EngineResult<RootResult> {
        let budget = Duration::from_millis(self.params.time_limit_ms);
        self.iterative_deepening(pos, self.params.start_depth, maximizing, budget)
    }

    /// Iterative deepening under a wall-clock budget
    ///
    /// The clock is only looked at between passes, so the pass running when
    /// the budget expires still completes. At least one pass always runs.
    ///
    /// # Returns
    /// Best move and score of the last completed pass, or
    /// `EngineError::NoLegalMoves`
    pub fn iterative_deepening(
        &mut self,
        pos: &Chess,
        start_depth: u8,
        maximizing: bool,
        budget: Duration,
    ) -> EngineResult<RootResult> {
        let moves = pos.legal_moves();
        if moves.is_empty() {
            return Err(EngineError::NoLegalMoves);
        }

        self.stats.reset();
        self.stats.start_timing();

        let mut depth = start_depth.max(1);
        let max_depth = self.params.max_depth.max(depth);

        let result = loop {
            let (best_move, score) = self.root_pass(pos, &moves, depth, maximizing);
            self.stats.completed_depth = depth;
            info!(
                depth,
                score,
                best = %move_to_uci(&best_move),
                nodes = self.stats.nodes,
                elapsed_ms = self.stats.elapsed().as_millis() as u64,
                "completed depth"
            );

            let result = RootResult {
                best_move,
                score,
                depth,
            };
            if depth >= max_depth || self.stats.elapsed() >= budget {
                break result;
            }
            depth += 1;
        };

        self.stats.update_timing();
        debug!(
            nodes = self.stats.nodes,
            tt_hits = self.stats.tt_hits,
            cutoffs = self.stats.cutoffs,
            "search finished"
        );
        self.last = Some(result.clone());
        Ok(result)
    }

    /// Score every root move at `depth`
    ///
    /// The best move starts as the first legal move so that a root where
    /// every line is lost still yields a move.
    fn root_pass(
        &mut self,
        pos: &Chess,
        moves: &[Move],
        depth: u8,
        maximizing: bool,
    ) -> (Move, i32) {
        let mut alpha = -INFINITE;
        let mut beta = INFINITE;
        let mut best_move = moves[0].clone();
        let mut best_score = if maximizing { -INFINITE } else { INFINITE };

        for mv in moves {
            self.stats.inc_root_node();

            let mut child = pos.clone();
            child.play_unchecked(mv);
            let score = self.minimax(&child, depth - 1, alpha, beta, !maximizing);
            trace!(depth, mv = %move_to_uci(mv), score, "root move");

            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_move = mv.clone();
                }
                alpha = alpha.max(best_score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_move = mv.clone();
                }
                beta = beta.min(best_score);
            }
        }

        (best_move, best_score)
    }

    /// Minimax with alpha-beta pruning
    ///
    /// A cache hit returns immediately regardless of the depth it was stored
    /// at. Leaves and finished games are evaluated; inner nodes cache their
    /// best score before returning.
    pub fn minimax(
        &mut self,
        pos: &Chess,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> i32 {
        self.stats.inc_node();

        let key = if self.params.use_cache {
            let key = self.tt.key(pos);
            if let Some(score) = self.tt.probe(&key) {
                self.stats.inc_tt_hit();
                return score;
            }
            Some(key)
        } else {
            None
        };

        if depth == 0 || pos.is_game_over() {
            let score = self.static_eval(pos);
            self.cache_store(key, score);
            return score;
        }

        let mut best = if maximizing { -INFINITE } else { INFINITE };
        for mv in pos.legal_moves() {
            let mut child = pos.clone();
            child.play_unchecked(&mv);
            let score = self.minimax(&child, depth - 1, alpha, beta, !maximizing);

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }

            if beta <= alpha {
                self.stats.inc_cutoff();
                break;
            }
        }

        self.cache_store(key, best);
        best
    }

    fn static_eval(&mut self, pos: &Chess) -> i32 {
        self.stats.inc_eval();
        self.evaluator.evaluate(pos)
    }

    fn cache_store(&mut self, key: Option<PositionKey>, score: i32) {
        if let Some(key) = key {
            self.tt.store(key, score);
            self.stats.inc_tt_store();
        }
    }
}

impl<E: Evaluate> MoveSearch for Search<E> {
    fn find_move(&mut self, pos: &Chess, _rng: &mut dyn RngCore) -> EngineResult<Move> {
        let maximizing = pos.turn() == Color::White;
        self.get_best_move(pos, maximizing).map(|r| r.best_move)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::position_from_fen;
    use std::cell::Cell;

    struct CountingEval {
        calls: Cell<u64>,
    }

    impl Evaluate for CountingEval {
        fn evaluate(&self, pos: &Chess) -> i32 {
            self.calls.set(self.calls.get() + 1);
            Evaluator::new().evaluate(pos)
        }
    }

    fn quick_params() -> SearchParams {
        SearchParams::new().max_depth(1).time_limit(0)
    }

    #[test]
    fn test_search_creation() {
        let search = Search::with_params(SearchParams::new());
        assert_eq!(search.params.max_depth, 20);
        assert_eq!(search.stats.nodes, 0);
        assert!(search.tt.is_empty());
    }

    #[test]
    fn test_cache_hit_skips_evaluator() {
        let counter = CountingEval {
            calls: Cell::new(0),
        };
        let mut search = Search::new(&counter, SearchParams::new());
        let pos = Chess::default();

        let first = search.minimax(&pos, 0, -INFINITE, INFINITE, true);
        assert_eq!(counter.calls.get(), 1);

        let second = search.minimax(&pos, 0, -INFINITE, INFINITE, true);
        assert_eq!(second, first);
        assert_eq!(counter.calls.get(), 1, "Cached position must not be re-evaluated");
        assert_eq!(search.stats().tt_hits, 1);
    }

    #[test]
    fn test_cache_ignores_depth() {
        let counter = CountingEval {
            calls: Cell::new(0),
        };
        let mut search = Search::new(&counter, SearchParams::new());
        let pos = Chess::default();

        let shallow = search.minimax(&pos, 0, -INFINITE, INFINITE, true);
        let deep = search.minimax(&pos, 3, -INFINITE, INFINITE, true);
        assert_eq!(shallow, deep);
        assert_eq!(counter.calls.get(), 1);
    }

    #[test]
    fn test_cache_disabled_reevaluates() {
        let counter = CountingEval {
            calls: Cell::new(0),
        };
        let mut search = Search::new(&counter, SearchParams::new().use_cache(false));
        let pos = Chess::default();

        search.minimax(&pos, 0, -INFINITE, INFINITE, true);
        search.minimax(&pos, 0, -INFINITE, INFINITE, true);
        assert_eq!(counter.calls.get(), 2);
        assert!(search.tt().is_empty());
    }

    #[test]
    fn test_no_legal_moves_is_an_error() {
        // Fool's mate: White is checkmated
        let pos =
            position_from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        let mut search = Search::with_params(quick_params());
        assert!(matches!(
            search.get_best_move(&pos, true),
            Err(EngineError::NoLegalMoves)
        ));
    }

    #[test]
    fn test_mate_in_one_found_at_depth_one() {
        let pos =
            position_from_fen("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4")
                .unwrap();
        let mut search = Search::with_params(quick_params());
        let result = search.get_best_move(&pos, true).unwrap();
        assert_eq!(move_to_uci(&result.best_move), "h5f7");
        assert_eq!(result.score, INFINITE);
        assert_eq!(result.depth, 1);
    }

    #[test]
    fn test_minimizing_side_picks_lowest() {
        // Black to move can take a free queen on d1
        let pos = position_from_fen("3rk3/8/8/8/8/8/8/3QK3 b - - 0 1").unwrap();
        let mut search = Search::with_params(quick_params());
        let result = search.get_best_move(&pos, false).unwrap();
        assert_eq!(move_to_uci(&result.best_move), "d8d1");
        assert!(result.score < 0);
    }

    #[test]
    fn test_depth_cap_stops_deepening() {
        let mut search = Search::with_params(SearchParams::new().max_depth(3).time_limit(60_000));
        let result = search.get_best_move(&Chess::default(), true).unwrap();
        assert_eq!(result.depth, 3);
        assert_eq!(search.stats().completed_depth, 3);
    }

    #[test]
    fn test_start_depth_is_respected() {
        let mut search = Search::with_params(SearchParams::new().max_depth(2).time_limit(0));
        let result = search
            .iterative_deepening(&Chess::default(), 2, true, Duration::ZERO)
            .unwrap();
        assert_eq!(result.depth, 2);
    }

    struct Lost;

    impl Evaluate for Lost {
        fn evaluate(&self, _pos: &Chess) -> i32 {
            -INFINITE
        }
    }

    #[test]
    fn test_all_moves_lose_still_returns_a_move() {
        let pos = Chess::default();
        let mut search = Search::new(Lost, quick_params());
        let result = search.get_best_move(&pos, true).unwrap();
        assert_eq!(result.best_move, pos.legal_moves()[0]);
        assert_eq!(result.score, -INFINITE);
    }
}
