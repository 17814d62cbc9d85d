//! Move selection entry point
//!
//! An `Engine` owns everything that lives longer than one request: the
//! opening book, the alpha-beta searcher with its cache, and the random
//! source. A request asks the book first and only searches on a miss.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use shakmaty::{Chess, Move};
use tracing::{debug, info};

use crate::board::move_to_uci;
use crate::book::{choose_book_move, NoBook, OpeningBook};
use crate::error::{EngineError, EngineResult};
use crate::eval::Evaluator;
use crate::search::{MctsParams, MctsSearch, MoveSearch, Search, SearchParams, SearchStats};

/// Which search runs on a book miss
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    #[default]
    AlphaBeta,
    Mcts,
}

impl FromStr for Strategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alphabeta" | "alpha-beta" | "minimax" => Ok(Strategy::AlphaBeta),
            "mcts" => Ok(Strategy::Mcts),
            other => Err(EngineError::InvalidOption(format!("unknown strategy '{other}'"))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::AlphaBeta => write!(f, "AlphaBeta"),
            Strategy::Mcts => write!(f, "MCTS"),
        }
    }
}

/// Where the last returned move came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    Book,
    Search,
}

/// Engine construction settings
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub search: SearchParams,
    pub mcts: MctsParams,
    /// Fixed seed for reproducible book and rollout choices, entropy if `None`
    pub seed: Option<u64>,
    /// Add the piece-square term to the material and pawn-structure score
    pub piece_square: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search: SearchParams::default(),
            mcts: MctsParams::default(),
            seed: None,
            piece_square: true,
        }
    }
}

pub struct Engine {
    book: Box<dyn OpeningBook>,
    alpha_beta: Search<Evaluator>,
    mcts: MctsSearch,
    rng: StdRng,
    last_source: Option<MoveSource>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let evaluator = Evaluator::with_piece_square(config.piece_square);
        Self {
            book: Box::new(NoBook),
            alpha_beta: Search::new(evaluator, config.search),
            mcts: MctsSearch::new(config.mcts),
            rng: seeded_rng(config.seed),
            last_source: None,
        }
    }

    /// Attach an opening book
    pub fn with_book<B: OpeningBook + 'static>(mut self, book: B) -> Self {
        self.set_book(Box::new(book));
        self
    }

    pub fn set_book(&mut self, book: Box<dyn OpeningBook>) {
        self.book = book;
    }

    /// Pick a move with one of the built-in strategies
    ///
    /// # Returns
    /// The chosen move, or `EngineError::NoLegalMoves` when the game is over
    pub fn choose_move(&mut self, pos: &Chess, strategy: Strategy) -> EngineResult<Move> {
        let Self {
            book,
            alpha_beta,
            mcts,
            rng,
            last_source,
        } = self;
        let (mv, source) = match strategy {
            Strategy::AlphaBeta => book_then_search(&**book, rng, pos, alpha_beta)?,
            Strategy::Mcts => book_then_search(&**book, rng, pos, mcts)?,
        };
        *last_source = Some(source);
        Ok(mv)
    }

    /// Pick a move with a caller-supplied search on a book miss
    pub fn choose_move_with<S>(&mut self, pos: &Chess, search: &mut S) -> EngineResult<Move>
    where
        S: MoveSearch + ?Sized,
    {
        let (mv, source) = book_then_search(&*self.book, &mut self.rng, pos, search)?;
        self.last_source = Some(source);
        Ok(mv)
    }

    /// Whether the last returned move was a book move or a search result
    pub fn last_source(&self) -> Option<MoveSource> {
        self.last_source
    }

    /// White-positive score of the last alpha-beta search
    pub fn last_score(&self) -> Option<i32> {
        self.alpha_beta.last_result().map(|r| r.score)
    }

    /// Forget cached scores from the previous game
    pub fn new_game(&mut self) {
        self.alpha_beta.clear_cache();
        debug!("cache cleared for new game");
    }

    /// Reseed the random source, or draw a fresh seed from entropy
    pub fn reseed(&mut self, seed: Option<u64>) {
        self.rng = seeded_rng(seed);
    }

    pub fn search_params(&self) -> &SearchParams {
        self.alpha_beta.params()
    }

    pub fn set_search_params(&mut self, params: SearchParams) {
        self.alpha_beta.set_params(params);
    }

    pub fn mcts_params(&self) -> &MctsParams {
        self.mcts.params()
    }

    pub fn set_mcts_params(&mut self, params: MctsParams) {
        self.mcts = MctsSearch::new(params);
    }

    pub fn set_piece_square(&mut self, enable: bool) {
        if self.alpha_beta.evaluator().uses_piece_square() != enable {
            self.alpha_beta
                .set_evaluator(Evaluator::with_piece_square(enable));
        }
    }

    /// Statistics of the last alpha-beta request
    pub fn stats(&self) -> &SearchStats {
        self.alpha_beta.stats()
    }

    pub fn cache_len(&self) -> usize {
        self.alpha_beta.tt().len()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn book_then_search<S>(
    book: &dyn OpeningBook,
    rng: &mut dyn RngCore,
    pos: &Chess,
    search: &mut S,
) -> EngineResult<(Move, MoveSource)>
where
    S: MoveSearch + ?Sized,
{
    let entries = book.lookup(pos);
    if let Some(mv) = choose_book_move(&entries, &mut *rng) {
        info!(mv = %move_to_uci(&mv), candidates = entries.len(), "book move");
        return Ok((mv, MoveSource::Book));
    }
    let mv = search.find_move(pos, rng)?;
    Ok((mv, MoveSource::Search))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("mcts".parse::<Strategy>().unwrap(), Strategy::Mcts);
        assert_eq!("AlphaBeta".parse::<Strategy>().unwrap(), Strategy::AlphaBeta);
        assert_eq!("minimax".parse::<Strategy>().unwrap(), Strategy::AlphaBeta);
        assert!("random".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_new_game_clears_cache() {
        let config = EngineConfig {
            search: SearchParams::new().max_depth(2).time_limit(0),
            seed: Some(1),
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(config);
        engine
            .choose_move(&Chess::default(), Strategy::AlphaBeta)
            .unwrap();
        assert!(engine.cache_len() > 0);

        engine.new_game();
        assert_eq!(engine.cache_len(), 0);
    }

    #[test]
    fn test_toggle_piece_square() {
        let mut engine = Engine::default();
        engine.set_piece_square(false);
        assert!(!engine.alpha_beta.evaluator().uses_piece_square());
    }
}
