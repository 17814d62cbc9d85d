//! UCI options configuration for Alfiere
//!
//! Option definitions with types, defaults and constraints, plus the typed
//! values the UCI loop turns into engine settings.

use crate::engine::{EngineConfig, Strategy};
use crate::error::{EngineError, EngineResult};
use crate::search::{MctsParams, SearchParams};

/// UCI option types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionType {
    Check { default: bool },
    Spin { default: i64, min: i64, max: i64 },
    Combo { default: String, vars: Vec<String> },
    String { default: String },
}

/// Individual UCI option definition
#[derive(Debug, Clone)]
pub struct UciOption {
    pub name: String,
    pub opt_type: OptionType,
}

impl UciOption {
    /// Line announced in answer to `uci`
    pub fn to_uci_line(&self) -> String {
        match &self.opt_type {
            OptionType::Check { default } => {
                format!("option name {} type check default {}", self.name, default)
            }
            OptionType::Spin { default, min, max } => format!(
                "option name {} type spin default {} min {} max {}",
                self.name, default, min, max
            ),
            OptionType::Combo { default, vars } => {
                let vars: String = vars.iter().map(|v| format!(" var {v}")).collect();
                format!("option name {} type combo default {}{}", self.name, default, vars)
            }
            OptionType::String { default } => {
                format!("option name {} type string default {}", self.name, default)
            }
        }
    }
}

pub const MAX_MCTS_ITERATIONS: i64 = 1_000_000;

/// Complete UCI options configuration
#[derive(Debug, Clone)]
pub struct UciOptions {
    /// Search used on a book miss
    pub strategy: Strategy,

    /// Polyglot book path, no book when `None`
    pub book_file: Option<String>,

    /// MCTS iterations per move
    pub mcts_iterations: u32,

    /// Seed for book and rollout randomness; 0 draws from entropy
    pub seed: u64,

    /// Transposition cache on/off
    pub use_cache: bool,

    /// Piece-square term in the evaluation
    pub piece_square: bool,

    /// Engine name
    pub engine_name: String,

    /// Engine author
    pub author: String,
}

impl Default for UciOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::AlphaBeta,
            book_file: None,
            mcts_iterations: MctsParams::default().iterations,
            seed: 0,
            use_cache: true,
            piece_square: true,
            engine_name: "Alfiere".to_string(),
            author: "Alfiere developers".to_string(),
        }
    }
}

impl UciOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Every option the engine understands
    pub fn definitions() -> Vec<UciOption> {
        let defaults = Self::default();
        vec![
            UciOption {
                name: "Strategy".to_string(),
                opt_type: OptionType::Combo {
                    default: Strategy::AlphaBeta.to_string(),
                    vars: vec![Strategy::AlphaBeta.to_string(), Strategy::Mcts.to_string()],
                },
            },
            UciOption {
                name: "BookFile".to_string(),
                opt_type: OptionType::String {
                    default: "<empty>".to_string(),
                },
            },
            UciOption {
                name: "MctsIterations".to_string(),
                opt_type: OptionType::Spin {
                    default: i64::from(defaults.mcts_iterations),
                    min: 1,
                    max: MAX_MCTS_ITERATIONS,
                },
            },
            UciOption {
                name: "Seed".to_string(),
                opt_type: OptionType::Spin {
                    default: 0,
                    min: 0,
                    max: i64::from(u32::MAX),
                },
            },
            UciOption {
                name: "UseCache".to_string(),
                opt_type: OptionType::Check {
                    default: defaults.use_cache,
                },
            },
            UciOption {
                name: "PieceSquareTables".to_string(),
                opt_type: OptionType::Check {
                    default: defaults.piece_square,
                },
            },
        ]
    }

    /// Set option value
    ///
    /// Names are matched case-insensitively as UCI allows.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> EngineResult<()> {
        let value = value.map(str::trim);
        match name.to_ascii_lowercase().as_str() {
            "strategy" => {
                self.strategy = require(name, value)?.parse()?;
            }
            "bookfile" => {
                self.book_file = match value {
                    None | Some("") | Some("<empty>") => None,
                    Some(path) => Some(path.to_string()),
                };
            }
            "mctsiterations" => {
                let n = parse_spin(name, value, 1, MAX_MCTS_ITERATIONS)?;
                self.mcts_iterations = n as u32;
            }
            "seed" => {
                self.seed = parse_spin(name, value, 0, i64::from(u32::MAX))? as u64;
            }
            "usecache" => {
                self.use_cache = parse_check(name, value)?;
            }
            "piecesquaretables" => {
                self.piece_square = parse_check(name, value)?;
            }
            _ => {
                return Err(EngineError::InvalidOption(format!("unknown option: {name}")));
            }
        }
        Ok(())
    }

    /// Seed handed to the engine, `None` meaning entropy
    pub fn rng_seed(&self) -> Option<u64> {
        (self.seed != 0).then_some(self.seed)
    }

    /// Engine configuration matching these options
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            search: SearchParams::new().use_cache(self.use_cache),
            mcts: MctsParams::new().iterations(self.mcts_iterations),
            seed: self.rng_seed(),
            piece_square: self.piece_square,
        }
    }
}

fn require<'a>(name: &str, value: Option<&'a str>) -> EngineResult<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EngineError::InvalidOption(format!("option {name} requires a value")))
}

fn parse_spin(name: &str, value: Option<&str>, min: i64, max: i64) -> EngineResult<i64> {
    let text = require(name, value)?;
    let n: i64 = text
        .parse()
        .map_err(|_| EngineError::InvalidOption(format!("invalid value for {name}: {text}")))?;
    if !(min..=max).contains(&n) {
        return Err(EngineError::InvalidOption(format!(
            "{name} must be between {min} and {max}"
        )));
    }
    Ok(n)
}

fn parse_check(name: &str, value: Option<&str>) -> EngineResult<bool> {
    match require(name, value)?.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(EngineError::InvalidOption(format!(
            "invalid value for {name}: {other}"
        ))),
    }
}
