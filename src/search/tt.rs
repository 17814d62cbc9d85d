//! Transposition cache keyed by position identity
//!
//! One score per position, whatever depth produced it. A score computed by a
//! shallow pass is reused as-is by deeper passes.

use std::collections::HashMap;

use shakmaty::fen::Fen;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{Chess, EnPassantMode};

use crate::board::game_ply;
use crate::eval::ENDGAME_PLY;

/// Mixed into the Zobrist key once the ply count alone makes it an endgame
const LATE_GAME_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// How a position is turned into a cache key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyMode {
    /// 64-bit Zobrist hash plus the ply-based phase bit: fast, small
    /// collision risk
    #[default]
    Zobrist,
    /// Full FEN string: collision free
    Fen,
}

impl KeyMode {
    pub fn key(self, pos: &Chess) -> PositionKey {
        match self {
            KeyMode::Zobrist => {
                let hash: Zobrist64 = pos.zobrist_hash(EnPassantMode::Legal);
                let salt = if game_ply(pos) > ENDGAME_PLY {
                    LATE_GAME_SALT
                } else {
                    0
                };
                PositionKey::Zobrist(hash.0 ^ salt)
            }
            KeyMode::Fen => {
                PositionKey::Fen(Fen::from_position(pos.clone(), EnPassantMode::Legal).to_string())
            }
        }
    }
}

/// Cache key for a position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PositionKey {
    Zobrist(u64),
    Fen(String),
}

/// Position-score memo table
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: HashMap<PositionKey, i32>,
    mode: KeyMode,
}

impl TranspositionTable {
    pub fn new(mode: KeyMode) -> Self {
        Self {
            entries: HashMap::new(),
            mode,
        }
    }

    pub fn key_mode(&self) -> KeyMode {
        self.mode
    }

    /// Switch key mode; existing entries are dropped since their keys no
    /// longer match
    pub fn set_key_mode(&mut self, mode: KeyMode) {
        if mode != self.mode {
            self.mode = mode;
            self.entries.clear();
        }
    }

    pub fn key(&self, pos: &Chess) -> PositionKey {
        self.mode.key(pos)
    }

    pub fn probe(&self, key: &PositionKey) -> Option<i32> {
        self.entries.get(key).copied()
    }

    /// Store a fully computed score, replacing any previous one
    pub fn store(&mut self, key: PositionKey, score: i32) {
        self.entries.insert(key, score);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
