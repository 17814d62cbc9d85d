//! Error types for the engine
//!
//! Covers the failures a move request can surface: a position with no legal
//! moves, bad input handed to the front ends, and unreadable opening books.

use std::io;

/// Errors that can occur while reading an opening book
#[derive(Debug, thiserror::Error)]
pub enum BookError {
    /// The book file could not be read
    #[error("failed to read opening book: {0}")]
    Io(#[from] io::Error),

    /// Polyglot books are a flat array of 16-byte records
    #[error("opening book length {len} is not a multiple of 16 bytes")]
    Truncated { len: usize },
}

/// Errors that can occur while choosing a move
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The position has no legal moves (checkmate or stalemate)
    #[error("no legal moves in the given position")]
    NoLegalMoves,

    /// A FEN string could not be turned into a legal position
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    /// A move string does not name a legal move in the position
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// An option name or value the engine does not understand
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// The opening book could not be loaded
    #[error(transparent)]
    Book(#[from] BookError),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
