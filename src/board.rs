//! Board helpers on top of shakmaty
//!
//! shakmaty owns the rules of chess. This module only adapts it to what the
//! rest of the engine needs: FEN loading, UCI move text in both directions,
//! and the ply counter used by the evaluation phase.

use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Color, Move, Position, Role};

use crate::error::{EngineError, EngineResult};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Build a position from a FEN string
pub fn position_from_fen(fen: &str) -> EngineResult<Chess> {
    let parsed: Fen = fen
        .trim()
        .parse()
        .map_err(|e| EngineError::InvalidFen(format!("{fen}: {e}")))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| EngineError::InvalidFen(format!("{fen}: {e}")))
}

/// Render a move in UCI long algebraic notation (e2e4, e7e8q, e1g1)
pub fn move_to_uci(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}

/// Resolve a UCI move string against the legal moves of `pos`
///
/// A four-character move that lands on the promotion rank without naming a
/// piece is promoted to a queen.
pub fn parse_uci_move(pos: &Chess, text: &str) -> EngineResult<Move> {
    let text = text.trim();
    let legal = pos.legal_moves();

    if let Some(mv) = legal.iter().find(|m| move_to_uci(m) == text) {
        return Ok(mv.clone());
    }

    if text.len() == 4 {
        if let Some(mv) = legal.iter().find(|m| {
            m.promotion() == Some(Role::Queen) && move_to_uci(m).starts_with(text)
        }) {
            return Ok(mv.clone());
        }
    }

    Err(EngineError::IllegalMove(text.to_string()))
}

/// Apply a sequence of UCI moves, failing on the first illegal one
pub fn apply_uci_moves<'a, I>(mut pos: Chess, moves: I) -> EngineResult<Chess>
where
    I: IntoIterator<Item = &'a str>,
{
    for text in moves {
        let mv = parse_uci_move(&pos, text)?;
        pos.play_unchecked(&mv);
    }
    Ok(pos)
}

/// Number of plies played so far, derived from the move counters
pub fn game_ply(pos: &Chess) -> u32 {
    let black_to_move = u32::from(pos.turn() == Color::Black);
    (pos.fullmoves().get() - 1)
        .saturating_mul(2)
        .saturating_add(black_to_move)
}
