//! Modulo di valutazione - materiale, struttura pedonale e Piece-Square Tables
//!
//! Lo score e' sempre dal punto di vista del BIANCO: positivo = meglio per il
//! Bianco, negativo = meglio per il Nero. Lo scacco matto vale +/- INFINITE.

use shakmaty::{Board, Chess, Color, Position, Role, Square};

use crate::board::game_ply;

/// Valore sentinella per lo scacco matto (e limiti iniziali alpha/beta)
pub const INFINITE: i32 = 1_000_000;

// ============================================================================
// VALORI MATERIALI (in centipawn)
// ============================================================================
const PAWN_VALUE: i32 = 100;
const KNIGHT_VALUE: i32 = 320;
const BISHOP_VALUE: i32 = 330;
const ROOK_VALUE: i32 = 500;
const QUEEN_VALUE: i32 = 900;

/// Penalita' per ogni pedone doppiato, bloccato o isolato
const STRUCTURE_PENALTY: i32 = 30;

/// Oltre questo numero di semimosse si considera finale
pub const ENDGAME_PLY: u32 = 40;

/// Sotto questo materiale complessivo (scala 9/5/3/3/1) si considera finale
const ENDGAME_MATERIAL: u32 = 28;

// ============================================================================
// PIECE-SQUARE TABLES (dal punto di vista del BIANCO)
// ============================================================================
// Indici: riga 0 = ottava traversa (A8..H8), riga 7 = prima traversa (A1..H1).
// Bianco legge (7 - rank) * 8 + file, il Nero legge rank * 8 + file.

#[rustfmt::skip]
const PAWN_PSQT: [i32; 64] = [
     0,  0,   0,   0,   0,   0,  0,  0,
    50, 50,  50,  50,  50,  50, 50, 50,
    10, 10,  20,  30,  30,  20, 10, 10,
     5,  5,  10,  25,  25,  10,  5,  5,
     0,  0,   0,  20,  20,   0,  0,  0,
     5, -5, -10,   0,   0, -10, -5,  5,
     5, 10,  10, -20, -20,  10, 10,  5,
     0,  0,   0,   0,   0,   0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_PSQT: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -50, -90, -30, -30, -30, -30, -90, -50,
];

#[rustfmt::skip]
const BISHOP_PSQT: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -20, -10, -90, -10, -10, -90, -10, -20,
];

#[rustfmt::skip]
const ROOK_PSQT: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_PSQT: [i32; 64] = [
    -20, -10, -10, -5, -5, -10, -10, -20,
    -10,   0,   0,  0,  0,   0,   0, -10,
    -10,   0,   5,  5,  5,   5,   0, -10,
     -5,   0,   5,  5,  5,   5,   0,  -5,
      0,   0,   5,  5,  5,   5,   0,  -5,
    -10,   5,   5,  5,  5,   5,   0, -10,
    -10,   0,   5,  0,  0,   0,   0, -10,
    -20, -10, -10, 70, -5, -10, -10, -20,
];

/// Re in apertura/mediogioco: resta dietro i pedoni, premia l'arrocco
#[rustfmt::skip]
const KING_PSQT: [i32; 64] = [
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -10, -20, -20, -20, -20, -20, -20, -10,
     20,  20,   0,   0,   0,   0,  20,  20,
     20,  30,  10,   0,   0,  10,  30,  20,
];

/// Re nel finale: centralizzazione
#[rustfmt::skip]
const KING_ENDGAME_PSQT: [i32; 64] = [
    -50, -40, -30, -20, -20, -30, -40, -50,
    -30, -20, -10,   0,   0, -10, -20, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -30,   0,   0,   0,   0, -30, -30,
    -50, -30, -30, -30, -30, -30, -30, -50,
];

/// Fase della partita, decide quale tabella usare per il Re
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Middlegame,
    Endgame,
}

/// Conteggi dei difetti pedonali per un colore
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PawnCounts {
    pub doubled: i32,
    pub blocked: i32,
    pub isolated: i32,
}

impl PawnCounts {
    fn total(&self) -> i32 {
        self.doubled + self.blocked + self.isolated
    }
}

/// Difetti pedonali di entrambi i colori
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PawnStructure {
    pub white: PawnCounts,
    pub black: PawnCounts,
}

impl PawnStructure {
    /// Penalita' netta (Bianco - Nero), gia' moltiplicata per il peso
    pub fn penalty(&self) -> i32 {
        STRUCTURE_PENALTY * (self.white.total() - self.black.total())
    }
}

/// Anything that can put a number on a position for the search
pub trait Evaluate {
    fn evaluate(&self, pos: &Chess) -> i32;
}

impl<E: Evaluate + ?Sized> Evaluate for &E {
    fn evaluate(&self, pos: &Chess) -> i32 {
        (**self).evaluate(pos)
    }
}

/// Valutatore statico
///
/// Di default somma materiale, struttura pedonale e PSQT. Con
/// [`Evaluator::material_only`] le PSQT vengono ignorate e restano solo
/// materiale e struttura pedonale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluator {
    piece_square: bool,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self { piece_square: true }
    }

    pub fn material_only() -> Self {
        Self {
            piece_square: false,
        }
    }

    pub fn with_piece_square(piece_square: bool) -> Self {
        Self { piece_square }
    }

    pub fn uses_piece_square(&self) -> bool {
        self.piece_square
    }
}

impl Evaluate for Evaluator {
    fn evaluate(&self, pos: &Chess) -> i32 {
        if pos.is_checkmate() {
            return match pos.turn() {
                Color::White => -INFINITE,
                Color::Black => INFINITE,
            };
        }

        let board = pos.board();
        let mut score = material_score(board) - pawn_structure(board).penalty();

        if self.piece_square {
            score += piece_square_score(board, game_phase(pos));
        }

        score
    }
}

/// Valuta la posizione con il valutatore di default
///
/// # Argomenti
/// * `pos` - La posizione da valutare
///
/// # Returns
/// Score in centipawn dal punto di vista del Bianco
pub fn evaluate(pos: &Chess) -> i32 {
    Evaluator::new().evaluate(pos)
}

fn count(board: &Board, color: Color, role: Role) -> i32 {
    (board.by_color(color) & board.by_role(role)).count() as i32
}

/// Differenza materiale Bianco - Nero (scala 900/500/330/320/100)
fn material_score(board: &Board) -> i32 {
    let side = |color| {
        QUEEN_VALUE * count(board, color, Role::Queen)
            + ROOK_VALUE * count(board, color, Role::Rook)
            + BISHOP_VALUE * count(board, color, Role::Bishop)
            + KNIGHT_VALUE * count(board, color, Role::Knight)
            + PAWN_VALUE * count(board, color, Role::Pawn)
    };
    side(Color::White) - side(Color::Black)
}

/// Materiale complessivo sulla scala 9/5/3/3/1, usato solo per la fase
fn phase_material(board: &Board) -> u32 {
    [Color::White, Color::Black]
        .into_iter()
        .map(|color| {
            9 * count(board, color, Role::Queen)
                + 5 * count(board, color, Role::Rook)
                + 3 * count(board, color, Role::Knight)
                + 3 * count(board, color, Role::Bishop)
                + count(board, color, Role::Pawn)
        })
        .sum::<i32>() as u32
}

/// Determina la fase della partita
///
/// Finale se sono state giocate piu' di 40 semimosse oppure se il materiale
/// complessivo scende sotto 28.
pub fn game_phase(pos: &Chess) -> GamePhase {
    if game_ply(pos) > ENDGAME_PLY || phase_material(pos.board()) < ENDGAME_MATERIAL {
        GamePhase::Endgame
    } else {
        GamePhase::Middlegame
    }
}

// ============================================================================
// STRUTTURA PEDONALE
// ============================================================================

fn pawns_per_file(board: &Board, color: Color) -> [i32; 8] {
    let mut files = [0; 8];
    for sq in board.by_color(color) & board.pawns() {
        files[sq.file() as usize] += 1;
    }
    files
}

/// Pedoni oltre il primo sulla stessa colonna
fn doubled_pawns(files: &[i32; 8]) -> i32 {
    files.iter().map(|&n| (n - 1).max(0)).sum()
}

/// Pedoni la cui casella davanti e' occupata da un pezzo avversario
///
/// Un pedone senza casella davanti (ultima traversa) non e' mai bloccato.
fn blocked_pawns(board: &Board, color: Color) -> i32 {
    let step = match color {
        Color::White => 8,
        Color::Black => -8,
    };
    (board.by_color(color) & board.pawns())
        .into_iter()
        .filter(|sq| {
            sq.offset(step)
                .is_some_and(|front| board.color_at(front) == Some(!color))
        })
        .count() as i32
}

/// Pedoni senza pedoni amici sulle colonne adiacenti (qualsiasi traversa)
fn isolated_pawns(board: &Board, color: Color, files: &[i32; 8]) -> i32 {
    (board.by_color(color) & board.pawns())
        .into_iter()
        .filter(|sq| {
            let file = sq.file() as usize;
            let left = file.checked_sub(1).map_or(0, |f| files[f]);
            let right = files.get(file + 1).copied().unwrap_or(0);
            left == 0 && right == 0
        })
        .count() as i32
}

fn pawn_counts(board: &Board, color: Color) -> PawnCounts {
    let files = pawns_per_file(board, color);
    PawnCounts {
        doubled: doubled_pawns(&files),
        blocked: blocked_pawns(board, color),
        isolated: isolated_pawns(board, color, &files),
    }
}

/// Conta pedoni doppiati, bloccati e isolati per entrambi i colori
pub fn pawn_structure(board: &Board) -> PawnStructure {
    PawnStructure {
        white: pawn_counts(board, Color::White),
        black: pawn_counts(board, Color::Black),
    }
}

// ============================================================================
// PIECE-SQUARE
// ============================================================================

fn psqt_index(sq: Square, color: Color) -> usize {
    let file = sq.file() as usize;
    let rank = sq.rank() as usize;
    match color {
        Color::White => (7 - rank) * 8 + file,
        Color::Black => rank * 8 + file,
    }
}

fn psqt_for(role: Role, phase: GamePhase) -> &'static [i32; 64] {
    match role {
        Role::Pawn => &PAWN_PSQT,
        Role::Knight => &KNIGHT_PSQT,
        Role::Bishop => &BISHOP_PSQT,
        Role::Rook => &ROOK_PSQT,
        Role::Queen => &QUEEN_PSQT,
        Role::King => match phase {
            GamePhase::Middlegame => &KING_PSQT,
            GamePhase::Endgame => &KING_ENDGAME_PSQT,
        },
    }
}

/// Contributo PSQT: sommato per il Bianco, sottratto per il Nero
pub fn piece_square_score(board: &Board, phase: GamePhase) -> i32 {
    let mut score = 0;
    for sq in board.occupied() {
        if let Some(piece) = board.piece_at(sq) {
            let bonus = psqt_for(piece.role, phase)[psqt_index(sq, piece.color)];
            match piece.color {
                Color::White => score += bonus,
                Color::Black => score -= bonus,
            }
        }
    }
    score
}

// ============================================================================
// TESTS
// ============================================================================
