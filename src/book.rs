//! Opening book lookup
//!
//! The engine only reads books. `PolyglotBook` understands the common
//! Polyglot `.bin` layout: 16-byte big-endian records sorted by position key.
//!
//! | bytes  | field  |
//! |--------|--------|
//! | 0..8   | key    |
//! | 8..10  | move   |
//! | 10..12 | weight |
//! | 12..16 | learn  |

use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::RngCore;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position};
use tracing::{debug, info};

use crate::error::BookError;

const RECORD_SIZE: usize = 16;

/// Records weighted below this are excluded from play
pub const MIN_WEIGHT: u16 = 1;

/// A book move that is legal in the probed position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookEntry {
    pub mv: Move,
    pub weight: u16,
}

/// Source of recorded moves for known positions
pub trait OpeningBook {
    /// All recorded moves for `pos`, empty on a miss
    fn lookup(&self, pos: &Chess) -> Vec<BookEntry>;
}

/// A book that never hits
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBook;

impl OpeningBook for NoBook {
    fn lookup(&self, _pos: &Chess) -> Vec<BookEntry> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Record {
    key: u64,
    raw_move: u16,
    weight: u16,
}

/// In-memory Polyglot book
#[derive(Debug, Clone, Default)]
pub struct PolyglotBook {
    records: Vec<Record>,
}

impl PolyglotBook {
    /// Load a book from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BookError> {
        let bytes = fs::read(path.as_ref())?;
        let book = Self::from_bytes(&bytes)?;
        info!(
            path = %path.as_ref().display(),
            entries = book.len(),
            "opening book loaded"
        );
        Ok(book)
    }

    /// Parse raw book bytes
    ///
    /// Records are sorted by key after parsing so lookups can binary search
    /// even if the file was not.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BookError> {
        if bytes.len() % RECORD_SIZE != 0 {
            return Err(BookError::Truncated { len: bytes.len() });
        }

        let mut records: Vec<Record> = bytes
            .chunks_exact(RECORD_SIZE)
            .map(|chunk| Record {
                key: u64::from_be_bytes([
                    chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6],
                    chunk[7],
                ]),
                raw_move: u16::from_be_bytes([chunk[8], chunk[9]]),
                weight: u16::from_be_bytes([chunk[10], chunk[11]]),
            })
            .collect();
        records.sort_by_key(|r| r.key);

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Polyglot key of a position
    pub fn key(pos: &Chess) -> u64 {
        let hash: Zobrist64 = pos.zobrist_hash(EnPassantMode::Legal);
        hash.0
    }

    fn records_for(&self, key: u64) -> &[Record] {
        let start = self.records.partition_point(|r| r.key < key);
        let end = self.records.partition_point(|r| r.key <= key);
        &self.records[start..end]
    }
}

impl OpeningBook for PolyglotBook {
    fn lookup(&self, pos: &Chess) -> Vec<BookEntry> {
        let records = self.records_for(Self::key(pos));
        if records.is_empty() {
            return Vec::new();
        }

        let legal = pos.legal_moves();
        records
            .iter()
            .filter(|record| record.weight >= MIN_WEIGHT)
            .filter_map(|record| {
                let text = decode_move(record.raw_move);
                let found = legal.iter().find(|m| {
                    m.to_uci(CastlingMode::Standard).to_string() == text
                        || m.to_uci(CastlingMode::Chess960).to_string() == text
                });
                if found.is_none() {
                    debug!(mv = %text, "skipping book move not legal in position");
                }
                found.map(|mv| BookEntry {
                    mv: mv.clone(),
                    weight: record.weight,
                })
            })
            .collect()
    }
}

/// Decode a Polyglot move into UCI text
///
/// Castling comes out as king-takes-rook (e1h1), which matches the Chess960
/// UCI form of the legal move.
fn decode_move(raw: u16) -> String {
    let to_file = raw & 0x7;
    let to_row = (raw >> 3) & 0x7;
    let from_file = (raw >> 6) & 0x7;
    let from_row = (raw >> 9) & 0x7;
    let promotion = (raw >> 12) & 0x7;

    let mut text = String::with_capacity(5);
    text.push(file_char(from_file));
    text.push(rank_char(from_row));
    text.push(file_char(to_file));
    text.push(rank_char(to_row));
    match promotion {
        1 => text.push('n'),
        2 => text.push('b'),
        3 => text.push('r'),
        4 => text.push('q'),
        _ => {}
    }
    text
}

fn file_char(file: u16) -> char {
    char::from(b'a' + file as u8)
}

fn rank_char(rank: u16) -> char {
    char::from(b'1' + rank as u8)
}

/// Pick one book move uniformly at random, ignoring weights
pub fn choose_book_move(entries: &[BookEntry], rng: &mut dyn RngCore) -> Option<Move> {
    entries.choose(rng).map(|e| e.mv.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{move_to_uci, position_from_fen};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn encode(from_file: u16, from_row: u16, to_file: u16, to_row: u16) -> u16 {
        to_file | (to_row << 3) | (from_file << 6) | (from_row << 9)
    }

    fn record(key: u64, raw_move: u16, weight: u16) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(RECORD_SIZE);
        bytes.extend_from_slice(&key.to_be_bytes());
        bytes.extend_from_slice(&raw_move.to_be_bytes());
        bytes.extend_from_slice(&weight.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes
    }

    #[test]
    fn test_startpos_key_is_polyglot() {
        assert_eq!(PolyglotBook::key(&Chess::default()), 0x463b_9618_1691_fc9c);
    }

    #[test]
    fn test_decode_move() {
        assert_eq!(decode_move(encode(4, 1, 4, 3)), "e2e4");
        assert_eq!(decode_move(encode(0, 6, 0, 7) | (4 << 12)), "a7a8q");
    }

    #[test]
    fn test_lookup_startpos() {
        let pos = Chess::default();
        let key = PolyglotBook::key(&pos);
        let mut bytes = record(key, encode(4, 1, 4, 3), 10);
        bytes.extend(record(key, encode(3, 1, 3, 3), 5));
        bytes.extend(record(key ^ 1, encode(6, 0, 5, 2), 1));

        let book = PolyglotBook::from_bytes(&bytes).unwrap();
        let entries = book.lookup(&pos);
        let moves: Vec<String> = entries.iter().map(|e| move_to_uci(&e.mv)).collect();
        assert_eq!(moves, vec!["e2e4", "d2d4"]);
        assert_eq!(entries[0].weight, 10);
    }

    #[test]
    fn test_lookup_miss() {
        let book = PolyglotBook::from_bytes(&record(42, encode(4, 1, 4, 3), 1)).unwrap();
        assert!(book.lookup(&Chess::default()).is_empty());
    }

    #[test]
    fn test_illegal_book_move_is_skipped() {
        let pos = Chess::default();
        let bytes = record(PolyglotBook::key(&pos), encode(4, 1, 4, 4), 1);
        let book = PolyglotBook::from_bytes(&bytes).unwrap();
        assert!(book.lookup(&pos).is_empty());
    }

    #[test]
    fn test_zero_weight_entry_is_excluded() {
        let pos = Chess::default();
        let key = PolyglotBook::key(&pos);
        let mut bytes = record(key, encode(4, 1, 4, 3), 0);
        bytes.extend(record(key, encode(3, 1, 3, 3), 2));
        let book = PolyglotBook::from_bytes(&bytes).unwrap();

        let moves: Vec<String> = book.lookup(&pos).iter().map(|e| move_to_uci(&e.mv)).collect();
        assert_eq!(moves, vec!["d2d4"]);

        let only_zero = PolyglotBook::from_bytes(&record(key, encode(4, 1, 4, 3), 0)).unwrap();
        assert!(only_zero.lookup(&pos).is_empty());
    }

    #[test]
    fn test_castling_king_takes_rook() {
        let pos = position_from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let bytes = record(PolyglotBook::key(&pos), encode(4, 0, 7, 0), 1);
        let book = PolyglotBook::from_bytes(&bytes).unwrap();

        let entries = book.lookup(&pos);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].mv.is_castle());
        assert_eq!(move_to_uci(&entries[0].mv), "e1g1");
    }

    #[test]
    fn test_truncated_book() {
        let err = PolyglotBook::from_bytes(&[0u8; 20]).unwrap_err();
        assert!(matches!(err, BookError::Truncated { len: 20 }));
    }

    #[test]
    fn test_choose_book_move() {
        let mut rng = StdRng::seed_from_u64(5);
        assert!(choose_book_move(&[], &mut rng).is_none());

        let pos = Chess::default();
        let entries: Vec<BookEntry> = pos
            .legal_moves()
            .into_iter()
            .map(|mv| BookEntry { mv, weight: 1 })
            .collect();
        let mv = choose_book_move(&entries, &mut rng).unwrap();
        assert!(pos.legal_moves().contains(&mv));
    }
}
