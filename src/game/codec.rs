//! Fixed-width text keys for boards.
//!
//! Each cell is written as a zero-padded two-digit decimal (`00`..`16`, with
//! `16` for empty) in row-major order, followed by an optional 17th field for
//! the pending piece. The same key indexes the transposition store.

use std::fmt::Write;

use super::board::{Board, Piece, NO_PIECE, NUM_CELLS};
use crate::error::CodecError;

/// Width of a board key without the pending-piece field.
pub const BOARD_KEY_LEN: usize = 2 * NUM_CELLS;
/// Width of a board key with the pending-piece field.
pub const STATE_KEY_LEN: usize = BOARD_KEY_LEN + 2;

/// Append `value` as a two-digit field.
pub(crate) fn push_field(out: &mut String, value: u8) {
    // writing to a String cannot fail
    let _ = write!(out, "{value:02}");
}

/// Parse the two-digit field starting at `offset`.
pub(crate) fn parse_field(key: &str, offset: usize) -> Result<u8, CodecError> {
    let field = key
        .get(offset..offset + 2)
        .ok_or(CodecError::Length(key.len()))?;
    if !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::NotANumber {
            offset,
            field: field.to_string(),
        });
    }
    let value: u8 = field.parse().map_err(|_| CodecError::NotANumber {
        offset,
        field: field.to_string(),
    })?;
    if value > NO_PIECE {
        return Err(CodecError::OutOfRange { offset, value });
    }
    Ok(value)
}

/// Encode a board and its pending piece (`None` is written as `16`).
pub fn encode(board: &Board, pending: Option<Piece>) -> String {
    let mut key = String::with_capacity(STATE_KEY_LEN);
    for piece in board.cells() {
        push_field(&mut key, piece);
    }
    push_field(&mut key, pending.unwrap_or(NO_PIECE));
    key
}

/// Encode only the 16 cells.
pub fn encode_board(board: &Board) -> String {
    let mut key = String::with_capacity(BOARD_KEY_LEN);
    for piece in board.cells() {
        push_field(&mut key, piece);
    }
    key
}

/// Exact inverse of [`encode`]. A 32-digit key (no pending field) decodes
/// with no pending piece.
pub fn decode(key: &str) -> Result<(Board, Option<Piece>), CodecError> {
    if key.len() != BOARD_KEY_LEN && key.len() != STATE_KEY_LEN {
        return Err(CodecError::Length(key.len()));
    }

    let mut board = Board::new();
    for index in 0..NUM_CELLS {
        board.set(index, parse_field(key, 2 * index)?);
    }

    let pending = if key.len() == STATE_KEY_LEN {
        match parse_field(key, BOARD_KEY_LEN)? {
            NO_PIECE => None,
            piece => Some(piece),
        }
    } else {
        None
    };

    Ok((board, pending))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_empty_board_encoding() {
        let key = encode(&Board::new(), None);
        assert_eq!(key, "16".repeat(17));
        assert_eq!(encode_board(&Board::new()), "16".repeat(16));
    }

    #[test]
    fn test_pieces_are_zero_padded() {
        let mut board = Board::new();
        board.set(0, 5);
        board.set(15, 12);
        let key = encode(&board, Some(0));
        assert!(key.starts_with("0516"));
        assert!(key.ends_with("1200"));
        assert_eq!(key.len(), STATE_KEY_LEN);
    }

    #[test]
    fn test_roundtrip_random_boards() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let mut pieces: Vec<Piece> = (0..16).collect();
            pieces.shuffle(&mut rng);
            let filled = rng.random_range(0..=16);
            let mut cells: Vec<usize> = (0..16).collect();
            cells.shuffle(&mut rng);

            let mut board = Board::new();
            for (&cell, &piece) in cells.iter().zip(pieces.iter()).take(filled) {
                board.set(cell, piece);
            }
            let pending = pieces.get(filled).copied();

            let (decoded, decoded_pending) = decode(&encode(&board, pending)).unwrap();
            assert_eq!(decoded, board);
            assert_eq!(decoded_pending, pending);
        }
    }

    #[test]
    fn test_decode_board_only_key() {
        let mut board = Board::new();
        board.set(3, 9);
        let (decoded, pending) = decode(&encode_board(&board)).unwrap();
        assert_eq!(decoded, board);
        assert_eq!(pending, None);
    }

    #[test]
    fn test_decode_rejects_malformed_keys() {
        assert_eq!(decode("0102"), Err(CodecError::Length(4)));

        let mut key = "16".repeat(17);
        key.replace_range(2..4, "x1");
        assert!(matches!(
            decode(&key),
            Err(CodecError::NotANumber { offset: 2, .. })
        ));

        let mut key = "16".repeat(17);
        key.replace_range(6..8, "42");
        assert_eq!(
            decode(&key),
            Err(CodecError::OutOfRange {
                offset: 6,
                value: 42
            })
        );
    }
}
