//! Terminal detection and the partial-line heuristic.

use super::board::{Attribute, Board, Piece, LINES, NO_PIECE};

const ATTRIBUTE_BITS: u8 = Attribute::Color.mask()
    | Attribute::Shape.mask()
    | Attribute::Height.mask()
    | Attribute::Fill.mask();

/// Whether every piece in `pieces` agrees on at least one attribute, either
/// all set or all clear. Works for the 4 pieces of a full line and for the
/// 3 placed pieces of a line with one gap.
pub fn matching_property_exists(pieces: &[Piece]) -> bool {
    if pieces.is_empty() {
        return false;
    }
    let mut all_set = ATTRIBUTE_BITS;
    let mut all_clear = ATTRIBUTE_BITS;
    for &piece in pieces {
        all_set &= piece;
        all_clear &= !piece & ATTRIBUTE_BITS;
    }
    (all_set | all_clear) != 0
}

/// The first completed line whose pieces share an attribute, if any.
pub fn winning_line(board: &Board) -> Option<[usize; 4]> {
    LINES.iter().copied().find(|line| {
        let pieces = board.line(line);
        !pieces.contains(&NO_PIECE) && matching_property_exists(&pieces)
    })
}

/// True iff a full row, column or diagonal shares an attribute. A full board
/// with no such line is a draw, not game over.
pub fn is_game_over(board: &Board) -> bool {
    winning_line(board).is_some()
}

/// Number of lines with exactly one gap whose three pieces already share an
/// attribute.
pub fn count_threat_lines(board: &Board) -> u32 {
    let mut count = 0;
    for line in &LINES {
        let pieces = board.line(line);
        if pieces.iter().filter(|&&p| p == NO_PIECE).count() != 1 {
            continue;
        }
        let placed: Vec<Piece> = pieces.into_iter().filter(|&p| p != NO_PIECE).collect();
        if matching_property_exists(&placed) {
            count += 1;
        }
    }
    count
}

/// Whose point of view a heuristic score is reported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perspective {
    /// The side about to place the pending piece.
    ToMove,
    /// The side that just placed a piece and handed over the pending one.
    JustMoved,
}

/// Threat-line count, positive when it favours `perspective`.
///
/// Open threat lines are counted in favour of the side about to place: it
/// holds the next piece and moves first into any of them.
pub fn line_heuristic(board: &Board, perspective: Perspective) -> i32 {
    let count = count_threat_lines(board) as i32;
    match perspective {
        Perspective::ToMove => count,
        Perspective::JustMoved => -count,
    }
}
