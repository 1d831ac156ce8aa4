use itertools::Itertools;

use super::board::{Board, Piece, NO_PIECE, NUM_CELLS};
use super::codec;
use super::lines;
use super::{Player, SlotSet};
use crate::error::{MoveError, StateError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(Player),
    Draw,
}

/// Place the pending piece at `position`, then hand `next_piece` to the
/// opponent. `next_piece` is `None` only when no pieces remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub position: u8,
    pub next_piece: Option<Piece>,
}

impl Move {
    pub fn new(position: u8, next_piece: Option<Piece>) -> Self {
        Move {
            position,
            next_piece,
        }
    }
}

/// One recorded turn. The opening has no position; the final placement
/// hands over no piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub player: Player,
    pub position: Option<u8>,
    pub piece: Option<Piece>,
}

/// Inverse patch returned by [`GameState::make`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "an unapplied Undo leaves the state mutated"]
pub struct Undo {
    position: u8,
    placed: Piece,
    next_piece: Option<Piece>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    board: Board,
    pending: Option<Piece>,
    available_pieces: SlotSet,
    available_positions: SlotSet,
    to_move: Player,
    history: Vec<HistoryEntry>,
    outcome: Option<GameOutcome>,
}

impl GameState {
    /// Create initial game state: empty board, Player One to hand over the
    /// opening piece.
    pub fn initial() -> Self {
        GameState {
            board: Board::new(),
            pending: None,
            available_pieces: SlotSet::full(),
            available_positions: SlotSet::full(),
            to_move: Player::One,
            history: Vec::new(),
            outcome: None,
        }
    }

    /// Build a state from its parts, checking that the available sets agree
    /// with the board. The side to move and the outcome are derived from the
    /// board; the history starts empty.
    pub fn from_parts(
        board: Board,
        pending: Option<Piece>,
        available_pieces: SlotSet,
        available_positions: SlotSet,
    ) -> Result<Self, StateError> {
        let out_of_range = (0..NUM_CELLS)
            .map(|index| board.at(index))
            .find(|&piece| piece > NO_PIECE);
        if let Some(piece) = out_of_range {
            return Err(StateError::InvalidPiece(piece));
        }
        if let Some(piece) = pending.filter(|&p| p >= NO_PIECE) {
            return Err(StateError::InvalidPiece(piece));
        }

        let mut placed = SlotSet::empty();
        for index in 0..NUM_CELLS as u8 {
            let piece = board.at(index as usize);
            if piece == NO_PIECE {
                if !available_positions.contains(index) {
                    return Err(StateError::EmptyPositionMissing(index));
                }
                continue;
            }
            if available_positions.contains(index) {
                return Err(StateError::OccupiedPositionAvailable(index));
            }
            if available_pieces.contains(piece) {
                return Err(StateError::PlacedPieceAvailable(piece));
            }
            if !placed.insert(piece) {
                return Err(StateError::DuplicatePiece(piece));
            }
        }

        if let Some(piece) = pending {
            if placed.contains(piece) || available_pieces.contains(piece) {
                return Err(StateError::DuplicatePiece(piece));
            }
        }

        let pending_count = usize::from(pending.is_some());
        if available_pieces.len() + placed.len() + pending_count != NUM_CELLS {
            return Err(StateError::PieceCount {
                available: available_pieces.len(),
                placed: placed.len(),
                pending: pending_count,
            });
        }

        // Player Two makes every even-numbered placement.
        let filled = placed.len();
        let to_move = if filled == 0 && pending.is_none() {
            Player::One
        } else if filled % 2 == 0 {
            Player::Two
        } else {
            Player::One
        };

        let outcome = if lines::is_game_over(&board) {
            Some(GameOutcome::Winner(to_move.other()))
        } else if filled == NUM_CELLS {
            Some(GameOutcome::Draw)
        } else {
            None
        };

        Ok(GameState {
            board,
            pending,
            available_pieces,
            available_positions,
            to_move,
            history: Vec::new(),
            outcome,
        })
    }

    /// Build a state from a board key and the available sets.
    pub fn from_encoding(
        key: &str,
        available_pieces: SlotSet,
        available_positions: SlotSet,
    ) -> Result<Self, StateError> {
        let (board, pending) = codec::decode(key)?;
        Self::from_parts(board, pending, available_pieces, available_positions)
    }

    /// Board key including the pending piece.
    pub fn encode(&self) -> String {
        codec::encode(&self.board, self.pending)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The piece the side to move must place.
    pub fn pending_piece(&self) -> Option<Piece> {
        self.pending
    }

    pub fn available_pieces(&self) -> SlotSet {
        self.available_pieces
    }

    pub fn available_positions(&self) -> SlotSet {
        self.available_positions
    }

    pub fn to_move(&self) -> Player {
        self.to_move
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Get game outcome if game is over
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Check if game is over
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    /// True before the opening piece has been handed over.
    pub fn awaiting_opening(&self) -> bool {
        self.outcome.is_none() && self.pending.is_none() && self.board.filled_count() == 0
    }

    /// True when one cell and no further pieces remain, so the last
    /// placement involves no choice.
    pub fn is_forced_last_move(&self) -> bool {
        self.outcome.is_none()
            && self.pending.is_some()
            && self.available_pieces.is_empty()
            && self.available_positions.len() == 1
    }

    /// The completed line that ended the game, if any.
    pub fn winning_line(&self) -> Option<[usize; 4]> {
        lines::winning_line(&self.board)
    }

    /// All legal moves, grouped by next piece: every position for the first
    /// piece, then every position for the second, and so on. When no pieces
    /// remain the next piece is `None`.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.outcome.is_some() || self.pending.is_none() {
            return Vec::new();
        }
        let pieces: Vec<Option<Piece>> = if self.available_pieces.is_empty() {
            vec![None]
        } else {
            self.available_pieces.iter().map(Some).collect()
        };
        pieces
            .into_iter()
            .cartesian_product(self.available_positions.iter())
            .map(|(piece, position)| Move::new(position, piece))
            .collect()
    }

    /// Check a move against the current state without applying it.
    pub fn validate_move(&self, mv: Move) -> Result<(), MoveError> {
        if self.outcome.is_some() {
            return Err(MoveError::GameOver);
        }
        if self.pending.is_none() {
            return Err(MoveError::NoPendingPiece);
        }
        if usize::from(mv.position) >= NUM_CELLS {
            return Err(MoveError::OutOfRange(mv.position));
        }
        if !self.available_positions.contains(mv.position) {
            return Err(MoveError::PositionUnavailable(mv.position));
        }
        match mv.next_piece {
            Some(piece) if piece >= NO_PIECE => Err(MoveError::OutOfRange(piece)),
            Some(piece) if !self.available_pieces.contains(piece) => {
                Err(MoveError::PieceUnavailable(piece))
            }
            None if !self.available_pieces.is_empty() => Err(MoveError::MissingNextPiece),
            _ => Ok(()),
        }
    }

    /// Hand over the opening piece.
    pub fn apply_first_move(&mut self, piece: Piece) -> Result<(), MoveError> {
        if self.outcome.is_some() {
            return Err(MoveError::GameOver);
        }
        if !self.awaiting_opening() {
            return Err(MoveError::OpeningAlreadyMade);
        }
        if piece >= NO_PIECE {
            return Err(MoveError::OutOfRange(piece));
        }
        if !self.available_pieces.remove(piece) {
            return Err(MoveError::PieceUnavailable(piece));
        }
        self.pending = Some(piece);
        self.history.push(HistoryEntry {
            player: self.to_move,
            position: None,
            piece: Some(piece),
        });
        self.to_move = self.to_move.other();
        Ok(())
    }

    /// Validate and apply a move, record it, and settle the outcome.
    pub fn apply_move(&mut self, mv: Move) -> Result<Option<GameOutcome>, MoveError> {
        self.validate_move(mv)?;

        let mover = self.to_move;
        // committed: apply_move never unmakes
        let _undo = self.make(mv);
        self.history.push(HistoryEntry {
            player: mover,
            position: Some(mv.position),
            piece: mv.next_piece,
        });

        if lines::is_game_over(&self.board) {
            self.outcome = Some(GameOutcome::Winner(mover));
        } else if self.board.is_full() {
            self.outcome = Some(GameOutcome::Draw);
        }

        Ok(self.outcome)
    }

    /// Apply a move for lookahead without validation, history or outcome
    /// bookkeeping. The returned patch must be passed to [`Self::unmake`]
    /// before the state is used for anything else.
    pub fn make(&mut self, mv: Move) -> Undo {
        debug_assert!(self.validate_move(mv).is_ok(), "illegal lookahead move {mv:?}");
        let placed = self.pending.unwrap_or(NO_PIECE);

        self.board.set(usize::from(mv.position), placed);
        self.available_positions.remove(mv.position);
        if let Some(piece) = mv.next_piece {
            self.available_pieces.remove(piece);
        }
        self.pending = mv.next_piece;
        self.to_move = self.to_move.other();

        Undo {
            position: mv.position,
            placed,
            next_piece: mv.next_piece,
        }
    }

    /// Restore the state exactly as it was before the matching [`Self::make`].
    pub fn unmake(&mut self, undo: Undo) {
        self.board.set(usize::from(undo.position), NO_PIECE);
        self.available_positions.insert(undo.position);
        if let Some(piece) = undo.next_piece {
            self.available_pieces.insert(piece);
        }
        self.pending = Some(undo.placed);
        self.to_move = self.to_move.other();
    }
}
