//! Core Quarto game logic: board and piece model, fixed-width board keys,
//! line evaluation, and the game state with checked moves and an unchecked
//! make/unmake pair for lookahead.

mod board;
pub mod codec;
pub mod lines;
mod player;
mod sets;
mod state;

pub use board::{
    coords, linear_index, Attribute, Board, Piece, LINES, NO_PIECE, NUM_CELLS, NUM_PIECES, SIZE,
};
pub use lines::{is_game_over, line_heuristic, matching_property_exists, Perspective};
pub use player::Player;
pub use sets::{SlotIter, SlotSet};
pub use state::{GameOutcome, GameState, HistoryEntry, Move, Undo};
