use crate::game::{GameState, Move, Piece};

/// Universal interface for all Quarto agents.
///
/// Agents only read the state; any lookahead works on a private copy.
pub trait Agent {
    /// Choose the opening piece to hand the opponent.
    fn first_move(&mut self, state: &GameState) -> Piece;

    /// Choose where to place the pending piece and which piece to hand over.
    fn select_move(&mut self, state: &GameState) -> Move;

    /// Return the agent's display name.
    fn name(&self) -> &str;
}
