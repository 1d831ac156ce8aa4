use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::agent::Agent;
use crate::game::{GameState, Move, Piece};

/// An agent that picks the position and the next piece uniformly at random.
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new() -> Self {
        RandomAgent {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        RandomAgent {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn first_move(&mut self, state: &GameState) -> Piece {
        let pieces = state.available_pieces();
        assert!(!pieces.is_empty(), "No pieces available");
        let idx = self.rng.random_range(0..pieces.len());
        pieces.nth(idx).unwrap_or(0)
    }

    fn select_move(&mut self, state: &GameState) -> Move {
        let positions = state.available_positions();
        assert!(!positions.is_empty(), "No positions available");
        let idx = self.rng.random_range(0..positions.len());
        let position = positions.nth(idx).unwrap_or(0);

        let pieces = state.available_pieces();
        let next_piece = if pieces.is_empty() {
            None
        } else {
            pieces.nth(self.rng.random_range(0..pieces.len()))
        };
        Move::new(position, next_piece)
    }

    fn name(&self) -> &str {
        "Random"
    }
}
