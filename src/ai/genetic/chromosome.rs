use rand::seq::index;
use rand::Rng;

use crate::error::CodecError;
use crate::game::codec::{parse_field, push_field};
use crate::game::{lines, GameState, Move, Perspective, SlotSet, NO_PIECE, NUM_CELLS};

/// Evaluation of a simulated win. The agent's own wins score positive.
pub const WIN_SCORE: i32 = 10;

/// A simulated line of play starting from the agent's move: the agent moves
/// at even indices, the opponent at odd ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chromosome {
    moves: Vec<Move>,
}

impl Chromosome {
    pub fn new(moves: Vec<Move>) -> Self {
        Chromosome { moves }
    }

    /// Number of moves a chromosome must carry for `state`.
    pub fn required_length(state: &GameState, search_depth: usize) -> usize {
        search_depth.min(state.available_positions().len())
    }

    /// Draw positions and pieces without replacement from the state's
    /// available sets. When pieces run out the final move hands over none.
    pub fn sample<R: Rng>(state: &GameState, length: usize, rng: &mut R) -> Self {
        let positions = state.available_positions();
        let pieces = state.available_pieces();
        let length = length.min(positions.len());
        let piece_count = length.min(pieces.len());

        let mut drawn_pieces = index::sample(rng, pieces.len(), piece_count).into_iter();
        let moves = index::sample(rng, positions.len(), length)
            .into_iter()
            .map(|i| {
                let position = positions.nth(i).unwrap_or(0);
                let next_piece = drawn_pieces.next().and_then(|j| pieces.nth(j));
                Move::new(position, next_piece)
            })
            .collect();
        Chromosome { moves }
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn first_move(&self) -> Option<Move> {
        self.moves.first().copied()
    }

    /// Four digits per move: position then next piece, `16` for none.
    pub fn encode(&self) -> String {
        encode_moves(&self.moves)
    }

    pub fn decode(key: &str) -> Result<Self, CodecError> {
        if key.len() % 4 != 0 {
            return Err(CodecError::ChromosomeLength(key.len()));
        }
        let moves = (0..key.len())
            .step_by(4)
            .map(|offset| {
                let position = parse_field(key, offset)?;
                if usize::from(position) >= NUM_CELLS {
                    return Err(CodecError::OutOfRange {
                        offset,
                        value: position,
                    });
                }
                let piece = parse_field(key, offset + 2)?;
                Ok(Move::new(position, (piece != NO_PIECE).then_some(piece)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Chromosome { moves })
    }

    /// No repeated position or piece, every one of them still available in
    /// `state`, and a missing next piece only on the final move once every
    /// available piece has been handed over.
    pub fn is_valid(&self, state: &GameState) -> bool {
        let available_positions = state.available_positions();
        let available_pieces = state.available_pieces();
        let mut positions = SlotSet::empty();
        let mut pieces = SlotSet::empty();

        for (i, mv) in self.moves.iter().enumerate() {
            if !available_positions.contains(mv.position) || !positions.insert(mv.position) {
                return false;
            }
            match mv.next_piece {
                Some(piece) => {
                    if !available_pieces.contains(piece) || !pieces.insert(piece) {
                        return false;
                    }
                }
                None => {
                    if i + 1 != self.moves.len() || pieces.len() != available_pieces.len() {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Simulate the moves on a copy of `state`, scoring from the point of
    /// view of the side to move in `state`.
    ///
    /// A win scores [`WIN_SCORE`] when the agent made the winning placement
    /// and its negation otherwise. Without a win the threat-line heuristic
    /// of the final position is used.
    pub fn evaluate(&self, state: &GameState) -> i32 {
        let mut scratch = state.clone();
        for (ply, &mv) in self.moves.iter().enumerate() {
            let _undo = scratch.make(mv);
            if lines::is_game_over(scratch.board()) {
                return if ply % 2 == 0 { WIN_SCORE } else { -WIN_SCORE };
            }
        }
        let perspective = if self.moves.len() % 2 == 0 {
            Perspective::ToMove
        } else {
            Perspective::JustMoved
        };
        lines::line_heuristic(scratch.board(), perspective)
    }

    /// Replace one slot with a value drawn from the state's available sets.
    /// The slot is a position with probability `position_bias`, else a piece.
    /// The child may repeat a value and fail [`Self::is_valid`].
    pub fn mutate<R: Rng>(
        &self,
        state: &GameState,
        position_bias: f64,
        rng: &mut R,
    ) -> Self {
        let mut moves = self.moves.clone();
        if moves.is_empty() {
            return Chromosome { moves };
        }
        let slot = rng.random_range(0..moves.len());

        if rng.random_bool(position_bias) {
            let positions = state.available_positions();
            if !positions.is_empty() {
                if let Some(position) = positions.nth(rng.random_range(0..positions.len())) {
                    moves[slot].position = position;
                }
            }
        } else {
            let pieces = state.available_pieces();
            if !pieces.is_empty() {
                moves[slot].next_piece = pieces.nth(rng.random_range(0..pieces.len()));
            }
        }
        Chromosome { moves }
    }

    /// One-point crossover at a move boundary: a prefix of `self` followed by
    /// the rest of `other`.
    pub fn crossover<R: Rng>(&self, other: &Chromosome, rng: &mut R) -> Self {
        let num_moves = self.len().min(other.len());
        if num_moves <= 1 {
            return self.clone();
        }
        let point = rng.random_range(1..num_moves);
        let moves = self.moves[..point]
            .iter()
            .chain(&other.moves[point..])
            .copied()
            .collect();
        Chromosome { moves }
    }
}

/// Key of a move sequence, shared by chromosomes and tree prefixes.
pub(crate) fn encode_moves(moves: &[Move]) -> String {
    let mut out = String::with_capacity(4 * moves.len());
    for mv in moves {
        push_field(&mut out, mv.position);
        push_field(&mut out, mv.next_piece.unwrap_or(NO_PIECE));
    }
    out
}
