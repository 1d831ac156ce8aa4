//! Agents: the shared [`Agent`] contract, a uniform random baseline, the
//! alpha-beta negamax searcher with its transposition store, and the
//! genetic minimax searcher.

mod agent;
pub mod genetic;
pub mod negamax;
mod random;
pub mod transposition;

pub use agent::Agent;
pub use genetic::chromosome::Chromosome;
pub use genetic::tree::ReservationTree;
pub use genetic::{GeneticAgent, GeneticConfig, PopulationBounds, Solution};
pub use negamax::{Heuristic, LineHeuristic, NegamaxAgent, NegamaxConfig, SearchStats};
pub use random::RandomAgent;
pub use transposition::{JsonFileStore, MemoryStore, TranspositionEntry, TranspositionStore};
