use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::agent::Agent;
use super::transposition::{JsonFileStore, TranspositionEntry, TranspositionStore};
use crate::error::StoreError;
use crate::game::{lines, Board, GameState, Move, Perspective, Piece};

/// Root alpha-beta bounds. Finite scores never leave `[-10, 10]`, so only a
/// forced win or loss falls outside.
pub const SEARCH_BOUND: f64 = 1000.0;

/// Trait for evaluating a non-terminal board.
pub trait Heuristic {
    fn evaluate(&self, board: &Board, perspective: Perspective) -> f64;
}

/// Counts lines with one gap whose three pieces already share an attribute.
pub struct LineHeuristic;

impl Heuristic for LineHeuristic {
    fn evaluate(&self, board: &Board, perspective: Perspective) -> f64 {
        f64::from(lines::line_heuristic(board, perspective))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NegamaxConfig {
    pub depth: usize,
    /// Maximum candidate moves examined at any node.
    pub search_window: usize,
    /// JSON file backing the transposition table. No table when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transposition_path: Option<PathBuf>,
}

impl Default for NegamaxConfig {
    fn default() -> Self {
        NegamaxConfig {
            depth: 2,
            search_window: 256,
            transposition_path: None,
        }
    }
}

/// Node and cache counters, cumulative over the agent's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub cache_hits: u64,
}

impl SearchStats {
    pub fn hit_rate(&self) -> f64 {
        if self.nodes == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.nodes as f64
        }
    }
}

/// Negamax agent with alpha-beta pruning over (position, next piece) moves.
pub struct NegamaxAgent {
    name: String,
    depth: usize,
    search_window: usize,
    heuristic: Box<dyn Heuristic>,
    table: Option<Box<dyn TranspositionStore>>,
    stats: SearchStats,
}

impl NegamaxAgent {
    pub fn new(depth: usize, search_window: usize) -> Self {
        assert!(depth >= 1, "search depth must be at least 1");
        NegamaxAgent {
            name: format!("Negamax-{depth}-{search_window}"),
            depth,
            search_window,
            heuristic: Box::new(LineHeuristic),
            table: None,
            stats: SearchStats::default(),
        }
    }

    /// Build from configuration, opening the transposition table if one is
    /// configured.
    pub fn from_config(config: &NegamaxConfig) -> Result<Self, StoreError> {
        let agent = Self::new(config.depth, config.search_window);
        match &config.transposition_path {
            Some(path) => Ok(agent.with_store(Box::new(JsonFileStore::open(path)?))),
            None => Ok(agent),
        }
    }

    pub fn with_heuristic(mut self, heuristic: Box<dyn Heuristic>) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_store(mut self, store: Box<dyn TranspositionStore>) -> Self {
        self.table = Some(store);
        self
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn store(&self) -> Option<&dyn TranspositionStore> {
        self.table.as_deref()
    }

    /// Persist the transposition table, if any.
    pub fn save_table(&mut self) -> Result<(), StoreError> {
        match self.table.as_mut() {
            Some(table) => table.flush(),
            None => Ok(()),
        }
    }

    /// Search from `state` and return the score for the side to move with
    /// the move that achieves it.
    pub fn best_move(&mut self, state: &GameState) -> (f64, Move) {
        let legal = state.legal_moves();
        assert!(!legal.is_empty(), "No legal moves available");

        let mut scratch = state.clone();
        let (score, best) = self.search(&mut scratch, self.depth, -SEARCH_BOUND, SEARCH_BOUND);
        debug_assert_eq!(&scratch, state, "search must restore the state");

        (score, best.unwrap_or(legal[0]))
    }

    /// Depth-limited negamax. A board that is already won scores negative
    /// infinity: the side to move lost on the previous placement.
    ///
    /// `state` is mutated during the search and restored before returning.
    pub fn search(
        &mut self,
        state: &mut GameState,
        depth: usize,
        mut alpha: f64,
        beta: f64,
    ) -> (f64, Option<Move>) {
        self.stats.nodes += 1;

        if lines::is_game_over(state.board()) {
            return (f64::NEG_INFINITY, None);
        }
        if depth == 0 || state.available_positions().is_empty() {
            return (self.heuristic.evaluate(state.board(), Perspective::ToMove), None);
        }

        let key = state.encode();
        if let Some(entry) = self.table.as_ref().and_then(|t| t.get(&key)) {
            self.stats.cache_hits += 1;
            return (entry.score(), Some(entry.best_move()));
        }

        let mut best_score = f64::NEG_INFINITY;
        let mut best_move = None;

        // Pieces outer, positions inner: the window covers every position
        // for a few pieces before it reaches the next piece.
        for mv in state.legal_moves().into_iter().take(self.search_window) {
            let undo = state.make(mv);
            let score = -self.search(state, depth - 1, -beta, -alpha).0;
            state.unmake(undo);

            if score >= best_score {
                best_score = score;
                best_move = Some(mv);
            }
            alpha = alpha.max(best_score);
            if alpha > beta {
                break;
            }
        }

        if depth == self.depth {
            self.record(key, best_score, best_move);
        }

        (best_score, best_move)
    }

    fn record(&mut self, key: String, score: f64, best: Option<Move>) {
        if let (Some(table), Some(mv)) = (self.table.as_mut(), best) {
            table.put(key, TranspositionEntry::new(score, mv));
        }
    }
}

impl Agent for NegamaxAgent {
    /// Every opening piece is equivalent up to attribute symmetry, so hand
    /// over the lowest one.
    fn first_move(&mut self, state: &GameState) -> Piece {
        state.available_pieces().first().unwrap_or(0)
    }

    fn select_move(&mut self, state: &GameState) -> Move {
        let before = self.stats;
        let (score, mv) = self.best_move(state);
        log::debug!(
            "{} chose {:?} (score {}, nodes {}, cache hits {})",
            self.name,
            mv,
            score,
            self.stats.nodes - before.nodes,
            self.stats.cache_hits - before.cache_hits
        );
        mv
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::transposition::MemoryStore;
    use crate::ai::RandomAgent;
    use crate::game::SlotSet;

    /// Plain minimax without pruning, windows or caching.
    fn exhaustive(state: &mut GameState, depth: usize) -> f64 {
        if lines::is_game_over(state.board()) {
            return f64::NEG_INFINITY;
        }
        if depth == 0 || state.available_positions().is_empty() {
            return f64::from(lines::line_heuristic(state.board(), Perspective::ToMove));
        }
        let mut best = f64::NEG_INFINITY;
        for mv in state.legal_moves() {
            let undo = state.make(mv);
            best = best.max(-exhaustive(state, depth - 1));
            state.unmake(undo);
        }
        best
    }

    fn random_midgame(seed: u64, plies: usize) -> GameState {
        let mut agent = RandomAgent::with_seed(seed);
        let mut state = GameState::initial();
        state.apply_first_move(agent.first_move(&state)).unwrap();
        for _ in 0..plies {
            let mut candidate = state.clone();
            candidate.apply_move(agent.select_move(&state)).unwrap();
            if candidate.is_terminal() {
                break;
            }
            state = candidate;
        }
        state
    }

    /// Pieces 8, 9, 10 on the top row with piece 11 pending for Player 1.
    fn one_move_from_win() -> GameState {
        let mut state = GameState::initial();
        state.apply_first_move(8).unwrap();
        state.apply_move(Move::new(0, Some(9))).unwrap();
        state.apply_move(Move::new(1, Some(10))).unwrap();
        state.apply_move(Move::new(2, Some(11))).unwrap();
        state
    }

    // --- Heuristic tests ---

    #[test]
    fn heuristic_empty_board_is_zero() {
        let h = LineHeuristic;
        assert_eq!(h.evaluate(&Board::new(), Perspective::ToMove), 0.0);
        assert_eq!(h.evaluate(&Board::new(), Perspective::JustMoved), 0.0);
    }

    // --- Algorithm tests ---

    #[test]
    fn takes_winning_move() {
        for depth in 1..=2 {
            let mut agent = NegamaxAgent::new(depth, 256);
            let (score, mv) = agent.best_move(&one_move_from_win());
            assert_eq!(mv.position, 3, "depth {depth} should complete the row");
            assert_eq!(score, f64::INFINITY);
        }
    }

    #[test]
    fn won_board_scores_as_loss_for_side_to_move() {
        let mut state = one_move_from_win();
        state.apply_move(Move::new(3, Some(0))).unwrap();
        let mut agent = NegamaxAgent::new(2, 256);
        let (score, mv) = agent.search(&mut state, 2, -SEARCH_BOUND, SEARCH_BOUND);
        assert_eq!(score, f64::NEG_INFINITY);
        assert_eq!(mv, None);
    }

    #[test]
    fn avoids_handing_over_a_winning_piece() {
        // 8, 9, 10 share "color set" and "shape clear"; only 4..=7 are safe
        // to place beside them.
        let mut board = Board::new();
        board.set(0, 8);
        board.set(1, 9);
        board.set(2, 10);
        let pieces: SlotSet = [0, 1, 2, 3, 5, 6, 7, 11, 12, 13, 14, 15].into_iter().collect();
        let positions: SlotSet = (3..16).collect();
        let state = GameState::from_parts(board, Some(4), pieces, positions).unwrap();

        let mut agent = NegamaxAgent::new(2, usize::MAX);
        let (score, mv) = agent.best_move(&state);
        assert!(score > f64::NEG_INFINITY);
        assert!(
            mv.position == 3 || matches!(mv.next_piece, Some(5..=7)),
            "{mv:?} lets the opponent complete the top row"
        );
    }

    #[test]
    fn matches_exhaustive_minimax() {
        for seed in 0..4 {
            let state = random_midgame(seed, 8);
            let expected = exhaustive(&mut state.clone(), 2);

            let mut agent = NegamaxAgent::new(2, usize::MAX);
            let mut scratch = state.clone();
            let (score, _) = agent.search(&mut scratch, 2, -SEARCH_BOUND, SEARCH_BOUND);
            assert_eq!(score, expected, "seed {seed}");
            assert_eq!(scratch, state, "search must restore the state");
        }
    }

    #[test]
    fn search_window_caps_expansion() {
        let state = random_midgame(9, 2);
        let mut agent = NegamaxAgent::new(2, 1);
        agent.best_move(&state);
        // one root, one child, one leaf
        assert_eq!(agent.stats().nodes, 3);
    }

    #[test]
    fn transposition_table_serves_repeat_positions() {
        let state = random_midgame(5, 6);
        let mut agent = NegamaxAgent::new(2, 64).with_store(Box::new(MemoryStore::new()));

        let first = agent.select_move(&state);
        assert_eq!(agent.stats().cache_hits, 0);
        assert_eq!(agent.store().map(|s| s.len()), Some(1));

        let second = agent.select_move(&state);
        assert_eq!(agent.stats().cache_hits, 1);
        assert_eq!(first, second);
        assert!(agent.stats().hit_rate() > 0.0);
    }

    #[test]
    fn from_config_opens_file_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        let config = NegamaxConfig {
            depth: 1,
            search_window: 16,
            transposition_path: Some(path.clone()),
        };

        let mut agent = NegamaxAgent::from_config(&config).unwrap();
        agent.select_move(&one_move_from_win());
        agent.save_table().unwrap();

        let reloaded = NegamaxAgent::from_config(&config).unwrap();
        assert_eq!(reloaded.store().map(|s| s.len()), Some(1));
    }

    // --- Agent trait tests ---

    #[test]
    fn first_move_hands_lowest_piece() {
        let mut agent = NegamaxAgent::new(2, 256);
        assert_eq!(agent.first_move(&GameState::initial()), 0);
    }

    #[test]
    fn name_reflects_parameters() {
        let agent = NegamaxAgent::new(3, 64);
        assert_eq!(agent.name(), "Negamax-3-64");
    }
}
