//! Genetic minimax agent.
//!
//! Each decision seeds a population of simulated move sequences, evolves it
//! by mutation and crossover, and ranks sequences by how far their leaf value
//! survives minimax backup in a shared-prefix tree. The best sequence's first
//! move is played; population and tree are dropped afterwards.

pub mod chromosome;
pub mod tree;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use self::chromosome::Chromosome;
use self::tree::{NodeId, ReservationTree};
use super::agent::Agent;
use crate::game::{GameState, Move, Piece};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    /// Moves simulated per chromosome.
    pub search_depth: usize,
    pub max_generations: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    /// Chance that a mutation rewrites a position rather than a piece.
    pub position_mutation_bias: f64,
    pub initial_population_size: usize,
    pub max_population_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        GeneticConfig {
            search_depth: 3,
            max_generations: 2,
            crossover_rate: 0.4,
            mutation_rate: 0.8,
            position_mutation_bias: 0.9,
            initial_population_size: 3000,
            max_population_size: 6000,
            seed: None,
        }
    }
}

/// Ordered selections of `k` out of `n`, saturating at `usize::MAX`.
pub fn permutations(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    (n - k + 1..=n).fold(1usize, |acc, x| acc.saturating_mul(x))
}

/// Upper bound on distinct chromosomes of `length` moves.
pub fn max_distinct_chromosomes(positions: usize, pieces: usize, length: usize) -> usize {
    permutations(positions, length).saturating_mul(permutations(pieces, pieces.min(length)))
}

/// Population limits for one decision. Late in the game there are fewer
/// distinct chromosomes than the configured sizes, so both shrink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationBounds {
    pub initial: usize,
    pub max: usize,
}

impl PopulationBounds {
    pub fn for_state(config: &GeneticConfig, state: &GameState) -> Self {
        let length = Chromosome::required_length(state, config.search_depth);
        let distinct = max_distinct_chromosomes(
            state.available_positions().len(),
            state.available_pieces().len(),
            length,
        );
        PopulationBounds {
            initial: config
                .initial_population_size
                .min(distinct.saturating_mul(3).div_ceil(2)),
            max: config.max_population_size.min(distinct.saturating_mul(2)),
        }
    }
}

/// Outcome of one decision.
#[derive(Debug, Clone)]
pub struct Solution {
    pub chromosome: Chromosome,
    pub fitness: usize,
    /// Propagated value of the chromosome's leaf.
    pub evaluation: i32,
    pub population_size: usize,
    pub tree_size: usize,
}

#[derive(Debug, Clone)]
struct Individual {
    chromosome: Chromosome,
    leaf: NodeId,
}

pub struct GeneticAgent {
    name: String,
    config: GeneticConfig,
    rng: StdRng,
}

impl GeneticAgent {
    pub fn new(config: GeneticConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        GeneticAgent {
            name: format!(
                "Genetic-{}-{}-{}",
                config.search_depth, config.max_generations, config.initial_population_size
            ),
            config,
            rng,
        }
    }

    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }

    /// Run the genetic search for `state`. Returns `None` only when no
    /// placement is possible.
    pub fn generate_solution(&mut self, state: &GameState) -> Option<Solution> {
        let length = Chromosome::required_length(state, self.config.search_depth);
        if length == 0 || state.pending_piece().is_none() {
            return None;
        }
        let bounds = PopulationBounds::for_state(&self.config, state);

        let mut tree = ReservationTree::new();
        let mut population = Vec::with_capacity(bounds.max);
        for _ in 0..bounds.initial {
            let chromosome = Chromosome::sample(state, length, &mut self.rng);
            let value = chromosome.evaluate(state);
            if let Some(leaf) = tree.insert(&chromosome, value) {
                population.push(Individual { chromosome, leaf });
            }
        }

        tree.propagate();
        let mut fitness = select(&mut population, &tree, bounds);
        for generation in 1..=self.config.max_generations {
            self.breed(state, length, bounds, &mut tree, &mut population);
            tree.propagate();
            fitness = select(&mut population, &tree, bounds);
            log::trace!(
                "generation {generation}: {} survivors, {} tree nodes",
                population.len(),
                tree.len()
            );
        }

        let best = population.first()?;
        Some(Solution {
            chromosome: best.chromosome.clone(),
            fitness: fitness.first().copied().unwrap_or(0),
            evaluation: tree.value(best.leaf),
            population_size: population.len(),
            tree_size: tree.len(),
        })
    }

    /// Grow the population toward `bounds.max` with offspring not yet in the
    /// tree.
    fn breed(
        &mut self,
        state: &GameState,
        length: usize,
        bounds: PopulationBounds,
        tree: &mut ReservationTree,
        population: &mut Vec<Individual>,
    ) {
        let attempts = bounds
            .max
            .saturating_sub(population.len().max(bounds.initial));

        for _ in 0..attempts {
            if population.len() < 2 {
                return;
            }
            let parents = index::sample(&mut self.rng, population.len(), 2);
            let (a, b) = (&population[parents.index(0)], &population[parents.index(1)]);

            let child = if self.rng.random_bool(self.config.mutation_rate) {
                a.chromosome
                    .mutate(state, self.config.position_mutation_bias, &mut self.rng)
            } else if self.rng.random_bool(self.config.crossover_rate) {
                a.chromosome.crossover(&b.chromosome, &mut self.rng)
            } else {
                continue;
            };

            if child.len() < length || !child.is_valid(state) {
                continue;
            }
            let value = child.evaluate(state);
            if let Some(leaf) = tree.insert(&child, value) {
                population.push(Individual {
                    chromosome: child,
                    leaf,
                });
            }
        }
    }
}

/// Score at most `bounds.max` individuals against the propagated tree, keep
/// the best `bounds.initial` in fitness order and return their fitness.
/// Equal fitness keeps population order.
fn select(
    population: &mut Vec<Individual>,
    tree: &ReservationTree,
    bounds: PopulationBounds,
) -> Vec<usize> {
    population.truncate(bounds.max);
    let mut scored: Vec<(usize, Individual)> = population
        .drain(..)
        .map(|individual| (tree.fitness(individual.leaf), individual))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(bounds.initial);

    let (fitness, survivors): (Vec<usize>, Vec<Individual>) = scored.into_iter().unzip();
    *population = survivors;
    fitness
}

impl Agent for GeneticAgent {
    fn first_move(&mut self, state: &GameState) -> Piece {
        let pieces = state.available_pieces();
        assert!(!pieces.is_empty(), "No pieces available");
        pieces
            .nth(self.rng.random_range(0..pieces.len()))
            .unwrap_or(0)
    }

    fn select_move(&mut self, state: &GameState) -> Move {
        let solution = self.generate_solution(state);
        if let Some(solution) = &solution {
            log::debug!(
                "{} chose {} (fitness {}, value {}, population {}, tree {})",
                self.name,
                solution.chromosome.encode(),
                solution.fitness,
                solution.evaluation,
                solution.population_size,
                solution.tree_size
            );
        }
        match solution.and_then(|s| s.chromosome.first_move()) {
            Some(mv) => mv,
            None => {
                let legal = state.legal_moves();
                assert!(!legal.is_empty(), "No legal moves available");
                legal[0]
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
