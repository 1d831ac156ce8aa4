use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::ai::Agent;
use crate::game::{GameOutcome, GameState, Move, Player};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Rejected moves a side may submit in one turn before it forfeits.
    pub retry_limit: usize,
    /// Draw the opening piece at random instead of asking Player 1.
    pub random_opening: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            retry_limit: 3,
            random_opening: true,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Winner(Player),
    Draw,
    /// `offender` ran out of retries; the other side wins.
    Forfeit { offender: Player },
}

#[derive(Debug, Clone)]
pub struct MatchResult {
    pub outcome: MatchOutcome,
    /// Board and history as the match ended.
    pub state: GameState,
    pub winning_line: Option<[usize; 4]>,
    /// Rejected submissions per side, indexed by [`Player::index`].
    pub rejected_moves: [usize; 2],
}

impl MatchResult {
    pub fn winner(&self) -> Option<Player> {
        match self.outcome {
            MatchOutcome::Winner(player) => Some(player),
            MatchOutcome::Forfeit { offender } => Some(offender.other()),
            MatchOutcome::Draw => None,
        }
    }
}

/// Runs a match: opening piece, alternating validated moves with bounded
/// retries, and the automatic final placement.
pub struct Orchestrator {
    config: MatchConfig,
    rng: StdRng,
}

impl Orchestrator {
    pub fn new(config: MatchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Orchestrator { config, rng }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Play one match. `one` hands over the opening piece.
    pub fn play(&mut self, one: &mut dyn Agent, two: &mut dyn Agent) -> MatchResult {
        let mut state = GameState::initial();
        let mut rejected = [0usize; 2];

        if let Err(offender) = self.open(&mut state, one, &mut rejected) {
            return finish(MatchOutcome::Forfeit { offender }, state, rejected, one, two);
        }

        while !state.is_terminal() {
            let player = state.to_move();

            if state.is_forced_last_move() {
                if let Some(position) = state.available_positions().only() {
                    log::debug!("placing the last piece at {position} for {}", player.name());
                    if let Err(err) = state.apply_move(Move::new(position, None)) {
                        log::error!("forced last move rejected: {err}");
                        rejected[player.index()] += 1;
                        return finish(
                            MatchOutcome::Forfeit { offender: player },
                            state,
                            rejected,
                            one,
                            two,
                        );
                    }
                    continue;
                }
            }

            let agent: &mut dyn Agent = match player {
                Player::One => &mut *one,
                Player::Two => &mut *two,
            };

            let mut failures = 0;
            loop {
                let mv = agent.select_move(&state);
                match state.apply_move(mv) {
                    Ok(_) => break,
                    Err(err) => {
                        failures += 1;
                        rejected[player.index()] += 1;
                        log::warn!(
                            "{} ({}) submitted {:?}: {} [{}/{}]",
                            agent.name(),
                            player.name(),
                            mv,
                            err,
                            failures,
                            self.config.retry_limit
                        );
                        if failures >= self.config.retry_limit {
                            return finish(
                                MatchOutcome::Forfeit { offender: player },
                                state,
                                rejected,
                                one,
                                two,
                            );
                        }
                    }
                }
            }
        }

        let outcome = match state.outcome() {
            Some(GameOutcome::Winner(player)) => MatchOutcome::Winner(player),
            _ => MatchOutcome::Draw,
        };
        finish(outcome, state, rejected, one, two)
    }

    /// Hand over the opening piece, either drawn here or chosen by `one`.
    /// Returns the offender if `one` exhausts its retries.
    fn open(
        &mut self,
        state: &mut GameState,
        one: &mut dyn Agent,
        rejected: &mut [usize; 2],
    ) -> Result<(), Player> {
        if self.config.random_opening {
            let pieces = state.available_pieces();
            let piece = pieces
                .nth(self.rng.random_range(0..pieces.len()))
                .unwrap_or(0);
            log::debug!("random opening piece {piece}");
            return state.apply_first_move(piece).map_err(|err| {
                log::error!("random opening rejected: {err}");
                Player::One
            });
        }

        for attempt in 1..=self.config.retry_limit {
            let piece = one.first_move(state);
            match state.apply_first_move(piece) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    rejected[Player::One.index()] += 1;
                    log::warn!(
                        "{} opened with piece {piece}: {err} [{attempt}/{}]",
                        one.name(),
                        self.config.retry_limit
                    );
                }
            }
        }
        Err(Player::One)
    }
}

fn finish(
    outcome: MatchOutcome,
    state: GameState,
    rejected: [usize; 2],
    one: &dyn Agent,
    two: &dyn Agent,
) -> MatchResult {
    match outcome {
        MatchOutcome::Winner(player) => log::info!(
            "{} wins as {} after {} placements",
            seat_name(player, one, two),
            player.name(),
            state.board().filled_count()
        ),
        MatchOutcome::Draw => log::info!("{} and {} draw", one.name(), two.name()),
        MatchOutcome::Forfeit { offender } => log::info!(
            "{} forfeits as {} after {} rejected moves",
            seat_name(offender, one, two),
            offender.name(),
            rejected[offender.index()]
        ),
    }
    let winning_line = match outcome {
        MatchOutcome::Winner(_) => state.winning_line(),
        _ => None,
    };
    MatchResult {
        outcome,
        state,
        winning_line,
        rejected_moves: rejected,
    }
}

fn seat_name<'a>(player: Player, one: &'a dyn Agent, two: &'a dyn Agent) -> &'a str {
    match player {
        Player::One => one.name(),
        Player::Two => two.name(),
    }
}
