//! Match play between two agents.

pub mod orchestrator;

pub use orchestrator::{MatchConfig, MatchOutcome, MatchResult, Orchestrator};
