//! # Quarto Engine
//!
//! The Quarto board game with two look-ahead agents: an alpha-beta negamax
//! searcher backed by a transposition store, and a genetic minimax searcher
//! that evolves simulated move sequences over a shared-prefix tree.
//!
//! ## Modules
//!
//! - [`game`]: Board and piece model, board keys, line evaluation, game state
//! - [`ai`]: Agent trait, random, negamax and genetic agents, transposition store
//! - [`play`]: Match orchestration with move validation and retries
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod play;
