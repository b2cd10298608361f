//! Genetic algorithm over item orderings.
//!
//! A [`Chromosome`] is a permutation of item indices, optionally paired with
//! a per-item orientation gene. The configured decoder turns it into pallets
//! and the fitness evaluator scores the result; the GA only ever sees the
//! fitness.
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters, builder and size-driven preset
//! - [`GaRunner`]: Executes the evolutionary loop
//! - [`GaResult`]: Best chromosome, its decoded layout and per-generation history
//! - [`AdaptiveController`]: Reweights the fitness terms between generations
//!
//! # Submodules
//!
//! - [`operators`]: OX and rotation crossover, swap and orientation mutation,
//!   height-sort local move
//! - [`seeding`]: Heuristic orderings for the initial population and for
//!   stagnation shocks
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"

mod config;
mod controller;
pub mod operators;
mod runner;
pub mod seeding;
mod selection;
mod types;

pub use config::GaConfig;
pub use controller::AdaptiveController;
pub use runner::{GaResult, GaRunner, GenerationStats};
pub use seeding::SeedHeuristic;
pub use selection::Selection;
pub use types::{Chromosome, Individual};
