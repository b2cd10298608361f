//! Error types for pallet packing.

use crate::validate::Violation;
use thiserror::Error;

/// Result type alias for palletizing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or checking a packing run.
///
/// Decoding itself never fails: physical violations found while packing are
/// scored by the fitness function instead. These errors cover invalid
/// configuration and the explicit post-hoc feasibility check.
#[derive(Debug, Error)]
pub enum Error {
    /// An item has non-positive or non-finite dimensions or weight.
    #[error("Invalid item '{id}': {reason}")]
    InvalidItem {
        /// Identifier of the offending item.
        id: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The container profile is degenerate.
    #[error("Invalid container: {0}")]
    InvalidContainer(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A decoded plan failed feasibility validation.
    #[error("Infeasible layout: {} violation(s), first: {}", .violations.len(), first_violation(.violations))]
    Infeasible {
        /// Every violation found.
        violations: Vec<Violation>,
    },
}

fn first_violation(violations: &[Violation]) -> String {
    violations
        .first()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "none".to_string())
}
