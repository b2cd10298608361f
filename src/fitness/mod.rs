//! Multi-term fitness evaluation.
//!
//! Fitness is maximized. It is the sum of
//!
//! - a pallet-count term against the volumetric minimum
//! - a fill term `Σ w_volume · fill²`
//! - an optional purity (clustering) term
//!
//! minus hard penalties (overweight, out of bounds, stacking, unplaced)
//! that dominate every reward, and a centre-of-gravity penalty past a
//! dead zone.
//!
//! Weights are passed explicitly as a versioned [`FitnessWeights`]
//! snapshot; nothing here holds global state.

mod evaluator;
mod stacking;
mod weights;

pub use evaluator::{Evaluation, FitnessEvaluator, ScoreBreakdown, ViolationCounts};
pub use stacking::{
    contact_weight_violations, is_heavy_on_light, unsupported_count, StackingModel,
    CONTACT_TOLERANCE, HEAVY_ON_LIGHT_RATIO,
};
pub use weights::FitnessWeights;
