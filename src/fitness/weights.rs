//! Versioned fitness weight snapshots.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Coefficients of every fitness term.
///
/// A snapshot is immutable while a generation is being evaluated. The
/// adaptive controller produces a new snapshot with a higher `version`
/// instead of mutating the one in use, and every chromosome records the
/// version its cached fitness was computed under.
///
/// # Defaults
///
/// ```
/// use u_palletize::fitness::FitnessWeights;
///
/// let w = FitnessWeights::default();
/// assert_eq!(w.version, 0);
/// assert!(w.w_weight_over > 100.0 * w.w_volume);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FitnessWeights {
    /// Fill reward: `w_volume * fill²` per pallet.
    pub w_volume: f64,
    /// Purity reward per pallet.
    pub w_cluster: f64,
    /// Bonus when the pallet count equals the volumetric minimum.
    pub w_min_pallet_bonus: f64,
    /// Bonus when the pallet count is below the volumetric minimum.
    pub w_below_min_bonus: f64,
    /// Penalty per pallet above the volumetric minimum.
    pub w_pallet_excess: f64,
    /// Hard penalty per overweight pallet.
    pub w_weight_over: f64,
    /// Hard penalty per placement outside the container.
    pub w_out_of_bounds: f64,
    /// Hard penalty per stacking violation.
    pub w_stack_violation: f64,
    /// Hard penalty per item left unplaced.
    pub w_unplaced: f64,
    /// Penalty per `cog_scale` of centre-of-gravity offset past the dead zone.
    pub w_cog_offset: f64,
    /// Offset (same unit as dimensions) tolerated without penalty.
    pub cog_dead_zone: f64,
    /// Offset step the CoG penalty is expressed in.
    pub cog_scale: f64,
    /// Snapshot version. Bumped on every reweighting.
    pub version: u64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            w_volume: 10_000.0,
            w_cluster: 0.0,
            w_min_pallet_bonus: 2_000.0,
            w_below_min_bonus: 4_000.0,
            w_pallet_excess: 1_000.0,
            w_weight_over: 1_000_000.0,
            w_out_of_bounds: 1_000_000.0,
            w_stack_violation: 1_000_000.0,
            w_unplaced: 1_000_000.0,
            w_cog_offset: 500.0,
            cog_dead_zone: 10.0,
            cog_scale: 5.0,
            version: 0,
        }
    }
}

impl FitnessWeights {
    /// Sets the fill weight.
    pub fn with_volume(mut self, w: f64) -> Self {
        self.w_volume = w;
        self
    }

    /// Sets the purity weight.
    pub fn with_cluster(mut self, w: f64) -> Self {
        self.w_cluster = w;
        self
    }

    /// Sets the per-excess-pallet penalty.
    pub fn with_pallet_excess(mut self, w: f64) -> Self {
        self.w_pallet_excess = w;
        self
    }

    /// Sets the stacking violation penalty.
    pub fn with_stack_violation(mut self, w: f64) -> Self {
        self.w_stack_violation = w;
        self
    }

    /// Sets the CoG penalty and its dead zone.
    pub fn with_cog(mut self, w: f64, dead_zone: f64, scale: f64) -> Self {
        self.w_cog_offset = w;
        self.cog_dead_zone = dead_zone;
        self.cog_scale = scale;
        self
    }

    /// Copy of this snapshot with the next version number.
    pub fn next_version(&self) -> Self {
        Self {
            version: self.version + 1,
            ..self.clone()
        }
    }

    /// Checks that every coefficient is finite and non-negative and that
    /// `cog_scale` is positive.
    pub fn validate(&self) -> Result<()> {
        let terms = [
            ("w_volume", self.w_volume),
            ("w_cluster", self.w_cluster),
            ("w_min_pallet_bonus", self.w_min_pallet_bonus),
            ("w_below_min_bonus", self.w_below_min_bonus),
            ("w_pallet_excess", self.w_pallet_excess),
            ("w_weight_over", self.w_weight_over),
            ("w_out_of_bounds", self.w_out_of_bounds),
            ("w_stack_violation", self.w_stack_violation),
            ("w_unplaced", self.w_unplaced),
            ("w_cog_offset", self.w_cog_offset),
            ("cog_dead_zone", self.cog_dead_zone),
        ];
        for (name, value) in terms {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if !self.cog_scale.is_finite() || self.cog_scale <= 0.0 {
            return Err(Error::Config(format!(
                "cog_scale must be positive, got {}",
                self.cog_scale
            )));
        }
        Ok(())
    }
}
