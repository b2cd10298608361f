//! Adaptive fitness reweighting.
//!
//! Every few generations the controller compares the incumbent against two
//! targets (pallet count close to the volumetric minimum, mean fill above a
//! threshold) and nudges the matching weights. Each weight stays within a
//! fixed band around its base value, so the search cannot drift into
//! ignoring either objective.

use crate::fitness::FitnessWeights;

/// Growth factor of the pallet-excess penalty when too many pallets are used.
pub const PALLET_RAISE: f64 = 1.25;
/// Decay factor of the pallet-excess penalty when the target is met.
pub const PALLET_RELAX: f64 = 0.9;
/// Growth factor of the fill weight when fill is below target.
pub const FILL_RAISE: f64 = 1.2;
/// Decay factor of the fill weight when the target is met.
pub const FILL_RELAX: f64 = 0.95;
/// Lower clamp, as a multiple of the base weight.
pub const MIN_SCALE: f64 = 0.5;
/// Upper clamp, as a multiple of the base weight.
pub const MAX_SCALE: f64 = 4.0;

/// Adjusts `w_pallet_excess` and `w_volume` from the incumbent's metrics.
#[derive(Debug, Clone)]
pub struct AdaptiveController {
    base_pallet_excess: f64,
    base_volume: f64,
    min_pallets: usize,
    pallet_margin: usize,
    fill_target: f64,
}

impl AdaptiveController {
    /// A controller anchored at the weights of `base`.
    pub fn new(base: &FitnessWeights, min_pallets: usize, pallet_margin: usize, fill_target: f64) -> Self {
        Self {
            base_pallet_excess: base.w_pallet_excess,
            base_volume: base.w_volume,
            min_pallets,
            pallet_margin,
            fill_target,
        }
    }

    /// The next weight snapshot, or `None` when nothing changed.
    ///
    /// A returned snapshot always carries `current.version + 1`.
    pub fn adjust(
        &self,
        current: &FitnessWeights,
        best_pallet_count: usize,
        best_fill_ratio: f64,
    ) -> Option<FitnessWeights> {
        let pallet_factor = if best_pallet_count > self.min_pallets + self.pallet_margin {
            PALLET_RAISE
        } else {
            PALLET_RELAX
        };
        let fill_factor = if best_fill_ratio < self.fill_target {
            FILL_RAISE
        } else {
            FILL_RELAX
        };

        let pallet_excess = clamp_to_base(current.w_pallet_excess * pallet_factor, self.base_pallet_excess);
        let volume = clamp_to_base(current.w_volume * fill_factor, self.base_volume);

        if pallet_excess == current.w_pallet_excess && volume == current.w_volume {
            return None;
        }
        let mut next = current.next_version();
        next.w_pallet_excess = pallet_excess;
        next.w_volume = volume;
        Some(next)
    }
}

fn clamp_to_base(value: f64, base: f64) -> f64 {
    value.clamp(base * MIN_SCALE, base * MAX_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_raises_when_targets_missed() {
        let base = FitnessWeights::default();
        let ctl = AdaptiveController::new(&base, 2, 0, 0.75);
        let next = ctl.adjust(&base, 3, 0.5).unwrap();
        assert_eq!(next.version, 1);
        assert_relative_eq!(next.w_pallet_excess, 1_250.0);
        assert_relative_eq!(next.w_volume, 12_000.0);
    }

    #[test]
    fn test_relaxes_when_targets_met() {
        let base = FitnessWeights::default();
        let ctl = AdaptiveController::new(&base, 2, 0, 0.75);
        let next = ctl.adjust(&base, 2, 0.9).unwrap();
        assert_relative_eq!(next.w_pallet_excess, 900.0);
        assert_relative_eq!(next.w_volume, 9_500.0);
    }

    #[test]
    fn test_margin_tolerates_extra_pallets() {
        let base = FitnessWeights::default();
        let ctl = AdaptiveController::new(&base, 2, 1, 0.75);
        let next = ctl.adjust(&base, 3, 0.9).unwrap();
        assert_relative_eq!(next.w_pallet_excess, 900.0);
    }

    #[test]
    fn test_clamped_to_band() {
        let base = FitnessWeights::default();
        let ctl = AdaptiveController::new(&base, 1, 0, 0.75);

        let mut w = base.clone();
        for _ in 0..50 {
            if let Some(next) = ctl.adjust(&w, 10, 0.1) {
                w = next;
            }
        }
        assert_relative_eq!(w.w_pallet_excess, 4_000.0);
        assert_relative_eq!(w.w_volume, 40_000.0);
        // Fully saturated: nothing left to change.
        assert!(ctl.adjust(&w, 10, 0.1).is_none());

        let mut w = base.clone();
        for _ in 0..50 {
            if let Some(next) = ctl.adjust(&w, 1, 1.0) {
                w = next;
            }
        }
        assert_relative_eq!(w.w_pallet_excess, 500.0);
        assert_relative_eq!(w.w_volume, 5_000.0);
    }

    #[test]
    fn test_other_weights_untouched() {
        let base = FitnessWeights::default().with_cluster(300.0);
        let ctl = AdaptiveController::new(&base, 1, 0, 0.75);
        let next = ctl.adjust(&base, 4, 0.2).unwrap();
        assert_eq!(next.w_cluster, 300.0);
        assert_eq!(next.w_unplaced, base.w_unplaced);
    }
}
