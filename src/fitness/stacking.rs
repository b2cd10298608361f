//! Stacking-violation models.

use crate::model::{Item, Pallet, Placement};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Vertical gap under which two faces count as touching.
pub const CONTACT_TOLERANCE: f64 = 1e-6;

/// An upper item heavier than this multiple of the item below it is a violation.
pub const HEAVY_ON_LIGHT_RATIO: f64 = 1.5;

/// Which stacking rule the fitness evaluator applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StackingModel {
    /// Only heavy-on-light contact pairs are violations.
    ContactWeight,
    /// Every elevated item must rest on something, and heavy-on-light
    /// contact pairs are violations too.
    #[default]
    Supported,
}

impl StackingModel {
    /// Number of violations on `pallet`. `items` is the slice placements index into.
    pub fn count_violations(&self, pallet: &Pallet, items: &[Item]) -> usize {
        let contact = contact_weight_violations(pallet, items);
        match self {
            StackingModel::ContactWeight => contact,
            StackingModel::Supported => contact + unsupported_count(pallet),
        }
    }
}

/// Whether `upper` resting on `lower` overloads it.
///
/// Overload means `upper` weighs more than [`HEAVY_ON_LIGHT_RATIO`] times
/// `lower`, or more than `lower`'s declared strength.
pub fn is_heavy_on_light(upper: &Placement, lower: &Placement, lower_strength: Option<f64>) -> bool {
    if upper.weight > HEAVY_ON_LIGHT_RATIO * lower.weight + CONTACT_TOLERANCE {
        return true;
    }
    matches!(lower_strength, Some(s) if upper.weight > s + CONTACT_TOLERANCE)
}

/// Contact pairs where the upper item overloads the lower one.
pub fn contact_weight_violations(pallet: &Pallet, items: &[Item]) -> usize {
    let ps = &pallet.placements;
    let mut count = 0;
    for upper in ps {
        if upper.z <= CONTACT_TOLERANCE {
            continue;
        }
        for lower in ps {
            if !upper.rests_on(lower, CONTACT_TOLERANCE) {
                continue;
            }
            let strength = items.get(lower.item).and_then(|i| i.strength);
            if is_heavy_on_light(upper, lower, strength) {
                count += 1;
            }
        }
    }
    count
}

/// Elevated placements with nothing directly underneath their footprint.
pub fn unsupported_count(pallet: &Pallet) -> usize {
    let ps = &pallet.placements;
    ps.iter()
        .filter(|p| p.z > CONTACT_TOLERANCE)
        .filter(|p| !ps.iter().any(|q| p.rests_on(q, CONTACT_TOLERANCE)))
        .count()
}
