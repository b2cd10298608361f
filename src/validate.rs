//! Post-hoc feasibility checks.
//!
//! Decoders never fail; they leave physical problems to the fitness
//! penalties. These functions re-check a finished layout from scratch and
//! fail loudly with every violation found, so a caller can refuse to ship
//! an infeasible plan.

use crate::error::{Error, Result};
use crate::fitness::{is_heavy_on_light, StackingModel, CONTACT_TOLERANCE};
use crate::model::{Item, Pallet, GEOMETRY_EPS};
use crate::planner::PackingPlan;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One feasibility violation. Pallet numbers are positions in the checked
/// sequence of pallets; item numbers are indices into the item slice.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Violation {
    /// A placement sticks out of the container.
    #[error("pallet {pallet}: item {item} is out of bounds")]
    OutOfBounds { pallet: usize, item: usize },

    /// Two placements intersect.
    #[error("pallet {pallet}: items {a} and {b} overlap")]
    Overlap { pallet: usize, a: usize, b: usize },

    /// Total weight exceeds the container limit.
    #[error("pallet {pallet}: weight {weight:.1} exceeds limit {max_weight:.1}")]
    Overweight {
        pallet: usize,
        weight: f64,
        max_weight: f64,
    },

    /// An elevated placement has nothing underneath it.
    #[error("pallet {pallet}: item {item} is not supported")]
    Unsupported { pallet: usize, item: usize },

    /// An item overloads the one it rests on.
    #[error("pallet {pallet}: item {upper} overloads item {lower}")]
    HeavyOnLight {
        pallet: usize,
        upper: usize,
        lower: usize,
    },

    /// A placement refers to an index outside the item slice.
    #[error("pallet {pallet}: unknown item {item}")]
    UnknownItem { pallet: usize, item: usize },

    /// An item is placed (or reported) more than once.
    #[error("item {item} appears more than once")]
    DuplicateItem { item: usize },

    /// An item is neither placed nor reported unplaced.
    #[error("item {item} is missing from the plan")]
    MissingItem { item: usize },
}

/// Every violation on `pallets`, in pallet order.
pub fn find_violations(pallets: &[Pallet], items: &[Item], stacking: StackingModel) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut seen = vec![false; items.len()];

    for (pi, pallet) in pallets.iter().enumerate() {
        let weight = pallet.total_weight();
        if weight > pallet.container.max_weight + GEOMETRY_EPS {
            violations.push(Violation::Overweight {
                pallet: pi,
                weight,
                max_weight: pallet.container.max_weight,
            });
        }

        let ps = &pallet.placements;
        for (k, p) in ps.iter().enumerate() {
            match seen.get_mut(p.item) {
                None => violations.push(Violation::UnknownItem { pallet: pi, item: p.item }),
                Some(true) => violations.push(Violation::DuplicateItem { item: p.item }),
                Some(slot) => *slot = true,
            }
            if !p.is_within(&pallet.container) {
                violations.push(Violation::OutOfBounds { pallet: pi, item: p.item });
            }
            for q in &ps[k + 1..] {
                if p.overlaps(q) {
                    violations.push(Violation::Overlap {
                        pallet: pi,
                        a: p.item,
                        b: q.item,
                    });
                }
            }

            if p.z <= CONTACT_TOLERANCE {
                continue;
            }
            let mut supported = false;
            for below in ps.iter().filter(|b| p.rests_on(b, CONTACT_TOLERANCE)) {
                supported = true;
                let strength = items.get(below.item).and_then(|i| i.strength);
                if is_heavy_on_light(p, below, strength) {
                    violations.push(Violation::HeavyOnLight {
                        pallet: pi,
                        upper: p.item,
                        lower: below.item,
                    });
                }
            }
            if !supported && stacking == StackingModel::Supported {
                violations.push(Violation::Unsupported { pallet: pi, item: p.item });
            }
        }
    }
    violations
}

/// Fails with [`Error::Infeasible`] when `pallets` has any violation.
pub fn validate_pallets(pallets: &[Pallet], items: &[Item], stacking: StackingModel) -> Result<()> {
    into_result(find_violations(pallets, items, stacking))
}

/// Checks a full plan against the items it was built from.
///
/// Pallets are numbered dedicated first, then mixed. Besides the per-pallet
/// checks, every item must be placed or listed as unplaced exactly once.
pub fn validate_plan(plan: &PackingPlan, items: &[Item], stacking: StackingModel) -> Result<()> {
    let pallets: Vec<Pallet> = plan.pallets().cloned().collect();
    let mut violations = find_violations(&pallets, items, stacking);

    let mut seen = vec![false; items.len()];
    for placement in pallets.iter().flat_map(|p| &p.placements) {
        if let Some(slot) = seen.get_mut(placement.item) {
            *slot = true;
        }
    }
    for &item in &plan.unplaced {
        match seen.get_mut(item) {
            Some(true) => violations.push(Violation::DuplicateItem { item }),
            Some(slot) => *slot = true,
            None => {}
        }
    }
    violations.extend(
        seen.iter()
            .enumerate()
            .filter(|(_, &s)| !s)
            .map(|(item, _)| Violation::MissingItem { item }),
    );
    into_result(violations)
}

fn into_result(violations: Vec<Violation>) -> Result<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::Infeasible { violations })
    }
}
