//! Single-pallet tiling for homogeneous product families.
//!
//! Runs before the GA. Each family (same product code, dimensions and
//! weight) is simulated on one pallet; families that pack densely enough
//! get dedicated pallets and the rest join the mixed pool.
//!
//! # Allocation
//!
//! With `capacity` items per full pallet and `stock` family members:
//!
//! - capacity is 0 or efficiency < [`DEDICATED_EFFICIENCY_THRESHOLD`]:
//!   the whole family goes to the mixed pool
//! - `stock >= capacity`: `stock / capacity` full pallets; a remainder of
//!   at least [`PARTIAL_PALLET_MIN_SHARE`] of capacity gets one more
//!   dedicated pallet, otherwise it goes to the mixed pool
//! - `stock < capacity`: one partial dedicated pallet

mod family;
mod layer;

pub use family::{
    group_families, layer_placements, simulate_family, Family, FamilySimulation,
    DEDICATED_EFFICIENCY_THRESHOLD, PARTIAL_PALLET_MIN_SHARE,
};
pub use layer::{solve_layer, solve_layer_fixed, Band, BandAxis, LayerLayout, Slot};

use crate::model::{ContainerProfile, Item, Pallet};

/// Dedicated pallets plus the indices left for the GA.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    /// Pure pallets, one family each.
    pub dedicated: Vec<Pallet>,
    /// Item indices for the mixed pool, in input order.
    pub mixed_pool: Vec<usize>,
}

/// Splits `items` into dedicated pallets and a mixed pool.
///
/// Every input index ends up in exactly one of the two outputs.
pub fn partition(items: &[Item], container: &ContainerProfile) -> Partition {
    let mut out = Partition::default();

    for family in group_families(items) {
        let Some(rep) = family.representative().and_then(|i| items.get(i)) else {
            continue;
        };
        let sim = simulate_family(rep, container);
        let stock = family.members.len();

        if !sim.can_be_single {
            log::info!(
                "family {}: {} item(s) to mixed pool (capacity {}, efficiency {:.3})",
                family.product_code,
                stock,
                sim.capacity,
                sim.efficiency
            );
            out.mixed_pool.extend_from_slice(&family.members);
            continue;
        }

        let chunks = family.members.chunks(sim.capacity);
        let mut full = 0usize;
        for chunk in chunks {
            let is_full = chunk.len() == sim.capacity;
            let promoted = chunk.len() as f64 >= PARTIAL_PALLET_MIN_SHARE * sim.capacity as f64;
            // A family smaller than one pallet always gets its partial pallet.
            if is_full || promoted || stock < sim.capacity {
                out.dedicated
                    .push(family::dedicated_pallet(rep, chunk, &sim, container));
                full += usize::from(is_full);
            } else {
                out.mixed_pool.extend_from_slice(chunk);
            }
        }
        log::info!(
            "family {}: {} item(s), capacity {}, {} full pallet(s), efficiency {:.3}",
            family.product_code,
            stock,
            sim.capacity,
            full,
            sim.efficiency
        );
    }

    out.mixed_pool.sort_unstable();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(code: &str, n: usize, l: f64, w: f64, h: f64, weight: f64) -> Vec<Item> {
        (0..n)
            .map(|i| {
                Item::new(format!("{code}{i}"), l, w, h)
                    .with_product_code(code)
                    .with_weight(weight)
            })
            .collect()
    }

    fn assert_covers_all(p: &Partition, n: usize) {
        let mut seen: Vec<usize> = p
            .dedicated
            .iter()
            .flat_map(|pl| pl.placements.iter().map(|pp| pp.item))
            .chain(p.mixed_pool.iter().copied())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn test_full_pallets_and_small_remainder() {
        // capacity 18; 40 = 2 full + 4 (< 30% of 18 = 5.4) to mixed.
        let items = family("A", 40, 40.0, 50.0, 60.0, 10.0);
        let p = partition(&items, &ContainerProfile::default());
        assert_eq!(p.dedicated.len(), 2);
        assert!(p.dedicated.iter().all(|d| d.len() == 18));
        assert_eq!(p.mixed_pool, vec![36, 37, 38, 39]);
        assert_covers_all(&p, 40);
    }

    #[test]
    fn test_large_remainder_gets_own_pallet() {
        // 18 + 6 (>= 5.4) -> two dedicated pallets.
        let items = family("A", 24, 40.0, 50.0, 60.0, 10.0);
        let p = partition(&items, &ContainerProfile::default());
        assert_eq!(p.dedicated.len(), 2);
        assert_eq!(p.dedicated[1].len(), 6);
        assert!(p.mixed_pool.is_empty());
    }

    #[test]
    fn test_partial_pallet_below_capacity() {
        let items = family("A", 3, 40.0, 50.0, 60.0, 10.0);
        let p = partition(&items, &ContainerProfile::default());
        assert_eq!(p.dedicated.len(), 1);
        assert_eq!(p.dedicated[0].len(), 3);
        assert!(p.mixed_pool.is_empty());
    }

    #[test]
    fn test_inefficient_family_goes_to_mixed_pool() {
        let items = family("T", 5, 100.0, 100.0, 150.0, 355.0);
        let p = partition(&items, &ContainerProfile::default());
        assert!(p.dedicated.is_empty());
        assert_eq!(p.mixed_pool, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_mixed_input_keeps_indices() {
        let mut items = family("T", 2, 100.0, 100.0, 150.0, 355.0);
        items.extend(family("A", 20, 40.0, 50.0, 60.0, 10.0));
        items.push(Item::new("odd", 33.0, 27.0, 41.0).with_weight(5.0));
        let p = partition(&items, &ContainerProfile::default());
        assert_eq!(p.dedicated.len(), 1);
        assert_eq!(p.dedicated[0].len(), 18);
        assert_eq!(p.mixed_pool, vec![0, 1, 20, 21, 22]);
        assert_covers_all(&p, items.len());
        for d in &p.dedicated {
            assert!(d.total_weight() <= d.container.max_weight);
            assert!(d.placements.iter().all(|pl| pl.is_within(&d.container)));
        }
    }

    #[test]
    fn test_empty_input() {
        let p = partition(&[], &ContainerProfile::default());
        assert!(p.dedicated.is_empty());
        assert!(p.mixed_pool.is_empty());
    }
}
