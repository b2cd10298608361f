//! Per-family capacity simulation and dedicated pallet construction.

use super::layer::{solve_layer, solve_layer_fixed, LayerLayout};
use crate::model::{ContainerProfile, Item, Orientation, Pallet, Placement};
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Minimum fill a full dedicated pallet must reach for a family to get one.
pub const DEDICATED_EFFICIENCY_THRESHOLD: f64 = 0.90;

/// Share of capacity a remainder needs to earn its own dedicated pallet.
pub const PARTIAL_PALLET_MIN_SHARE: f64 = 0.30;

/// Items sharing product code, dimensions and weight.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Family {
    /// Shared product code.
    pub product_code: String,
    /// Indices of the members in input order.
    pub members: Vec<usize>,
}

impl Family {
    /// Index of the first member, whose dimensions stand for the family.
    pub fn representative(&self) -> Option<usize> {
        self.members.first().copied()
    }
}

/// Groups items into families in first-appearance order.
pub fn group_families(items: &[Item]) -> Vec<Family> {
    // Dimensions and weight keyed by bit pattern.
    type Key = (String, u64, u64, u64, u64);
    let mut by_key: HashMap<Key, usize> = HashMap::new();
    let mut families: Vec<Family> = Vec::new();

    for (idx, item) in items.iter().enumerate() {
        let key = (
            item.product_code.clone(),
            item.length.to_bits(),
            item.width.to_bits(),
            item.height.to_bits(),
            item.weight.to_bits(),
        );
        match by_key.get(&key) {
            Some(&f) => families[f].members.push(idx),
            None => {
                by_key.insert(key, families.len());
                families.push(Family {
                    product_code: item.product_code.clone(),
                    members: vec![idx],
                });
            }
        }
    }
    families
}

/// Capacity of one pallet holding only copies of one item.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FamilySimulation {
    /// Best floor pattern.
    pub layout: LayerLayout,
    /// Layers that fit under the height limit.
    pub layers: usize,
    /// `items_per_layer * layers`.
    pub volume_capacity: usize,
    /// `floor(max_weight / weight)`, unbounded for weightless items.
    pub weight_capacity: usize,
    /// The smaller of the two capacities.
    pub capacity: usize,
    /// `capacity * item volume / pallet volume`.
    pub efficiency: f64,
    /// Whether a full pallet clears [`DEDICATED_EFFICIENCY_THRESHOLD`].
    pub can_be_single: bool,
}

impl FamilySimulation {
    /// Items per layer.
    pub fn items_per_layer(&self) -> usize {
        self.layout.count
    }
}

/// Simulates a pallet filled with copies of `item`.
///
/// # Examples
///
/// ```
/// use u_palletize::model::{ContainerProfile, Item};
/// use u_palletize::tiling::simulate_family;
///
/// let item = Item::new("c", 40.0, 50.0, 60.0).with_weight(10.0);
/// let sim = simulate_family(&item, &ContainerProfile::default());
/// assert_eq!(sim.capacity, 18);
/// assert!(sim.can_be_single);
/// ```
pub fn simulate_family(item: &Item, container: &ContainerProfile) -> FamilySimulation {
    let layout = if item.rotatable {
        solve_layer(container.length, container.width, item.length, item.width)
    } else {
        solve_layer_fixed(container.length, container.width, item.length, item.width)
    };

    let layers = if item.height > 0.0 && item.height <= container.height {
        ((container.height + 1e-9) / item.height).floor() as usize
    } else {
        0
    };
    let volume_capacity = layout.count * layers;
    let weight_capacity = if item.weight > 0.0 {
        ((container.max_weight + 1e-9) / item.weight).floor() as usize
    } else {
        usize::MAX
    };
    let capacity = volume_capacity.min(weight_capacity);

    let pallet_volume = container.volume();
    let efficiency = if pallet_volume > 0.0 {
        capacity as f64 * item.volume() / pallet_volume
    } else {
        0.0
    };

    FamilySimulation {
        layout,
        layers,
        volume_capacity,
        weight_capacity,
        capacity,
        efficiency,
        can_be_single: capacity > 0 && efficiency >= DEDICATED_EFFICIENCY_THRESHOLD,
    }
}

/// Places `members` (all copies of `item`) band by band, layer by layer.
///
/// Stops when the members or the layers run out.
pub fn layer_placements(
    item: &Item,
    members: &[usize],
    simulation: &FamilySimulation,
    container: &ContainerProfile,
) -> Vec<Placement> {
    let slots = simulation.layout.slots();
    let mut placements = Vec::with_capacity(members.len());
    let mut remaining = members.iter().copied();

    'layers: for layer in 0..simulation.layers {
        let z = layer as f64 * item.height;
        if z + item.height > container.height + 1e-9 {
            break;
        }
        for slot in &slots {
            let Some(idx) = remaining.next() else {
                break 'layers;
            };
            let o = Orientation::new(slot.length, slot.width, item.height);
            placements.push(Placement::new(idx, item, o, slot.x, slot.y, z));
        }
    }
    placements
}

/// Builds one dedicated pallet for `members`.
pub(crate) fn dedicated_pallet(
    item: &Item,
    members: &[usize],
    simulation: &FamilySimulation,
    container: &ContainerProfile,
) -> Pallet {
    let mut pallet = Pallet::dedicated(*container, item.product_code.clone());
    for p in layer_placements(item, members, simulation, container) {
        pallet.push(p);
    }
    pallet
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_group_families_first_appearance() {
        let items = vec![
            Item::new("1", 10.0, 10.0, 10.0).with_product_code("B"),
            Item::new("2", 10.0, 10.0, 10.0).with_product_code("A"),
            Item::new("3", 10.0, 10.0, 10.0).with_product_code("B"),
            Item::new("4", 10.0, 10.0, 20.0).with_product_code("B"),
            Item::new("5", 10.0, 10.0, 10.0)
                .with_product_code("A")
                .with_weight(2.0),
        ];
        let families = group_families(&items);
        let members: Vec<Vec<usize>> = families.iter().map(|f| f.members.clone()).collect();
        assert_eq!(members, vec![vec![0, 2], vec![1], vec![3], vec![4]]);
        assert_eq!(families[0].product_code, "B");
        assert_eq!(families[0].representative(), Some(0));
    }

    #[test]
    fn test_tall_heavy_box_is_not_single() {
        // One per layer, one layer: weight would allow 3 but volume allows 1.
        let item = Item::new("t", 100.0, 100.0, 150.0).with_weight(355.0);
        let sim = simulate_family(&item, &ContainerProfile::default());
        assert_eq!(sim.items_per_layer(), 1);
        assert_eq!(sim.layers, 1);
        assert_eq!(sim.weight_capacity, 3);
        assert!(sim.capacity <= 3);
        assert_eq!(sim.capacity, 1);
        assert_relative_eq!(sim.efficiency, 1_500_000.0 / 2_160_000.0);
        assert!(!sim.can_be_single);
    }

    #[test]
    fn test_weight_caps_capacity() {
        let item = Item::new("w", 40.0, 50.0, 60.0).with_weight(100.0);
        let sim = simulate_family(&item, &ContainerProfile::default());
        assert_eq!(sim.volume_capacity, 18);
        assert_eq!(sim.weight_capacity, 12);
        assert_eq!(sim.capacity, 12);
        assert!(!sim.can_be_single);
    }

    #[test]
    fn test_too_tall_item_has_no_capacity() {
        let item = Item::new("x", 40.0, 50.0, 200.0);
        let sim = simulate_family(&item, &ContainerProfile::default());
        assert_eq!(sim.capacity, 0);
        assert!(!sim.can_be_single);
        assert_eq!(sim.weight_capacity, usize::MAX);
    }

    #[test]
    fn test_layer_placements_fill_bottom_up() {
        let container = ContainerProfile::default();
        let item = Item::new("c", 40.0, 50.0, 60.0).with_weight(10.0);
        let sim = simulate_family(&item, &container);
        let members: Vec<usize> = (100..110).collect();
        let placements = layer_placements(&item, &members, &sim, &container);
        assert_eq!(placements.len(), 10);
        assert_eq!(placements.iter().filter(|p| p.z == 0.0).count(), 6);
        assert_eq!(placements.iter().filter(|p| p.z == 60.0).count(), 4);
        assert_eq!(placements[0].item, 100);
        for (i, a) in placements.iter().enumerate() {
            assert!(a.is_within(&container));
            for b in &placements[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }
    }

    #[test]
    fn test_layer_placements_stop_at_capacity() {
        let container = ContainerProfile::default();
        let item = Item::new("c", 40.0, 50.0, 60.0);
        let sim = simulate_family(&item, &container);
        let members: Vec<usize> = (0..25).collect();
        assert_eq!(layer_placements(&item, &members, &sim, &container).len(), 18);
    }

    #[test]
    fn test_dedicated_pallet_kind() {
        let container = ContainerProfile::default();
        let item = Item::new("c", 40.0, 50.0, 60.0)
            .with_product_code("SKU")
            .with_weight(10.0);
        let sim = simulate_family(&item, &container);
        let pallet = dedicated_pallet(&item, &[0, 1, 2], &sim, &container);
        assert_eq!(pallet.len(), 3);
        assert_relative_eq!(pallet.total_weight(), 30.0);
        assert_eq!(
            pallet.kind,
            crate::model::PalletKind::Dedicated {
                product_code: "SKU".into()
            }
        );
    }
}
