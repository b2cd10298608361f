//! Geometry and placement primitives.
//!
//! - [`Item`]: an immutable box with yaw-only rotation policy
//! - [`Orientation`]: one allowed permutation of an item's extents
//! - [`ContainerProfile`]: the pallet dimensions and payload limit
//! - [`Placement`] / [`Pallet`]: decoder output

mod container;
mod item;
mod pallet;

pub use container::ContainerProfile;
pub use item::{Item, Orientation};
pub use pallet::{Pallet, PalletKind, Placement, Point3, GEOMETRY_EPS};

/// Volumetric lower bound on the pallet count: `ceil(sum volume / pallet volume)`, at least 1.
pub fn theoretical_min_pallets(items: &[Item], container: &ContainerProfile) -> usize {
    let pallet_volume = container.volume();
    if pallet_volume <= 0.0 {
        return 1;
    }
    let total: f64 = items.iter().map(Item::volume).sum();
    // Guard against 2.0000000001 rounding up to 3.
    let ratio = total / pallet_volume - 1e-9;
    (ratio.ceil() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theoretical_min() {
        let c = ContainerProfile::new(10.0, 10.0, 10.0, 100.0);
        let items: Vec<Item> = (0..4)
            .map(|i| Item::new(format!("i{i}"), 10.0, 10.0, 5.0))
            .collect();
        assert_eq!(theoretical_min_pallets(&items, &c), 2);
        assert_eq!(theoretical_min_pallets(&items[..3], &c), 2);
        assert_eq!(theoretical_min_pallets(&items[..1], &c), 1);
        assert_eq!(theoretical_min_pallets(&[], &c), 1);
    }
}
