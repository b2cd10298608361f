//! Deterministic decoders turning an item ordering into pallets.
//!
//! Both decoders implement [`PlacementStrategy`] with the same contract:
//! `(items, sequence, per-item orientation hint, container) -> Decoded`.
//! The GA never branches on which decoder is in use; it holds a
//! [`DecoderKind`] chosen by configuration.
//!
//! - [`ShelfDecoder`]: row / layer shelf packing, O(n)
//! - [`MaxRectsDecoder`]: best-fit over guillotine-split free boxes
//!
//! Decoders are lenient: they always produce some placement for every item
//! that fits an empty container, and report the rest in
//! [`Decoded::unplaced`] instead of dropping them.

mod maxrects;
mod shelf;

pub use maxrects::MaxRectsDecoder;
pub use shelf::ShelfDecoder;

use crate::model::{ContainerProfile, Item, Pallet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Output of a decoder run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    /// Closed pallets in the order they were opened.
    pub pallets: Vec<Pallet>,
    /// Items that fit no empty container (too large or too heavy).
    pub unplaced: Vec<usize>,
}

impl Decoded {
    /// Number of pallets used.
    pub fn pallet_count(&self) -> usize {
        self.pallets.len()
    }

    /// Number of placed items.
    pub fn placed_count(&self) -> usize {
        self.pallets.iter().map(Pallet::len).sum()
    }

    /// Mean fill ratio across pallets (0 when there are none).
    pub fn mean_fill_ratio(&self) -> f64 {
        if self.pallets.is_empty() {
            return 0.0;
        }
        self.pallets.iter().map(Pallet::fill_ratio).sum::<f64>() / self.pallets.len() as f64
    }
}

/// Turns an ordering of items into closed pallets.
///
/// Implementations must be deterministic: the same inputs always produce
/// identical placements.
pub trait PlacementStrategy: Send + Sync {
    /// Decodes `sequence` (indices into `items`) into pallets.
    ///
    /// `hints`, when given, holds an orientation index per item (indexed by
    /// item index, not by sequence position). Indices outside `items` are
    /// ignored.
    fn decode(
        &self,
        items: &[Item],
        sequence: &[usize],
        hints: Option<&[usize]>,
        container: &ContainerProfile,
    ) -> Decoded;
}

/// Decoder selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DecoderKind {
    /// Row / layer shelf packing.
    #[default]
    Shelf,
    /// Guillotine free-box best-fit packing.
    MaxRects,
}

impl PlacementStrategy for DecoderKind {
    fn decode(
        &self,
        items: &[Item],
        sequence: &[usize],
        hints: Option<&[usize]>,
        container: &ContainerProfile,
    ) -> Decoded {
        match self {
            DecoderKind::Shelf => ShelfDecoder.decode(items, sequence, hints, container),
            DecoderKind::MaxRects => MaxRectsDecoder.decode(items, sequence, hints, container),
        }
    }
}

/// Whether an item fits an empty container in some orientation and within its weight limit.
pub fn is_placeable(item: &Item, container: &ContainerProfile) -> bool {
    item.weight <= container.max_weight
        && item.orientations().iter().any(|o| container.fits(o))
}

/// Result for a container that cannot hold anything: every item is unplaced.
fn reject_all(items: &[Item], sequence: &[usize]) -> Decoded {
    Decoded {
        pallets: Vec::new(),
        unplaced: sequence.iter().copied().filter(|&i| i < items.len()).collect(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::model::{Item, Pallet};

    /// Asserts bounds, pairwise non-overlap and the weight limit on every pallet.
    pub fn assert_geometric_invariants(pallets: &[Pallet]) {
        for (pi, pallet) in pallets.iter().enumerate() {
            assert!(
                pallet.total_weight() <= pallet.container.max_weight + 1e-6,
                "pallet {pi} overweight: {}",
                pallet.total_weight()
            );
            for (a_idx, a) in pallet.placements.iter().enumerate() {
                assert!(a.is_within(&pallet.container), "pallet {pi}: {a:?} out of bounds");
                for b in &pallet.placements[a_idx + 1..] {
                    assert!(!a.overlaps(b), "pallet {pi}: {a:?} overlaps {b:?}");
                }
            }
        }
    }

    pub fn uniform_items(n: usize, l: f64, w: f64, h: f64, weight: f64) -> Vec<Item> {
        (0..n)
            .map(|i| {
                Item::new(format!("u{i}"), l, w, h)
                    .with_product_code("U")
                    .with_weight(weight)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use proptest::prelude::*;

    fn item_strategy() -> impl Strategy<Value = Item> {
        (5u32..70, 5u32..60, 5u32..90, 0u32..400, any::<bool>()).prop_map(|(l, w, h, wt, rot)| {
            Item::new("p", l as f64, w as f64, h as f64)
                .with_weight(wt as f64)
                .with_rotation(rot)
        })
    }

    proptest! {
        #[test]
        fn prop_decoders_respect_invariants(
            items in prop::collection::vec(item_strategy(), 1..40),
            seed in any::<u64>(),
        ) {
            use rand::seq::SliceRandom;
            use rand::SeedableRng;
            let container = ContainerProfile::default();
            let mut sequence: Vec<usize> = (0..items.len()).collect();
            sequence.shuffle(&mut rand::rngs::StdRng::seed_from_u64(seed));

            for kind in [DecoderKind::Shelf, DecoderKind::MaxRects] {
                let decoded = kind.decode(&items, &sequence, None, &container);
                assert_geometric_invariants(&decoded.pallets);
                prop_assert_eq!(decoded.placed_count() + decoded.unplaced.len(), items.len());
                prop_assert!(decoded.pallets.iter().all(|p| !p.is_empty()));
            }
        }
    }

    #[test]
    fn test_decode_is_idempotent() {
        let items: Vec<Item> = (0..30)
            .map(|i| {
                Item::new(format!("i{i}"), 20.0 + (i % 5) as f64 * 7.0, 15.0 + (i % 3) as f64 * 11.0, 25.0 + (i % 4) as f64 * 9.0)
                    .with_weight(10.0 + i as f64)
            })
            .collect();
        let sequence: Vec<usize> = (0..items.len()).rev().collect();
        let container = ContainerProfile::default();
        for kind in [DecoderKind::Shelf, DecoderKind::MaxRects] {
            let a = kind.decode(&items, &sequence, None, &container);
            let b = kind.decode(&items, &sequence, None, &container);
            assert_eq!(a, b, "{kind:?} must be deterministic");
        }
    }

    #[test]
    fn test_oversized_item_is_reported() {
        let items = vec![
            Item::new("fits", 50.0, 50.0, 50.0),
            Item::new("huge", 200.0, 200.0, 50.0),
            Item::new("heavy", 10.0, 10.0, 10.0).with_weight(2000.0),
        ];
        let container = ContainerProfile::default();
        for kind in [DecoderKind::Shelf, DecoderKind::MaxRects] {
            let d = kind.decode(&items, &[0, 1, 2], None, &container);
            assert_eq!(d.unplaced, vec![1, 2]);
            assert_eq!(d.placed_count(), 1);
        }
    }

    #[test]
    fn test_invalid_container_places_nothing() {
        let items = uniform_items(3, 10.0, 10.0, 10.0, 1.0);
        let container = ContainerProfile::new(0.0, 100.0, 100.0, 100.0);
        for kind in [DecoderKind::Shelf, DecoderKind::MaxRects] {
            let d = kind.decode(&items, &[0, 1, 2], None, &container);
            assert!(d.pallets.is_empty());
            assert_eq!(d.unplaced.len(), 3);
        }
    }

    #[test]
    fn test_out_of_range_indices_ignored() {
        let items = uniform_items(2, 10.0, 10.0, 10.0, 1.0);
        let d = DecoderKind::Shelf.decode(&items, &[0, 7, 1], None, &ContainerProfile::default());
        assert_eq!(d.placed_count(), 2);
        assert!(d.unplaced.is_empty());
    }

    #[test]
    fn test_is_placeable() {
        let c = ContainerProfile::default();
        assert!(is_placeable(&Item::new("r", 100.0, 120.0, 10.0), &c));
        assert!(!is_placeable(
            &Item::new("r", 100.0, 120.0, 10.0).with_rotation(false),
            &c
        ));
    }

    #[test]
    fn test_mean_fill_ratio_empty() {
        assert_eq!(Decoded::default().mean_fill_ratio(), 0.0);
    }
}
