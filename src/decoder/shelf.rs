//! Shelf decoder: left-to-right rows, front-to-back layers, bottom-to-top.
//!
//! Items are laid along x until the row is full, rows advance along y by
//! the deepest item seen in the row, and layers advance along z by the
//! tallest item seen in the layer. Overlap is impossible by construction,
//! so no pairwise checks are made.

use super::{is_placeable, reject_all, Decoded, PlacementStrategy};
use crate::model::{ContainerProfile, Item, Orientation, Pallet, Placement, GEOMETRY_EPS};

/// Greedy shelf packer.
///
/// Orientation is taken from the hint (or orientation 0) and then adjusted
/// by two heuristics:
///
/// - **strip efficiency**: at the start of a row, use whichever orientation
///   packs more items per unit of row depth (`floor(L / len) / wid`)
/// - **smart fit**: mid-row, rotate an item whose length overflows the
///   remaining row when the alternate orientation fits
#[derive(Debug, Clone, Copy, Default)]
pub struct ShelfDecoder;

/// Cursor state for the open pallet.
#[derive(Debug, Clone, Copy, Default)]
struct Shelf {
    x: f64,
    y: f64,
    z: f64,
    /// Deepest item on the current row.
    row_depth: f64,
    /// Tallest item on the current layer.
    layer_height: f64,
}

impl Shelf {
    fn next_row(&mut self) {
        self.x = 0.0;
        self.y += self.row_depth;
        self.row_depth = 0.0;
    }

    fn next_layer(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
        self.z += self.layer_height;
        self.row_depth = 0.0;
        self.layer_height = 0.0;
    }

    fn advance(&mut self, o: &Orientation) {
        self.x += o.length;
        self.row_depth = self.row_depth.max(o.width);
        self.layer_height = self.layer_height.max(o.height);
    }

    fn at_row_start(&self) -> bool {
        self.x <= GEOMETRY_EPS
    }
}

impl ShelfDecoder {
    /// Picks the orientation for `item` at the current cursor.
    fn orient(item: &Item, hint: usize, shelf: &Shelf, container: &ContainerProfile) -> Orientation {
        let count = item.orientation_count();
        let mut current = hint % count;

        if count > 1 {
            let alt = 1 - current;
            let (cur_o, alt_o) = (item.orientation(current), item.orientation(alt));

            if shelf.at_row_start() {
                let density = |o: &Orientation| {
                    if o.width > 0.0 && o.length > 0.0 {
                        (container.length / o.length).floor() / o.width
                    } else {
                        0.0
                    }
                };
                if density(&alt_o) > density(&cur_o) && alt_o.length <= container.length {
                    current = alt;
                }
            } else {
                let remaining = container.length - shelf.x;
                if cur_o.length > remaining + GEOMETRY_EPS && alt_o.length <= remaining + GEOMETRY_EPS {
                    current = alt;
                }
            }
        }

        let chosen = item.orientation(current);
        if container.fits(&chosen) {
            return chosen;
        }
        item.orientations()
            .into_iter()
            .find(|o| container.fits(o))
            .unwrap_or(chosen)
    }
}

impl PlacementStrategy for ShelfDecoder {
    fn decode(
        &self,
        items: &[Item],
        sequence: &[usize],
        hints: Option<&[usize]>,
        container: &ContainerProfile,
    ) -> Decoded {
        if !container.is_valid() {
            return reject_all(items, sequence);
        }

        let mut out = Decoded::default();
        let mut pallet = Pallet::new(*container);
        let mut shelf = Shelf::default();

        for &idx in sequence {
            let Some(item) = items.get(idx) else {
                continue;
            };
            if !is_placeable(item, container) {
                out.unplaced.push(idx);
                continue;
            }
            let hint = hints.and_then(|h| h.get(idx)).copied().unwrap_or(0);

            if !pallet.can_accept_weight(item.weight) {
                out.pallets.push(std::mem::replace(&mut pallet, Pallet::new(*container)));
                shelf = Shelf::default();
            }

            let mut o = Self::orient(item, hint, &shelf, container);

            if shelf.x + o.length > container.length + GEOMETRY_EPS {
                shelf.next_row();
                // A fresh row gets the strip-efficiency choice.
                o = Self::orient(item, hint, &shelf, container);
            }
            if shelf.y + o.width > container.width + GEOMETRY_EPS {
                shelf.next_layer();
            }
            if shelf.z + o.height > container.height + GEOMETRY_EPS {
                out.pallets.push(std::mem::replace(&mut pallet, Pallet::new(*container)));
                shelf = Shelf::default();
            }

            pallet.push(Placement::new(idx, item, o, shelf.x, shelf.y, shelf.z));
            shelf.advance(&o);
        }

        if !pallet.is_empty() {
            out.pallets.push(pallet);
        }
        out
    }
}
