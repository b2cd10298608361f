//! Maximal-rectangles decoder with guillotine splitting.
//!
//! Each open pallet keeps a list of free boxes, initially the whole pallet.
//! An item goes into the (free box, orientation) pair leaving the least
//! unused volume in that box. The chosen box is then split into up to three
//! children:
//!
//! ```text
//!   right: (x + l, y,     z    )  extent (B.l - l, B.w,     B.h    )
//!   front: (x,     y + w, z    )  extent (l,       B.w - w, B.h    )
//!   top:   (x,     y,     z + h)  extent (l,       w,       B.h - h)
//! ```
//!
//! The top child sits exactly on the item's top face, so every placement
//! is fully supported by the floor or by the item below it.

use super::{is_placeable, reject_all, Decoded, PlacementStrategy};
use crate::model::{ContainerProfile, Item, Orientation, Pallet, Placement, GEOMETRY_EPS};

/// Best-fit decoder over guillotine-split free boxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxRectsDecoder;

/// An empty axis-aligned region of the pallet.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FreeBox {
    x: f64,
    y: f64,
    z: f64,
    length: f64,
    width: f64,
    height: f64,
}

impl FreeBox {
    fn whole(container: &ContainerProfile) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            length: container.length,
            width: container.width,
            height: container.height,
        }
    }

    fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    fn accepts(&self, o: &Orientation) -> bool {
        o.length <= self.length + GEOMETRY_EPS
            && o.width <= self.width + GEOMETRY_EPS
            && o.height <= self.height + GEOMETRY_EPS
    }

    fn is_degenerate(&self) -> bool {
        self.length <= GEOMETRY_EPS || self.width <= GEOMETRY_EPS || self.height <= GEOMETRY_EPS
    }

    fn contains(&self, other: &FreeBox) -> bool {
        other.x >= self.x - GEOMETRY_EPS
            && other.y >= self.y - GEOMETRY_EPS
            && other.z >= self.z - GEOMETRY_EPS
            && other.x + other.length <= self.x + self.length + GEOMETRY_EPS
            && other.y + other.width <= self.y + self.width + GEOMETRY_EPS
            && other.z + other.height <= self.z + self.height + GEOMETRY_EPS
    }

    /// Guillotine children after placing `o` at this box's origin.
    fn split(&self, o: &Orientation) -> [FreeBox; 3] {
        [
            FreeBox {
                x: self.x + o.length,
                length: self.length - o.length,
                ..*self
            },
            FreeBox {
                y: self.y + o.width,
                length: o.length,
                width: self.width - o.width,
                ..*self
            },
            FreeBox {
                z: self.z + o.height,
                length: o.length,
                width: o.width,
                height: self.height - o.height,
                ..*self
            },
        ]
    }
}

/// The pallet being filled plus its free space.
struct OpenPallet {
    pallet: Pallet,
    free: Vec<FreeBox>,
}

impl OpenPallet {
    fn new(container: &ContainerProfile) -> Self {
        Self {
            pallet: Pallet::new(*container),
            free: vec![FreeBox::whole(container)],
        }
    }

    /// Best (free box index, orientation index) among `candidates`.
    fn best_fit(&self, item: &Item, candidates: &[usize]) -> Option<(usize, usize)> {
        let mut best: Option<(f64, usize, usize)> = None;
        for (bi, b) in self.free.iter().enumerate() {
            for &oi in candidates {
                let o = item.orientation(oi);
                if !b.accepts(&o) {
                    continue;
                }
                let waste = b.volume() - o.volume();
                let better = match best {
                    None => true,
                    Some((best_waste, best_bi, best_oi)) => {
                        if (waste - best_waste).abs() > GEOMETRY_EPS {
                            waste < best_waste
                        } else {
                            position_key(b, oi) < position_key(&self.free[best_bi], best_oi)
                        }
                    }
                };
                if better {
                    best = Some((waste, bi, oi));
                }
            }
        }
        best.map(|(_, bi, oi)| (bi, oi))
    }

    /// Hinted orientation first, then the full orientation set.
    fn find_slot(&self, item: &Item, hint: Option<usize>) -> Option<(usize, usize)> {
        let all: Vec<usize> = (0..item.orientation_count()).collect();
        match hint {
            Some(h) => self
                .best_fit(item, &[h % item.orientation_count()])
                .or_else(|| self.best_fit(item, &all)),
            None => self.best_fit(item, &all),
        }
    }

    fn place(&mut self, idx: usize, item: &Item, box_idx: usize, orientation: usize) {
        let b = self.free.swap_remove(box_idx);
        let o = item.orientation(orientation);
        self.pallet.push(Placement::new(idx, item, o, b.x, b.y, b.z));
        self.free
            .extend(b.split(&o).into_iter().filter(|c| !c.is_degenerate()));
        self.prune();
    }

    /// Drops boxes fully contained in another box.
    fn prune(&mut self) {
        let boxes = std::mem::take(&mut self.free);
        let mut kept: Vec<FreeBox> = Vec::with_capacity(boxes.len());
        for (i, b) in boxes.iter().enumerate() {
            let dominated = boxes.iter().enumerate().any(|(j, other)| {
                // Of two identical boxes keep the first.
                i != j && other.contains(b) && (!b.contains(other) || j < i)
            });
            if !dominated {
                kept.push(*b);
            }
        }
        kept.sort_by(|a, b| {
            position_key(a, 0)
                .partial_cmp(&position_key(b, 0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        self.free = kept;
    }
}

/// Lowest z, then y, then x, then orientation index.
fn position_key(b: &FreeBox, orientation: usize) -> (f64, f64, f64, usize) {
    (b.z, b.y, b.x, orientation)
}

impl PlacementStrategy for MaxRectsDecoder {
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
        let mut open = OpenPallet::new(container);

        for &idx in sequence {
            let Some(item) = items.get(idx) else {
                continue;
            };
            if !is_placeable(item, container) {
                out.unplaced.push(idx);
                continue;
            }
            let hint = hints.and_then(|h| h.get(idx)).copied();

            let slot = if open.pallet.can_accept_weight(item.weight) {
                open.find_slot(item, hint)
            } else {
                None
            };
            let slot = match slot {
                Some(s) => s,
                None => {
                    let full = std::mem::replace(&mut open, OpenPallet::new(container));
                    if !full.pallet.is_empty() {
                        out.pallets.push(full.pallet);
                    }
                    match open.find_slot(item, hint) {
                        Some(s) => s,
                        // An empty pallet always takes a placeable item.
                        None => {
                            out.unplaced.push(idx);
                            continue;
                        }
                    }
                }
            };
            open.place(idx, item, slot.0, slot.1);
        }

        if !open.pallet.is_empty() {
            out.pallets.push(open.pallet);
        }
        out
    }
}
