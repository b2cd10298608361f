//! Placements and decoded pallets.

use super::container::ContainerProfile;
use super::item::{Item, Orientation};
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance for coordinate comparisons.
pub const GEOMETRY_EPS: f64 = 1e-6;

/// A point in pallet coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point3 {
    /// x coordinate.
    pub x: f64,
    /// y coordinate.
    pub y: f64,
    /// z coordinate.
    pub z: f64,
}

/// One item placed at a position in a chosen orientation.
///
/// `(x, y, z)` is the item's minimum corner. A valid placement satisfies
/// `x + length <= L`, `y + width <= W` and `z + height <= H` for its pallet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    /// Index of the item in the slice the decoder was given.
    pub item: usize,
    /// Minimum x.
    pub x: f64,
    /// Minimum y.
    pub y: f64,
    /// Minimum z.
    pub z: f64,
    /// Oriented extent along x.
    pub length: f64,
    /// Oriented extent along y.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
    /// Weight of the placed item.
    pub weight: f64,
}

impl Placement {
    /// Places `item` (with index `index`) at `(x, y, z)` in orientation `o`.
    pub fn new(index: usize, item: &Item, o: Orientation, x: f64, y: f64, z: f64) -> Self {
        Self {
            item: index,
            x,
            y,
            z,
            length: o.length,
            width: o.width,
            height: o.height,
            weight: item.weight,
        }
    }

    /// Maximum x.
    pub fn max_x(&self) -> f64 {
        self.x + self.length
    }

    /// Maximum y.
    pub fn max_y(&self) -> f64 {
        self.y + self.width
    }

    /// Maximum z (top face).
    pub fn max_z(&self) -> f64 {
        self.z + self.height
    }

    /// Volume of the placed box.
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Centre of the placed box.
    pub fn center(&self) -> Point3 {
        Point3 {
            x: self.x + self.length / 2.0,
            y: self.y + self.width / 2.0,
            z: self.z + self.height / 2.0,
        }
    }

    /// Whether the two footprints share a positive area in the xy plane.
    pub fn footprint_overlaps(&self, other: &Placement) -> bool {
        self.x < other.max_x() - GEOMETRY_EPS
            && other.x < self.max_x() - GEOMETRY_EPS
            && self.y < other.max_y() - GEOMETRY_EPS
            && other.y < self.max_y() - GEOMETRY_EPS
    }

    /// Whether the two boxes intersect with positive volume.
    pub fn overlaps(&self, other: &Placement) -> bool {
        self.footprint_overlaps(other)
            && self.z < other.max_z() - GEOMETRY_EPS
            && other.z < self.max_z() - GEOMETRY_EPS
    }

    /// Whether this box rests directly on top of `below`.
    pub fn rests_on(&self, below: &Placement, tolerance: f64) -> bool {
        (self.z - below.max_z()).abs() <= tolerance && self.footprint_overlaps(below)
    }

    /// Whether the box lies inside the container bounds.
    pub fn is_within(&self, container: &ContainerProfile) -> bool {
        self.x >= -GEOMETRY_EPS
            && self.y >= -GEOMETRY_EPS
            && self.z >= -GEOMETRY_EPS
            && self.max_x() <= container.length + GEOMETRY_EPS
            && self.max_y() <= container.width + GEOMETRY_EPS
            && self.max_z() <= container.height + GEOMETRY_EPS
    }
}

/// How a pallet was formed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PalletKind {
    /// A pure pallet built by the tiling solver for one product family.
    Dedicated {
        /// The family's product code.
        product_code: String,
    },
    /// A pallet produced by a decoder from the mixed pool.
    Mixed,
}

/// A decoded pallet: placements sharing one container profile.
///
/// Weight and volume totals are kept up to date by [`push`](Self::push).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pallet {
    /// The container this pallet is built on.
    pub container: ContainerProfile,
    /// Placements in decode order.
    pub placements: Vec<Placement>,
    /// How the pallet was formed.
    pub kind: PalletKind,
    total_weight: f64,
    total_volume: f64,
}

impl Pallet {
    /// An empty mixed pallet.
    pub fn new(container: ContainerProfile) -> Self {
        Self {
            container,
            placements: Vec::new(),
            kind: PalletKind::Mixed,
            total_weight: 0.0,
            total_volume: 0.0,
        }
    }

    /// An empty dedicated pallet for `product_code`.
    pub fn dedicated(container: ContainerProfile, product_code: impl Into<String>) -> Self {
        Self {
            kind: PalletKind::Dedicated {
                product_code: product_code.into(),
            },
            ..Self::new(container)
        }
    }

    /// Appends a placement and updates the running totals.
    pub fn push(&mut self, placement: Placement) {
        self.total_weight += placement.weight;
        self.total_volume += placement.volume();
        self.placements.push(placement);
    }

    /// Whether no item has been placed.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Number of placed items.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Sum of placed weights.
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Sum of placed volumes.
    pub fn total_volume(&self) -> f64 {
        self.total_volume
    }

    /// Placed volume over container volume.
    pub fn fill_ratio(&self) -> f64 {
        let v = self.container.volume();
        if v > 0.0 {
            self.total_volume / v
        } else {
            0.0
        }
    }

    /// Whether adding `weight` keeps the pallet within its payload limit.
    pub fn can_accept_weight(&self, weight: f64) -> bool {
        self.total_weight + weight <= self.container.max_weight + GEOMETRY_EPS
    }

    /// Weight-weighted centroid of the placed boxes.
    ///
    /// Falls back to the volume-weighted centroid when every item is
    /// weightless; `None` for an empty pallet.
    pub fn center_of_gravity(&self) -> Option<Point3> {
        if self.placements.is_empty() {
            return None;
        }
        let use_weight = self.total_weight > 0.0;
        let mut sum = Point3 {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        };
        let mut total = 0.0;
        for p in &self.placements {
            let m = if use_weight { p.weight } else { p.volume() };
            let c = p.center();
            sum.x += c.x * m;
            sum.y += c.y * m;
            sum.z += c.z * m;
            total += m;
        }
        if total <= 0.0 {
            return None;
        }
        Some(Point3 {
            x: sum.x / total,
            y: sum.y / total,
            z: sum.z / total,
        })
    }

    /// Horizontal distance between the centre of gravity and the floor centre.
    pub fn cog_offset(&self) -> f64 {
        match self.center_of_gravity() {
            Some(cog) => {
                let (cx, cy) = self.container.center_xy();
                (cog.x - cx).hypot(cog.y - cy)
            }
            None => 0.0,
        }
    }

    /// Share of the most frequent product code among placed items.
    ///
    /// `items` is the slice the placements index into.
    pub fn purity(&self, items: &[Item]) -> f64 {
        if self.placements.is_empty() {
            return 0.0;
        }
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for p in &self.placements {
            if let Some(item) = items.get(p.item) {
                *counts.entry(item.product_code.as_str()).or_insert(0) += 1;
            }
        }
        let top = counts.values().copied().max().unwrap_or(0);
        top as f64 / self.placements.len() as f64
    }
}
