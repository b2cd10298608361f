//! Best items-per-layer for one footprint on one pallet floor.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction in which bands are stacked on the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BandAxis {
    /// Rows run along x and are stacked along y.
    #[default]
    Rows,
    /// Columns run along y and are stacked along x.
    Columns,
}

/// A run of identical lines of items in one orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Band {
    /// Item extent along x.
    pub length: f64,
    /// Item extent along y.
    pub width: f64,
    /// Whether the item is yawed 90° relative to its reference footprint.
    pub rotated: bool,
    /// Number of lines in the band.
    pub lines: usize,
    /// Items in each line.
    pub per_line: usize,
}

impl Band {
    /// Items in the band.
    pub fn count(&self) -> usize {
        self.lines * self.per_line
    }

    /// Extent of one line across the stacking axis.
    fn line_depth(&self, axis: BandAxis) -> f64 {
        match axis {
            BandAxis::Rows => self.width,
            BandAxis::Columns => self.length,
        }
    }

    /// Step between items within a line.
    fn item_step(&self, axis: BandAxis) -> f64 {
        match axis {
            BandAxis::Rows => self.length,
            BandAxis::Columns => self.width,
        }
    }
}

/// The winning floor pattern.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayerLayout {
    /// Items per layer.
    pub count: usize,
    /// Stacking direction of the bands.
    pub axis: BandAxis,
    /// Bands in placement order (empty bands omitted).
    pub bands: Vec<Band>,
}

/// One floor position of a layer template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Minimum x.
    pub x: f64,
    /// Minimum y.
    pub y: f64,
    /// Item extent along x.
    pub length: f64,
    /// Item extent along y.
    pub width: f64,
}

impl LayerLayout {
    fn from_bands(axis: BandAxis, bands: Vec<Band>) -> Self {
        let bands: Vec<Band> = bands.into_iter().filter(|b| b.count() > 0).collect();
        Self {
            count: bands.iter().map(Band::count).sum(),
            axis,
            bands,
        }
    }

    /// Floor positions of one layer, band by band, line by line.
    pub fn slots(&self) -> Vec<Slot> {
        let mut slots = Vec::with_capacity(self.count);
        let mut offset = 0.0;
        for band in &self.bands {
            for _ in 0..band.lines {
                for k in 0..band.per_line {
                    let along = k as f64 * band.item_step(self.axis);
                    let (x, y) = match self.axis {
                        BandAxis::Rows => (along, offset),
                        BandAxis::Columns => (offset, along),
                    };
                    slots.push(Slot {
                        x,
                        y,
                        length: band.length,
                        width: band.width,
                    });
                }
                offset += band.line_depth(self.axis);
            }
        }
        slots
    }
}

fn fits(space: f64, size: f64) -> usize {
    if size <= 0.0 || space <= 0.0 {
        return 0;
    }
    // Absorb 119.99999 / 40 style rounding.
    ((space + 1e-9) / size).floor() as usize
}

/// Search along one axis. `span` is the extent lines run along, `depth`
/// the extent bands are stacked along; `a` and `b` are the item
/// (along-line, across-line) extents in each orientation.
fn search(axis: BandAxis, span: f64, depth: f64, a: (f64, f64), b: (f64, f64)) -> LayerLayout {
    let band = |ext: (f64, f64), rotated: bool, lines: usize| {
        let (along, across) = ext;
        let (length, width) = match axis {
            BandAxis::Rows => (along, across),
            BandAxis::Columns => (across, along),
        };
        Band {
            length,
            width,
            rotated,
            lines,
            per_line: fits(span, along),
        }
    };

    let max_a = fits(depth, a.1);
    let max_b = fits(depth, b.1);

    let mut candidates = vec![
        vec![band(a, false, max_a)],
        vec![band(b, true, max_b)],
    ];
    for i in 0..=max_a {
        let rest = depth - i as f64 * a.1;
        candidates.push(vec![band(a, false, i), band(b, true, fits(rest, b.1))]);
    }
    for i in 0..=max_b {
        let rest = depth - i as f64 * b.1;
        candidates.push(vec![band(b, true, i), band(a, false, fits(rest, a.1))]);
    }

    let mut best = LayerLayout {
        axis,
        ..LayerLayout::default()
    };
    for bands in candidates {
        let layout = LayerLayout::from_bands(axis, bands);
        if layout.count > best.count {
            best = layout;
        }
    }
    best
}

/// Maximum items per layer for footprint `(l, w)` on floor `(pallet_l, pallet_w)`,
/// with the 90° yaw allowed.
///
/// Strategies are evaluated in a fixed order and only a strictly greater
/// count replaces the incumbent:
///
/// 1. pure orientation A `(l, w)` rows
/// 2. pure orientation B `(w, l)` rows
/// 3. `i` rows of A then as many B rows as fit, ascending `i`
/// 4. `i` rows of B then as many A rows as fit, ascending `i`
/// 5. the same four patterns with column bands stacked along x
///
/// # Examples
///
/// ```
/// use u_palletize::tiling::solve_layer;
///
/// let layout = solve_layer(120.0, 100.0, 40.0, 50.0);
/// assert_eq!(layout.count, 6);
/// ```
pub fn solve_layer(pallet_l: f64, pallet_w: f64, l: f64, w: f64) -> LayerLayout {
    let rows = search(BandAxis::Rows, pallet_l, pallet_w, (l, w), (w, l));
    let columns = search(BandAxis::Columns, pallet_w, pallet_l, (w, l), (l, w));
    if columns.count > rows.count {
        columns
    } else {
        rows
    }
}

/// Items per layer when the footprint may not be rotated: pure orientation A.
pub fn solve_layer_fixed(pallet_l: f64, pallet_w: f64, l: f64, w: f64) -> LayerLayout {
    LayerLayout::from_bands(
        BandAxis::Rows,
        vec![Band {
            length: l,
            width: w,
            rotated: false,
            lines: fits(pallet_w, w),
            per_line: fits(pallet_l, l),
        }],
    )
}
