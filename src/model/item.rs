//! Items and their yaw-only orientations.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Extents of an item in one allowed orientation.
///
/// `length` runs along the container's x axis, `width` along y and
/// `height` along z.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Orientation {
    /// Extent along x.
    pub length: f64,
    /// Extent along y.
    pub width: f64,
    /// Extent along z.
    pub height: f64,
}

impl Orientation {
    /// Creates an orientation from its three extents.
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    /// Volume of the oriented box.
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }
}

/// One physical unit to be packed.
///
/// Items are immutable once built. Only rotation about the vertical axis is
/// ever allowed: an item never tips onto a side face, so its height is fixed.
///
/// # Examples
///
/// ```
/// use u_palletize::model::Item;
///
/// let item = Item::new("box-1", 40.0, 30.0, 20.0)
///     .with_product_code("SKU-7")
///     .with_weight(12.5)
///     .with_rotation(true);
///
/// assert_eq!(item.orientations().len(), 2);
/// assert!((item.volume() - 24_000.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Item {
    /// Unique identifier of the unit.
    pub id: String,
    /// Product code, used for family grouping and purity scoring.
    pub product_code: String,
    /// Extent along x in the reference orientation.
    pub length: f64,
    /// Extent along y in the reference orientation.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
    /// Weight of the unit.
    pub weight: f64,
    /// Maximum load this item can carry on its top face.
    pub strength: Option<f64>,
    /// Whether the 90° yaw rotation is allowed.
    pub rotatable: bool,
}

impl Item {
    /// Creates a weightless, rotatable item whose product code equals its id.
    pub fn new(id: impl Into<String>, length: f64, width: f64, height: f64) -> Self {
        let id = id.into();
        Self {
            product_code: id.clone(),
            id,
            length,
            width,
            height,
            weight: 0.0,
            strength: None,
            rotatable: true,
        }
    }

    /// Sets the product code.
    pub fn with_product_code(mut self, code: impl Into<String>) -> Self {
        self.product_code = code.into();
        self
    }

    /// Sets the weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the maximum supportable load.
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength);
        self
    }

    /// Allows or forbids the yaw rotation.
    pub fn with_rotation(mut self, rotatable: bool) -> Self {
        self.rotatable = rotatable;
        self
    }

    /// Volume of the item.
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Area of the reference footprint.
    pub fn footprint_area(&self) -> f64 {
        self.length * self.width
    }

    /// Allowed orientations: `(L, W, H)` and, if rotatable, `(W, L, H)`.
    pub fn orientations(&self) -> Vec<Orientation> {
        let upright = Orientation::new(self.length, self.width, self.height);
        if self.rotatable {
            vec![upright, Orientation::new(self.width, self.length, self.height)]
        } else {
            vec![upright]
        }
    }

    /// Number of allowed orientations (1 or 2).
    pub fn orientation_count(&self) -> usize {
        if self.rotatable {
            2
        } else {
            1
        }
    }

    /// Orientation at `index`, wrapping out-of-range indices.
    pub fn orientation(&self, index: usize) -> Orientation {
        if self.rotatable && index % 2 == 1 {
            Orientation::new(self.width, self.length, self.height)
        } else {
            Orientation::new(self.length, self.width, self.height)
        }
    }

    /// Checks that dimensions and weight are finite and sensible.
    pub fn validate(&self) -> Result<()> {
        let dims = [self.length, self.width, self.height];
        if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(Error::InvalidItem {
                id: self.id.clone(),
                reason: format!(
                    "dimensions must be positive, got {}x{}x{}",
                    self.length, self.width, self.height
                ),
            });
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(Error::InvalidItem {
                id: self.id.clone(),
                reason: format!("weight must be non-negative, got {}", self.weight),
            });
        }
        if let Some(s) = self.strength {
            if !s.is_finite() || s < 0.0 {
                return Err(Error::InvalidItem {
                    id: self.id.clone(),
                    reason: format!("strength must be non-negative, got {s}"),
                });
            }
        }
        Ok(())
    }
}
