//! Container (pallet) profile.

use super::item::Orientation;
use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dimensions and payload limit of one pallet.
///
/// Supplied by the caller and constant for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContainerProfile {
    /// Extent along x.
    pub length: f64,
    /// Extent along y.
    pub width: f64,
    /// Maximum stacking height.
    pub height: f64,
    /// Maximum total payload weight.
    pub max_weight: f64,
}

impl Default for ContainerProfile {
    /// A 120×100 cm EUR pallet loaded to 180 cm and 1250 kg.
    fn default() -> Self {
        Self::new(120.0, 100.0, 180.0, 1250.0)
    }
}

impl ContainerProfile {
    /// Creates a container profile.
    pub fn new(length: f64, width: f64, height: f64, max_weight: f64) -> Self {
        Self {
            length,
            width,
            height,
            max_weight,
        }
    }

    /// Usable volume.
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Floor area.
    pub fn floor_area(&self) -> f64 {
        self.length * self.width
    }

    /// Geometric centre of the floor.
    pub fn center_xy(&self) -> (f64, f64) {
        (self.length / 2.0, self.width / 2.0)
    }

    /// Whether all dimensions and the weight limit are positive and finite.
    pub fn is_valid(&self) -> bool {
        [self.length, self.width, self.height, self.max_weight]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }

    /// Like [`is_valid`](Self::is_valid) but with a descriptive error.
    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::InvalidContainer(format!(
                "dimensions and max weight must be positive, got {}x{}x{} / {}",
                self.length, self.width, self.height, self.max_weight
            )))
        }
    }

    /// Whether an oriented box fits inside an empty container.
    pub fn fits(&self, o: &Orientation) -> bool {
        o.length <= self.length && o.width <= self.width && o.height <= self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_eur_pallet() {
        let c = ContainerProfile::default();
        assert_eq!(c.length, 120.0);
        assert_eq!(c.max_weight, 1250.0);
        assert!((c.volume() - 2_160_000.0).abs() < 1e-6);
        assert_eq!(c.center_xy(), (60.0, 50.0));
    }

    #[test]
    fn test_validity() {
        assert!(ContainerProfile::default().is_valid());
        assert!(!ContainerProfile::new(0.0, 100.0, 180.0, 1250.0).is_valid());
        assert!(!ContainerProfile::new(120.0, -1.0, 180.0, 1250.0).is_valid());
        assert!(ContainerProfile::new(120.0, 100.0, f64::INFINITY, 1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_fits() {
        let c = ContainerProfile::default();
        assert!(c.fits(&Orientation::new(120.0, 100.0, 180.0)));
        assert!(!c.fits(&Orientation::new(100.0, 120.0, 10.0)));
    }
}
