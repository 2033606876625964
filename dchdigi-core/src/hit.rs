//! Simulated hit input and decoded cell addresses.

use crate::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A simulated ("true") hit in a drift chamber cell.
///
/// Lengths are in millimetres, as delivered by the simulation. The record is
/// never modified by the digitizer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawHit {
    /// Opaque bit-packed cell identifier.
    pub cell_id: u64,
    /// Hit position in mm.
    pub position: Vec3,
    /// Particle momentum at the hit in GeV.
    pub momentum: Vec3,
    /// Energy deposited in the gas in GeV.
    pub edep: f64,
    /// Path length through the sensitive volume in mm.
    pub path_length: f64,
    /// Hit time in ns.
    pub time: f64,
    /// Mass of the particle that produced the hit in GeV.
    #[cfg_attr(feature = "serde", serde(default = "default_mass"))]
    pub mass: f64,
}

#[cfg(feature = "serde")]
fn default_mass() -> f64 {
    RawHit::PION_MASS
}

impl RawHit {
    /// Charged pion mass in GeV, used when the producing particle is unknown.
    pub const PION_MASS: f64 = 0.139_570_39;

    /// Creates a hit from a charged pion with the given kinematics.
    #[must_use]
    pub fn new(cell_id: u64, position: Vec3, momentum: Vec3, edep: f64, path_length: f64) -> Self {
        Self {
            cell_id,
            position,
            momentum,
            edep,
            path_length,
            time: 0.0,
            mass: Self::PION_MASS,
        }
    }

    /// Sets the hit time.
    #[must_use]
    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    /// Sets the particle mass.
    #[must_use]
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }
}

/// Decoded position of a cell in the chamber's wire hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellAddress {
    /// Layer index inside its superlayer (0-based).
    pub local_layer: u32,
    /// Superlayer index (0-based).
    pub superlayer: u32,
    /// Cell index in phi (0-based).
    pub nphi: u32,
}

impl CellAddress {
    /// Creates a new cell address.
    #[inline]
    #[must_use]
    pub fn new(local_layer: u32, superlayer: u32, nphi: u32) -> Self {
        Self {
            local_layer,
            superlayer,
            nphi,
        }
    }

    /// Global 1-based layer number.
    ///
    /// `layer = local_layer + layers_per_superlayer * superlayer + 1`
    #[inline]
    #[must_use]
    pub fn layer(&self, layers_per_superlayer: u32) -> u32 {
        self.local_layer + layers_per_superlayer * self.superlayer + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_numbering_is_one_based() {
        assert_eq!(CellAddress::new(0, 0, 0).layer(8), 1);
        assert_eq!(CellAddress::new(7, 0, 3).layer(8), 8);
        assert_eq!(CellAddress::new(0, 1, 3).layer(8), 9);
        assert_eq!(CellAddress::new(3, 13, 3).layer(8), 108);
    }

    #[test]
    fn test_raw_hit_builder() {
        let hit = RawHit::new(42, Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, 1e-6, 10.0)
            .with_time(5.0)
            .with_mass(0.0);
        assert_eq!(hit.cell_id, 42);
        assert!((hit.time - 5.0).abs() < f64::EPSILON);
        assert!(hit.mass.abs() < f64::EPSILON);
    }
}
