//! Gaussian position smearing in the wire frame.

use crate::{Error, Result};
use dchdigi_core::MM_TO_CM;
use rand::RngCore;
use rand_distr::{Distribution, Normal};

/// Wire-frame coordinates after smearing (cm).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmearedCoordinates {
    /// Observed distance along the wire.
    pub along_wire: f64,
    /// Observed distance to the wire.
    pub distance: f64,
    /// Applied shift along the wire.
    pub delta_along: f64,
    /// Applied shift of the distance to the wire.
    pub delta_distance: f64,
}

/// Independent zero-mean gaussian smearing of both wire-frame coordinates.
///
/// The along-wire coordinate comes from timing at both wire ends and is much
/// coarser than the drift distance. Exactly two draws are taken per hit,
/// along-wire first, even when a sigma is zero, so the stream position does
/// not depend on the configured resolutions.
#[derive(Clone, Copy, Debug)]
pub struct ResolutionSmearer {
    along: Normal<f64>,
    perpendicular: Normal<f64>,
}

impl ResolutionSmearer {
    /// Creates a smearer from sigmas in cm.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] if a sigma is negative or not finite.
    pub fn new(along_sigma_cm: f64, perpendicular_sigma_cm: f64) -> Result<Self> {
        let normal = |sigma: f64, name: &str| {
            if !sigma.is_finite() {
                return Err(Error::ConfigError(format!("{name} sigma is {sigma}")));
            }
            Normal::new(0.0, sigma)
                .map_err(|e| Error::ConfigError(format!("{name} sigma {sigma}: {e}")))
        };
        Ok(Self {
            along: normal(along_sigma_cm, "along-wire")?,
            perpendicular: normal(perpendicular_sigma_cm, "perpendicular")?,
        })
    }

    /// Creates a smearer from sigmas in mm.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] if a sigma is negative or not finite.
    pub fn from_mm(along_sigma_mm: f64, perpendicular_sigma_mm: f64) -> Result<Self> {
        Self::new(along_sigma_mm * MM_TO_CM, perpendicular_sigma_mm * MM_TO_CM)
    }

    /// Along-wire sigma in cm.
    #[must_use]
    pub fn along_sigma(&self) -> f64 {
        self.along.std_dev()
    }

    /// Perpendicular sigma in cm.
    #[must_use]
    pub fn perpendicular_sigma(&self) -> f64 {
        self.perpendicular.std_dev()
    }

    /// Smears one hit.
    ///
    /// The shifted distance is not folded back: a negative result is kept
    /// as is, so the sign convention of the unsmeared distance is preserved.
    pub fn smear(&self, along_wire: f64, distance: f64, rng: &mut dyn RngCore) -> SmearedCoordinates {
        let delta_along = self.along.sample(rng);
        let delta_distance = self.perpendicular.sample(rng);
        SmearedCoordinates {
            along_wire: along_wire + delta_along,
            distance: distance + delta_distance,
            delta_along,
            delta_distance,
        }
    }
}
