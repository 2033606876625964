//! dchdigi-geometry: Drift chamber layer database and wire geometry.
//!
//! This crate turns a handful of static detector parameters into the full
//! description of every sense wire of a cylindrical drift chamber with
//! stereo (twisted) layers, and projects hit positions onto those wires.
//!
//! # Key Components
//!
//! - [`DetectorConfig`] - Static parameters, loadable from JSON
//! - [`LayerInfo`] - Per-layer radii, cell counts and stereo angle
//! - [`WireGeometryModel`] - Closed-form wire direction, z=0 point and phi
//! - [`project_onto_wire`] - Hit position to wire-frame coordinates
//! - [`BitFieldCoder`] - Cell identifier decoding
//!
//! All lengths are in centimetres and all angles in radians.

mod cellid;
mod error;
mod layer;
mod projector;
mod wire;

pub use cellid::{BitFieldCoder, CellIdDecoder, DEFAULT_DCH_ENCODING};
pub use error::{Error, Result};
pub use layer::{build_layer_database, LayerInfo};
pub use projector::project_onto_wire;
pub use wire::{WireDescriptor, WireGeometryModel};

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Static drift chamber parameters.
///
/// Lengths in cm, angles in radians.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Detector name.
    pub name: String,
    /// Half length of the gas volume along z.
    pub half_length: f64,
    /// Inner radius of the gas volume.
    pub inner_radius: f64,
    /// Outer radius of the gas volume.
    pub outer_radius: f64,
    /// Sense wire radius of the seed layer (layer 0) at z=0.
    pub first_sense_radius: f64,
    /// Cell height of the seed layer (layer 0).
    pub first_width: f64,
    /// Azimuthal twist of a wire between the two endplates.
    pub twist_angle: f64,
    /// Number of superlayers.
    pub nsuperlayers: u32,
    /// Number of layers in each superlayer.
    pub nlayers_per_superlayer: u32,
    /// Number of cells per layer in the first superlayer.
    pub ncell0: u32,
    /// Additional cells per layer for each following superlayer.
    pub ncell_increment: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::idea_defaults()
    }
}

// Intermediate structs for the nested JSON schema
#[derive(Deserialize)]
struct JsonConfig {
    detector: JsonDetector,
}

#[derive(Deserialize)]
#[serde(default)]
struct JsonDetector {
    name: String,
    dimensions: JsonDimensions,
    cells: JsonCells,
}

impl Default for JsonDetector {
    fn default() -> Self {
        Self {
            name: "DCH_v2".to_string(),
            dimensions: JsonDimensions::default(),
            cells: JsonCells::default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct JsonDimensions {
    half_length_cm: f64,
    inner_radius_cm: f64,
    outer_radius_cm: f64,
    first_sense_radius_cm: f64,
    first_width_cm: f64,
    twist_angle_deg: f64,
}

impl Default for JsonDimensions {
    fn default() -> Self {
        let d = DetectorConfig::idea_defaults();
        Self {
            half_length_cm: d.half_length,
            inner_radius_cm: d.inner_radius,
            outer_radius_cm: d.outer_radius,
            first_sense_radius_cm: d.first_sense_radius,
            first_width_cm: d.first_width,
            twist_angle_deg: d.twist_angle.to_degrees(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct JsonCells {
    nsuperlayers: u32,
    nlayers_per_superlayer: u32,
    ncell0: u32,
    ncell_increment: u32,
}

impl Default for JsonCells {
    fn default() -> Self {
        let d = DetectorConfig::idea_defaults();
        Self {
            nsuperlayers: d.nsuperlayers,
            nlayers_per_superlayer: d.nlayers_per_superlayer,
            ncell0: d.ncell0,
            ncell_increment: d.ncell_increment,
        }
    }
}

impl DetectorConfig {
    /// IDEA drift chamber configuration.
    ///
    /// 14 superlayers of 8 layers, 192 cells per layer in the innermost
    /// superlayer growing by 48 per superlayer, 4 m long with a 30 degree twist.
    #[must_use]
    pub fn idea_defaults() -> Self {
        Self {
            name: "DCH_v2".to_string(),
            half_length: 200.0,
            inner_radius: 35.0,
            outer_radius: 200.0,
            first_sense_radius: 36.0,
            first_width: 1.2,
            twist_angle: PI / 6.0,
            nsuperlayers: 14,
            nlayers_per_superlayer: 8,
            ncell0: 192,
            ncell_increment: 48,
        }
    }

    /// Load configuration from a JSON file.
    ///
    /// Missing fields keep their IDEA default.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let json_config: JsonConfig = serde_json::from_reader(reader)?;
        Self::from_json_config(json_config)
    }

    /// Load configuration from a JSON string.
    ///
    /// # Errors
    /// Returns an error if the string cannot be parsed or fails validation.
    pub fn from_json(json: &str) -> Result<Self> {
        let json_config: JsonConfig = serde_json::from_str(json)?;
        Self::from_json_config(json_config)
    }

    fn from_json_config(config: JsonConfig) -> Result<Self> {
        let detector = config.detector;
        let config = Self {
            name: detector.name,
            half_length: detector.dimensions.half_length_cm,
            inner_radius: detector.dimensions.inner_radius_cm,
            outer_radius: detector.dimensions.outer_radius_cm,
            first_sense_radius: detector.dimensions.first_sense_radius_cm,
            first_width: detector.dimensions.first_width_cm,
            twist_angle: detector.dimensions.twist_angle_deg.to_radians(),
            nsuperlayers: detector.cells.nsuperlayers,
            nlayers_per_superlayer: detector.cells.nlayers_per_superlayer,
            ncell0: detector.cells.ncell0,
            ncell_increment: detector.cells.ncell_increment,
        };

        // Validate once at load time (not per-hit)
        config.validate()?;

        Ok(config)
    }

    /// Checks that every parameter the layer database depends on is usable.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] naming the first offending parameter.
    pub fn validate(&self) -> Result<()> {
        let positive = |value: f64, name: &str| -> Result<()> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(Error::InvalidParameter(format!(
                    "{name} must be positive, got {value}"
                )))
            }
        };
        positive(self.half_length, "half length")?;
        positive(self.inner_radius, "inner radius")?;
        positive(self.outer_radius, "outer radius")?;
        positive(self.first_sense_radius, "first sense radius")?;
        positive(self.first_width, "first width")?;
        positive(self.twist_angle, "twist angle")?;

        if self.twist_angle >= PI {
            return Err(Error::InvalidParameter(format!(
                "twist angle must be below pi, got {}",
                self.twist_angle
            )));
        }
        if self.name.is_empty() {
            return Err(Error::InvalidParameter(
                "detector name must not be empty".to_string(),
            ));
        }
        for (value, name) in [
            (self.nsuperlayers, "nsuperlayers"),
            (self.nlayers_per_superlayer, "nlayers_per_superlayer"),
            (self.ncell0, "ncell0"),
        ] {
            if value == 0 {
                return Err(Error::InvalidParameter(format!("{name} must be positive")));
            }
        }
        if self
            .nsuperlayers
            .checked_mul(self.nlayers_per_superlayer)
            .is_none()
        {
            return Err(Error::InvalidParameter(format!(
                "nsuperlayers * nlayers_per_superlayer overflows ({} * {})",
                self.nsuperlayers, self.nlayers_per_superlayer
            )));
        }
        if self.ncells_in(self.nsuperlayers - 1).is_none() {
            return Err(Error::InvalidParameter(format!(
                "ncell_increment {} overflows the cell count of the outermost superlayer",
                self.ncell_increment
            )));
        }
        if self.first_sense_radius - 0.5 * self.first_width < self.inner_radius {
            return Err(Error::InvalidParameter(format!(
                "first layer (r={}, width={}) extends below the inner radius {}",
                self.first_sense_radius, self.first_width, self.inner_radius
            )));
        }
        Ok(())
    }

    /// Total number of sensitive layers.
    #[must_use]
    pub fn nlayers(&self) -> u32 {
        self.nsuperlayers.saturating_mul(self.nlayers_per_superlayer)
    }

    /// Cells per layer in `superlayer`, `None` on overflow.
    #[must_use]
    pub fn ncells_in(&self, superlayer: u32) -> Option<u32> {
        self.ncell_increment
            .checked_mul(superlayer)?
            .checked_add(self.ncell0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_idea_defaults() {
        let config = DetectorConfig::idea_defaults();
        assert!(config.validate().is_ok());
        assert_eq!(config.nlayers(), 112);
        assert_eq!(config.name, "DCH_v2");
    }

    #[test]
    fn test_json_loading() {
        let json = r#"{
            "detector": {
                "name": "DCH_test",
                "dimensions": {
                    "half_length_cm": 100.0,
                    "inner_radius_cm": 20.0,
                    "outer_radius_cm": 80.0,
                    "first_sense_radius_cm": 21.0,
                    "first_width_cm": 1.0,
                    "twist_angle_deg": 20.0
                },
                "cells": {
                    "nsuperlayers": 4,
                    "nlayers_per_superlayer": 6,
                    "ncell0": 120,
                    "ncell_increment": 24
                }
            }
        }"#;

        let config = DetectorConfig::from_json(json).expect("Failed to parse JSON");

        assert_eq!(config.name, "DCH_test");
        assert_relative_eq!(config.half_length, 100.0);
        assert_relative_eq!(config.twist_angle, 20.0_f64.to_radians());
        assert_eq!(config.nlayers(), 24);
        assert_eq!(config.ncell_increment, 24);
    }

    #[test]
    fn test_json_partial_config() {
        let json = r#"{ "detector": { "cells": { "nsuperlayers": 2 } } }"#;

        let config = DetectorConfig::from_json(json).expect("Should parse partial config");

        assert_eq!(config.nsuperlayers, 2); // Changed
        assert_eq!(config.nlayers_per_superlayer, 8); // Default
        assert_relative_eq!(config.half_length, 200.0); // Default
    }

    #[test]
    fn test_json_empty_detector() {
        let config = DetectorConfig::from_json(r#"{ "detector": {} }"#).expect("Should parse");
        assert_eq!(config, DetectorConfig::idea_defaults());
    }

    #[test]
    fn test_invalid_parameter_rejected() {
        let json = r#"{ "detector": { "dimensions": { "half_length_cm": -1.0 } } }"#;
        let err = DetectorConfig::from_json(json).unwrap_err().to_string();
        assert!(err.contains("half length"), "unexpected error: {err}");

        let json = r#"{ "detector": { "cells": { "ncell0": 0 } } }"#;
        let err = DetectorConfig::from_json(json).unwrap_err().to_string();
        assert!(err.contains("ncell0"), "unexpected error: {err}");
    }

    #[test]
    fn test_overflowing_cell_counts_rejected() {
        let json = r#"{ "detector": { "cells": { "nsuperlayers": 70000, "nlayers_per_superlayer": 70000 } } }"#;
        let err = DetectorConfig::from_json(json).unwrap_err().to_string();
        assert!(err.contains("nlayers_per_superlayer"), "unexpected error: {err}");

        let json = r#"{ "detector": { "cells": { "ncell_increment": 4294967295 } } }"#;
        let err = DetectorConfig::from_json(json).unwrap_err().to_string();
        assert!(err.contains("ncell_increment"), "unexpected error: {err}");

        let mut config = DetectorConfig::idea_defaults();
        config.ncell_increment = u32::MAX;
        assert!(WireGeometryModel::new(config).is_err());
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "detector": {{ "name": "DCH_file" }} }}"#).unwrap();

        let config = DetectorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.name, "DCH_file");
        assert!(DetectorConfig::from_file("/nonexistent/detector.json").is_err());
    }
}
