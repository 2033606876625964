//! Digitizer configuration.

use crate::{Error, Result};
use dchdigi_core::MM_TO_CM;
use dchdigi_geometry::DEFAULT_DCH_ENCODING;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Options recognized by the digitizer.
///
/// Every field has a default so partial JSON documents are accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigitizerConfig {
    /// Name of the input simulated hit collection.
    pub input_collection: String,
    /// Name of the output digi collection.
    pub output_collection: String,
    /// Drift chamber subdetector name.
    pub detector_name: String,
    /// File with the cluster count and size distributions.
    pub calibration_file: Option<PathBuf>,
    /// Resolution along the sense wire in mm (sigma of the gaussian smearing).
    pub z_resolution_mm: f64,
    /// Resolution perpendicular to the sense wire in mm.
    pub xy_resolution_mm: f64,
    /// Fill debug histograms.
    pub create_debug_histograms: bool,
    /// Output file for the debug histograms.
    pub out_debug_filename: PathBuf,
    /// Geometry service name.
    pub geo_svc_name: String,
    /// Seed service name, mixed into every event seed.
    pub uid_svc_name: String,
    /// Base seed for the per-event random streams.
    pub seed: u64,
    /// Cell identifier field layout.
    pub cell_id_encoding: String,
}

impl Default for DigitizerConfig {
    fn default() -> Self {
        Self {
            input_collection: "DCH_simhits".to_string(),
            output_collection: "DCH_DigiCollection".to_string(),
            detector_name: "DCH_v2".to_string(),
            calibration_file: None,
            z_resolution_mm: 1.0,
            xy_resolution_mm: 0.1,
            create_debug_histograms: false,
            out_debug_filename: PathBuf::from("dch_digi_alg_debug.csv"),
            geo_svc_name: "GeoSvc".to_string(),
            uid_svc_name: "uidSvc".to_string(),
            seed: 0,
            cell_id_encoding: DEFAULT_DCH_ENCODING.to_string(),
        }
    }
}

impl DigitizerConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets both resolutions in mm.
    #[must_use]
    pub fn with_resolutions_mm(mut self, z_mm: f64, xy_mm: f64) -> Self {
        self.z_resolution_mm = z_mm;
        self.xy_resolution_mm = xy_mm;
        self
    }

    /// Sets the calibration file.
    #[must_use]
    pub fn with_calibration_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.calibration_file = Some(path.into());
        self
    }

    /// Sets the base seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enables debug histograms.
    #[must_use]
    pub fn with_debug_histograms(mut self, enabled: bool) -> Self {
        self.create_debug_histograms = enabled;
        self
    }

    /// Resolution along the wire in cm.
    #[must_use]
    pub fn z_resolution_cm(&self) -> f64 {
        self.z_resolution_mm * MM_TO_CM
    }

    /// Resolution perpendicular to the wire in cm.
    #[must_use]
    pub fn xy_resolution_cm(&self) -> f64 {
        self.xy_resolution_mm * MM_TO_CM
    }

    /// Checks the configuration before any event is processed.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] naming the offending option.
    pub fn validate(&self) -> Result<()> {
        for (value, name) in [
            (self.z_resolution_mm, "zResolution_mm"),
            (self.xy_resolution_mm, "xyResolution_mm"),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::ConfigError(format!(
                    "{name} must be a non-negative length, got {value}"
                )));
            }
        }
        for (value, name) in [
            (&self.input_collection, "input collection"),
            (&self.output_collection, "output collection"),
            (&self.detector_name, "DCH_name"),
            (&self.geo_svc_name, "GeoSvcName"),
            (&self.uid_svc_name, "uidSvcName"),
        ] {
            if value.is_empty() {
                return Err(Error::ConfigError(format!("{name} must not be empty")));
            }
        }
        if self.create_debug_histograms && self.out_debug_filename.as_os_str().is_empty() {
            return Err(Error::ConfigError(
                "debug histograms requested without an output file".to_string(),
            ));
        }
        Ok(())
    }

    /// Multi-line summary for the startup log.
    #[must_use]
    pub fn summary(&self) -> String {
        let calibration = self
            .calibration_file
            .as_ref()
            .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());
        format!(
            "DCH digitizer configuration:\n  \
             input collection: {}\n  \
             output collection: {}\n  \
             detector: {}\n  \
             calibration file: {}\n  \
             z resolution: {} mm\n  \
             xy resolution: {} mm\n  \
             debug histograms: {} ({})\n  \
             services: {} / {} (seed {})",
            self.input_collection,
            self.output_collection,
            self.detector_name,
            calibration,
            self.z_resolution_mm,
            self.xy_resolution_mm,
            self.create_debug_histograms,
            self.out_debug_filename.display(),
            self.geo_svc_name,
            self.uid_svc_name,
            self.seed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let config = DigitizerConfig::default();
        assert!(config.validate().is_ok());
        assert_relative_eq!(config.z_resolution_cm(), 0.1);
        assert_relative_eq!(config.xy_resolution_cm(), 0.01);
        assert_eq!(config.detector_name, "DCH_v2");
    }

    #[test]
    fn test_partial_json() {
        let config = DigitizerConfig::from_json(
            r#"{ "z_resolution_mm": 2.0, "calibration_file": "/data/cls.json" }"#,
        )
        .unwrap();
        assert_relative_eq!(config.z_resolution_mm, 2.0);
        assert_relative_eq!(config.xy_resolution_mm, 0.1);
        assert_eq!(config.calibration_file, Some(PathBuf::from("/data/cls.json")));
    }

    #[test]
    fn test_negative_resolution_rejected() {
        let config = DigitizerConfig::new().with_resolutions_mm(-1.0, 0.1);
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("zResolution_mm"), "unexpected error: {err}");

        let config = DigitizerConfig::new().with_resolutions_mm(1.0, f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        let config = DigitizerConfig {
            detector_name: String::new(),
            ..DigitizerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_resolution_allowed() {
        assert!(DigitizerConfig::new()
            .with_resolutions_mm(0.0, 0.0)
            .validate()
            .is_ok());
    }
}
