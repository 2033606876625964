//! Calibration file loading.

use crate::{Error, Result};
use dchdigi_algorithms::EmpiricalCalibration;
use std::path::Path;

/// Loads a cluster calibration table from a JSON file.
///
/// # Errors
/// Returns [`Error::MissingFile`] if the file does not exist and a core
/// calibration error if its content is invalid.
pub fn load_calibration<P: AsRef<Path>>(path: P) -> Result<EmpiricalCalibration> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::MissingFile(path.to_path_buf()));
    }
    let json = std::fs::read_to_string(path)?;
    let calibration = EmpiricalCalibration::from_json(&json)?;

    let (min, max) = calibration.path_range();
    log::info!(
        "loaded calibration {}: {} path bins in [{min}, {max}) cm, {} angle bins",
        path.display(),
        calibration.path_bins(),
        calibration.angle_bins()
    );
    Ok(calibration)
}
