//! dchdigi-io: File I/O for drift chamber digitization.
//!
//! This crate reads simulated events and cluster calibrations from JSON
//! and writes digitized events as CSV, JSON or little-endian binary.
//!

mod calibration;
mod error;
mod histograms;
mod reader;
mod writer;

pub use calibration::load_calibration;
pub use error::{Error, Result};
pub use histograms::write_debug_histograms;
pub use reader::{EventFileReader, EventSummary};
pub use writer::{DigiFileWriter, OutputFormat, BINARY_MAGIC, BINARY_VERSION};
