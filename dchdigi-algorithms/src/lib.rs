//! dchdigi-algorithms: Digitization of simulated drift chamber hits.
//!
//! For every simulated hit the [`Digitizer`]:
//! - decodes the cell identifier and looks up the sense wire
//! - projects the hit onto the wire
//! - smears both wire-frame coordinates with the detector resolution
//! - samples ionization cluster counts and sizes from a calibration
//! - packages the result together with a link to the simulated hit
//!
//! Events are independent; [`Digitizer::process_events`] runs them on the
//! rayon thread pool with one reproducible random stream per event.
//!
#![warn(missing_docs)]

mod assembler;
pub mod calibration;
mod clusters;
mod config;
mod debug;
mod error;
mod processing;
pub mod seed;
mod smearing;

pub use assembler::DigiAssembler;
pub use calibration::{
    BucketIndex, BucketLookup, CalibrationData, ClusterCalibration, EmpiricalCalibration,
    EmpiricalDistribution, MAX_CLUSTER_COUNT,
};
pub use clusters::{incidence_angle, ClusterEstimate, ClusterEstimator};
pub use config::DigitizerConfig;
pub use debug::{DebugHistograms, Histogram1D};
pub use error::{Error, Result};
pub use processing::Digitizer;
pub use seed::{EventRng, SeedGenerator};
pub use smearing::{ResolutionSmearer, SmearedCoordinates};
