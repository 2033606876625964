//! dchdigi-core: Core types for drift chamber hit digitization.
//!
//! This crate provides the plain data shared by the geometry, algorithm
//! and I/O crates: simulated hits, decoded cell addresses, wire-frame
//! coordinates and the digitized output records.
//!

pub mod digi;
pub mod error;
pub mod event;
pub mod hit;
pub mod units;
pub mod vector;

pub use digi::{AssociationLink, DigiCollection, DigitizedHit, WireFrameCoordinates};
pub use error::{Error, Result};
pub use event::{EventHeader, SimEvent};
pub use hit::{CellAddress, RawHit};
pub use units::{CM_TO_MM, MM_TO_CM};
pub use vector::Vec3;
