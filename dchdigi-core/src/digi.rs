//! Digitized output records.
//!
//! A [`DigiCollection`] stores the digitized hits of one event together with
//! the association links back to the simulated hits. Both vectors grow in
//! lockstep, so the nth link always describes the nth digi.

use crate::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Position of a hit expressed relative to its sense wire (lengths in cm).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WireFrameCoordinates {
    /// Signed distance along the wire from its z=0 reference point.
    pub along_wire: f64,
    /// Distance from the hit to the wire (always >= 0).
    pub distance: f64,
    /// Point on the wire closest to the hit.
    pub closest_point: Vec3,
    /// Vector from the hit to the closest point on the wire.
    pub hit_to_wire: Vec3,
}

/// Digitized drift chamber hit.
///
/// Lengths are in millimetres, matching the input collection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DigitizedHit {
    /// Cell identifier copied from the simulated hit.
    pub cell_id: u64,
    /// Point on the wire at the smeared along-wire coordinate.
    pub position: Vec3,
    /// Smeared distance along the wire from its z=0 point.
    pub along_wire: f64,
    /// Smeared distance to the wire.
    pub distance_to_wire: f64,
    /// Distance along the wire before smearing.
    pub along_wire_true: f64,
    /// Distance to the wire before smearing.
    pub distance_to_wire_true: f64,
    /// Hit time in ns.
    pub time: f64,
    /// Energy deposit in GeV.
    pub edep: f64,
    /// Number of ionization clusters.
    pub n_clusters: u32,
    /// Number of electrons in each cluster, in sampling order.
    pub cluster_sizes: Vec<u32>,
    /// Index of the originating hit in the input collection.
    pub sim_hit_index: usize,
}

impl DigitizedHit {
    /// Total number of ionization electrons over all clusters.
    #[must_use]
    pub fn total_electrons(&self) -> u64 {
        self.cluster_sizes.iter().map(|&s| u64::from(s)).sum()
    }
}

/// Link between a digitized hit and the simulated hit it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssociationLink {
    /// Index in the digi collection.
    pub digi_index: usize,
    /// Index in the simulated hit collection.
    pub sim_hit_index: usize,
}

/// Output collections for one event.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DigiCollection {
    /// Digitized hits, in input order.
    pub digis: Vec<DigitizedHit>,
    /// One association per digitized hit.
    pub links: Vec<AssociationLink>,
}

impl DigiCollection {
    /// Creates an empty collection with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            digis: Vec::with_capacity(capacity),
            links: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of digitized hits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.digis.len()
    }

    /// Returns true if the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digis.is_empty()
    }

    /// Appends a digi and its association link.
    pub fn push(&mut self, digi: DigitizedHit, link: AssociationLink) {
        debug_assert_eq!(link.digi_index, self.digis.len());
        self.digis.push(digi);
        self.links.push(link);
    }

    /// Returns an iterator over digis paired with their links.
    pub fn iter(&self) -> impl Iterator<Item = (&DigitizedHit, &AssociationLink)> {
        self.digis.iter().zip(self.links.iter())
    }
}
