//! Packaging of digitized hits.

use crate::clusters::ClusterEstimate;
use crate::smearing::SmearedCoordinates;
use dchdigi_core::{AssociationLink, DigitizedHit, RawHit, WireFrameCoordinates, CM_TO_MM};
use dchdigi_geometry::WireDescriptor;

/// Builds output records from the per-hit results.
///
/// Inputs are in the geometry unit (cm); the output is scaled back to the
/// unit of the simulated hit collection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DigiAssembler {
    output_scale: f64,
}

impl Default for DigiAssembler {
    fn default() -> Self {
        Self {
            output_scale: CM_TO_MM,
        }
    }
}

impl DigiAssembler {
    /// Assembler writing millimetres.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Factor from cm to the output length unit.
    #[must_use]
    pub fn output_scale(&self) -> f64 {
        self.output_scale
    }

    /// Combines one hit's results into a digi and its association link.
    ///
    /// `digi_index` is the position the digi will take in the output
    /// collection and `sim_hit_index` the position of `hit` in the input.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        &self,
        hit: &RawHit,
        sim_hit_index: usize,
        digi_index: usize,
        wire: &WireDescriptor,
        true_coords: &WireFrameCoordinates,
        smeared: &SmearedCoordinates,
        clusters: ClusterEstimate,
    ) -> (DigitizedHit, AssociationLink) {
        let scale = self.output_scale;
        let digi = DigitizedHit {
            cell_id: hit.cell_id,
            position: wire.point_at(smeared.along_wire).scaled(scale),
            along_wire: smeared.along_wire * scale,
            distance_to_wire: smeared.distance * scale,
            along_wire_true: true_coords.along_wire * scale,
            distance_to_wire_true: true_coords.distance * scale,
            time: hit.time,
            edep: hit.edep,
            n_clusters: clusters.count,
            cluster_sizes: clusters.sizes,
            sim_hit_index,
        };
        let link = AssociationLink {
            digi_index,
            sim_hit_index,
        };
        (digi, link)
    }
}
