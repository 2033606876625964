//! Per-layer geometry database.
//!
//! Layer 0 is a seed layer built from the input parameters. Every following
//! layer sits directly on top of the previous one, with a cell height chosen
//! so that cells are square at the sense wire radius:
//!
//! `h = 2 pi r_fuw(prev) / (ncell - pi)`

use crate::{DetectorConfig, Error, Result};
use std::f64::consts::{PI, TAU};

/// Geometry of one layer of cells at z=0 (lengths in cm, angles in rad).
#[derive(Clone, Debug, PartialEq)]
pub struct LayerInfo {
    /// Layer number (0 is the seed layer, sensitive layers start at 1).
    pub layer: u32,
    /// Superlayer (0-based) the layer belongs to.
    pub superlayer: u32,
    /// Number of cells in phi.
    pub ncells: u32,
    /// Number of wires (sense and field) in phi.
    pub nwires: u32,
    /// Cell height.
    pub height_z0: f64,
    /// Cell width at the sense wire radius.
    pub width_z0: f64,
    /// Sense wire radius.
    pub radius_sw_z0: f64,
    /// Lower field wire radius.
    pub radius_fdw_z0: f64,
    /// Upper field wire radius.
    pub radius_fuw_z0: f64,
    /// Signed stereo angle of the sense wires.
    pub stereo_angle_z0: f64,
}

impl LayerInfo {
    /// Stereo sign: +1 for odd layers, -1 for even layers.
    #[inline]
    #[must_use]
    pub fn stereo_sign(&self) -> f64 {
        if self.layer % 2 == 1 {
            1.0
        } else {
            -1.0
        }
    }

    /// Azimuthal distance between neighbouring cells.
    #[inline]
    #[must_use]
    pub fn phi_step(&self) -> f64 {
        TAU / f64::from(self.ncells)
    }

    /// Sense wire radius at the endplates (|z| = half length).
    #[inline]
    #[must_use]
    pub fn radius_sw_endplate(&self, twist_angle: f64) -> f64 {
        self.radius_sw_z0 / (0.5 * twist_angle).cos()
    }
}

/// Upper bound on the up-front allocation of the layer database.
const MAX_PREALLOCATED_LAYERS: usize = 1024;

/// Magnitude of the stereo angle of a wire at radius `r` (z=0).
fn stereo_angle(r: f64, config: &DetectorConfig) -> f64 {
    (r * (0.5 * config.twist_angle).tan() / config.half_length).atan()
}

/// Builds the layer database, indexed by layer number (entry 0 is the seed layer).
///
/// # Errors
/// Returns [`Error::InvalidParameter`] if the configuration is invalid or the
/// layers do not fit inside the outer radius.
pub fn build_layer_database(config: &DetectorConfig) -> Result<Vec<LayerInfo>> {
    config.validate()?;

    let nlayers = config.nlayers() as usize;
    let mut layers = Vec::with_capacity(nlayers.min(MAX_PREALLOCATED_LAYERS) + 1);

    let mut seed = LayerInfo {
        layer: 0,
        superlayer: 0,
        ncells: config.ncell0,
        nwires: 2 * config.ncell0,
        height_z0: config.first_width,
        width_z0: TAU * config.first_sense_radius / f64::from(config.ncell0),
        radius_sw_z0: config.first_sense_radius,
        radius_fdw_z0: config.first_sense_radius - 0.5 * config.first_width,
        radius_fuw_z0: config.first_sense_radius + 0.5 * config.first_width,
        stereo_angle_z0: 0.0,
    };
    seed.stereo_angle_z0 = seed.stereo_sign() * stereo_angle(seed.radius_sw_z0, config);
    layers.push(seed);

    let mut layer = 1;
    for superlayer in 0..config.nsuperlayers {
        let ncells = config.ncells_in(superlayer).ok_or_else(|| {
            Error::InvalidParameter(format!("cell count of superlayer {superlayer} overflows"))
        })?;
        let ncells_f = f64::from(ncells);
        if ncells_f <= PI {
            return Err(Error::InvalidParameter(format!(
                "superlayer {superlayer} has {ncells} cells, at least 4 are needed"
            )));
        }

        for _ in 0..config.nlayers_per_superlayer {
            let r_below = layers[layers.len() - 1].radius_fuw_z0;
            let height = TAU * r_below / (ncells_f - PI);
            let radius_sw = r_below + 0.5 * height;

            let mut info = LayerInfo {
                layer,
                superlayer,
                ncells,
                nwires: 2 * ncells,
                height_z0: height,
                width_z0: TAU * radius_sw / ncells_f,
                radius_sw_z0: radius_sw,
                radius_fdw_z0: r_below,
                radius_fuw_z0: r_below + height,
                stereo_angle_z0: 0.0,
            };
            info.stereo_angle_z0 = info.stereo_sign() * stereo_angle(radius_sw, config);
            // radii grow monotonically, so the first overflowing layer ends the build
            if info.radius_fuw_z0 > config.outer_radius {
                return Err(Error::InvalidParameter(format!(
                    "layer {layer} reaches r={:.3} cm, beyond the outer radius {} cm",
                    info.radius_fuw_z0, config.outer_radius
                )));
            }
            layers.push(info);
            layer += 1;
        }
    }

    log::debug!(
        "{}: built {} layers, sense radii {:.3}-{:.3} cm",
        config.name,
        nlayers,
        layers[1.min(nlayers)].radius_sw_z0,
        layers[nlayers].radius_sw_z0
    );

    Ok(layers)
}
