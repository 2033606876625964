//! Sense wire parametrization.
//!
//! Wires of a stereo layer are straight lines on a hyperboloid: the end at
//! `z = -L` is rotated by `-twist/2` and the end at `z = +L` by `+twist/2`
//! with respect to the z=0 plane (Hoshina et al., Comput. Phys. Commun. 153
//! (2003) 3, eq. 2.9). Before the rotation of the cell to its phi position,
//! the wire ends are
//!
//! `p1 = (r, -s r tan(twist/2), -L)` and `p2 = (r, +s r tan(twist/2), +L)`
//!
//! where `r` is the sense wire radius at z=0, `L` the half length and `s`
//! the layer's stereo sign. Cells are rotated to
//!
//! `phi_z0 = (nphi + 0.25 (layer mod 2)) * 2 pi / ncells`

use crate::layer::{build_layer_database, LayerInfo};
use crate::{DetectorConfig, Error, Result};
use dchdigi_core::{CellAddress, Vec3};

/// Geometric description of one sense wire (lengths in cm).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WireDescriptor {
    layer: u32,
    nphi: u32,
    direction: Vec3,
    z0_point: Vec3,
    phi_z0: f64,
    stereo_angle: f64,
}

impl WireDescriptor {
    /// Builds a descriptor for an arbitrary straight wire through `z0_point`.
    ///
    /// The direction is normalized; layer and cell indices are left at 0.
    ///
    /// # Errors
    /// Returns [`Error::DegenerateWire`] if `direction` has zero length.
    pub fn from_line(z0_point: Vec3, direction: Vec3) -> Result<Self> {
        let direction = direction.unit().map_err(|e| Error::DegenerateWire(e.to_string()))?;
        Ok(Self {
            layer: 0,
            nphi: 0,
            direction,
            z0_point,
            phi_z0: z0_point.phi(),
            stereo_angle: direction.perp().atan2(direction.z.abs()),
        })
    }

    /// Layer number.
    #[must_use]
    pub fn layer(&self) -> u32 {
        self.layer
    }

    /// Cell index in phi.
    #[must_use]
    pub fn nphi(&self) -> u32 {
        self.nphi
    }

    /// Unit vector along the wire, pointing towards +z.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Point where the wire crosses the z=0 plane.
    #[must_use]
    pub fn z0_point(&self) -> Vec3 {
        self.z0_point
    }

    /// Azimuth of the wire at z=0.
    #[must_use]
    pub fn phi_z0(&self) -> f64 {
        self.phi_z0
    }

    /// Signed stereo angle.
    #[must_use]
    pub fn stereo_angle(&self) -> f64 {
        self.stereo_angle
    }

    /// Point on the wire at signed distance `along` from the z=0 point.
    #[must_use]
    pub fn point_at(&self, along: f64) -> Vec3 {
        self.z0_point + self.direction * along
    }
}

/// Closed-form wire geometry for every (layer, phi cell) of the chamber.
///
/// Immutable after construction and cheap to share between threads.
#[derive(Clone, Debug)]
pub struct WireGeometryModel {
    config: DetectorConfig,
    layers: Vec<LayerInfo>,
}

impl WireGeometryModel {
    /// Builds the model and its layer database.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: DetectorConfig) -> Result<Self> {
        let layers = build_layer_database(&config)?;
        Ok(Self { config, layers })
    }

    /// Detector parameters.
    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Number of sensitive layers.
    #[must_use]
    pub fn nlayers(&self) -> u32 {
        self.config.nlayers()
    }

    /// Geometry of a sensitive layer (1-based).
    ///
    /// # Errors
    /// Returns [`Error::LayerOutOfRange`] for layer 0 or beyond the last layer.
    pub fn layer_info(&self, layer: u32) -> Result<&LayerInfo> {
        if layer == 0 || layer > self.nlayers() {
            return Err(Error::LayerOutOfRange {
                layer,
                nlayers: self.nlayers(),
            });
        }
        Ok(&self.layers[layer as usize])
    }

    /// All layers including the seed layer at index 0.
    #[must_use]
    pub fn layers(&self) -> &[LayerInfo] {
        &self.layers
    }

    fn checked_cell(&self, layer: u32, nphi: u32) -> Result<&LayerInfo> {
        let info = self.layer_info(layer)?;
        if nphi >= info.ncells {
            return Err(Error::CellOutOfRange {
                layer,
                nphi,
                ncells: info.ncells,
            });
        }
        Ok(info)
    }

    /// Global layer number of a decoded cell address.
    ///
    /// # Errors
    /// Returns [`Error::LayerOutOfRange`] if the local layer or superlayer
    /// does not exist.
    pub fn layer_of(&self, address: &CellAddress) -> Result<u32> {
        let layer = address.layer(self.config.nlayers_per_superlayer);
        if address.local_layer >= self.config.nlayers_per_superlayer
            || address.superlayer >= self.config.nsuperlayers
        {
            return Err(Error::LayerOutOfRange {
                layer,
                nlayers: self.nlayers(),
            });
        }
        Ok(layer)
    }

    /// Azimuth of the wire at z=0.
    ///
    /// # Errors
    /// Returns an error if the layer or cell does not exist.
    pub fn wire_phi_z0(&self, layer: u32, nphi: u32) -> Result<f64> {
        let info = self.checked_cell(layer, nphi)?;
        Ok(Self::phi_z0(info, nphi))
    }

    fn phi_z0(info: &LayerInfo, nphi: u32) -> f64 {
        let offset = 0.25 * f64::from(info.layer % 2);
        (f64::from(nphi) + offset) * info.phi_step()
    }

    /// Point where the wire crosses the z=0 plane.
    ///
    /// # Errors
    /// Returns an error if the layer or cell does not exist.
    pub fn wire_z0_point(&self, layer: u32, nphi: u32) -> Result<Vec3> {
        let info = self.checked_cell(layer, nphi)?;
        Ok(Vec3::new(info.radius_sw_z0, 0.0, 0.0).rotate_z(Self::phi_z0(info, nphi)))
    }

    /// Unit vector along the wire, pointing towards +z.
    ///
    /// # Errors
    /// Returns an error if the layer or cell does not exist.
    pub fn wire_direction(&self, layer: u32, nphi: u32) -> Result<Vec3> {
        let info = self.checked_cell(layer, nphi)?;
        self.direction(info, nphi)
    }

    fn direction(&self, info: &LayerInfo, nphi: u32) -> Result<Vec3> {
        let half_length = self.config.half_length;
        let r = info.radius_sw_z0;
        let dy = info.stereo_sign() * r * (0.5 * self.config.twist_angle).tan();

        let phi = Self::phi_z0(info, nphi);
        let p1 = Vec3::new(r, -dy, -half_length).rotate_z(phi);
        let p2 = Vec3::new(r, dy, half_length).rotate_z(phi);

        (p2 - p1).unit().map_err(|e| {
            Error::DegenerateWire(format!("layer {} cell {nphi}: {e}", info.layer))
        })
    }

    /// Full descriptor of one wire.
    ///
    /// # Errors
    /// Returns an error if the layer or cell does not exist.
    pub fn wire(&self, layer: u32, nphi: u32) -> Result<WireDescriptor> {
        let info = self.checked_cell(layer, nphi)?;
        let phi_z0 = Self::phi_z0(info, nphi);
        Ok(WireDescriptor {
            layer,
            nphi,
            direction: self.direction(info, nphi)?,
            z0_point: Vec3::new(info.radius_sw_z0, 0.0, 0.0).rotate_z(phi_z0),
            phi_z0,
            stereo_angle: info.stereo_angle_z0,
        })
    }

    /// Descriptor of the wire of a decoded cell.
    ///
    /// # Errors
    /// Returns an error if the address is outside the chamber.
    pub fn wire_for_cell(&self, address: &CellAddress) -> Result<WireDescriptor> {
        let layer = self.layer_of(address)?;
        self.wire(layer, address.nphi)
    }
}
