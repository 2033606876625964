//! Hit-to-wire projection.

use crate::{Error, Result, WireDescriptor};
use dchdigi_core::{Vec3, WireFrameCoordinates};

/// Expresses a hit position (cm) in the frame of a wire.
///
/// The hit is translated by the wire's z=0 point and split into the
/// component along the wire direction and the perpendicular residual.
/// Works for any wire orientation.
///
/// # Errors
/// Returns [`Error::DegenerateWire`] if the wire direction is not a unit
/// vector (only possible for corrupted descriptors) or the hit is not finite.
pub fn project_onto_wire(position: Vec3, wire: &WireDescriptor) -> Result<WireFrameCoordinates> {
    let n = wire.direction();
    if (n.mag2() - 1.0).abs() > 1e-9 {
        return Err(Error::DegenerateWire(format!(
            "direction ({}, {}, {}) of layer {} cell {} is not a unit vector",
            n.x,
            n.y,
            n.z,
            wire.layer(),
            wire.nphi()
        )));
    }
    if !position.is_finite() {
        return Err(Error::DegenerateWire(format!(
            "non-finite hit position ({}, {}, {})",
            position.x, position.y, position.z
        )));
    }

    let relative = position - wire.z0_point();
    let along_wire = relative.dot(&n);
    let closest_point = wire.point_at(along_wire);
    let hit_to_wire = closest_point - position;

    Ok(WireFrameCoordinates {
        along_wire,
        distance: hit_to_wire.mag(),
        closest_point,
        hit_to_wire,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DetectorConfig, WireGeometryModel};
    use approx::assert_abs_diff_eq;

    fn wire() -> WireDescriptor {
        WireGeometryModel::new(DetectorConfig::idea_defaults())
            .unwrap()
            .wire(2, 5)
            .unwrap()
    }

    #[test]
    fn test_hit_on_reference_point() {
        let wire = wire();
        let coords = project_onto_wire(wire.z0_point(), &wire).unwrap();
        assert_abs_diff_eq!(coords.distance, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(coords.along_wire, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_hit_offset_along_wire() {
        let wire = wire();
        for d in [-150.0, -1.5, 2.0, 37.25] {
            let coords = project_onto_wire(wire.point_at(d), &wire).unwrap();
            assert_abs_diff_eq!(coords.along_wire, d, epsilon = 1e-10);
            assert_abs_diff_eq!(coords.distance, 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_perpendicular_offset() {
        let wire = wire();
        // radial unit vector at z=0 is perpendicular to the wire there
        let radial = wire.z0_point().unit().unwrap();
        let hit = wire.point_at(3.0) + radial * 0.05;
        let coords = project_onto_wire(hit, &wire).unwrap();
        assert_abs_diff_eq!(coords.along_wire, 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(coords.distance, 0.05, epsilon = 1e-10);
        assert_abs_diff_eq!(coords.hit_to_wire.dot(&wire.direction()), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!((coords.closest_point - wire.point_at(3.0)).mag(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_general_orientation() {
        let wire =
            WireDescriptor::from_line(Vec3::new(1.0, -2.0, 0.5), Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let n = wire.direction();
        let perp = n.cross(&Vec3::new(0.0, 0.0, 1.0)).unit().unwrap();
        let hit = wire.point_at(-4.0) + perp * 0.2;
        let coords = project_onto_wire(hit, &wire).unwrap();
        assert_abs_diff_eq!(coords.along_wire, -4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(coords.distance, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_non_finite_hit_rejected() {
        let wire = wire();
        assert!(project_onto_wire(Vec3::new(f64::NAN, 0.0, 0.0), &wire).is_err());
    }
}
