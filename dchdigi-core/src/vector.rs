//! Minimal 3D vector used for hit positions and wire directions.

use std::ops::{Add, Mul, Neg, Sub};

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cartesian 3-vector in detector coordinates (z along the beam axis).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a new vector.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Dot product.
    #[inline]
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product.
    #[inline]
    #[must_use]
    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Squared magnitude.
    #[inline]
    #[must_use]
    pub fn mag2(&self) -> f64 {
        self.dot(self)
    }

    /// Magnitude.
    #[inline]
    #[must_use]
    pub fn mag(&self) -> f64 {
        self.mag2().sqrt()
    }

    /// Transverse radius, `sqrt(x^2 + y^2)`.
    #[inline]
    #[must_use]
    pub fn perp(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Azimuthal angle in `(-pi, pi]`.
    #[inline]
    #[must_use]
    pub fn phi(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Returns the unit vector with the same direction.
    ///
    /// # Errors
    /// Returns [`Error::DegenerateVector`] if the vector has zero or non-finite length.
    pub fn unit(&self) -> Result<Self> {
        let mag = self.mag();
        if mag > 0.0 && mag.is_finite() {
            Ok(*self * (1.0 / mag))
        } else {
            Err(Error::DegenerateVector {
                x: self.x,
                y: self.y,
                z: self.z,
            })
        }
    }

    /// Rotates the vector around the z axis by `angle` radians.
    #[inline]
    #[must_use]
    pub fn rotate_z(&self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            x: c * self.x - s * self.y,
            y: s * self.x + c * self.y,
            z: self.z,
        }
    }

    /// Multiplies every component by `factor` (unit conversion helper).
    #[inline]
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        *self * factor
    }

    /// Returns true if every component is finite.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}
