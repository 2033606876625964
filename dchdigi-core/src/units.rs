//! Length unit conversions.
//!
//! Simulated hits arrive in millimetres while the detector geometry works
//! in centimetres. Every crossing between the two goes through these
//! constants.

/// Millimetres to centimetres.
pub const MM_TO_CM: f64 = 0.1;

/// Centimetres to millimetres.
pub const CM_TO_MM: f64 = 10.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_are_inverse() {
        assert!((MM_TO_CM * CM_TO_MM - 1.0).abs() < f64::EPSILON);
    }
}
