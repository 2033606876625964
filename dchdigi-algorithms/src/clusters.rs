//! Ionization cluster counting.

use crate::calibration::{BucketIndex, ClusterCalibration};
use dchdigi_core::Vec3;
use rand::RngCore;
use std::sync::Arc;

/// Sampled cluster statistics of one hit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterEstimate {
    /// Number of clusters.
    pub count: u32,
    /// Electrons per cluster, one entry per cluster.
    pub sizes: Vec<u32>,
    /// Calibration bin used, `None` if sampling was skipped.
    pub bucket: Option<BucketIndex>,
    /// True if the lookup was clamped to an outer bin.
    pub clamped: bool,
}

impl ClusterEstimate {
    /// Estimate for a hit that produces no ionization.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Resamples cluster counts and sizes from a calibration.
#[derive(Clone)]
pub struct ClusterEstimator {
    calibration: Arc<dyn ClusterCalibration>,
}

impl std::fmt::Debug for ClusterEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterEstimator").finish_non_exhaustive()
    }
}

impl ClusterEstimator {
    /// Creates an estimator backed by a shared calibration.
    #[must_use]
    pub fn new(calibration: Arc<dyn ClusterCalibration>) -> Self {
        Self { calibration }
    }

    /// Shared calibration.
    #[must_use]
    pub fn calibration(&self) -> &Arc<dyn ClusterCalibration> {
        &self.calibration
    }

    /// Samples the clusters of one hit.
    ///
    /// Hits with no energy deposit, a non-positive path length or a massless
    /// particle produce no clusters and consume no random numbers. Otherwise
    /// one count is drawn, followed by one size per cluster.
    pub fn estimate(
        &self,
        edep: f64,
        path_length_cm: f64,
        incidence_angle: f64,
        mass: f64,
        rng: &mut dyn RngCore,
    ) -> ClusterEstimate {
        // NaN inputs fail these comparisons and also short-circuit
        if !(edep > 0.0 && path_length_cm > 0.0 && mass > 0.0) {
            return ClusterEstimate::empty();
        }

        let lookup = self.calibration.locate(path_length_cm, incidence_angle);
        if lookup.clamped {
            log::trace!(
                "cluster lookup clamped: path {path_length_cm} cm, angle {incidence_angle} rad -> {:?}",
                lookup.index
            );
        }

        let count = self.calibration.sample_count(lookup.index, rng);
        let sizes = (0..count)
            .map(|_| self.calibration.sample_size(lookup.index, rng).max(1))
            .collect();

        ClusterEstimate {
            count,
            sizes,
            bucket: Some(lookup.index),
            clamped: lookup.clamped,
        }
    }
}

/// Angle between a momentum and the plane perpendicular to a wire.
///
/// Zero for tracks crossing the wire at right angles, `π/2` for tracks
/// running parallel to it. A zero or non-finite momentum gives 0.
#[must_use]
pub fn incidence_angle(momentum: Vec3, wire_direction: Vec3) -> f64 {
    let (Ok(p), Ok(w)) = (momentum.unit(), wire_direction.unit()) else {
        return 0.0;
    };
    p.dot(&w).abs().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::BucketLookup;
    use crate::seed::EventRng;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::FRAC_PI_2;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PION: f64 = dchdigi_core::RawHit::PION_MASS;

    /// Two path bins split at 1 cm; counts 3 and 6, sizes 0 and 2.
    #[derive(Default)]
    struct MockCalibration {
        draws: AtomicUsize,
    }

    impl ClusterCalibration for MockCalibration {
        fn locate(&self, path_length_cm: f64, _incidence_angle: f64) -> BucketLookup {
            let (path, clamped) = if path_length_cm < 0.1 {
                (0, true)
            } else if path_length_cm < 1.0 {
                (0, false)
            } else if path_length_cm < 2.0 {
                (1, false)
            } else {
                (1, true)
            };
            BucketLookup {
                index: BucketIndex { path, angle: 0 },
                clamped,
            }
        }

        fn sample_count(&self, index: BucketIndex, rng: &mut dyn RngCore) -> u32 {
            self.draws.fetch_add(1, Ordering::Relaxed);
            rng.next_u32();
            if index.path == 0 {
                3
            } else {
                6
            }
        }

        fn sample_size(&self, index: BucketIndex, rng: &mut dyn RngCore) -> u32 {
            self.draws.fetch_add(1, Ordering::Relaxed);
            rng.next_u32();
            // bin 0 reports an impossible empty cluster
            if index.path == 0 {
                0
            } else {
                2
            }
        }
    }

    fn estimator() -> (ClusterEstimator, Arc<MockCalibration>) {
        let mock = Arc::new(MockCalibration::default());
        (ClusterEstimator::new(mock.clone()), mock)
    }

    #[test]
    fn test_counts_and_sizes_from_bucket() {
        let (estimator, mock) = estimator();
        let mut rng = EventRng::seed_from_u64(0);
        let estimate = estimator.estimate(1e-6, 1.5, 0.2, PION, &mut rng);
        assert_eq!(estimate.count, 6);
        assert_eq!(estimate.sizes, vec![2; 6]);
        assert_eq!(estimate.bucket, Some(BucketIndex { path: 1, angle: 0 }));
        assert!(!estimate.clamped);
        assert_eq!(mock.draws.load(Ordering::Relaxed), 7);
    }

    #[test]
    fn test_sizes_are_at_least_one() {
        let (estimator, _) = estimator();
        let mut rng = EventRng::seed_from_u64(0);
        let estimate = estimator.estimate(1e-6, 0.5, 0.0, PION, &mut rng);
        assert_eq!(estimate.count, 3);
        assert!(estimate.sizes.iter().all(|&s| s == 1));
    }

    #[test]
    fn test_short_circuits_draw_nothing() {
        let (estimator, mock) = estimator();
        let mut rng = EventRng::seed_from_u64(11);
        let mut reference = EventRng::seed_from_u64(11);

        for (edep, path, mass) in [
            (0.0, 1.0, PION),
            (1e-6, 0.0, PION),
            (1e-6, -0.5, PION),
            (1e-6, 1.0, 0.0),
            (f64::NAN, 1.0, PION),
        ] {
            let estimate = estimator.estimate(edep, path, 0.1, mass, &mut rng);
            assert_eq!(estimate, ClusterEstimate::empty());
        }
        assert_eq!(mock.draws.load(Ordering::Relaxed), 0);
        assert_eq!(rng.gen::<u64>(), reference.gen::<u64>());
    }

    #[test]
    fn test_out_of_range_path_is_clamped() {
        let (estimator, _) = estimator();
        let mut rng = EventRng::seed_from_u64(2);

        let long = estimator.estimate(1e-6, 1.0e4, 0.0, PION, &mut rng);
        assert_eq!(long.bucket, Some(BucketIndex { path: 1, angle: 0 }));
        assert!(long.clamped);
        assert_eq!(long.count, 6);

        let short = estimator.estimate(1e-6, 0.01, 0.0, PION, &mut rng);
        assert_eq!(short.bucket, Some(BucketIndex { path: 0, angle: 0 }));
        assert!(short.clamped);
    }

    #[test]
    fn test_incidence_angle() {
        let z = Vec3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(incidence_angle(Vec3::new(1.0, 0.0, 0.0), z), 0.0);
        assert_relative_eq!(incidence_angle(Vec3::new(0.0, 0.0, -3.0), z), FRAC_PI_2);
        assert_relative_eq!(
            incidence_angle(Vec3::new(1.0, 0.0, 1.0), z),
            FRAC_PI_2 / 2.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(incidence_angle(Vec3::ZERO, z), 0.0);
    }
}
