//! Empirical cluster count and cluster size distributions.
//!
//! The distributions are produced offline from a detailed ionization
//! simulation and binned in path length (and optionally incidence angle).
//! Lookups use explicit bin edges: bin `i` covers `[edge_i, edge_{i+1})`.
//! Values below the first edge go to the first bin and values at or above
//! the last edge go to the last bin; both cases are reported as clamped.

use dchdigi_core::{Error, Result};
use rand::distributions::WeightedIndex;
use rand::RngCore;
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Largest cluster count a calibration may contain.
pub const MAX_CLUSTER_COUNT: u32 = 100_000;

/// Position of a calibration bin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BucketIndex {
    /// Path length bin.
    pub path: usize,
    /// Incidence angle bin.
    pub angle: usize,
}

/// Result of a calibration lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BucketLookup {
    /// Selected bin.
    pub index: BucketIndex,
    /// True if an input was outside the calibrated range.
    pub clamped: bool,
}

/// Read-only source of cluster distributions.
///
/// Implementations are shared between all event-processing threads.
pub trait ClusterCalibration: Send + Sync {
    /// Selects the bin for a path length (cm) and incidence angle (rad).
    fn locate(&self, path_length_cm: f64, incidence_angle: f64) -> BucketLookup;

    /// Draws a number of clusters.
    fn sample_count(&self, index: BucketIndex, rng: &mut dyn RngCore) -> u32;

    /// Draws the number of electrons in one cluster.
    fn sample_size(&self, index: BucketIndex, rng: &mut dyn RngCore) -> u32;
}

/// Serialized form of a discrete distribution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistributionData {
    /// Possible values.
    pub values: Vec<u32>,
    /// Relative weight of each value.
    pub weights: Vec<f64>,
}

/// Discrete distribution sampled by weight.
#[derive(Clone, Debug)]
pub struct EmpiricalDistribution {
    values: Vec<u32>,
    sampler: WeightedIndex<f64>,
}

impl EmpiricalDistribution {
    /// Builds a distribution from values and weights.
    ///
    /// # Errors
    /// Returns [`Error::CalibrationError`] for empty input, mismatched lengths,
    /// or weights that are negative, non-finite or all zero.
    pub fn new(values: Vec<u32>, weights: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::CalibrationError("empty distribution".to_string()));
        }
        if values.len() != weights.len() {
            return Err(Error::CalibrationError(format!(
                "{} values but {} weights",
                values.len(),
                weights.len()
            )));
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(Error::CalibrationError("non-finite weight".to_string()));
        }
        let sampler = WeightedIndex::new(weights)
            .map_err(|e| Error::CalibrationError(format!("invalid weights: {e}")))?;
        Ok(Self { values, sampler })
    }

    /// Draws one value.
    pub fn sample(&self, rng: &mut dyn RngCore) -> u32 {
        self.values[self.sampler.sample(rng)]
    }

    /// Possible values.
    #[must_use]
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Smallest possible value.
    #[must_use]
    pub fn min_value(&self) -> u32 {
        self.values.iter().copied().min().unwrap_or(0)
    }

    /// Largest possible value.
    #[must_use]
    pub fn max_value(&self) -> u32 {
        self.values.iter().copied().max().unwrap_or(0)
    }
}

/// Serialized form of one calibration bin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BucketData {
    /// Cluster count distribution.
    pub count: DistributionData,
    /// Cluster size distribution.
    pub size: DistributionData,
}

/// Serialized calibration table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationData {
    /// Path length bin edges in cm.
    pub path_length_edges_cm: Vec<f64>,
    /// Incidence angle bin edges in rad.
    #[serde(default = "default_angle_edges")]
    pub angle_edges_rad: Vec<f64>,
    /// Bins in row-major `[path][angle]` order.
    pub buckets: Vec<BucketData>,
}

fn default_angle_edges() -> Vec<f64> {
    vec![0.0, FRAC_PI_2]
}

#[derive(Clone, Debug)]
struct Bucket {
    count: EmpiricalDistribution,
    size: EmpiricalDistribution,
}

/// Calibration table binned in path length and incidence angle.
#[derive(Clone, Debug)]
pub struct EmpiricalCalibration {
    path_edges: Vec<f64>,
    angle_edges: Vec<f64>,
    buckets: Vec<Bucket>,
}

fn check_edges(edges: &[f64], name: &str) -> Result<()> {
    if edges.len() < 2 {
        return Err(Error::CalibrationError(format!(
            "{name} needs at least two edges, got {}",
            edges.len()
        )));
    }
    if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::CalibrationError(format!(
            "{name} must be finite and strictly ascending"
        )));
    }
    Ok(())
}

/// Bin of `x` within `edges`, clamped to the outermost bins.
fn locate_edge(edges: &[f64], x: f64) -> (usize, bool) {
    let nbins = edges.len() - 1;
    let at_or_below = edges.partition_point(|&e| e <= x);
    if at_or_below == 0 {
        (0, true)
    } else if at_or_below > nbins {
        (nbins - 1, true)
    } else {
        (at_or_below - 1, false)
    }
}

impl EmpiricalCalibration {
    /// Builds and validates a calibration table.
    ///
    /// # Errors
    /// Returns [`Error::CalibrationError`] describing the first problem found.
    pub fn from_data(data: CalibrationData) -> Result<Self> {
        check_edges(&data.path_length_edges_cm, "path_length_edges_cm")?;
        check_edges(&data.angle_edges_rad, "angle_edges_rad")?;

        let npath = data.path_length_edges_cm.len() - 1;
        let nangle = data.angle_edges_rad.len() - 1;
        if data.buckets.len() != npath * nangle {
            return Err(Error::CalibrationError(format!(
                "expected {npath} x {nangle} buckets, got {}",
                data.buckets.len()
            )));
        }

        let buckets = data
            .buckets
            .into_iter()
            .enumerate()
            .map(|(i, bucket)| {
                let context = |e: Error| {
                    Error::CalibrationError(format!(
                        "bucket (path {}, angle {}): {e}",
                        i / nangle,
                        i % nangle
                    ))
                };
                let count = EmpiricalDistribution::new(bucket.count.values, &bucket.count.weights)
                    .map_err(context)?;
                let size = EmpiricalDistribution::new(bucket.size.values, &bucket.size.weights)
                    .map_err(context)?;
                if count.max_value() > MAX_CLUSTER_COUNT {
                    return Err(context(Error::CalibrationError(format!(
                        "cluster count {} exceeds the maximum of {MAX_CLUSTER_COUNT}",
                        count.max_value()
                    ))));
                }
                if size.min_value() == 0 {
                    return Err(context(Error::CalibrationError(
                        "cluster sizes must be at least 1".to_string(),
                    )));
                }
                Ok(Bucket { count, size })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            path_edges: data.path_length_edges_cm,
            angle_edges: data.angle_edges_rad,
            buckets,
        })
    }

    /// Parses a JSON calibration table.
    ///
    /// # Errors
    /// Returns [`Error::CalibrationError`] if the JSON is malformed or invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: CalibrationData = serde_json::from_str(json)
            .map_err(|e| Error::CalibrationError(format!("malformed calibration: {e}")))?;
        Self::from_data(data)
    }

    /// Number of path length bins.
    #[must_use]
    pub fn path_bins(&self) -> usize {
        self.path_edges.len() - 1
    }

    /// Number of incidence angle bins.
    #[must_use]
    pub fn angle_bins(&self) -> usize {
        self.angle_edges.len() - 1
    }

    /// Calibrated path length range in cm.
    #[must_use]
    pub fn path_range(&self) -> (f64, f64) {
        (self.path_edges[0], self.path_edges[self.path_edges.len() - 1])
    }

    fn bucket(&self, index: BucketIndex) -> &Bucket {
        &self.buckets[index.path * self.angle_bins() + index.angle]
    }
}

impl ClusterCalibration for EmpiricalCalibration {
    fn locate(&self, path_length_cm: f64, incidence_angle: f64) -> BucketLookup {
        let (path, path_clamped) = locate_edge(&self.path_edges, path_length_cm);
        let (angle, angle_clamped) = locate_edge(&self.angle_edges, incidence_angle);
        BucketLookup {
            index: BucketIndex { path, angle },
            clamped: path_clamped || angle_clamped,
        }
    }

    fn sample_count(&self, index: BucketIndex, rng: &mut dyn RngCore) -> u32 {
        self.bucket(index).count.sample(rng)
    }

    fn sample_size(&self, index: BucketIndex, rng: &mut dyn RngCore) -> u32 {
        self.bucket(index).size.sample(rng)
    }
}
