//! Diagnostic histograms filled during digitization.

use serde::{Deserialize, Serialize};

/// Fixed-width 1D histogram with under- and overflow counters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Histogram1D {
    /// Histogram name.
    pub name: String,
    /// Bin edges, `counts.len() + 1` entries.
    pub edges: Vec<f64>,
    /// Entries per bin.
    pub counts: Vec<u64>,
    /// Entries below the first edge.
    pub underflow: u64,
    /// Entries at or above the last edge, and NaN.
    pub overflow: u64,
    sum: f64,
    sum_sq: f64,
    entries: u64,
}

impl Histogram1D {
    /// Creates a histogram with `nbins` equal bins over `[min, max)`.
    ///
    /// A degenerate range is widened so that every histogram has a
    /// positive bin width.
    #[must_use]
    pub fn new(name: &str, nbins: usize, min: f64, max: f64) -> Self {
        let nbins = nbins.max(1);
        let max = if max > min { max } else { min + 1.0 };
        #[allow(clippy::cast_precision_loss)]
        let step = (max - min) / nbins as f64;
        #[allow(clippy::cast_precision_loss)]
        let edges = (0..=nbins).map(|i| min + i as f64 * step).collect();
        Self {
            name: name.to_string(),
            edges,
            counts: vec![0; nbins],
            underflow: 0,
            overflow: 0,
            sum: 0.0,
            sum_sq: 0.0,
            entries: 0,
        }
    }

    /// Adds one value.
    pub fn fill(&mut self, value: f64) {
        self.entries += 1;
        if value.is_finite() {
            self.sum += value;
            self.sum_sq += value * value;
        }

        let lo = self.edges[0];
        let hi = self.edges[self.edges.len() - 1];
        if value < lo {
            self.underflow += 1;
        } else if value >= hi || value.is_nan() {
            self.overflow += 1;
        } else {
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_precision_loss
            )]
            let bin = ((value - lo) / (hi - lo) * self.counts.len() as f64) as usize;
            let bin = bin.min(self.counts.len() - 1);
            self.counts[bin] += 1;
        }
    }

    /// Total number of fills, including under- and overflow.
    #[must_use]
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Mean of all filled values, 0 when empty.
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.entries == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.entries as f64;
        self.sum / n
    }

    /// Population standard deviation of all filled values.
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        if self.entries == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.entries as f64;
        let mean = self.sum / n;
        (self.sum_sq / n - mean * mean).max(0.0).sqrt()
    }

    /// Centre of bin `i`.
    #[must_use]
    pub fn bin_center(&self, i: usize) -> f64 {
        0.5 * (self.edges[i] + self.edges[i + 1])
    }

    /// Adds the contents of a histogram with the same binning.
    ///
    /// Returns false and leaves `self` unchanged if the binning differs.
    pub fn merge(&mut self, other: &Self) -> bool {
        if self.edges != other.edges {
            return false;
        }
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.entries += other.entries;
        true
    }
}

/// Histograms of one digitization run (lengths in cm).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DebugHistograms {
    /// Distance from the hit position to the wire.
    pub distance_hit_wire: Histogram1D,
    /// Distance from the projected point to the wire, ideally zero.
    pub distance_projection_wire: Histogram1D,
    /// Smearing along the wire.
    pub smearing_along: Histogram1D,
    /// Smearing perpendicular to the wire.
    pub smearing_perpendicular: Histogram1D,
    /// Hits whose cluster lookup was clamped to an outer calibration bin.
    pub clamped_lookups: u64,
}

impl DebugHistograms {
    /// Creates empty histograms; the smearing ranges span five sigma.
    #[must_use]
    pub fn new(along_sigma_cm: f64, perpendicular_sigma_cm: f64) -> Self {
        let span = |sigma: f64| if sigma > 0.0 { 5.0 * sigma } else { 1e-3 };
        let z = span(along_sigma_cm);
        let xy = span(perpendicular_sigma_cm);
        Self {
            distance_hit_wire: Histogram1D::new("hDpw", 200, 0.0, 2.0),
            distance_projection_wire: Histogram1D::new("hDww", 100, 0.0, 1e-6),
            smearing_along: Histogram1D::new("hSz", 200, -z, z),
            smearing_perpendicular: Histogram1D::new("hSxy", 200, -xy, xy),
            clamped_lookups: 0,
        }
    }

    /// All four histograms.
    #[must_use]
    pub fn histograms(&self) -> [&Histogram1D; 4] {
        [
            &self.distance_hit_wire,
            &self.distance_projection_wire,
            &self.smearing_along,
            &self.smearing_perpendicular,
        ]
    }

    /// Adds the contents of another set with the same binning.
    pub fn merge(&mut self, other: &Self) -> bool {
        let merged = self.distance_hit_wire.merge(&other.distance_hit_wire)
            & self
                .distance_projection_wire
                .merge(&other.distance_projection_wire)
            & self.smearing_along.merge(&other.smearing_along)
            & self.smearing_perpendicular.merge(&other.smearing_perpendicular);
        self.clamped_lookups += other.clamped_lookups;
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fill_and_overflow() {
        let mut h = Histogram1D::new("h", 10, 0.0, 1.0);
        h.fill(0.05);
        h.fill(0.95);
        h.fill(0.1);
        h.fill(-0.1);
        h.fill(1.0);
        h.fill(f64::NAN);
        assert_eq!(h.counts[0], 1);
        assert_eq!(h.counts[1], 1);
        assert_eq!(h.counts[9], 1);
        assert_eq!(h.underflow, 1);
        assert_eq!(h.overflow, 2);
        assert_eq!(h.entries(), 6);
        assert_relative_eq!(h.bin_center(0), 0.05);
    }

    #[test]
    fn test_mean_and_std() {
        let mut h = Histogram1D::new("h", 4, -2.0, 2.0);
        for v in [-1.0, 1.0, -1.0, 1.0] {
            h.fill(v);
        }
        assert_relative_eq!(h.mean(), 0.0);
        assert_relative_eq!(h.std_dev(), 1.0);
        assert_relative_eq!(Histogram1D::new("e", 1, 0.0, 1.0).mean(), 0.0);
    }

    #[test]
    fn test_merge() {
        let mut a = DebugHistograms::new(0.1, 0.01);
        let mut b = DebugHistograms::new(0.1, 0.01);
        a.smearing_along.fill(0.05);
        b.smearing_along.fill(-0.05);
        b.clamped_lookups = 3;
        assert!(a.merge(&b));
        assert_eq!(a.smearing_along.entries(), 2);
        assert_eq!(a.clamped_lookups, 3);

        let other = DebugHistograms::new(1.0, 0.01);
        assert!(!a.merge(&other));
    }

    #[test]
    fn test_zero_sigma_range_is_not_degenerate() {
        let h = DebugHistograms::new(0.0, 0.0);
        assert!(h.smearing_along.edges[0] < h.smearing_along.edges[200]);
        let mut degenerate = Histogram1D::new("d", 0, 1.0, 1.0);
        degenerate.fill(1.5);
        assert_eq!(degenerate.counts, vec![1]);
    }
}
