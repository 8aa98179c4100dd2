//! Probability grid and empirical quantiles for method-of-quantiles fitting.
//!
//! The grid is deterministic given the range and partition count, so two runs
//! over the same samples always regress against the same points.

use crate::error::ParamError;

/// `partitions + 1` evenly spaced probabilities from `range.0` to `range.1` inclusive.
pub fn probability_grid(range: (f64, f64), partitions: usize) -> Result<Vec<f64>, ParamError> {
    let (lo, hi) = range;
    if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && hi < 1.0 && lo < hi) {
        return Err(ParamError::invalid(format!(
            "quantile range ({lo}, {hi}) must satisfy 0 < lo < hi < 1"
        )));
    }
    if partitions < 1 {
        return Err(ParamError::invalid("quantile partitions must be >= 1"));
    }
    let step = (hi - lo) / partitions as f64;
    Ok((0..=partitions)
        .map(|k| if k == partitions { hi } else { lo + step * k as f64 })
        .collect())
}

/// Linear interpolation between order statistics (`sorted` ascending, non-empty).
fn empirical_quantile(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let i = h.floor() as usize;
    match sorted.get(i + 1) {
        Some(&next) => sorted[i] + (h - i as f64) * (next - sorted[i]),
        None => sorted[i],
    }
}

/// Empirical quantiles of a sample at a fixed probability grid.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileGrid {
    probabilities: Vec<f64>,
    quantiles: Vec<f64>,
    /// Total sum of squares of `quantiles` about their mean.
    sst: f64,
    sample_min: f64,
    sample_max: f64,
}

impl QuantileGrid {
    /// Drops non-finite samples; rejects fewer than two finite samples and
    /// grids whose empirical quantiles are all equal.
    pub fn from_samples(samples: &[f64], range: (f64, f64), partitions: usize) -> Result<Self, ParamError> {
        let probabilities = probability_grid(range, partitions)?;
        let mut sorted: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.len() < 2 {
            return Err(ParamError::invalid(format!(
                "need at least 2 finite samples, got {}",
                sorted.len()
            )));
        }
        sorted.sort_by(f64::total_cmp);

        let quantiles: Vec<f64> = probabilities.iter().map(|&p| empirical_quantile(&sorted, p)).collect();
        let mean = quantiles.iter().sum::<f64>() / quantiles.len() as f64;
        let sst = quantiles.iter().map(|q| (q - mean).powi(2)).sum::<f64>();
        if !(sst > 0.0) {
            return Err(ParamError::invalid("empirical quantiles have no spread"));
        }

        Ok(QuantileGrid {
            probabilities,
            quantiles,
            sst,
            sample_min: sorted[0],
            sample_max: sorted[sorted.len() - 1],
        })
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn quantiles(&self) -> &[f64] {
        &self.quantiles
    }

    pub fn total_sum_of_squares(&self) -> f64 {
        self.sst
    }

    /// Smallest and largest finite sample.
    pub fn sample_range(&self) -> (f64, f64) {
        (self.sample_min, self.sample_max)
    }

    pub fn len(&self) -> usize {
        self.quantiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_includes_endpoints() {
        let p = probability_grid((0.1, 0.9), 4).unwrap();
        assert_eq!(p.len(), 5);
        assert_eq!(p[0], 0.1);
        assert_eq!(p[4], 0.9);
        assert!((p[2] - 0.5).abs() < 1e-15);
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        assert!(probability_grid((0.0, 0.5), 4).is_err());
        assert!(probability_grid((0.6, 0.5), 4).is_err());
        assert!(probability_grid((0.1, 0.9), 0).is_err());
    }

    #[test]
    fn empirical_quantiles_interpolate_order_statistics() {
        let grid = QuantileGrid::from_samples(&[4.0, 1.0, f64::NAN, 3.0, 2.0, 5.0], (0.25, 0.75), 2).unwrap();
        assert_eq!(grid.quantiles(), &[2.0, 3.0, 4.0]);
        assert_eq!(grid.sample_range(), (1.0, 5.0));
        assert!((grid.total_sum_of_squares() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_samples_are_rejected() {
        assert!(QuantileGrid::from_samples(&[1.0], (0.1, 0.9), 4).is_err());
        assert!(QuantileGrid::from_samples(&[2.0; 10], (0.1, 0.9), 4).is_err());
        assert!(QuantileGrid::from_samples(&[f64::NAN, f64::INFINITY, 1.0], (0.1, 0.9), 4).is_err());
    }
}
