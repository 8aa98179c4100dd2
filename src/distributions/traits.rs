//! Capability traits composed per distribution.

use rand::Rng;
use rand::distributions::{Distribution, Open01};

use crate::domain::Interval;
use crate::error::ParamError;
use crate::fit::{FitOutcome, FitSettings, QuantileGrid};

pub trait Density {
    /// Probability density at `x`; zero outside the support.
    fn pdf(&self, x: f64) -> f64;

    /// `(lower, upper)` end points of the support, possibly infinite.
    fn support(&self) -> (f64, f64);
}

pub trait Cumulative: Density {
    /// `P(X <= x)` for `Lower`, `P(X > x)` for `Upper`. NaN for NaN `x`.
    fn cdf(&self, x: f64, interval: Interval) -> f64;

    /// Inverse of [`Cumulative::cdf`] for the same tail.
    ///
    /// NaN for `p` outside `[0, 1]`; `p = 0` and `p = 1` map exactly onto the
    /// support end points.
    fn quantile(&self, p: f64, interval: Interval) -> f64;

    fn median(&self) -> f64 {
        self.quantile(0.5, Interval::Lower)
    }
}

/// Central moments; `None` where the moment is undefined or infinite.
pub trait Moments {
    fn mean(&self) -> Option<f64>;
    fn variance(&self) -> Option<f64>;
    fn skewness(&self) -> Option<f64>;
    fn excess_kurtosis(&self) -> Option<f64>;

    fn std_dev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }
}

pub trait Sampler: Cumulative {
    /// One draw; inverse-transform sampling unless a family has a better method.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        inverse_transform(self, rng)
    }

    fn sample_n<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.sample(rng)).collect()
    }
}

/// Multiplication by a positive constant: `cX`.
pub trait Scalable: Sized {
    fn scaled(&self, factor: f64) -> Result<Self, ParamError>;

    fn divided(&self, divisor: f64) -> Result<Self, ParamError> {
        self.scaled(1.0 / divisor)
    }
}

/// Translation: `X + d`.
pub trait Shiftable: Sized {
    fn shifted(&self, offset: f64) -> Result<Self, ParamError>;
}

/// Distribution of the sum of two independent variables, where closed-form.
pub trait Additive: Sized {
    fn add_independent(&self, other: &Self) -> Result<Self, ParamError>;
}

/// Method-of-quantiles estimation.
pub trait Fittable: Sized {
    /// Fit against precomputed empirical quantiles.
    fn fit_quantiles(grid: &QuantileGrid, settings: &FitSettings) -> FitOutcome<Self>;

    /// Fit raw samples using the quantiles at `partitions + 1` evenly spaced
    /// probabilities across `range`.
    fn fit(samples: &[f64], range: (f64, f64), partitions: usize) -> FitOutcome<Self> {
        let settings = FitSettings {
            quantile_range: range,
            partitions,
            ..FitSettings::default()
        };
        match QuantileGrid::from_samples(samples, range, partitions) {
            Ok(grid) => Self::fit_quantiles(&grid, &settings),
            Err(err) => {
                tracing::warn!(%err, "fit input rejected");
                FitOutcome::failed()
            }
        }
    }
}

/// Validated factor for [`Scalable::scaled`].
pub(crate) fn scale_factor(factor: f64) -> Result<f64, ParamError> {
    crate::error::require_positive("factor", factor)
}

/// Resolve probabilities that need no numerical work.
///
/// Returns `Some(NaN)` outside `[0, 1]`, the exact support end point at
/// `p = 0` or `p = 1`, and `None` for interior probabilities.
pub(crate) fn boundary_quantile(p: f64, interval: Interval, support: (f64, f64)) -> Option<f64> {
    if !(0.0..=1.0).contains(&p) {
        return Some(f64::NAN);
    }
    match (interval, p == 0.0, p == 1.0) {
        (Interval::Lower, true, _) | (Interval::Upper, _, true) => Some(support.0),
        (Interval::Lower, _, true) | (Interval::Upper, true, _) => Some(support.1),
        _ => None,
    }
}

/// Mean, variance, skewness and excess kurtosis from the first four raw
/// moments `E[X^n]`.
pub(crate) fn standardized_moments(raw: [f64; 4]) -> [f64; 4] {
    let [m1, m2, m3, m4] = raw;
    let var = m2 - m1 * m1;
    let mu3 = m3 - 3.0 * m1 * m2 + 2.0 * m1.powi(3);
    let mu4 = m4 - 4.0 * m1 * m3 + 6.0 * m1 * m1 * m2 - 3.0 * m1.powi(4);
    [m1, var, mu3 / var.powf(1.5), mu4 / (var * var) - 3.0]
}

pub(crate) fn inverse_transform<D, R>(dist: &D, rng: &mut R) -> f64
where
    D: Cumulative + ?Sized,
    R: Rng + ?Sized,
{
    let u: f64 = Open01.sample(rng);
    dist.quantile(u, Interval::Lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_probabilities_hit_support_ends() {
        let support = (0.0, f64::INFINITY);
        assert_eq!(boundary_quantile(0.0, Interval::Lower, support), Some(0.0));
        assert_eq!(boundary_quantile(1.0, Interval::Lower, support), Some(f64::INFINITY));
        assert_eq!(boundary_quantile(0.0, Interval::Upper, support), Some(f64::INFINITY));
        assert_eq!(boundary_quantile(1.0, Interval::Upper, support), Some(0.0));
        assert_eq!(boundary_quantile(0.3, Interval::Lower, support), None);
        assert!(boundary_quantile(-0.1, Interval::Lower, support).unwrap().is_nan());
        assert!(boundary_quantile(f64::NAN, Interval::Upper, support).unwrap().is_nan());
    }

    #[test]
    fn standardized_moments_of_unit_exponential() {
        // E[X^n] = n! for Exp(1).
        let [mean, var, skew, kurt] = standardized_moments([1.0, 2.0, 6.0, 24.0]);
        assert_eq!(mean, 1.0);
        assert!((var - 1.0).abs() < 1e-12);
        assert!((skew - 2.0).abs() < 1e-12);
        assert!((kurt - 6.0).abs() < 1e-12);
    }
}
