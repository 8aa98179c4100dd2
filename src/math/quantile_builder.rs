//! Table inversion: "which x has cumulative value ≈ p", with a bracket.
//!
//! A [`QuantileBuilder`] holds a monotone cumulative table (both tails) over a
//! strictly increasing knot sequence. [`QuantileBuilder::estimate`] finds the
//! two knots straddling the target by binary search and interpolates between
//! them; the straddling knots become the bracket handed to the Newton polish
//! in [`crate::math::newton`].
//!
//! Tie-break for flat stretches of the table: the leftmost crossing (smallest
//! index) wins, in both tails.

use crate::domain::Interval;
use crate::error::{ParamError, require_finite};
use crate::math::segment_cache::{ReparametrizedDomain, SegmentCache};

/// Slack allowed when validating explicitly supplied tables.
const TABLE_TOLERANCE: f64 = 1e-12;

/// Initial quantile guess plus an interval containing the root.
///
/// `low <= estimate <= high` always holds; the ends may be infinite when the
/// target falls beyond the tabulated range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantileBracket {
    pub estimate: f64,
    pub low: f64,
    pub high: f64,
}

impl QuantileBracket {
    pub fn contains(&self, x: f64) -> bool {
        self.low <= x && x <= self.high
    }
}

#[derive(Debug, Clone)]
pub struct QuantileBuilder {
    knots: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    /// Maps knots to physical x; `None` when the knots already are physical.
    mapping: Option<ReparametrizedDomain>,
    support: (f64, f64),
}

impl QuantileBuilder {
    /// Tabulate `density` over `domain` with `samples` segments.
    pub fn from_density<F>(density: F, domain: ReparametrizedDomain, samples: usize) -> Result<Self, ParamError>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        let cache = SegmentCache::new(domain.pullback(density), 0.0, 1.0, samples)?;
        Self::from_cache(&cache, domain)
    }

    /// Reuse a cache built over `t ∈ [0, 1]` of `domain`.
    pub fn from_cache(cache: &SegmentCache, domain: ReparametrizedDomain) -> Result<Self, ParamError> {
        let (t_min, t_max) = cache.bounds();
        if t_min < 0.0 || t_max > 1.0 {
            return Err(ParamError::invalid(format!(
                "cache bounds [{t_min}, {t_max}] exceed the unit sampling interval"
            )));
        }
        // Each tail is normalized by its own sum so both start exactly at 0 and 1.
        let total = cache.total();
        let upper_total = cache.upper_table()[0];
        for mass in [total, upper_total] {
            if !(mass.is_finite() && mass > 0.0) {
                return Err(ParamError::invalid(format!(
                    "cannot normalize a table with total mass {mass}"
                )));
            }
        }

        let knots: Vec<f64> = (0..=cache.samples()).map(|i| cache.knot(i)).collect();
        let lower = cache.lower_table().iter().map(|v| v / total).collect();
        let upper = cache.upper_table().iter().map(|v| v / upper_total).collect();

        Ok(QuantileBuilder {
            knots,
            lower,
            upper,
            mapping: Some(domain),
            support: domain.bounds(),
        })
    }

    /// Wrap an explicit table of cumulative values at physical `knots`.
    ///
    /// `lower[i]` is `P(X <= knots[i])`, `upper[i]` is `P(X > knots[i])`;
    /// `support` are the physical extremes beyond the first/last knot.
    pub fn from_table(
        knots: Vec<f64>,
        lower: Vec<f64>,
        upper: Vec<f64>,
        support: (f64, f64),
    ) -> Result<Self, ParamError> {
        let n = knots.len();
        if n < 2 || lower.len() != n || upper.len() != n {
            return Err(ParamError::invalid(format!(
                "table needs at least two knots and matching columns, got {} / {} / {}",
                n,
                lower.len(),
                upper.len()
            )));
        }
        for &k in &knots {
            require_finite("knot", k)?;
        }
        if knots.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ParamError::invalid("table knots must be strictly increasing"));
        }
        let in_unit = |v: &f64| v.is_finite() && *v >= -TABLE_TOLERANCE && *v <= 1.0 + TABLE_TOLERANCE;
        if !lower.iter().all(in_unit) || !upper.iter().all(in_unit) {
            return Err(ParamError::invalid("table values must lie in [0, 1]"));
        }
        if lower.windows(2).any(|w| w[1] < w[0] - TABLE_TOLERANCE) {
            return Err(ParamError::invalid("lower table must be non-decreasing"));
        }
        if upper.windows(2).any(|w| w[1] > w[0] + TABLE_TOLERANCE) {
            return Err(ParamError::invalid("upper table must be non-increasing"));
        }
        if support.0.is_nan() || support.1.is_nan() || support.0 > knots[0] || support.1 < knots[n - 1] {
            return Err(ParamError::invalid("support must enclose the table knots"));
        }

        Ok(QuantileBuilder {
            knots,
            lower,
            upper,
            mapping: None,
            support,
        })
    }

    /// Estimate the x with cumulative value `target` in `interval`.
    ///
    /// Returns `None` for targets outside `[0, 1]` (or NaN).
    pub fn estimate(&self, target: f64, interval: Interval) -> Option<QuantileBracket> {
        if !(0.0..=1.0).contains(&target) {
            return None;
        }
        let last = self.knots.len() - 1;

        let bracket = match interval {
            Interval::Lower => {
                let table = &self.lower;
                if target <= table[0] {
                    self.below_first()
                } else if target >= table[last] {
                    self.beyond_last()
                } else {
                    let j = table.partition_point(|&v| v < target).clamp(1, last);
                    let i = j - 1;
                    let frac = (target - table[i]) / (table[j] - table[i]);
                    self.interpolate(i, j, frac)
                }
            }
            Interval::Upper => {
                let table = &self.upper;
                if target >= table[0] {
                    self.below_first()
                } else if target <= table[last] {
                    self.beyond_last()
                } else {
                    let j = table.partition_point(|&v| v > target).clamp(1, last);
                    let i = j - 1;
                    let frac = (table[i] - target) / (table[i] - table[j]);
                    self.interpolate(i, j, frac)
                }
            }
        };
        Some(bracket)
    }

    /// Physical x of knot `i`.
    fn knot_x(&self, i: usize) -> f64 {
        self.to_x(self.knots[i])
    }

    fn to_x(&self, k: f64) -> f64 {
        match self.mapping {
            Some(domain) => domain.to_x(k),
            None => k,
        }
    }

    fn below_first(&self) -> QuantileBracket {
        let lo = self.support.0;
        QuantileBracket {
            estimate: lo,
            low: lo,
            high: self.knot_x(0).max(lo),
        }
    }

    fn beyond_last(&self) -> QuantileBracket {
        let hi = self.support.1;
        QuantileBracket {
            estimate: hi,
            low: self.knot_x(self.knots.len() - 1).min(hi),
            high: hi,
        }
    }

    fn interpolate(&self, i: usize, j: usize, frac: f64) -> QuantileBracket {
        let frac = if frac.is_finite() { frac.clamp(0.0, 1.0) } else { 0.5 };
        let low = self.knot_x(i);
        let high = self.knot_x(j);
        let k = self.knots[i] + frac * (self.knots[j] - self.knots[i]);
        let mut estimate = self.to_x(k);
        if !estimate.is_finite() {
            // Knot at an infinite end of the mapping: fall back to the finite side.
            estimate = if low.is_finite() { low } else { high };
        }
        QuantileBracket {
            estimate: estimate.clamp(low, high),
            low,
            high,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_uniform() -> QuantileBuilder {
        let domain = ReparametrizedDomain::bounded(0.0, 1.0).unwrap();
        QuantileBuilder::from_density(|_| 1.0, domain, 4).unwrap()
    }

    #[test]
    fn uniform_median_lands_between_middle_knots() {
        let b = unit_uniform().estimate(0.5, Interval::Lower).unwrap();
        assert_abs_diff_eq!(b.estimate, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(b.low, 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(b.high, 0.5, epsilon = 1e-12);
        assert!(b.contains(b.estimate));
    }

    #[test]
    fn upper_tail_mirrors_lower_tail() {
        let builder = unit_uniform();
        let b = builder.estimate(0.3, Interval::Upper).unwrap();
        assert_abs_diff_eq!(b.estimate, 0.7, epsilon = 1e-12);
        assert!(b.low <= b.estimate && b.estimate <= b.high);
    }

    #[test]
    fn extremes_map_to_support() {
        let domain = ReparametrizedDomain::unbounded(0.0, 1.0).unwrap();
        let builder = QuantileBuilder::from_density(|x: f64| 0.5 * (-x.abs()).exp(), domain, 64).unwrap();
        let b0 = builder.estimate(0.0, Interval::Lower).unwrap();
        assert_eq!(b0.estimate, f64::NEG_INFINITY);
        let b1 = builder.estimate(1.0, Interval::Lower).unwrap();
        assert_eq!(b1.estimate, f64::INFINITY);
        let u0 = builder.estimate(0.0, Interval::Upper).unwrap();
        assert_eq!(u0.estimate, f64::INFINITY);
        assert!(builder.estimate(1.5, Interval::Lower).is_none());
        assert!(builder.estimate(f64::NAN, Interval::Upper).is_none());
    }

    #[test]
    fn flat_region_takes_leftmost_crossing() {
        let knots = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let lower = vec![0.0, 0.5, 0.5, 0.5, 1.0];
        let upper = lower.iter().map(|v| 1.0 - v).collect();
        let builder = QuantileBuilder::from_table(knots, lower, upper, (0.0, 4.0)).unwrap();
        let b = builder.estimate(0.5, Interval::Lower).unwrap();
        assert_abs_diff_eq!(b.estimate, 1.0, epsilon = 1e-12);
        let u = builder.estimate(0.5, Interval::Upper).unwrap();
        assert_abs_diff_eq!(u.estimate, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn explicit_table_is_validated() {
        let bad_order = QuantileBuilder::from_table(vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], (0.0, 1.0));
        assert!(bad_order.is_err());
        let decreasing = QuantileBuilder::from_table(vec![0.0, 1.0], vec![0.6, 0.4], vec![0.4, 0.6], (0.0, 1.0));
        assert!(decreasing.is_err());
        let short = QuantileBuilder::from_table(vec![0.0], vec![0.0], vec![1.0], (0.0, 1.0));
        assert!(short.is_err());
    }
}
