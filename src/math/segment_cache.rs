//! Monotone cumulative tables of a one-dimensional integrand.
//!
//! A [`SegmentCache`] splits a bounded parameter interval `[a, b]` into `N`
//! equal segments and integrates the integrand once per segment with a
//! fixed 5-point Gauss–Legendre panel. Two tables are kept:
//!
//! - `lower[i] = ∫_a^{t_i} f` (accumulated left to right)
//! - `upper[i] = ∫_{t_i}^b f` (accumulated right to left)
//!
//! The upper table is summed independently so small upper-tail values are not
//! lost to cancellation against the total.
//!
//! Infinite physical supports are handled by a [`ReparametrizedDomain`]: the
//! density is pulled back onto `t ∈ [0, 1]` (`f(x(t)) · x'(t)`) and the table
//! is built over `t`. Gauss–Legendre nodes never touch segment end points, so
//! the (integrable) end-point blow-ups of the Jacobian are never evaluated.

use crate::error::{ParamError, require_finite, require_positive};

/// Gauss–Legendre nodes on `[-1, 1]` (5 points, exact to degree 9).
const GL_NODES: [f64; 5] = [
    -0.906_179_845_938_664,
    -0.538_469_310_105_683_1,
    0.0,
    0.538_469_310_105_683_1,
    0.906_179_845_938_664,
];

const GL_WEIGHTS: [f64; 5] = [
    0.236_926_885_056_189_1,
    0.478_628_670_499_366_5,
    0.568_888_888_888_888_9,
    0.478_628_670_499_366_5,
    0.236_926_885_056_189_1,
];

/// Default segment count used by the distributions that tabulate their CDF.
pub const DEFAULT_SEGMENTS: usize = 1024;

pub type Integrand = Box<dyn Fn(f64) -> f64 + Send + Sync>;

/// A monotone change of variable between a physical domain and `t ∈ [0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReparametrizedDomain {
    /// `x = lo + (hi - lo) t`.
    Bounded { lo: f64, hi: f64 },
    /// `x = lo + scale · t / (1 - t)`, covering `[lo, ∞)`.
    LowerBounded { lo: f64, scale: f64 },
    /// `x = center + scale · v / (1 - |v|)` with `v = 2t - 1`, covering `ℝ`.
    Unbounded { center: f64, scale: f64 },
}

impl ReparametrizedDomain {
    pub fn bounded(lo: f64, hi: f64) -> Result<Self, ParamError> {
        require_finite("lo", lo)?;
        require_finite("hi", hi)?;
        if hi <= lo {
            return Err(ParamError::invalid(format!(
                "bounded domain needs lo < hi, got [{lo}, {hi}]"
            )));
        }
        Ok(ReparametrizedDomain::Bounded { lo, hi })
    }

    pub fn lower_bounded(lo: f64, scale: f64) -> Result<Self, ParamError> {
        require_finite("lo", lo)?;
        require_positive("scale", scale)?;
        Ok(ReparametrizedDomain::LowerBounded { lo, scale })
    }

    pub fn unbounded(center: f64, scale: f64) -> Result<Self, ParamError> {
        require_finite("center", center)?;
        require_positive("scale", scale)?;
        Ok(ReparametrizedDomain::Unbounded { center, scale })
    }

    /// Physical coordinate for the sampling coordinate `t` (clamped to `[0, 1]`).
    pub fn to_x(&self, t: f64) -> f64 {
        if t.is_nan() {
            return f64::NAN;
        }
        let t = t.clamp(0.0, 1.0);
        match *self {
            ReparametrizedDomain::Bounded { lo, hi } => lo + (hi - lo) * t,
            ReparametrizedDomain::LowerBounded { lo, scale } => {
                if t >= 1.0 {
                    f64::INFINITY
                } else {
                    lo + scale * t / (1.0 - t)
                }
            }
            ReparametrizedDomain::Unbounded { center, scale } => {
                if t <= 0.0 {
                    f64::NEG_INFINITY
                } else if t >= 1.0 {
                    f64::INFINITY
                } else {
                    center + scale * (2.0 * t - 1.0) / unbounded_gap(t)
                }
            }
        }
    }

    /// Sampling coordinate for the physical coordinate `x` (saturating outside the domain).
    pub fn to_t(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        match *self {
            ReparametrizedDomain::Bounded { lo, hi } => ((x - lo) / (hi - lo)).clamp(0.0, 1.0),
            ReparametrizedDomain::LowerBounded { lo, scale } => {
                if x <= lo {
                    0.0
                } else if x == f64::INFINITY {
                    1.0
                } else {
                    let u = (x - lo) / scale;
                    u / (1.0 + u)
                }
            }
            ReparametrizedDomain::Unbounded { center, scale } => {
                if x == f64::INFINITY {
                    1.0
                } else if x == f64::NEG_INFINITY {
                    0.0
                } else {
                    let u = (x - center) / scale;
                    // Written per side so the far left tail keeps full relative precision.
                    if u < 0.0 { 0.5 / (1.0 - u) } else { 1.0 - 0.5 / (1.0 + u) }
                }
            }
        }
    }

    /// `dx/dt`; infinite at the open ends of the half-line and line mappings.
    pub fn jacobian(&self, t: f64) -> f64 {
        match *self {
            ReparametrizedDomain::Bounded { lo, hi } => hi - lo,
            ReparametrizedDomain::LowerBounded { scale, .. } => {
                let r = 1.0 - t;
                scale / (r * r)
            }
            ReparametrizedDomain::Unbounded { scale, .. } => {
                let r = unbounded_gap(t);
                2.0 * scale / (r * r)
            }
        }
    }

    /// Physical extremes `(to_x(0), to_x(1))`.
    pub fn bounds(&self) -> (f64, f64) {
        (self.to_x(0.0), self.to_x(1.0))
    }

    /// Pull a physical density back onto `t`: `g(t) = f(x(t)) · x'(t)`.
    pub fn pullback<F>(self, density: F) -> impl Fn(f64) -> f64 + Send + Sync + 'static
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        move |t| density(self.to_x(t)) * self.jacobian(t)
    }
}

/// `1 - |2t - 1|`, exact near `t = 0`.
fn unbounded_gap(t: f64) -> f64 {
    if t < 0.5 { 2.0 * t } else { 2.0 * (1.0 - t) }
}

/// Cumulative tables of an integrand over `[t_min, t_max]`.
pub struct SegmentCache {
    integrand: Integrand,
    t_min: f64,
    t_max: f64,
    step: f64,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl SegmentCache {
    /// Tabulate `integrand` over `[t_min, t_max]` with `samples` segments.
    ///
    /// Values of the integrand that are non-finite or negative count as zero.
    pub fn new<F>(integrand: F, t_min: f64, t_max: f64, samples: usize) -> Result<Self, ParamError>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        if samples == 0 {
            return Err(ParamError::invalid("segment cache needs at least one sample"));
        }
        require_finite("t_min", t_min)?;
        require_finite("t_max", t_max)?;
        if t_max <= t_min {
            return Err(ParamError::invalid(format!(
                "segment cache needs t_min < t_max, got [{t_min}, {t_max}]"
            )));
        }

        let integrand: Integrand = Box::new(integrand);
        let step = (t_max - t_min) / samples as f64;
        let knot = |i: usize| if i == samples { t_max } else { t_min + i as f64 * step };

        let segments: Vec<f64> = (0..samples)
            .map(|i| gauss_legendre(&integrand, knot(i), knot(i + 1)))
            .collect();

        let mut lower = Vec::with_capacity(samples + 1);
        let mut acc = 0.0;
        lower.push(acc);
        for s in &segments {
            acc += s;
            lower.push(acc);
        }

        let mut upper = vec![0.0; samples + 1];
        let mut acc = 0.0;
        for i in (0..samples).rev() {
            acc += segments[i];
            upper[i] = acc;
        }

        Ok(SegmentCache {
            integrand,
            t_min,
            t_max,
            step,
            lower,
            upper,
        })
    }

    /// Number of segments `N` (tables hold `N + 1` entries).
    pub fn samples(&self) -> usize {
        self.lower.len() - 1
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.t_min, self.t_max)
    }

    /// Grid point `t_i`, `i ∈ 0..=N`.
    pub fn knot(&self, i: usize) -> f64 {
        if i >= self.samples() {
            self.t_max
        } else {
            self.t_min + i as f64 * self.step
        }
    }

    pub fn lower_table(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper_table(&self) -> &[f64] {
        &self.upper
    }

    /// Integral over the whole interval.
    pub fn total(&self) -> f64 {
        self.lower[self.samples()]
    }

    /// `∫_{t_min}^{t} f`, saturating outside the interval.
    pub fn lower(&self, t: f64) -> f64 {
        if t.is_nan() {
            return f64::NAN;
        }
        if t <= self.t_min {
            return 0.0;
        }
        if t >= self.t_max {
            return self.total();
        }
        let i = self.segment_of(t);
        let seg = self.lower[i + 1] - self.lower[i];
        let left = self.knot(i);
        if t == left {
            return self.lower[i];
        }
        let partial = gauss_legendre(&self.integrand, left, t).clamp(0.0, seg);
        self.lower[i] + partial
    }

    /// `∫_{t}^{t_max} f`, saturating outside the interval.
    pub fn upper(&self, t: f64) -> f64 {
        if t.is_nan() {
            return f64::NAN;
        }
        if t <= self.t_min {
            return self.total_upper();
        }
        if t >= self.t_max {
            return 0.0;
        }
        let i = self.segment_of(t);
        let seg = self.upper[i] - self.upper[i + 1];
        let left = self.knot(i);
        if t == left {
            return self.upper[i];
        }
        let partial = gauss_legendre(&self.integrand, t, self.knot(i + 1)).clamp(0.0, seg);
        self.upper[i + 1] + partial
    }

    fn total_upper(&self) -> f64 {
        self.upper[0]
    }

    fn segment_of(&self, t: f64) -> usize {
        let i = ((t - self.t_min) / self.step).floor();
        (i.max(0.0) as usize).min(self.samples() - 1)
    }
}

impl std::fmt::Debug for SegmentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentCache")
            .field("t_min", &self.t_min)
            .field("t_max", &self.t_max)
            .field("samples", &self.samples())
            .field("total", &self.total())
            .finish()
    }
}

fn density_or_zero(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

fn gauss_legendre(f: &Integrand, a: f64, b: f64) -> f64 {
    let mid = 0.5 * (a + b);
    let half = 0.5 * (b - a);
    let mut sum = 0.0;
    for (node, weight) in GL_NODES.iter().zip(GL_WEIGHTS.iter()) {
        sum += weight * density_or_zero(f(mid + half * node));
    }
    sum * half
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn constant_integrand_on_four_segments() {
        let cache = SegmentCache::new(|_| 1.0, 0.0, 1.0, 4).unwrap();
        assert_eq!(cache.lower_table().len(), 5);
        assert_abs_diff_eq!(cache.lower(0.5), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(cache.upper(0.5), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(cache.lower(1.0), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(cache.lower(0.3), 0.3, epsilon = 1e-15);
    }

    #[test]
    fn tables_are_monotone_and_sum_to_total() {
        let cache = SegmentCache::new(|t: f64| (3.0 * t).sin() + 1.5, 0.0, 2.0, 64).unwrap();
        let total = cache.total();
        for w in cache.lower_table().windows(2) {
            assert!(w[1] >= w[0]);
        }
        for w in cache.upper_table().windows(2) {
            assert!(w[1] <= w[0]);
        }
        for k in 0..=200 {
            let t = 2.0 * k as f64 / 200.0;
            assert_abs_diff_eq!(cache.lower(t) + cache.upper(t), total, epsilon = 1e-12);
        }
    }

    #[test]
    fn non_finite_values_contribute_zero() {
        let cache = SegmentCache::new(|t: f64| if t < 0.5 { f64::NAN } else { 1.0 }, 0.0, 1.0, 2).unwrap();
        assert_abs_diff_eq!(cache.total(), 0.5, epsilon = 1e-15);
        assert!(cache.lower(0.25) == 0.0);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(SegmentCache::new(|_| 1.0, 0.0, 1.0, 0).is_err());
        assert!(SegmentCache::new(|_| 1.0, 1.0, 1.0, 4).is_err());
        assert!(SegmentCache::new(|_| 1.0, 0.0, f64::INFINITY, 4).is_err());
    }

    #[test]
    fn pulled_back_exponential_density_integrates_to_one() {
        let domain = ReparametrizedDomain::lower_bounded(0.0, 1.0).unwrap();
        let g = domain.pullback(|x: f64| if x >= 0.0 { (-x).exp() } else { 0.0 });
        let cache = SegmentCache::new(g, 0.0, 1.0, 256).unwrap();
        assert_abs_diff_eq!(cache.total(), 1.0, epsilon = 1e-10);
        let t = domain.to_t(1.0);
        assert_abs_diff_eq!(cache.lower(t), 1.0 - (-1.0f64).exp(), epsilon = 1e-10);
    }

    #[test]
    fn domain_round_trips() {
        let domains = [
            ReparametrizedDomain::bounded(-2.0, 3.0).unwrap(),
            ReparametrizedDomain::lower_bounded(1.0, 0.5).unwrap(),
            ReparametrizedDomain::unbounded(-1.0, 2.0).unwrap(),
        ];
        for d in domains {
            for k in 1..100 {
                let t = k as f64 / 100.0;
                assert_abs_diff_eq!(d.to_t(d.to_x(t)), t, epsilon = 1e-12);
            }
        }
        let line = ReparametrizedDomain::unbounded(0.0, 1.0).unwrap();
        assert_eq!(line.bounds(), (f64::NEG_INFINITY, f64::INFINITY));
        assert_eq!(line.to_x(0.5), 0.0);
    }

    #[test]
    fn far_left_tail_keeps_relative_precision() {
        let line = ReparametrizedDomain::unbounded(0.0, 2.0).unwrap();
        for &x in &[-1e17, -3.5e40, -1e100] {
            let t = line.to_t(x);
            assert!(t > 0.0);
            assert_abs_diff_eq!(line.to_x(t) / x, 1.0, epsilon = 1e-12);
        }
    }
}
