//! Bracketed Newton–Raphson polish of a table-based quantile estimate.
//!
//! The PDF is the derivative of the CDF, so each step is
//! `x ← x - r(x) / pdf(x)` with `r` the signed CDF residual oriented to be
//! increasing in `x` for both tails. Every iterate stays inside the bracket;
//! a step that would leave it is replaced by bisection.

use crate::domain::Interval;
use crate::math::quantile_builder::QuantileBracket;

/// Maximum number of outward doublings when the bracket has to be widened.
const MAX_WIDENINGS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonSettings {
    pub max_iterations: usize,
    /// Stop once `|Δx| <= relative_tolerance · |x|`.
    pub relative_tolerance: f64,
}

impl Default for NewtonSettings {
    fn default() -> Self {
        NewtonSettings {
            max_iterations: 64,
            relative_tolerance: 1e-14,
        }
    }
}

impl QuantileBracket {
    /// Polish the estimate so that `cdf(x, interval) ≈ target`.
    ///
    /// Never returns NaN for a finite starting bracket: a NaN residual stops
    /// the iteration and the last finite iterate is returned. With one
    /// infinite end the search steps outward until the residual changes sign,
    /// after which the bracket is finite and shrinks as usual.
    pub fn refine<C, D>(&self, target: f64, interval: Interval, cdf: C, pdf: D, settings: &NewtonSettings) -> f64
    where
        C: Fn(f64, Interval) -> f64,
        D: Fn(f64) -> f64,
    {
        let residual = |x: f64| match interval {
            Interval::Lower => cdf(x, Interval::Lower) - target,
            Interval::Upper => target - cdf(x, Interval::Upper),
        };

        let (mut lo, mut hi) = widen(self.low, self.high, &residual);

        let mut x = self.estimate;
        if !x.is_finite() {
            x = if lo.is_finite() && hi.is_finite() {
                0.5 * (lo + hi)
            } else if lo.is_finite() {
                lo
            } else if hi.is_finite() {
                hi
            } else {
                0.0
            };
        }
        x = x.max(lo).min(hi);

        // Outward growth factor for one-sided brackets; squared after every use.
        let mut growth = 2.0_f64;
        for _ in 0..settings.max_iterations {
            let r = residual(x);
            if r.is_nan() {
                break;
            }
            if r == 0.0 {
                return x;
            }
            if r < 0.0 {
                lo = x;
            } else {
                hi = x;
            }

            let newton = x - r / pdf(x);
            let bounded = lo.is_finite() && hi.is_finite();
            let next = if bounded {
                if newton.is_finite() && newton > lo && newton < hi {
                    newton
                } else {
                    midpoint(lo, hi)
                }
            } else {
                // The root lies towards the infinite end: take the farther of
                // the Newton step and a reach that grows doubly exponentially.
                let reach = x.abs().max(1.0) * (growth - 1.0);
                growth = (growth * growth).min(f64::MAX);
                if r < 0.0 {
                    let far = (x + reach).min(f64::MAX);
                    if newton.is_finite() && newton > far { newton } else { far }
                } else {
                    let far = (x - reach).max(f64::MIN);
                    if newton.is_finite() && newton < far { newton } else { far }
                }
            };
            if next == x {
                tracing::debug!(x, r, "quantile search cannot move further");
                break;
            }

            let converged = (next - x).abs() <= settings.relative_tolerance * next.abs().max(f64::MIN_POSITIVE);
            let collapsed = bounded && hi - lo <= settings.relative_tolerance * lo.abs().max(hi.abs());
            x = next;
            if converged || collapsed {
                return x;
            }
        }

        x
    }
}

/// Bisection point of `[lo, hi]`; geometric when both ends share a sign and
/// span more than a factor of 16. A zero end counts as `ε` times the other.
fn midpoint(lo: f64, hi: f64) -> f64 {
    if lo >= 0.0 && hi > 16.0 * lo {
        (lo.max(hi * f64::EPSILON) * hi).sqrt()
    } else if hi <= 0.0 && lo < 16.0 * hi {
        -(lo.abs() * hi.abs().max(lo.abs() * f64::EPSILON)).sqrt()
    } else {
        0.5 * (lo + hi)
    }
}

/// Push finite bracket ends outward until the residual changes sign across them.
fn widen<R>(mut lo: f64, mut hi: f64, residual: &R) -> (f64, f64)
where
    R: Fn(f64) -> f64,
{
    if lo.is_finite() && residual(lo) > 0.0 {
        let mut step = (hi - lo).abs().max(lo.abs() * f64::EPSILON).max(f64::MIN_POSITIVE);
        if !step.is_finite() {
            step = lo.abs().max(1.0);
        }
        let original = lo;
        for _ in 0..MAX_WIDENINGS {
            hi = hi.min(original);
            lo = original - step;
            if !(residual(lo) > 0.0) {
                break;
            }
            step *= 2.0;
        }
    }
    if hi.is_finite() && residual(hi) < 0.0 {
        let mut step = (hi - lo).abs().max(hi.abs() * f64::EPSILON).max(f64::MIN_POSITIVE);
        if !step.is_finite() {
            step = hi.abs().max(1.0);
        }
        let original = hi;
        for _ in 0..MAX_WIDENINGS {
            lo = lo.max(original);
            hi = original + step;
            if !(residual(hi) < 0.0) {
                break;
            }
            step *= 2.0;
        }
    }
    (lo, hi)
}
