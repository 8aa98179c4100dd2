use super::traits::{
    Cumulative, Density, Fittable, Moments, Sampler, Scalable, boundary_quantile, scale_factor, standardized_moments,
};
use crate::domain::Interval;
use crate::error::{ParamError, require_finite, require_positive};
use crate::fit::{Affine, FitOutcome, FitSettings, QuantileGrid, ShapeAxis, ShapeSearch, fit_by_shape};

const FIT_Q_RANGE: (f64, f64) = (-1.0, 2.0);

/// Tsallis q-exponential with index `q < 2` and rate `λ`.
///
/// `q < 1` is supported on `[0, 1/(λ(1-q))]`, `q = 1` is the exponential
/// distribution and `1 < q < 2` is a Lomax (Pareto II) tail. Survival is
/// `[1 - (1-q) λ x]^{(2-q)/(1-q)}`, so both tails invert in closed form.
#[derive(Debug, Clone, PartialEq)]
pub struct QExponential {
    q: f64,
    rate: f64,
}

impl QExponential {
    pub fn new(q: f64, rate: f64) -> Result<Self, ParamError> {
        require_finite("q", q)?;
        if q >= 2.0 {
            return Err(ParamError::out_of_range("q", q, "< 2"));
        }
        Ok(QExponential {
            q,
            rate: require_positive("rate", rate)?,
        })
    }

    pub fn q(&self) -> f64 {
        self.q
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    fn is_exponential(&self) -> bool {
        (self.q - 1.0).abs() < 1e-12
    }

    /// `ln S(x)` for `x` inside the support.
    fn ln_survival(&self, x: f64) -> f64 {
        if self.is_exponential() {
            return -self.rate * x;
        }
        let k = 1.0 - self.q;
        (2.0 - self.q) / k * (-k * self.rate * x).ln_1p()
    }

    /// Inverse of [`Self::ln_survival`].
    fn from_ln_survival(&self, ln_s: f64) -> f64 {
        if self.is_exponential() {
            return -ln_s / self.rate;
        }
        let k = 1.0 - self.q;
        -(k / (2.0 - self.q) * ln_s).exp_m1() / (k * self.rate)
    }

    /// `E[X^n] = n! Π_{j=1..n} 1 / (λ (j + 2 - q (j + 1)))`, finite for
    /// `q < (n + 2) / (n + 1)`.
    fn raw_moment(&self, n: u32) -> Option<f64> {
        let mut m = 1.0;
        for j in 1..=n {
            let j = f64::from(j);
            let denom = j + 2.0 - self.q * (j + 1.0);
            if denom <= 0.0 {
                return None;
            }
            m *= j / (self.rate * denom);
        }
        Some(m)
    }

    fn standardized(&self) -> Option<[f64; 4]> {
        Some(standardized_moments([
            self.raw_moment(1)?,
            self.raw_moment(2)?,
            self.raw_moment(3)?,
            self.raw_moment(4)?,
        ]))
    }
}

impl Density for QExponential {
    fn pdf(&self, x: f64) -> f64 {
        let (lo, hi) = self.support();
        if !(lo..=hi).contains(&x) || x == f64::INFINITY {
            return 0.0;
        }
        if self.is_exponential() {
            return self.rate * (-self.rate * x).exp();
        }
        let k = 1.0 - self.q;
        let base = 1.0 - k * self.rate * x;
        if base <= 0.0 {
            return 0.0;
        }
        (2.0 - self.q) * self.rate * (base.ln() / k).exp()
    }

    fn support(&self) -> (f64, f64) {
        if self.q < 1.0 && !self.is_exponential() {
            (0.0, 1.0 / ((1.0 - self.q) * self.rate))
        } else {
            (0.0, f64::INFINITY)
        }
    }
}

impl Cumulative for QExponential {
    fn cdf(&self, x: f64, interval: Interval) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let (lo, hi) = self.support();
        let ln_s = if x <= lo {
            0.0
        } else if x >= hi {
            f64::NEG_INFINITY
        } else {
            self.ln_survival(x)
        };
        match interval {
            Interval::Lower => -ln_s.exp_m1(),
            Interval::Upper => ln_s.exp(),
        }
    }

    fn quantile(&self, p: f64, interval: Interval) -> f64 {
        if let Some(x) = boundary_quantile(p, interval, self.support()) {
            return x;
        }
        let ln_s = match interval {
            Interval::Lower => (-p).ln_1p(),
            Interval::Upper => p.ln(),
        };
        let (lo, hi) = self.support();
        self.from_ln_survival(ln_s).max(lo).min(hi)
    }
}

impl Moments for QExponential {
    fn mean(&self) -> Option<f64> {
        self.raw_moment(1)
    }

    fn variance(&self) -> Option<f64> {
        let m1 = self.raw_moment(1)?;
        Some(self.raw_moment(2)? - m1 * m1)
    }

    fn skewness(&self) -> Option<f64> {
        self.standardized().map(|m| m[2])
    }

    fn excess_kurtosis(&self) -> Option<f64> {
        self.standardized().map(|m| m[3])
    }
}

impl Sampler for QExponential {}

impl Scalable for QExponential {
    fn scaled(&self, factor: f64) -> Result<Self, ParamError> {
        QExponential::new(self.q, self.rate / scale_factor(factor)?)
    }
}

impl Fittable for QExponential {
    fn fit_quantiles(grid: &QuantileGrid, settings: &FitSettings) -> FitOutcome<Self> {
        let (lo, hi) = FIT_Q_RANGE;
        fit_by_shape(
            "q-exponential",
            grid,
            settings,
            Affine::ScaleOnly,
            ShapeSearch::Bisect(ShapeAxis::Interval { lo, hi }),
            |q| QExponential::new(q[0], 1.0),
            |q, fit| QExponential::new(q[0], 1.0 / fit.scale),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::Exponential;
    use approx::assert_relative_eq;

    #[test]
    fn q_one_is_exponential() {
        let d = QExponential::new(1.0, 0.5).unwrap();
        let e = Exponential::new(2.0).unwrap();
        for &x in &[0.1, 1.0, 7.0] {
            assert_relative_eq!(d.pdf(x), e.pdf(x), max_relative = 1e-12);
            assert_relative_eq!(d.cdf(x, Interval::Upper), e.cdf(x, Interval::Upper), max_relative = 1e-12);
        }
        assert_relative_eq!(d.variance().unwrap(), 4.0, max_relative = 1e-12);
        assert_relative_eq!(d.skewness().unwrap(), 2.0, max_relative = 1e-9);
    }

    #[test]
    fn heavy_tail_is_lomax() {
        // q = 1.5: α = 1, scale 2/λ, so S(x) = 1 / (1 + λx/2).
        let d = QExponential::new(1.5, 1.0).unwrap();
        assert_relative_eq!(d.cdf(2.0, Interval::Upper), 0.5, max_relative = 1e-12);
        assert!(d.mean().is_none());
        assert!(d.variance().is_none());
    }

    #[test]
    fn bounded_support_below_one() {
        let d = QExponential::new(0.5, 2.0).unwrap();
        assert_eq!(d.support(), (0.0, 1.0));
        assert_eq!(d.quantile(1.0, Interval::Lower), 1.0);
        assert_eq!(d.cdf(1.5, Interval::Lower), 1.0);
        assert_eq!(d.pdf(1.5), 0.0);
        // Beta(1, 3) scaled by 1: mean 1/4.
        assert_relative_eq!(d.mean().unwrap(), 0.25, max_relative = 1e-12);
    }

    #[test]
    fn quantile_round_trips() {
        for &q in &[-0.5, 0.5, 1.0, 1.7] {
            let d = QExponential::new(q, 1.3).unwrap();
            for &p in &[1e-8, 0.1, 0.5, 0.9, 1.0 - 1e-8] {
                assert_relative_eq!(d.cdf(d.quantile(p, Interval::Lower), Interval::Lower), p, max_relative = 1e-10);
                assert_relative_eq!(d.cdf(d.quantile(p, Interval::Upper), Interval::Upper), p, max_relative = 1e-10);
            }
        }
    }
}
