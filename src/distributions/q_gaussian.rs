use std::f64::consts::PI;

use rand::Rng;
use rand::distributions::{Distribution, Open01};
use statrs::function::gamma::ln_gamma;

use super::tabulated::{LazyTable, TabulatedCdf};
use super::traits::{
    Cumulative, Density, Fittable, Moments, Sampler, Scalable, Shiftable, boundary_quantile, scale_factor,
};
use crate::domain::Interval;
use crate::error::{ParamError, require_finite, require_positive};
use crate::fit::{Affine, FitOutcome, FitSettings, QuantileGrid, ShapeAxis, ShapeSearch, fit_by_shape};
use crate::math::{DEFAULT_SEGMENTS, ReparametrizedDomain};

/// Search range for `q` when fitting.
const FIT_Q_RANGE: (f64, f64) = (-2.0, 2.9);

/// Tsallis q-Gaussian with location `μ`, entropic index `q < 3` and
/// inverse-width `β`.
///
/// `q < 1` has compact support, `q = 1` is the normal distribution with
/// variance `1/(2β)`, `1 < q < 3` has power-law tails. CDF and quantile go
/// through a segment cache of the density.
#[derive(Debug, Clone)]
pub struct QGaussian {
    mean: f64,
    q: f64,
    beta: f64,
    /// `ln(√β / C_q)`.
    log_norm: f64,
    table: LazyTable<TabulatedCdf>,
}

impl QGaussian {
    pub fn new(mean: f64, q: f64, beta: f64) -> Result<Self, ParamError> {
        require_finite("mean", mean)?;
        require_finite("q", q)?;
        if q >= 3.0 {
            return Err(ParamError::out_of_range("q", q, "< 3"));
        }
        require_positive("beta", beta)?;
        let log_norm = 0.5 * beta.ln() - ln_normalization(q);
        Ok(QGaussian {
            mean,
            q,
            beta,
            log_norm,
            table: LazyTable::new(),
        })
    }

    pub fn location(&self) -> f64 {
        self.mean
    }

    pub fn q(&self) -> f64 {
        self.q
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Half-width of the support for `q < 1`.
    fn half_width(&self) -> Option<f64> {
        (self.q < 1.0).then(|| 1.0 / (self.beta * (1.0 - self.q)).sqrt())
    }

    fn domain(&self) -> Result<ReparametrizedDomain, ParamError> {
        match self.half_width() {
            Some(r) => ReparametrizedDomain::bounded(self.mean - r, self.mean + r),
            None => ReparametrizedDomain::unbounded(self.mean, 1.0 / self.beta.sqrt()),
        }
    }

    fn table(&self) -> Option<&TabulatedCdf> {
        self.table.get_or_build(|| {
            let (mean, q, beta, log_norm) = (self.mean, self.q, self.beta, self.log_norm);
            let density = move |x: f64| density(mean, q, beta, log_norm, x);
            TabulatedCdf::symmetric(density, self.domain()?, DEFAULT_SEGMENTS, mean)
        })
    }
}

/// `ln C_q`, the normalization of `e_q(-x²)`.
fn ln_normalization(q: f64) -> f64 {
    let ln_sqrt_pi = 0.5 * PI.ln();
    if (q - 1.0).abs() < 1e-12 {
        ln_sqrt_pi
    } else if q < 1.0 {
        let a = 1.0 - q;
        (2.0f64).ln() + ln_sqrt_pi + ln_gamma(1.0 / a) - ((3.0 - q).ln() + 0.5 * a.ln() + ln_gamma((3.0 - q) / (2.0 * a)))
    } else {
        let a = q - 1.0;
        ln_sqrt_pi + ln_gamma((3.0 - q) / (2.0 * a)) - (0.5 * a.ln() + ln_gamma(1.0 / a))
    }
}

/// Tsallis q-exponential `e_q(u) = [1 + (1-q) u]_+^{1/(1-q)}`.
pub(crate) fn q_exp(q: f64, u: f64) -> f64 {
    if (q - 1.0).abs() < 1e-12 {
        return u.exp();
    }
    let base = 1.0 + (1.0 - q) * u;
    if base <= 0.0 {
        return if q < 1.0 { 0.0 } else { f64::INFINITY };
    }
    (base.ln() / (1.0 - q)).exp()
}

/// Tsallis q-logarithm, the inverse of [`q_exp`].
fn q_ln(q: f64, x: f64) -> f64 {
    if (q - 1.0).abs() < 1e-12 {
        return x.ln();
    }
    ((1.0 - q) * x.ln()).exp_m1() / (1.0 - q)
}

fn density(mean: f64, q: f64, beta: f64, log_norm: f64, x: f64) -> f64 {
    if !x.is_finite() {
        return 0.0;
    }
    let d = x - mean;
    log_norm.exp() * q_exp(q, -beta * d * d)
}

impl Density for QGaussian {
    fn pdf(&self, x: f64) -> f64 {
        density(self.mean, self.q, self.beta, self.log_norm, x)
    }

    fn support(&self) -> (f64, f64) {
        match self.half_width() {
            Some(r) => (self.mean - r, self.mean + r),
            None => (f64::NEG_INFINITY, f64::INFINITY),
        }
    }
}

impl Cumulative for QGaussian {
    fn cdf(&self, x: f64, interval: Interval) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        match self.table() {
            Some(table) => table.cdf(x, interval),
            None => f64::NAN,
        }
    }

    fn quantile(&self, p: f64, interval: Interval) -> f64 {
        if let Some(x) = boundary_quantile(p, interval, self.support()) {
            return x;
        }
        let Some(table) = self.table() else {
            return f64::NAN;
        };
        table.quantile(p, interval, |x| self.pdf(x))
    }

    fn median(&self) -> f64 {
        self.mean
    }
}

impl Moments for QGaussian {
    fn mean(&self) -> Option<f64> {
        (self.q < 2.0).then_some(self.mean)
    }

    fn variance(&self) -> Option<f64> {
        (self.q < 5.0 / 3.0).then(|| 1.0 / (self.beta * (5.0 - 3.0 * self.q)))
    }

    fn skewness(&self) -> Option<f64> {
        (self.q < 1.5).then_some(0.0)
    }

    fn excess_kurtosis(&self) -> Option<f64> {
        (self.q < 7.0 / 5.0).then(|| 6.0 * (self.q - 1.0) / (7.0 - 5.0 * self.q))
    }
}

impl Sampler for QGaussian {
    /// Generalized Box–Muller.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let q_prime = (1.0 + self.q) / (3.0 - self.q);
        let u1: f64 = Open01.sample(rng);
        let u2: f64 = Open01.sample(rng);
        let z = (-2.0 * q_ln(q_prime, u1)).sqrt() * (2.0 * PI * u2).cos();
        self.mean + z / (self.beta * (3.0 - self.q)).sqrt()
    }
}

impl Scalable for QGaussian {
    fn scaled(&self, factor: f64) -> Result<Self, ParamError> {
        let c = scale_factor(factor)?;
        QGaussian::new(self.mean * c, self.q, self.beta / (c * c))
    }
}

impl Shiftable for QGaussian {
    fn shifted(&self, offset: f64) -> Result<Self, ParamError> {
        QGaussian::new(self.mean + offset, self.q, self.beta)
    }
}

impl Fittable for QGaussian {
    fn fit_quantiles(grid: &QuantileGrid, settings: &FitSettings) -> FitOutcome<Self> {
        let (lo, hi) = FIT_Q_RANGE;
        fit_by_shape(
            "q-gaussian",
            grid,
            settings,
            Affine::LocationScale,
            ShapeSearch::Grid(ShapeAxis::Interval { lo, hi }),
            |q| QGaussian::new(0.0, q[0], 1.0),
            |q, fit| QGaussian::new(fit.location, q[0], 1.0 / (fit.scale * fit.scale)),
        )
    }
}
