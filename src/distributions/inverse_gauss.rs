use std::f64::consts::{PI, SQRT_2};

use rand::Rng;
use rand_distr::{Distribution, InverseGaussian};
use statrs::function::erf::erfc;

use super::tabulated::{LazyTable, refine_quantile};
use super::traits::{
    Cumulative, Density, Fittable, Moments, Sampler, Scalable, boundary_quantile, inverse_transform, scale_factor,
};
use crate::domain::Interval;
use crate::error::{ParamError, require_positive};
use crate::fit::{Affine, FitOutcome, FitSettings, QuantileGrid, ShapeAxis, ShapeSearch, fit_by_shape};
use crate::math::{DEFAULT_SEGMENTS, QuantileBuilder, ReparametrizedDomain};

/// Beyond this argument `erfc` underflows and `ln Φ(-b)` switches to its
/// asymptotic series.
const LOG_PHI_ASYMPTOTIC: f64 = 35.0;

/// Inverse Gaussian (Wald) distribution with mean `μ` and shape `λ`.
///
/// The CDF is closed-form; quantiles come from a tabulated density seeding a
/// Newton polish against that CDF.
#[derive(Debug, Clone)]
pub struct InverseGauss {
    mean: f64,
    shape: f64,
    table: LazyTable<QuantileBuilder>,
}

impl InverseGauss {
    pub fn new(mean: f64, shape: f64) -> Result<Self, ParamError> {
        Ok(InverseGauss {
            mean: require_positive("mean", mean)?,
            shape: require_positive("shape", shape)?,
            table: LazyTable::new(),
        })
    }

    /// The mean parameter `μ`.
    pub fn mu(&self) -> f64 {
        self.mean
    }

    pub fn shape(&self) -> f64 {
        self.shape
    }

    fn build_table(&self) -> Result<QuantileBuilder, ParamError> {
        let (mean, shape) = (self.mean, self.shape);
        let domain = ReparametrizedDomain::lower_bounded(0.0, mean)?;
        QuantileBuilder::from_density(move |x| density(mean, shape, x), domain, DEFAULT_SEGMENTS)
    }

    /// `e^{2λ/μ} Φ(-b)`, evaluated in log space.
    fn reflected_term(&self, b: f64) -> f64 {
        (2.0 * self.shape / self.mean + ln_normal_upper(b)).exp()
    }
}

fn density(mean: f64, shape: f64, x: f64) -> f64 {
    if x <= 0.0 || x == f64::INFINITY {
        return 0.0;
    }
    let d = x - mean;
    (shape / (2.0 * PI * x.powi(3))).sqrt() * (-shape * d * d / (2.0 * mean * mean * x)).exp()
}

/// `Φ(-z) = P(N(0,1) > z)`.
fn normal_upper(z: f64) -> f64 {
    0.5 * erfc(z / SQRT_2)
}

/// `ln Φ(-z)` without underflow for large positive `z`.
fn ln_normal_upper(z: f64) -> f64 {
    if z < LOG_PHI_ASYMPTOTIC {
        return normal_upper(z).ln();
    }
    let z2 = z * z;
    let z4 = z2 * z2;
    let series = 1.0 - 1.0 / z2 + 3.0 / z4 - 15.0 / (z4 * z2) + 105.0 / (z4 * z4);
    -0.5 * z2 - (z * (2.0 * PI).sqrt()).ln() + series.ln()
}

impl Density for InverseGauss {
    fn pdf(&self, x: f64) -> f64 {
        density(self.mean, self.shape, x)
    }

    fn support(&self) -> (f64, f64) {
        (0.0, f64::INFINITY)
    }
}

impl Cumulative for InverseGauss {
    fn cdf(&self, x: f64, interval: Interval) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x <= 0.0 {
            return match interval {
                Interval::Lower => 0.0,
                Interval::Upper => 1.0,
            };
        }
        if x == f64::INFINITY {
            return match interval {
                Interval::Lower => 1.0,
                Interval::Upper => 0.0,
            };
        }
        let r = (self.shape / x).sqrt();
        let a = r * (x / self.mean - 1.0);
        let b = r * (x / self.mean + 1.0);
        let value = match interval {
            Interval::Lower => normal_upper(-a) + self.reflected_term(b),
            Interval::Upper => normal_upper(a) - self.reflected_term(b),
        };
        value.clamp(0.0, 1.0)
    }

    fn quantile(&self, p: f64, interval: Interval) -> f64 {
        if let Some(x) = boundary_quantile(p, interval, self.support()) {
            return x;
        }
        let Some(table) = self.table.get_or_build(|| self.build_table()) else {
            return f64::NAN;
        };
        refine_quantile(table, p, interval, |x, i| self.cdf(x, i), |x| self.pdf(x))
    }
}

impl Moments for InverseGauss {
    fn mean(&self) -> Option<f64> {
        Some(self.mean)
    }

    fn variance(&self) -> Option<f64> {
        Some(self.mean.powi(3) / self.shape)
    }

    fn skewness(&self) -> Option<f64> {
        Some(3.0 * (self.mean / self.shape).sqrt())
    }

    fn excess_kurtosis(&self) -> Option<f64> {
        Some(15.0 * self.mean / self.shape)
    }
}

impl Sampler for InverseGauss {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match InverseGaussian::new(self.mean, self.shape) {
            Ok(ig) => ig.sample(rng),
            Err(_) => inverse_transform(self, rng),
        }
    }
}

impl Scalable for InverseGauss {
    /// `c · IG(μ, λ) = IG(cμ, cλ)`.
    fn scaled(&self, factor: f64) -> Result<Self, ParamError> {
        let c = scale_factor(factor)?;
        InverseGauss::new(self.mean * c, self.shape * c)
    }
}

impl Fittable for InverseGauss {
    /// Searches the ratio `φ = λ/μ`; the unit-mean member is then scaled.
    fn fit_quantiles(grid: &QuantileGrid, settings: &FitSettings) -> FitOutcome<Self> {
        fit_by_shape(
            "inverse-gauss",
            grid,
            settings,
            Affine::ScaleOnly,
            ShapeSearch::Grid(ShapeAxis::HalfLine),
            |ratio| InverseGauss::new(1.0, ratio[0]),
            |ratio, fit| InverseGauss::new(fit.scale, ratio[0] * fit.scale),
        )
    }
}
