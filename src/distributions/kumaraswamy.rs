use statrs::function::beta::ln_beta;

use super::traits::{Cumulative, Density, Fittable, Moments, Sampler, boundary_quantile, standardized_moments};
use crate::domain::Interval;
use crate::error::{ParamError, require_positive};
use crate::fit::{Affine, FitOutcome, FitSettings, QuantileGrid, ShapeAxis, ShapeSearch, fit_by_shape};

/// Kumaraswamy distribution on `[0, 1]` with shapes `a` and `b`.
///
/// `F(x) = 1 - (1 - x^a)^b`, inverted in closed form for both tails.
#[derive(Debug, Clone, PartialEq)]
pub struct Kumaraswamy {
    a: f64,
    b: f64,
}

impl Kumaraswamy {
    pub fn new(a: f64, b: f64) -> Result<Self, ParamError> {
        Ok(Kumaraswamy {
            a: require_positive("a", a)?,
            b: require_positive("b", b)?,
        })
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    /// `E[X^n] = b B(1 + n/a, b)`.
    fn raw_moment(&self, n: f64) -> f64 {
        self.b * ln_beta(1.0 + n / self.a, self.b).exp()
    }

    fn standardized(&self) -> [f64; 4] {
        standardized_moments([self.raw_moment(1.0), self.raw_moment(2.0), self.raw_moment(3.0), self.raw_moment(4.0)])
    }
}

impl Density for Kumaraswamy {
    fn pdf(&self, x: f64) -> f64 {
        if !(0.0..=1.0).contains(&x) {
            return 0.0;
        }
        let xa = x.powf(self.a);
        let log = (self.a * self.b).ln() + (self.a - 1.0) * x.ln() + (self.b - 1.0) * (-xa).ln_1p();
        log.exp()
    }

    fn support(&self) -> (f64, f64) {
        (0.0, 1.0)
    }
}

impl Cumulative for Kumaraswamy {
    fn cdf(&self, x: f64, interval: Interval) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        // ln of the upper tail, (1 - x^a)^b.
        let ln_s = self.b * (-x.clamp(0.0, 1.0).powf(self.a)).ln_1p();
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
        (-(ln_s / self.b).exp_m1()).powf(1.0 / self.a)
    }
}

impl Moments for Kumaraswamy {
    fn mean(&self) -> Option<f64> {
        Some(self.raw_moment(1.0))
    }

    fn variance(&self) -> Option<f64> {
        Some(self.standardized()[1])
    }

    fn skewness(&self) -> Option<f64> {
        Some(self.standardized()[2])
    }

    fn excess_kurtosis(&self) -> Option<f64> {
        Some(self.standardized()[3])
    }
}

impl Sampler for Kumaraswamy {}

impl Fittable for Kumaraswamy {
    /// Both shapes are searched jointly; the support is fixed, so no affine map.
    fn fit_quantiles(grid: &QuantileGrid, settings: &FitSettings) -> FitOutcome<Self> {
        fit_by_shape(
            "kumaraswamy",
            grid,
            settings,
            Affine::None,
            ShapeSearch::Grid2d([ShapeAxis::HalfLine, ShapeAxis::HalfLine]),
            |ab| Kumaraswamy::new(ab[0], ab[1]),
            |ab, _| Kumaraswamy::new(ab[0], ab[1]),
        )
    }
}
