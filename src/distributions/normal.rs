use std::f64::consts::{PI, SQRT_2};

use rand::Rng;
use rand_distr::Distribution;
use statrs::function::erf::{erfc, erfc_inv};

use super::traits::{
    Additive, Cumulative, Density, Fittable, Moments, Sampler, Scalable, Shiftable, boundary_quantile,
    inverse_transform, scale_factor,
};
use crate::domain::Interval;
use crate::error::{ParamError, require_finite, require_positive};
use crate::fit::{Affine, FitOutcome, FitSettings, QuantileGrid, ShapeSearch, fit_by_shape};

/// Normal distribution `N(μ, σ²)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Normal {
    mean: f64,
    std_dev: f64,
}

impl Normal {
    pub fn new(mean: f64, std_dev: f64) -> Result<Self, ParamError> {
        Ok(Normal {
            mean: require_finite("mean", mean)?,
            std_dev: require_positive("std_dev", std_dev)?,
        })
    }

    pub fn standard() -> Self {
        Normal { mean: 0.0, std_dev: 1.0 }
    }

    pub fn location(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }
}

impl Density for Normal {
    fn pdf(&self, x: f64) -> f64 {
        let z = (x - self.mean) / self.std_dev;
        (-0.5 * z * z).exp() / (self.std_dev * (2.0 * PI).sqrt())
    }

    fn support(&self) -> (f64, f64) {
        (f64::NEG_INFINITY, f64::INFINITY)
    }
}

impl Cumulative for Normal {
    fn cdf(&self, x: f64, interval: Interval) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let z = (x - self.mean) / (self.std_dev * SQRT_2);
        match interval {
            Interval::Lower => 0.5 * erfc(-z),
            Interval::Upper => 0.5 * erfc(z),
        }
    }

    fn quantile(&self, p: f64, interval: Interval) -> f64 {
        if let Some(x) = boundary_quantile(p, interval, self.support()) {
            return x;
        }
        let z = self.std_dev * SQRT_2 * erfc_inv(2.0 * p);
        match interval {
            Interval::Lower => self.mean - z,
            Interval::Upper => self.mean + z,
        }
    }

    fn median(&self) -> f64 {
        self.mean
    }
}

impl Moments for Normal {
    fn mean(&self) -> Option<f64> {
        Some(self.mean)
    }

    fn variance(&self) -> Option<f64> {
        Some(self.std_dev * self.std_dev)
    }

    fn skewness(&self) -> Option<f64> {
        Some(0.0)
    }

    fn excess_kurtosis(&self) -> Option<f64> {
        Some(0.0)
    }
}

impl Sampler for Normal {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match rand_distr::Normal::new(self.mean, self.std_dev) {
            Ok(normal) => normal.sample(rng),
            Err(_) => inverse_transform(self, rng),
        }
    }
}

impl Scalable for Normal {
    fn scaled(&self, factor: f64) -> Result<Self, ParamError> {
        let c = scale_factor(factor)?;
        Normal::new(self.mean * c, self.std_dev * c)
    }
}

impl Shiftable for Normal {
    fn shifted(&self, offset: f64) -> Result<Self, ParamError> {
        Normal::new(self.mean + offset, self.std_dev)
    }
}

impl Additive for Normal {
    fn add_independent(&self, other: &Self) -> Result<Self, ParamError> {
        Normal::new(self.mean + other.mean, self.std_dev.hypot(other.std_dev))
    }
}

impl Fittable for Normal {
    fn fit_quantiles(grid: &QuantileGrid, settings: &FitSettings) -> FitOutcome<Self> {
        fit_by_shape(
            "normal",
            grid,
            settings,
            Affine::LocationScale,
            ShapeSearch::Fixed,
            |_| Ok(Normal::standard()),
            |_, fit| Normal::new(fit.location, fit.scale),
        )
    }
}
