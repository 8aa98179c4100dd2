use rand::Rng;
use rand_distr::Distribution;
use statrs::function::gamma::gamma;

use super::traits::{
    Cumulative, Density, Fittable, Moments, Sampler, Scalable, boundary_quantile, inverse_transform, scale_factor,
};
use crate::domain::Interval;
use crate::error::{ParamError, require_positive};
use crate::fit::{Affine, FitOutcome, FitSettings, QuantileGrid, ShapeAxis, ShapeSearch, fit_by_shape};

/// Weibull distribution with shape `k` and scale `λ`.
#[derive(Debug, Clone, PartialEq)]
pub struct Weibull {
    shape: f64,
    scale: f64,
}

impl Weibull {
    pub fn new(shape: f64, scale: f64) -> Result<Self, ParamError> {
        Ok(Weibull {
            shape: require_positive("shape", shape)?,
            scale: require_positive("scale", scale)?,
        })
    }

    pub fn shape(&self) -> f64 {
        self.shape
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// `Γ(1 + n/k)`, the raw moments of the unit-scale variable.
    fn raw(&self, n: f64) -> f64 {
        gamma(1.0 + n / self.shape)
    }
}

impl Density for Weibull {
    fn pdf(&self, x: f64) -> f64 {
        if x < 0.0 || x == f64::INFINITY {
            return 0.0;
        }
        let z = x / self.scale;
        if z == 0.0 {
            return match self.shape {
                k if k < 1.0 => f64::INFINITY,
                k if k == 1.0 => 1.0 / self.scale,
                _ => 0.0,
            };
        }
        let zk = z.powf(self.shape);
        self.shape / self.scale * zk / z * (-zk).exp()
    }

    fn support(&self) -> (f64, f64) {
        (0.0, f64::INFINITY)
    }
}

impl Cumulative for Weibull {
    fn cdf(&self, x: f64, interval: Interval) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let zk = (x.max(0.0) / self.scale).powf(self.shape);
        match interval {
            Interval::Lower => -(-zk).exp_m1(),
            Interval::Upper => (-zk).exp(),
        }
    }

    fn quantile(&self, p: f64, interval: Interval) -> f64 {
        if let Some(x) = boundary_quantile(p, interval, self.support()) {
            return x;
        }
        let hazard = match interval {
            Interval::Lower => -(-p).ln_1p(),
            Interval::Upper => -p.ln(),
        };
        self.scale * hazard.powf(1.0 / self.shape)
    }
}

impl Moments for Weibull {
    fn mean(&self) -> Option<f64> {
        Some(self.scale * self.raw(1.0))
    }

    fn variance(&self) -> Option<f64> {
        let g1 = self.raw(1.0);
        Some(self.scale * self.scale * (self.raw(2.0) - g1 * g1))
    }

    fn skewness(&self) -> Option<f64> {
        let (g1, g2, g3) = (self.raw(1.0), self.raw(2.0), self.raw(3.0));
        let var = g2 - g1 * g1;
        Some((g3 - 3.0 * g1 * g2 + 2.0 * g1.powi(3)) / var.powf(1.5))
    }

    fn excess_kurtosis(&self) -> Option<f64> {
        let (g1, g2, g3, g4) = (self.raw(1.0), self.raw(2.0), self.raw(3.0), self.raw(4.0));
        let var = g2 - g1 * g1;
        let num = -6.0 * g1.powi(4) + 12.0 * g1 * g1 * g2 - 3.0 * g2 * g2 - 4.0 * g1 * g3 + g4;
        Some(num / (var * var))
    }
}

impl Sampler for Weibull {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match rand_distr::Weibull::new(self.scale, self.shape) {
            Ok(weibull) => weibull.sample(rng),
            Err(_) => inverse_transform(self, rng),
        }
    }
}

impl Scalable for Weibull {
    fn scaled(&self, factor: f64) -> Result<Self, ParamError> {
        Weibull::new(self.shape, self.scale * scale_factor(factor)?)
    }
}

impl Fittable for Weibull {
    fn fit_quantiles(grid: &QuantileGrid, settings: &FitSettings) -> FitOutcome<Self> {
        fit_by_shape(
            "weibull",
            grid,
            settings,
            Affine::ScaleOnly,
            ShapeSearch::Grid(ShapeAxis::HalfLine),
            |shape| Weibull::new(shape[0], 1.0),
            |shape, fit| Weibull::new(shape[0], fit.scale),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn shape_two_moments() {
        // Rayleigh with σ = λ / √2.
        let d = Weibull::new(2.0, 1.0).unwrap();
        assert_relative_eq!(d.mean().unwrap(), std::f64::consts::PI.sqrt() / 2.0, max_relative = 1e-12);
        assert_relative_eq!(d.variance().unwrap(), 1.0 - std::f64::consts::PI / 4.0, max_relative = 1e-12);
    }

    #[test]
    fn shape_one_has_exponential_moments() {
        let d = Weibull::new(1.0, 3.0).unwrap();
        assert_relative_eq!(d.skewness().unwrap(), 2.0, max_relative = 1e-9);
        assert_relative_eq!(d.excess_kurtosis().unwrap(), 6.0, max_relative = 1e-9);
    }

    #[test]
    fn quantile_round_trips() {
        let d = Weibull::new(0.7, 2.5).unwrap();
        for &p in &[1e-9, 0.2, 0.5, 0.8, 1.0 - 1e-9] {
            assert_relative_eq!(d.cdf(d.quantile(p, Interval::Lower), Interval::Lower), p, max_relative = 1e-12);
            assert_relative_eq!(d.cdf(d.quantile(p, Interval::Upper), Interval::Upper), p, max_relative = 1e-12);
        }
    }
}
