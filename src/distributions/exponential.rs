use rand::Rng;
use rand_distr::{Distribution, Exp};

use super::traits::{
    Cumulative, Density, Fittable, Moments, Sampler, Scalable, boundary_quantile, inverse_transform, scale_factor,
};
use crate::domain::Interval;
use crate::error::{ParamError, require_positive};
use crate::fit::{Affine, FitOutcome, FitSettings, QuantileGrid, ShapeSearch, fit_by_shape};

/// Exponential distribution with mean `scale` (θ).
#[derive(Debug, Clone, PartialEq)]
pub struct Exponential {
    scale: f64,
}

impl Exponential {
    pub fn new(scale: f64) -> Result<Self, ParamError> {
        Ok(Exponential {
            scale: require_positive("scale", scale)?,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Density for Exponential {
    fn pdf(&self, x: f64) -> f64 {
        if x < 0.0 {
            return 0.0;
        }
        (-x / self.scale).exp() / self.scale
    }

    fn support(&self) -> (f64, f64) {
        (0.0, f64::INFINITY)
    }
}

impl Cumulative for Exponential {
    fn cdf(&self, x: f64, interval: Interval) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let z = x.max(0.0) / self.scale;
        match interval {
            Interval::Lower => -(-z).exp_m1(),
            Interval::Upper => (-z).exp(),
        }
    }

    fn quantile(&self, p: f64, interval: Interval) -> f64 {
        if let Some(x) = boundary_quantile(p, interval, self.support()) {
            return x;
        }
        match interval {
            Interval::Lower => -self.scale * (-p).ln_1p(),
            Interval::Upper => -self.scale * p.ln(),
        }
    }

    fn median(&self) -> f64 {
        self.scale * std::f64::consts::LN_2
    }
}

impl Moments for Exponential {
    fn mean(&self) -> Option<f64> {
        Some(self.scale)
    }

    fn variance(&self) -> Option<f64> {
        Some(self.scale * self.scale)
    }

    fn skewness(&self) -> Option<f64> {
        Some(2.0)
    }

    fn excess_kurtosis(&self) -> Option<f64> {
        Some(6.0)
    }
}

impl Sampler for Exponential {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match Exp::new(1.0 / self.scale) {
            Ok(exp) => exp.sample(rng),
            Err(_) => inverse_transform(self, rng),
        }
    }
}

impl Scalable for Exponential {
    fn scaled(&self, factor: f64) -> Result<Self, ParamError> {
        Exponential::new(self.scale * scale_factor(factor)?)
    }
}

impl Fittable for Exponential {
    fn fit_quantiles(grid: &QuantileGrid, settings: &FitSettings) -> FitOutcome<Self> {
        fit_by_shape(
            "exponential",
            grid,
            settings,
            Affine::ScaleOnly,
            ShapeSearch::Fixed,
            |_| Exponential::new(1.0),
            |_, fit| Exponential::new(fit.scale),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn rejects_non_positive_scale() {
        assert!(Exponential::new(0.0).is_err());
        assert!(Exponential::new(f64::NAN).is_err());
    }

    #[test]
    fn quantile_inverts_both_tails() {
        let d = Exponential::new(2.0).unwrap();
        for &p in &[1e-12, 0.1, 0.5, 0.9, 1.0 - 1e-9] {
            assert_relative_eq!(d.cdf(d.quantile(p, Interval::Lower), Interval::Lower), p, max_relative = 1e-12);
            assert_relative_eq!(d.cdf(d.quantile(p, Interval::Upper), Interval::Upper), p, max_relative = 1e-12);
        }
        assert_relative_eq!(d.median(), 2.0 * std::f64::consts::LN_2);
    }

    #[test]
    fn fit_recovers_scale() {
        let truth = Exponential::new(2.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let samples = truth.sample_n(&mut rng, 20_000);
        let outcome = Exponential::fit(&samples, (0.1, 0.9), 20);
        let fitted = outcome.distribution.unwrap();
        assert!((fitted.scale() - 2.0).abs() / 2.0 < 0.05);
        assert!(outcome.error < 1e-2);
    }

    #[test]
    fn scaling_multiplies_the_mean() {
        let d = Exponential::new(1.5).unwrap().scaled(2.0).unwrap();
        assert_relative_eq!(d.mean().unwrap(), 3.0);
        assert!(d.divided(0.0).is_err());
    }
}
