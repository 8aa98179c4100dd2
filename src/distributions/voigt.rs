use std::f64::consts::{PI, SQRT_2};

use nalgebra::Complex;
use rand::Rng;
use rand_distr::{Cauchy, Distribution};

use super::tabulated::{LazyTable, TabulatedCdf};
use super::traits::{
    Additive, Cumulative, Density, Fittable, Moments, Sampler, Scalable, Shiftable, boundary_quantile, scale_factor,
};
use crate::domain::Interval;
use crate::error::{ParamError, require_finite, require_positive};
use crate::fit::{Affine, FitOutcome, FitSettings, QuantileGrid, ShapeAxis, ShapeSearch, fit_by_shape};
use crate::math::{DEFAULT_SEGMENTS, ReparametrizedDomain, faddeeva};

/// Voigt profile: the convolution of `N(μ, σ²)` with a Cauchy of half-width `γ`.
///
/// The density is `Re w(z) / (σ√(2π))` with `z = (x - μ + iγ) / (σ√2)` and
/// `w` the Faddeeva function; CDF and quantile come from a segment cache over
/// the unbounded domain. `γ = 0` reduces to the normal distribution.
#[derive(Debug, Clone)]
pub struct Voigt {
    mean: f64,
    sigma: f64,
    gamma: f64,
    table: LazyTable<TabulatedCdf>,
}

impl Voigt {
    pub fn new(mean: f64, sigma: f64, gamma: f64) -> Result<Self, ParamError> {
        require_finite("mean", mean)?;
        require_positive("sigma", sigma)?;
        if !gamma.is_finite() || gamma < 0.0 {
            return Err(ParamError::out_of_range("gamma", gamma, ">= 0"));
        }
        Ok(Voigt {
            mean,
            sigma,
            gamma,
            table: LazyTable::new(),
        })
    }

    pub fn location(&self) -> f64 {
        self.mean
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    fn table(&self) -> Option<&TabulatedCdf> {
        self.table.get_or_build(|| {
            let (mean, sigma, gamma) = (self.mean, self.sigma, self.gamma);
            let domain = ReparametrizedDomain::unbounded(mean, sigma + gamma)?;
            TabulatedCdf::symmetric(move |x| density(mean, sigma, gamma, x), domain, DEFAULT_SEGMENTS, mean)
        })
    }
}

fn density(mean: f64, sigma: f64, gamma: f64, x: f64) -> f64 {
    if !x.is_finite() {
        return 0.0;
    }
    let norm = sigma * (2.0 * PI).sqrt();
    if gamma == 0.0 {
        let z = (x - mean) / sigma;
        return (-0.5 * z * z).exp() / norm;
    }
    let z = Complex::new(x - mean, gamma) / (sigma * SQRT_2);
    (faddeeva(z).re / norm).max(0.0)
}

impl Density for Voigt {
    fn pdf(&self, x: f64) -> f64 {
        density(self.mean, self.sigma, self.gamma, x)
    }

    fn support(&self) -> (f64, f64) {
        (f64::NEG_INFINITY, f64::INFINITY)
    }
}

impl Cumulative for Voigt {
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

impl Moments for Voigt {
    fn mean(&self) -> Option<f64> {
        (self.gamma == 0.0).then_some(self.mean)
    }

    fn variance(&self) -> Option<f64> {
        (self.gamma == 0.0).then_some(self.sigma * self.sigma)
    }

    fn skewness(&self) -> Option<f64> {
        (self.gamma == 0.0).then_some(0.0)
    }

    fn excess_kurtosis(&self) -> Option<f64> {
        (self.gamma == 0.0).then_some(0.0)
    }
}

impl Sampler for Voigt {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let gauss = match rand_distr::Normal::new(self.mean, self.sigma) {
            Ok(normal) => normal.sample(rng),
            Err(_) => self.mean,
        };
        if self.gamma == 0.0 {
            return gauss;
        }
        match Cauchy::new(0.0, self.gamma) {
            Ok(cauchy) => gauss + cauchy.sample(rng),
            Err(_) => gauss,
        }
    }
}

impl Scalable for Voigt {
    fn scaled(&self, factor: f64) -> Result<Self, ParamError> {
        let c = scale_factor(factor)?;
        Voigt::new(self.mean * c, self.sigma * c, self.gamma * c)
    }
}

impl Shiftable for Voigt {
    fn shifted(&self, offset: f64) -> Result<Self, ParamError> {
        Voigt::new(self.mean + offset, self.sigma, self.gamma)
    }
}

impl Additive for Voigt {
    /// Gaussian widths add in quadrature, Lorentzian half-widths linearly.
    fn add_independent(&self, other: &Self) -> Result<Self, ParamError> {
        Voigt::new(
            self.mean + other.mean,
            self.sigma.hypot(other.sigma),
            self.gamma + other.gamma,
        )
    }
}

impl Fittable for Voigt {
    /// Searches the width ratio `γ/σ` for the unit-`σ` member.
    fn fit_quantiles(grid: &QuantileGrid, settings: &FitSettings) -> FitOutcome<Self> {
        fit_by_shape(
            "voigt",
            grid,
            settings,
            Affine::LocationScale,
            ShapeSearch::Grid(ShapeAxis::HalfLine),
            |ratio| Voigt::new(0.0, 1.0, ratio[0]),
            |ratio, fit| Voigt::new(fit.location, fit.scale, ratio[0] * fit.scale),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::Normal;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn zero_gamma_is_normal() {
        let d = Voigt::new(1.0, 2.0, 0.0).unwrap();
        let n = Normal::new(1.0, 2.0).unwrap();
        assert_relative_eq!(d.pdf(0.3), n.pdf(0.3), max_relative = 1e-14);
        assert_abs_diff_eq!(d.cdf(2.5, Interval::Lower), n.cdf(2.5, Interval::Lower), epsilon = 1e-9);
        assert_eq!(d.variance(), Some(4.0));
    }

    #[test]
    fn density_integrates_to_one() {
        let d = Voigt::new(0.0, 0.8, 0.5).unwrap();
        assert_abs_diff_eq!(d.cdf(0.0, Interval::Lower), 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(d.cdf(-1e9, Interval::Lower), 0.0, epsilon = 1e-8);
        assert!(d.mean().is_none());
    }

    #[test]
    fn small_sigma_approaches_cauchy() {
        // σ → 0: Cauchy(0, 1), whose third quartile is 1.
        let d = Voigt::new(0.0, 1e-3, 1.0).unwrap();
        assert_abs_diff_eq!(d.quantile(0.75, Interval::Lower), 1.0, epsilon = 1e-3);
    }

    #[test]
    fn quantile_round_trips() {
        let d = Voigt::new(-1.0, 1.0, 0.3).unwrap();
        for &p in &[1e-4, 0.1, 0.5, 0.9, 1.0 - 1e-4] {
            let x = d.quantile(p, Interval::Lower);
            assert_abs_diff_eq!(d.cdf(x, Interval::Lower), p, epsilon = 1e-9);
            let y = d.quantile(p, Interval::Upper);
            assert_abs_diff_eq!(d.cdf(y, Interval::Upper), p, epsilon = 1e-9);
        }
    }

    #[test]
    fn sum_adds_widths() {
        let a = Voigt::new(1.0, 3.0, 0.5).unwrap();
        let b = Voigt::new(2.0, 4.0, 1.5).unwrap();
        let s = a.add_independent(&b).unwrap();
        assert_relative_eq!(s.sigma(), 5.0);
        assert_relative_eq!(s.gamma(), 2.0);
        assert_eq!(s.median(), 3.0);
    }
}
