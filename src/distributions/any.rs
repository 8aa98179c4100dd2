//! Runtime-selected distribution, used where the family is only known from
//! CLI input or a saved report.

use rand::Rng;

use super::{
    Cumulative, Density, Exponential, Fittable, Gamma, InverseGauss, Kumaraswamy, Moments, Normal, QExponential,
    QGaussian, Sampler, SkewCauchy, Voigt, Weibull,
};
use crate::domain::{DistributionKind, DistributionSpec, Interval};
use crate::error::ParamError;
use crate::fit::{FitOutcome, FitSettings, QuantileGrid};

#[derive(Debug, Clone)]
pub enum AnyDistribution {
    Exponential(Exponential),
    Normal(Normal),
    Gamma(Gamma),
    Weibull(Weibull),
    InverseGauss(InverseGauss),
    QGaussian(QGaussian),
    QExponential(QExponential),
    Voigt(Voigt),
    SkewCauchy(SkewCauchy),
    Kumaraswamy(Kumaraswamy),
}

macro_rules! dispatch {
    ($self:expr, $d:ident => $body:expr) => {
        match $self {
            AnyDistribution::Exponential($d) => $body,
            AnyDistribution::Normal($d) => $body,
            AnyDistribution::Gamma($d) => $body,
            AnyDistribution::Weibull($d) => $body,
            AnyDistribution::InverseGauss($d) => $body,
            AnyDistribution::QGaussian($d) => $body,
            AnyDistribution::QExponential($d) => $body,
            AnyDistribution::Voigt($d) => $body,
            AnyDistribution::SkewCauchy($d) => $body,
            AnyDistribution::Kumaraswamy($d) => $body,
        }
    };
}

impl AnyDistribution {
    /// Validate `spec` and build the distribution it names.
    pub fn from_spec(spec: &DistributionSpec) -> Result<Self, ParamError> {
        let expected = spec.kind.param_count();
        if spec.params.len() != expected {
            return Err(ParamError::invalid(format!(
                "{} takes {expected} parameters ({}), got {}",
                spec.kind,
                spec.kind.param_names().join(", "),
                spec.params.len()
            )));
        }
        let p = &spec.params;
        Ok(match spec.kind {
            DistributionKind::Exponential => AnyDistribution::Exponential(Exponential::new(p[0])?),
            DistributionKind::Normal => AnyDistribution::Normal(Normal::new(p[0], p[1])?),
            DistributionKind::Gamma => AnyDistribution::Gamma(Gamma::new(p[0], p[1])?),
            DistributionKind::Weibull => AnyDistribution::Weibull(Weibull::new(p[0], p[1])?),
            DistributionKind::InverseGauss => AnyDistribution::InverseGauss(InverseGauss::new(p[0], p[1])?),
            DistributionKind::QGaussian => AnyDistribution::QGaussian(QGaussian::new(p[0], p[1], p[2])?),
            DistributionKind::QExponential => AnyDistribution::QExponential(QExponential::new(p[0], p[1])?),
            DistributionKind::Voigt => AnyDistribution::Voigt(Voigt::new(p[0], p[1], p[2])?),
            DistributionKind::SkewCauchy => AnyDistribution::SkewCauchy(SkewCauchy::new(p[0], p[1], p[2])?),
            DistributionKind::Kumaraswamy => AnyDistribution::Kumaraswamy(Kumaraswamy::new(p[0], p[1])?),
        })
    }

    pub fn kind(&self) -> DistributionKind {
        match self {
            AnyDistribution::Exponential(_) => DistributionKind::Exponential,
            AnyDistribution::Normal(_) => DistributionKind::Normal,
            AnyDistribution::Gamma(_) => DistributionKind::Gamma,
            AnyDistribution::Weibull(_) => DistributionKind::Weibull,
            AnyDistribution::InverseGauss(_) => DistributionKind::InverseGauss,
            AnyDistribution::QGaussian(_) => DistributionKind::QGaussian,
            AnyDistribution::QExponential(_) => DistributionKind::QExponential,
            AnyDistribution::Voigt(_) => DistributionKind::Voigt,
            AnyDistribution::SkewCauchy(_) => DistributionKind::SkewCauchy,
            AnyDistribution::Kumaraswamy(_) => DistributionKind::Kumaraswamy,
        }
    }

    /// Parameters in `DistributionKind::param_names` order.
    pub fn params(&self) -> Vec<f64> {
        match self {
            AnyDistribution::Exponential(d) => vec![d.scale()],
            AnyDistribution::Normal(d) => vec![d.location(), d.std_dev()],
            AnyDistribution::Gamma(d) => vec![d.shape(), d.scale()],
            AnyDistribution::Weibull(d) => vec![d.shape(), d.scale()],
            AnyDistribution::InverseGauss(d) => vec![d.mu(), d.shape()],
            AnyDistribution::QGaussian(d) => vec![d.location(), d.q(), d.beta()],
            AnyDistribution::QExponential(d) => vec![d.q(), d.rate()],
            AnyDistribution::Voigt(d) => vec![d.location(), d.sigma(), d.gamma()],
            AnyDistribution::SkewCauchy(d) => vec![d.location(), d.scale(), d.skew()],
            AnyDistribution::Kumaraswamy(d) => vec![d.a(), d.b()],
        }
    }

    pub fn spec(&self) -> DistributionSpec {
        DistributionSpec::new(self.kind(), self.params())
    }

    /// Method-of-quantiles fit of the family `kind`.
    pub fn fit(kind: DistributionKind, grid: &QuantileGrid, settings: &FitSettings) -> FitOutcome<Self> {
        match kind {
            DistributionKind::Exponential => Exponential::fit_quantiles(grid, settings).map(AnyDistribution::Exponential),
            DistributionKind::Normal => Normal::fit_quantiles(grid, settings).map(AnyDistribution::Normal),
            DistributionKind::Gamma => Gamma::fit_quantiles(grid, settings).map(AnyDistribution::Gamma),
            DistributionKind::Weibull => Weibull::fit_quantiles(grid, settings).map(AnyDistribution::Weibull),
            DistributionKind::InverseGauss => {
                InverseGauss::fit_quantiles(grid, settings).map(AnyDistribution::InverseGauss)
            }
            DistributionKind::QGaussian => QGaussian::fit_quantiles(grid, settings).map(AnyDistribution::QGaussian),
            DistributionKind::QExponential => {
                QExponential::fit_quantiles(grid, settings).map(AnyDistribution::QExponential)
            }
            DistributionKind::Voigt => Voigt::fit_quantiles(grid, settings).map(AnyDistribution::Voigt),
            DistributionKind::SkewCauchy => SkewCauchy::fit_quantiles(grid, settings).map(AnyDistribution::SkewCauchy),
            DistributionKind::Kumaraswamy => {
                Kumaraswamy::fit_quantiles(grid, settings).map(AnyDistribution::Kumaraswamy)
            }
        }
    }
}

impl Density for AnyDistribution {
    fn pdf(&self, x: f64) -> f64 {
        dispatch!(self, d => d.pdf(x))
    }

    fn support(&self) -> (f64, f64) {
        dispatch!(self, d => d.support())
    }
}

impl Cumulative for AnyDistribution {
    fn cdf(&self, x: f64, interval: Interval) -> f64 {
        dispatch!(self, d => d.cdf(x, interval))
    }

    fn quantile(&self, p: f64, interval: Interval) -> f64 {
        dispatch!(self, d => d.quantile(p, interval))
    }

    fn median(&self) -> f64 {
        dispatch!(self, d => d.median())
    }
}

impl Moments for AnyDistribution {
    fn mean(&self) -> Option<f64> {
        dispatch!(self, d => d.mean())
    }

    fn variance(&self) -> Option<f64> {
        dispatch!(self, d => d.variance())
    }

    fn skewness(&self) -> Option<f64> {
        dispatch!(self, d => d.skewness())
    }

    fn excess_kurtosis(&self) -> Option<f64> {
        dispatch!(self, d => d.excess_kurtosis())
    }
}

impl Sampler for AnyDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        dispatch!(self, d => d.sample(rng))
    }
}
