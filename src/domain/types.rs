//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - parsed from CLI flags
//! - used in-memory during fitting
//! - exported to JSON and reloaded later for plotting

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::distributions::AnyDistribution;
use crate::error::ParamError;
use crate::fit::FitSettings;

/// Supported distribution families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DistributionKind {
    Exponential,
    Normal,
    Gamma,
    Weibull,
    InverseGauss,
    QGaussian,
    QExponential,
    Voigt,
    SkewCauchy,
    Kumaraswamy,
}

impl DistributionKind {
    pub const ALL: [DistributionKind; 10] = [
        DistributionKind::Exponential,
        DistributionKind::Normal,
        DistributionKind::Gamma,
        DistributionKind::Weibull,
        DistributionKind::InverseGauss,
        DistributionKind::QGaussian,
        DistributionKind::QExponential,
        DistributionKind::Voigt,
        DistributionKind::SkewCauchy,
        DistributionKind::Kumaraswamy,
    ];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            DistributionKind::Exponential => "Exponential",
            DistributionKind::Normal => "Normal",
            DistributionKind::Gamma => "Gamma",
            DistributionKind::Weibull => "Weibull",
            DistributionKind::InverseGauss => "Inverse Gaussian",
            DistributionKind::QGaussian => "q-Gaussian",
            DistributionKind::QExponential => "q-Exponential",
            DistributionKind::Voigt => "Voigt",
            DistributionKind::SkewCauchy => "Skew Cauchy",
            DistributionKind::Kumaraswamy => "Kumaraswamy",
        }
    }

    /// Parameter names in the order `DistributionSpec::params` stores them.
    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            DistributionKind::Exponential => &["scale"],
            DistributionKind::Normal => &["mean", "std_dev"],
            DistributionKind::Gamma => &["shape", "scale"],
            DistributionKind::Weibull => &["shape", "scale"],
            DistributionKind::InverseGauss => &["mean", "shape"],
            DistributionKind::QGaussian => &["mean", "q", "beta"],
            DistributionKind::QExponential => &["q", "rate"],
            DistributionKind::Voigt => &["mean", "sigma", "gamma"],
            DistributionKind::SkewCauchy => &["location", "scale", "skew"],
            DistributionKind::Kumaraswamy => &["a", "b"],
        }
    }

    pub fn param_count(self) -> usize {
        self.param_names().len()
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Which families to fit.
///
/// `Auto` fits every family compatible with the data and prefers the simpler
/// family when errors are close; `All` fits the same set but reports the
/// minimum error as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FamilySpec {
    Auto,
    All,
    Exponential,
    Normal,
    Gamma,
    Weibull,
    InverseGauss,
    QGaussian,
    QExponential,
    Voigt,
    SkewCauchy,
    Kumaraswamy,
}

impl FamilySpec {
    /// The single family requested, if any.
    pub fn single(self) -> Option<DistributionKind> {
        match self {
            FamilySpec::Auto | FamilySpec::All => None,
            FamilySpec::Exponential => Some(DistributionKind::Exponential),
            FamilySpec::Normal => Some(DistributionKind::Normal),
            FamilySpec::Gamma => Some(DistributionKind::Gamma),
            FamilySpec::Weibull => Some(DistributionKind::Weibull),
            FamilySpec::InverseGauss => Some(DistributionKind::InverseGauss),
            FamilySpec::QGaussian => Some(DistributionKind::QGaussian),
            FamilySpec::QExponential => Some(DistributionKind::QExponential),
            FamilySpec::Voigt => Some(DistributionKind::Voigt),
            FamilySpec::SkewCauchy => Some(DistributionKind::SkewCauchy),
            FamilySpec::Kumaraswamy => Some(DistributionKind::Kumaraswamy),
        }
    }

    pub fn kinds(self) -> Vec<DistributionKind> {
        match self.single() {
            Some(kind) => vec![kind],
            None => DistributionKind::ALL.to_vec(),
        }
    }
}

/// A distribution family plus its parameter values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSpec {
    pub kind: DistributionKind,
    pub params: Vec<f64>,
}

impl DistributionSpec {
    pub fn new(kind: DistributionKind, params: Vec<f64>) -> Self {
        Self { kind, params }
    }

    /// Validate the parameters and construct the distribution.
    pub fn build(&self) -> Result<AnyDistribution, ParamError> {
        AnyDistribution::from_spec(self)
    }
}

impl fmt::Display for DistributionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind.display_name())?;
        for (i, (name, value)) in self.kind.param_names().iter().zip(&self.params).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value:.6}")?;
        }
        f.write_str(")")
    }
}

/// Where the samples of a `fit` run come from.
#[derive(Debug, Clone)]
pub enum SampleSource {
    /// A text file of numbers.
    File(PathBuf),
    /// Seeded draws from a known distribution.
    Synthetic {
        spec: DistributionSpec,
        count: usize,
        seed: u64,
    },
}

/// A full run’s configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub source: SampleSource,
    pub family: FamilySpec,
    pub settings: FitSettings,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export: Option<PathBuf>,
}

/// Summary statistics of the fitted samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl SampleStats {
    /// Statistics of the finite values in `samples`; `None` when there are none.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        let n = finite.len();
        let mean = finite.iter().sum::<f64>() / n as f64;
        let var = if n > 1 {
            finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(SampleStats {
            n,
            min,
            max,
            mean,
            std_dev: var.sqrt(),
        })
    }
}

/// One successfully fitted family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFit {
    pub distribution: DistributionSpec,
    /// Residual sum of squares over total sum of squares of the empirical quantiles.
    pub error: f64,
}

/// A family that was not fitted, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedFamily {
    pub kind: DistributionKind,
    pub reason: String,
}

/// A saved fit (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub quantile_range: (f64, f64),
    pub partitions: usize,
    pub samples: SampleStats,
    pub candidates: Vec<CandidateFit>,
    pub skipped: Vec<SkippedFamily>,
    pub best: CandidateFit,
}
