//! Reporting utilities: fitted-vs-empirical quantiles and the saved report.

pub mod format;

pub use format::*;

use chrono::Utc;

use crate::distributions::{AnyDistribution, Cumulative};
use crate::domain::{FitReport, Interval, SampleStats};
use crate::fit::{FitSelection, FitSettings, QuantileGrid};

/// One grid probability with the empirical and fitted quantile.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileResidual {
    pub p: f64,
    pub empirical: f64,
    pub fitted: f64,
    pub residual: f64,
}

/// Compare the fitted distribution's quantiles with the empirical ones.
pub fn quantile_residuals(dist: &AnyDistribution, grid: &QuantileGrid) -> Vec<QuantileResidual> {
    grid.probabilities()
        .iter()
        .zip(grid.quantiles())
        .map(|(&p, &empirical)| {
            let fitted = dist.quantile(p, Interval::Lower);
            QuantileResidual {
                p,
                empirical,
                fitted,
                residual: empirical - fitted,
            }
        })
        .collect()
}

/// Assemble the JSON-exportable record of a fit run.
pub fn build_fit_report(selection: &FitSelection, samples: &SampleStats, settings: &FitSettings) -> FitReport {
    FitReport {
        tool: "distfit".to_string(),
        generated_at: Utc::now(),
        quantile_range: settings.quantile_range,
        partitions: settings.partitions,
        samples: samples.clone(),
        candidates: selection.candidates.clone(),
        skipped: selection.skipped.clone(),
        best: selection.best.clone(),
    }
}
