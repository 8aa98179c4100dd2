//! Shared "fit pipeline" logic.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load samples -> quantile grid -> fit/search -> selection -> residuals -> report
//!
//! The CLI handlers then only focus on presentation.

use crate::domain::{FitConfig, FitReport, SampleSource, SampleStats};
use crate::error::AppError;
use crate::fit::{FitSelection, fit_and_select};
use crate::report::{QuantileResidual, build_fit_report, quantile_residuals};

/// All computed outputs of a single `distfit fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub samples: Vec<f64>,
    pub stats: SampleStats,
    pub selection: FitSelection,
    pub residuals: Vec<QuantileResidual>,
    pub report: FitReport,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let samples = load_samples(&config.source)?;
    run_fit_with_samples(config, samples)
}

/// Execute the fitting pipeline on samples already in memory.
pub fn run_fit_with_samples(config: &FitConfig, samples: Vec<f64>) -> Result<RunOutput, AppError> {
    let stats = SampleStats::from_samples(&samples)
        .ok_or_else(|| AppError::new(3, "No finite samples to fit."))?;
    tracing::info!(n = stats.n, min = stats.min, max = stats.max, "loaded samples");

    let selection = fit_and_select(&samples, config.family, &config.settings)?;
    let residuals = quantile_residuals(&selection.best_distribution, &selection.grid);
    let report = build_fit_report(&selection, &stats, &config.settings);

    Ok(RunOutput {
        samples,
        stats,
        selection,
        residuals,
        report,
    })
}

fn load_samples(source: &SampleSource) -> Result<Vec<f64>, AppError> {
    match source {
        SampleSource::File(path) => crate::io::read_samples(path),
        SampleSource::Synthetic { spec, count, seed } => crate::data::generate_samples(spec, *count, *seed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DistributionKind, DistributionSpec, FamilySpec};
    use crate::fit::FitSettings;

    fn config(family: FamilySpec, spec: DistributionSpec) -> FitConfig {
        FitConfig {
            source: SampleSource::Synthetic {
                spec,
                count: 4_000,
                seed: 5,
            },
            family,
            settings: FitSettings::default(),
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export: None,
        }
    }

    #[test]
    fn synthetic_normal_run_selects_normal() {
        let spec = DistributionSpec::new(DistributionKind::Normal, vec![3.0, 2.0]);
        let run = run_fit(&config(FamilySpec::Auto, spec)).unwrap();
        assert_eq!(run.selection.best.distribution.kind, DistributionKind::Normal);
        assert_eq!(run.residuals.len(), 21);
        assert_eq!(run.report.best, run.selection.best);
        assert_eq!(run.stats.n, 4_000);
    }

    #[test]
    fn empty_sample_file_is_insufficient_data() {
        let cfg = config(FamilySpec::Normal, DistributionSpec::new(DistributionKind::Normal, vec![0.0, 1.0]));
        let err = run_fit_with_samples(&cfg, Vec::new()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
