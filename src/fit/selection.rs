//! Family selection.
//!
//! Every requested family whose support admits the data is fitted against
//! the same quantile grid, so their errors (`SSE / SST`) are directly
//! comparable. Selection rules:
//! 1. Skip families whose support excludes part of the sample, or with fewer
//!    than `k + MIN_N_BUFFER` samples
//! 2. Choose the family with the minimum error
//! 3. In `auto` mode, if a family with fewer parameters is within
//!    `SIMPLER_MODEL_TOLERANCE` of the best error, pick it instead

use crate::distributions::AnyDistribution;
use crate::domain::{CandidateFit, DistributionKind, FamilySpec, SkippedFamily};
use crate::error::AppError;
use crate::fit::{FitSettings, QuantileGrid, probability_grid};

/// Minimum number of samples beyond the parameter count.
const MIN_N_BUFFER: usize = 5;

/// Absolute error margin within which a simpler family is preferred.
pub const SIMPLER_MODEL_TOLERANCE: f64 = 1e-3;

/// Output of fitting + selection.
#[derive(Debug, Clone)]
pub struct FitSelection {
    pub best: CandidateFit,
    pub best_distribution: AnyDistribution,
    /// Successful fits, lowest error first.
    pub candidates: Vec<CandidateFit>,
    pub skipped: Vec<SkippedFamily>,
    pub grid: QuantileGrid,
}

/// Fit every family `family` names and select the best one.
pub fn fit_and_select(samples: &[f64], family: FamilySpec, settings: &FitSettings) -> Result<FitSelection, AppError> {
    probability_grid(settings.quantile_range, settings.partitions)?;
    let grid = QuantileGrid::from_samples(samples, settings.quantile_range, settings.partitions)
        .map_err(|err| AppError::new(3, format!("Insufficient data: {err}")))?;
    let n = samples.iter().filter(|v| v.is_finite()).count();

    let mut fitted: Vec<(CandidateFit, AnyDistribution)> = Vec::new();
    let mut skipped = Vec::new();

    for kind in family.kinds() {
        let k = kind.param_count();
        if n < k + MIN_N_BUFFER {
            skipped.push(SkippedFamily {
                kind,
                reason: format!("Underdetermined: n={n} < k+{MIN_N_BUFFER}={}", k + MIN_N_BUFFER),
            });
            continue;
        }
        if let Some(reason) = support_mismatch(kind, grid.sample_range()) {
            skipped.push(SkippedFamily { kind, reason });
            continue;
        }

        let outcome = AnyDistribution::fit(kind, &grid, settings);
        match outcome.distribution {
            Some(dist) => {
                tracing::debug!(family = %kind, error = outcome.error, "candidate fitted");
                fitted.push((
                    CandidateFit {
                        distribution: dist.spec(),
                        error: outcome.error,
                    },
                    dist,
                ));
            }
            None => skipped.push(SkippedFamily {
                kind,
                reason: "No feasible parameters found.".to_string(),
            }),
        }
    }

    if fitted.is_empty() {
        return Err(AppError::new(3, "No distribution family could be fitted to the samples."));
    }

    let best_idx = match family {
        FamilySpec::Auto => select_simplest(&fitted),
        _ => select_min_error(&fitted),
    };
    let (best, best_distribution) = fitted[best_idx].clone();

    let mut candidates: Vec<CandidateFit> = fitted.into_iter().map(|(c, _)| c).collect();
    candidates.sort_by(|a, b| a.error.total_cmp(&b.error));

    Ok(FitSelection {
        best,
        best_distribution,
        candidates,
        skipped,
        grid,
    })
}

/// Why `kind` cannot describe samples spanning `range`, if it cannot.
fn support_mismatch(kind: DistributionKind, (min, max): (f64, f64)) -> Option<String> {
    match kind {
        DistributionKind::Exponential
        | DistributionKind::Gamma
        | DistributionKind::Weibull
        | DistributionKind::InverseGauss
        | DistributionKind::QExponential
            if min < 0.0 =>
        {
            Some(format!("Support is [0, ∞) but the sample minimum is {min}."))
        }
        DistributionKind::Kumaraswamy if min < 0.0 || max > 1.0 => {
            Some(format!("Support is [0, 1] but the samples span [{min}, {max}]."))
        }
        _ => None,
    }
}

fn select_min_error(fitted: &[(CandidateFit, AnyDistribution)]) -> usize {
    let mut best = 0;
    for (i, (c, _)) in fitted.iter().enumerate().skip(1) {
        if c.error < fitted[best].0.error {
            best = i;
        }
    }
    best
}

fn select_simplest(fitted: &[(CandidateFit, AnyDistribution)]) -> usize {
    let best = select_min_error(fitted);
    let best_error = fitted[best].0.error;
    let params = |i: usize| fitted[i].0.distribution.kind.param_count();

    let mut chosen = best;
    for (i, (c, _)) in fitted.iter().enumerate() {
        if c.error - best_error >= SIMPLER_MODEL_TOLERANCE {
            continue;
        }
        if params(i) < params(chosen) || (params(i) == params(chosen) && c.error < fitted[chosen].0.error) {
            chosen = i;
        }
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{Exponential, Normal, Sampler};
    use crate::domain::DistributionSpec;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn candidate(kind: DistributionKind, params: Vec<f64>, error: f64) -> (CandidateFit, AnyDistribution) {
        let spec = DistributionSpec::new(kind, params);
        let dist = spec.build().unwrap();
        (CandidateFit { distribution: spec, error }, dist)
    }

    #[test]
    fn simpler_family_wins_when_close() {
        let fitted = vec![
            candidate(DistributionKind::Gamma, vec![1.1, 2.0], 0.0010),
            candidate(DistributionKind::Exponential, vec![2.0], 0.0015),
        ];
        assert_eq!(select_min_error(&fitted), 0);
        assert_eq!(select_simplest(&fitted), 1);
    }

    #[test]
    fn complex_family_wins_when_clearly_better() {
        let fitted = vec![
            candidate(DistributionKind::Exponential, vec![2.0], 0.05),
            candidate(DistributionKind::Gamma, vec![3.0, 2.0], 0.001),
        ];
        assert_eq!(select_simplest(&fitted), 1);
    }

    #[test]
    fn negative_samples_skip_positive_families() {
        let mut rng = StdRng::seed_from_u64(5);
        let samples = Normal::new(0.0, 1.0).unwrap().sample_n(&mut rng, 500);
        let settings = FitSettings::default();
        let selection = fit_and_select(&samples, FamilySpec::Exponential, &settings);
        let err = selection.unwrap_err();
        assert_eq!(err.exit_code(), 3);

        let selection = fit_and_select(&samples, FamilySpec::All, &settings).unwrap();
        let skipped: Vec<DistributionKind> = selection.skipped.iter().map(|s| s.kind).collect();
        assert!(skipped.contains(&DistributionKind::Gamma));
        assert!(skipped.contains(&DistributionKind::Kumaraswamy));
        assert!(selection.candidates.iter().any(|c| c.distribution.kind == DistributionKind::Normal));
    }

    #[test]
    fn single_family_reports_its_fit() {
        let mut rng = StdRng::seed_from_u64(9);
        let samples = Exponential::new(2.0).unwrap().sample_n(&mut rng, 5_000);
        let selection = fit_and_select(&samples, FamilySpec::Exponential, &FitSettings::default()).unwrap();
        assert_eq!(selection.best.distribution.kind, DistributionKind::Exponential);
        assert_eq!(selection.candidates.len(), 1);
        assert!((selection.best.distribution.params[0] - 2.0).abs() < 0.2);
    }

    #[test]
    fn too_few_samples_is_insufficient_data() {
        let err = fit_and_select(&[1.0], FamilySpec::Auto, &FitSettings::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn bad_range_is_invalid_input() {
        let settings = FitSettings {
            quantile_range: (0.9, 0.1),
            ..FitSettings::default()
        };
        let err = fit_and_select(&[1.0, 2.0, 3.0], FamilySpec::Auto, &settings).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
