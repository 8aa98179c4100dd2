//! Method-of-quantiles fitting for a single family.
//!
//! For a candidate shape:
//! - compute the family's standard quantiles `z_k` at the grid probabilities
//! - regress the empirical quantiles `q_k` on them (`q ≈ μ + s z`, `q ≈ s z`,
//!   or `q ≈ z` depending on the family)
//! - score the candidate by `SSE / SST`
//!
//! and search the shape with the bounded minimizers in `crate::math` over a
//! unit-interval reparametrization of its admissible range.

use nalgebra::{DMatrix, DVector};

use crate::distributions::Cumulative;
use crate::domain::Interval;
use crate::error::ParamError;
use crate::fit::QuantileGrid;
use crate::math::{
    bisect_minimize_1d, grid_minimize_1d, grid_minimize_2d, residual_sum_of_squares, solve_least_squares,
    unit_to_half_line, unit_to_interval,
};

/// Distance kept from the ends of the unit search interval, so that searches
/// never probe a shape on the boundary of its open range.
pub const UNIT_MARGIN: f64 = 1e-6;

/// Knobs of a method-of-quantiles fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSettings {
    /// Probabilities `(lo, hi)` spanned by the quantile grid.
    pub quantile_range: (f64, f64),
    /// The grid has `partitions + 1` points.
    pub partitions: usize,
    /// Probes per refinement level of the grid searches.
    pub grid_points: usize,
    pub grid_iterations: usize,
    pub bisect_iterations: usize,
}

impl Default for FitSettings {
    fn default() -> Self {
        FitSettings {
            quantile_range: (0.05, 0.95),
            partitions: 20,
            grid_points: 17,
            grid_iterations: 10,
            bisect_iterations: 40,
        }
    }
}

/// Result of fitting one family: the distribution (if any) and its error.
#[derive(Debug, Clone)]
pub struct FitOutcome<D> {
    pub distribution: Option<D>,
    /// `SSE / SST` of the quantile regression; NaN when the fit failed.
    pub error: f64,
}

impl<D> FitOutcome<D> {
    pub fn failed() -> Self {
        FitOutcome {
            distribution: None,
            error: f64::NAN,
        }
    }

    pub fn is_success(&self) -> bool {
        self.distribution.is_some()
    }

    pub fn map<E, F: FnOnce(D) -> E>(self, f: F) -> FitOutcome<E> {
        FitOutcome {
            distribution: self.distribution.map(f),
            error: self.error,
        }
    }
}

/// Which affine map links standard and empirical quantiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affine {
    /// `q = z`; the family fixes its own support.
    None,
    /// `q = s z`.
    ScaleOnly,
    /// `q = μ + s z`.
    LocationScale,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineFit {
    pub location: f64,
    pub scale: f64,
    pub error: f64,
}

/// Regresses a grid's empirical quantiles on standard quantiles.
#[derive(Debug, Clone, Copy)]
pub struct QuantileScaleFitter<'a> {
    grid: &'a QuantileGrid,
    affine: Affine,
}

impl<'a> QuantileScaleFitter<'a> {
    pub fn new(grid: &'a QuantileGrid, affine: Affine) -> Self {
        QuantileScaleFitter { grid, affine }
    }

    /// Fit against standard quantiles given at the grid probabilities.
    ///
    /// `None` for non-finite inputs, a singular regression or a non-positive scale.
    pub fn fit(&self, standard: &[f64]) -> Option<AffineFit> {
        let observed = self.grid.quantiles();
        if standard.len() != observed.len() || standard.iter().any(|z| !z.is_finite()) {
            return None;
        }
        let n = observed.len();
        let y = DVector::from_column_slice(observed);

        let (location, scale, sse) = match self.affine {
            Affine::None => {
                let sse = standard.iter().zip(observed).map(|(z, q)| (q - z).powi(2)).sum::<f64>();
                (0.0, 1.0, sse)
            }
            Affine::ScaleOnly => {
                let x = DMatrix::from_column_slice(n, 1, standard);
                let beta = solve_least_squares(&x, &y)?;
                (0.0, beta[0], residual_sum_of_squares(&x, &y, &beta))
            }
            Affine::LocationScale => {
                let x = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { standard[i] });
                let beta = solve_least_squares(&x, &y)?;
                (beta[0], beta[1], residual_sum_of_squares(&x, &y, &beta))
            }
        };

        if !(scale > 0.0 && scale.is_finite() && sse.is_finite()) {
            return None;
        }
        Some(AffineFit {
            location,
            scale,
            error: sse / self.grid.total_sum_of_squares(),
        })
    }

    /// Fit against the lower-tail quantiles of `standard`.
    pub fn fit_distribution<D: Cumulative>(&self, standard: &D) -> Option<AffineFit> {
        let z: Vec<f64> = self
            .grid
            .probabilities()
            .iter()
            .map(|&p| standard.quantile(p, Interval::Lower))
            .collect();
        self.fit(&z)
    }
}

/// Admissible range of one shape parameter, reached from `t ∈ (0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeAxis {
    /// `(0, ∞)` through `t / (1 - t)`.
    HalfLine,
    /// `(lo, hi)` linearly.
    Interval { lo: f64, hi: f64 },
}

impl ShapeAxis {
    pub fn to_shape(self, t: f64) -> f64 {
        match self {
            ShapeAxis::HalfLine => unit_to_half_line(t),
            ShapeAxis::Interval { lo, hi } => unit_to_interval(t, lo, hi),
        }
    }
}

/// How a family's shape parameters are searched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeSearch {
    /// No shape parameter; only the affine map is fitted.
    Fixed,
    Grid(ShapeAxis),
    Bisect(ShapeAxis),
    Grid2d([ShapeAxis; 2]),
}

/// Search the shape of a family, then fit its affine parameters.
///
/// `standard` builds the family member whose quantiles are regressed for a
/// given shape; `finish` turns the winning shape and affine fit into the
/// fitted distribution. Infeasible searches are logged and reported as
/// [`FitOutcome::failed`].
pub fn fit_by_shape<D, S, F>(
    label: &str,
    grid: &QuantileGrid,
    settings: &FitSettings,
    affine: Affine,
    search: ShapeSearch,
    standard: S,
    finish: F,
) -> FitOutcome<D>
where
    D: Cumulative,
    S: Fn(&[f64]) -> Result<D, ParamError> + Sync,
    F: Fn(&[f64], &AffineFit) -> Result<D, ParamError>,
{
    let fitter = QuantileScaleFitter::new(grid, affine);
    let objective = |shape: &[f64]| -> f64 {
        match standard(shape) {
            Ok(d) => fitter.fit_distribution(&d).map_or(f64::NAN, |fit| fit.error),
            Err(_) => f64::NAN,
        }
    };

    let (lo, hi) = (UNIT_MARGIN, 1.0 - UNIT_MARGIN);
    let shape: Vec<f64> = match search {
        ShapeSearch::Fixed => Vec::new(),
        ShapeSearch::Grid(axis) => {
            let best = grid_minimize_1d(
                |t| objective(&[axis.to_shape(t)]),
                lo,
                hi,
                settings.grid_points,
                settings.grid_iterations,
            );
            match best {
                Some(m) => vec![axis.to_shape(m.x)],
                None => return infeasible(label),
            }
        }
        ShapeSearch::Bisect(axis) => {
            let best = bisect_minimize_1d(|t| objective(&[axis.to_shape(t)]), lo, hi, settings.bisect_iterations);
            match best {
                Some(m) => vec![axis.to_shape(m.x)],
                None => return infeasible(label),
            }
        }
        ShapeSearch::Grid2d(axes) => {
            let best = grid_minimize_2d(
                |t| objective(&[axes[0].to_shape(t[0]), axes[1].to_shape(t[1])]),
                [(lo, hi), (lo, hi)],
                settings.grid_points,
                settings.grid_iterations,
            );
            match best {
                Some(m) => vec![axes[0].to_shape(m.x[0]), axes[1].to_shape(m.x[1])],
                None => return infeasible(label),
            }
        }
    };

    let Some(fit) = standard(shape.as_slice()).ok().and_then(|d| fitter.fit_distribution(&d)) else {
        return infeasible(label);
    };
    match finish(shape.as_slice(), &fit) {
        Ok(distribution) => {
            tracing::debug!(family = label, ?shape, location = fit.location, scale = fit.scale, error = fit.error, "fitted");
            FitOutcome {
                distribution: Some(distribution),
                error: fit.error,
            }
        }
        Err(err) => {
            tracing::warn!(family = label, %err, "fitted parameters are invalid");
            FitOutcome::failed()
        }
    }
}

fn infeasible<D>(label: &str) -> FitOutcome<D> {
    tracing::warn!(family = label, "no feasible parameters found");
    FitOutcome::failed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{Exponential, Normal};

    fn grid_of(samples: &[f64]) -> QuantileGrid {
        QuantileGrid::from_samples(samples, (0.1, 0.9), 8).unwrap()
    }

    #[test]
    fn location_scale_regression_is_exact_for_affine_data() {
        // Exact N(5, 2²) quantiles give a perfect fit.
        let truth = Normal::new(5.0, 2.0).unwrap();
        let samples: Vec<f64> = (1..2000).map(|k| truth.quantile(k as f64 / 2000.0, Interval::Lower)).collect();
        let grid = grid_of(&samples);
        let fit = QuantileScaleFitter::new(&grid, Affine::LocationScale)
            .fit_distribution(&Normal::standard())
            .unwrap();
        assert!((fit.location - 5.0).abs() < 1e-2);
        assert!((fit.scale - 2.0).abs() < 1e-2);
        assert!(fit.error < 1e-6);
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        let grid = grid_of(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let reversed: Vec<f64> = grid.quantiles().iter().map(|q| -q).collect();
        assert!(QuantileScaleFitter::new(&grid, Affine::ScaleOnly).fit(&reversed).is_none());
        assert!(QuantileScaleFitter::new(&grid, Affine::ScaleOnly).fit(&[1.0]).is_none());
    }

    #[test]
    fn identity_fit_scores_raw_residuals() {
        let grid = grid_of(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let fit = QuantileScaleFitter::new(&grid, Affine::None).fit(grid.quantiles()).unwrap();
        assert_eq!(fit.error, 0.0);
        assert_eq!(fit.scale, 1.0);
    }

    #[test]
    fn shape_axes_map_the_unit_interval() {
        assert_eq!(ShapeAxis::HalfLine.to_shape(0.5), 1.0);
        assert_eq!(ShapeAxis::Interval { lo: -1.0, hi: 3.0 }.to_shape(0.25), 0.0);
    }

    #[test]
    fn infeasible_search_fails_softly() {
        let grid = grid_of(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let outcome: FitOutcome<Exponential> = fit_by_shape(
            "never",
            &grid,
            &FitSettings::default(),
            Affine::ScaleOnly,
            ShapeSearch::Grid(ShapeAxis::HalfLine),
            |_| Err(ParamError::invalid("no member")),
            |_, fit| Exponential::new(fit.scale),
        );
        assert!(!outcome.is_success());
        assert!(outcome.error.is_nan());
    }

    #[test]
    fn outcome_map_keeps_error() {
        let outcome = FitOutcome {
            distribution: Some(2.0),
            error: 0.5,
        };
        let mapped = outcome.map(|v| v * 2.0);
        assert_eq!(mapped.distribution, Some(4.0));
        assert_eq!(mapped.error, 0.5);
    }
}
