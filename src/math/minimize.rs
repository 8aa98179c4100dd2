//! Derivative-free minimizers over bounded 1-D intervals and 2-D boxes.
//!
//! Objectives may be non-smooth or NaN over whole regions (invalid parameter
//! combinations), so every routine treats NaN as worse than any number and
//! runs for a fixed iteration budget. Each returns the best probe seen, or
//! `None` when every probe was NaN.
//!
//! The grid variants evaluate one refinement level in parallel with rayon and
//! then select the winner by index, so the outcome never depends on thread
//! scheduling.

use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum1d {
    pub x: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum2d {
    pub x: [f64; 2],
    pub value: f64,
}

/// Coarse-to-fine grid search on `[lo, hi]`.
///
/// Each level evaluates `points` evenly spaced probes, keeps the best one
/// (smaller index on ties) and shrinks the interval to its two neighbours.
pub fn grid_minimize_1d<F>(f: F, lo: f64, hi: f64, points: usize, iterations: usize) -> Option<Minimum1d>
where
    F: Fn(f64) -> f64 + Sync,
{
    if !valid_range(lo, hi) || points < 3 {
        return None;
    }

    let (mut a, mut b) = (lo, hi);
    let mut best: Option<Minimum1d> = None;

    for level in 0..iterations.max(1) {
        let xs = linspace(a, b, points);
        let values: Vec<f64> = xs.par_iter().map(|&x| f(x)).collect();
        let Some(idx) = argmin(&values) else {
            tracing::debug!(level, a, b, "grid level produced only NaN probes");
            break;
        };

        let candidate = Minimum1d {
            x: xs[idx],
            value: values[idx],
        };
        if best.is_none_or(|b| candidate.value < b.value) {
            best = Some(candidate);
        }

        a = xs[idx.saturating_sub(1)];
        b = xs[(idx + 1).min(points - 1)];
        if b <= a {
            break;
        }
    }

    best
}

/// Bracketing descent on `[lo, hi]`.
///
/// Probes the quarter, mid and three-quarter points and keeps the half (or
/// the central half) on the lower side. The end points are probed once so a
/// minimum sitting on the boundary is still reported.
pub fn bisect_minimize_1d<F>(f: F, lo: f64, hi: f64, iterations: usize) -> Option<Minimum1d>
where
    F: Fn(f64) -> f64,
{
    if !valid_range(lo, hi) {
        return None;
    }

    let mut best = Best1d::default();
    best.probe(&f, lo);
    best.probe(&f, hi);

    let (mut a, mut b) = (lo, hi);
    for _ in 0..iterations {
        let m = 0.5 * (a + b);
        let q1 = 0.5 * (a + m);
        let q3 = 0.5 * (m + b);
        let f1 = best.probe(&f, q1);
        let fm = best.probe(&f, m);
        let f3 = best.probe(&f, q3);

        if f1 < fm && f1 <= f3 {
            b = m;
        } else if f3 < fm {
            a = m;
        } else {
            a = q1;
            b = q3;
        }
        if b <= a {
            break;
        }
    }

    best.0
}

/// Joint `points × points` grid refinement over a box.
pub fn grid_minimize_2d<F>(f: F, bounds: [(f64, f64); 2], points: usize, iterations: usize) -> Option<Minimum2d>
where
    F: Fn([f64; 2]) -> f64 + Sync,
{
    if bounds.iter().any(|&(lo, hi)| !valid_range(lo, hi)) || points < 3 {
        return None;
    }

    let mut range = bounds;
    let mut best: Option<Minimum2d> = None;

    for level in 0..iterations.max(1) {
        let xs = linspace(range[0].0, range[0].1, points);
        let ys = linspace(range[1].0, range[1].1, points);
        // Row-major: probe `i * points + j` sits at (xs[i], ys[j]).
        let values: Vec<f64> = (0..points * points)
            .into_par_iter()
            .map(|k| f([xs[k / points], ys[k % points]]))
            .collect();
        let Some(idx) = argmin(&values) else {
            tracing::debug!(level, "2-D grid level produced only NaN probes");
            break;
        };

        let (i, j) = (idx / points, idx % points);
        let candidate = Minimum2d {
            x: [xs[i], ys[j]],
            value: values[idx],
        };
        if best.is_none_or(|b| candidate.value < b.value) {
            best = Some(candidate);
        }

        range = [
            (xs[i.saturating_sub(1)], xs[(i + 1).min(points - 1)]),
            (ys[j.saturating_sub(1)], ys[(j + 1).min(points - 1)]),
        ];
        if range.iter().all(|&(lo, hi)| hi <= lo) {
            break;
        }
    }

    best
}

/// Alternating per-axis bracketing descent over a box.
///
/// Each iteration performs one [`bisect_minimize_1d`]-style step on the first
/// axis (second coordinate held at the centre of its current range), then one
/// on the second axis.
pub fn bisect_minimize_2d<F>(f: F, bounds: [(f64, f64); 2], iterations: usize) -> Option<Minimum2d>
where
    F: Fn([f64; 2]) -> f64,
{
    if bounds.iter().any(|&(lo, hi)| !valid_range(lo, hi)) {
        return None;
    }

    let mut best: Option<Minimum2d> = None;
    let mut probe = |p: [f64; 2]| -> f64 {
        let v = f(p);
        if !v.is_nan() && best.is_none_or(|b| v < b.value) {
            best = Some(Minimum2d { x: p, value: v });
        }
        score(v)
    };

    let mut range = bounds;
    for _ in 0..iterations {
        for axis in 0..2 {
            let other = 1 - axis;
            let (a, b) = range[axis];
            let m = 0.5 * (a + b);
            let q1 = 0.5 * (a + m);
            let q3 = 0.5 * (m + b);
            let fixed = 0.5 * (range[other].0 + range[other].1);
            let at = |v: f64| {
                let mut p = [0.0; 2];
                p[axis] = v;
                p[other] = fixed;
                p
            };

            let f1 = probe(at(q1));
            let fm = probe(at(m));
            let f3 = probe(at(q3));

            range[axis] = if f1 < fm && f1 <= f3 {
                (a, m)
            } else if f3 < fm {
                (m, b)
            } else {
                (q1, q3)
            };
        }
    }

    best
}

/// `t / (1 - t)`: maps `[0, 1)` onto `[0, ∞)`.
pub fn unit_to_half_line(t: f64) -> f64 {
    if t >= 1.0 { f64::INFINITY } else { t / (1.0 - t) }
}

/// Inverse of [`unit_to_half_line`].
pub fn half_line_to_unit(x: f64) -> f64 {
    if x == f64::INFINITY { 1.0 } else { x / (1.0 + x) }
}

/// `lo + (hi - lo) t`.
pub fn unit_to_interval(t: f64, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * t
}

#[derive(Default)]
struct Best1d(Option<Minimum1d>);

impl Best1d {
    fn probe<F: Fn(f64) -> f64>(&mut self, f: &F, x: f64) -> f64 {
        let v = f(x);
        if !v.is_nan() && self.0.is_none_or(|b| v < b.value) {
            self.0 = Some(Minimum1d { x, value: v });
        }
        score(v)
    }
}

/// NaN compares as worse than every number.
fn score(v: f64) -> f64 {
    if v.is_nan() { f64::INFINITY } else { v }
}

/// Index of the smallest non-NaN value; the smaller index wins ties.
fn argmin(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        if best.is_none_or(|b| v < values[b]) {
            best = Some(i);
        }
    }
    best
}

fn linspace(a: f64, b: f64, points: usize) -> Vec<f64> {
    let step = (b - a) / (points - 1) as f64;
    (0..points)
        .map(|i| if i == points - 1 { b } else { a + i as f64 * step })
        .collect()
}

fn valid_range(lo: f64, hi: f64) -> bool {
    lo.is_finite() && hi.is_finite() && lo <= hi
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_finds_quadratic_minimum() {
        let m = grid_minimize_1d(|x| (x - 0.3).powi(2), 0.0, 1.0, 11, 12).unwrap();
        assert!((m.x - 0.3).abs() < 1e-6);
        assert!(m.value < 1e-12);
    }

    #[test]
    fn grid_skips_nan_region() {
        let f = |x: f64| if x < 0.5 { f64::NAN } else { (x - 0.7).abs() };
        let m = grid_minimize_1d(f, 0.0, 1.0, 9, 20).unwrap();
        assert!((m.x - 0.7).abs() < 1e-6);
    }

    #[test]
    fn all_nan_objective_yields_none() {
        assert!(grid_minimize_1d(|_| f64::NAN, 0.0, 1.0, 5, 4).is_none());
        assert!(bisect_minimize_1d(|_| f64::NAN, 0.0, 1.0, 4).is_none());
        assert!(grid_minimize_2d(|_| f64::NAN, [(0.0, 1.0), (0.0, 1.0)], 5, 4).is_none());
        assert!(bisect_minimize_2d(|_| f64::NAN, [(0.0, 1.0), (0.0, 1.0)], 4).is_none());
    }

    #[test]
    fn ties_resolve_to_smaller_index() {
        let m = grid_minimize_1d(|_| 1.0, -2.0, 2.0, 5, 3).unwrap();
        assert_eq!(m.x, -2.0);
    }

    #[test]
    fn bisection_descends_to_minimum() {
        let m = bisect_minimize_1d(|x| (x - 2.5).powi(2) + 1.0, 0.0, 10.0, 60).unwrap();
        assert!((m.x - 2.5).abs() < 1e-8);
        assert!((m.value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn bisection_reports_boundary_minimum() {
        let m = bisect_minimize_1d(|x| x, 0.0, 1.0, 30).unwrap();
        assert_eq!(m.x, 0.0);
    }

    #[test]
    fn two_dimensional_variants_agree() {
        let f = |p: [f64; 2]| (p[0] - 0.2).powi(2) + 2.0 * (p[1] - 0.6).powi(2);
        let g = grid_minimize_2d(f, [(0.0, 1.0), (0.0, 1.0)], 9, 15).unwrap();
        assert!((g.x[0] - 0.2).abs() < 1e-6 && (g.x[1] - 0.6).abs() < 1e-6);
        let b = bisect_minimize_2d(f, [(0.0, 1.0), (0.0, 1.0)], 60).unwrap();
        assert!((b.x[0] - 0.2).abs() < 1e-6 && (b.x[1] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn half_line_mapping_round_trips() {
        for k in 0..20 {
            let t = k as f64 / 20.0;
            assert!((half_line_to_unit(unit_to_half_line(t)) - t).abs() < 1e-15);
        }
        assert_eq!(unit_to_half_line(1.0), f64::INFINITY);
        assert_eq!(unit_to_interval(0.25, 2.0, 6.0), 3.0);
    }
}
