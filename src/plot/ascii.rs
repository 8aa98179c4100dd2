//! ASCII plotting for terminal output.
//!
//! Fixed-size character grid, deterministic for a given input.
//!
//! Plot elements:
//! - sample histogram (density-normalized): `#` bars
//! - fitted density: `*` line

use crate::distributions::{AnyDistribution, Density};

/// Histogram of `samples` with the density of `dist` drawn on top.
pub fn render_fit_plot(samples: &[f64], dist: &AnyDistribution, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let (x_min, x_max) = sample_range(samples).unwrap_or((0.0, 1.0));
    let bars = histogram(samples, x_min, x_max, width);
    let curve = sample_pdf(dist, x_min, x_max, width);
    render_plot(Some(&bars), &curve, x_min, x_max, height)
}

/// Density of `dist` alone over `range` (used when re-plotting a saved report).
pub fn render_pdf_plot(dist: &AnyDistribution, range: (f64, f64), width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let (x_min, x_max) = if range.1 > range.0 {
        range
    } else {
        pad_range(range.0, range.1, 0.05)
    };
    let curve = sample_pdf(dist, x_min, x_max, width);
    render_plot(None, &curve, x_min, x_max, height)
}

fn render_plot(bars: Option<&[f64]>, curve: &[Option<f64>], x_min: f64, x_max: f64, height: usize) -> String {
    let width = curve.len();

    let hist_max = bars.map(|b| b.iter().copied().fold(0.0, f64::max)).unwrap_or(0.0);
    let pdf_max = curve.iter().flatten().copied().fold(0.0, f64::max);
    // A pole at the support edge would flatten everything else.
    let y_max = if hist_max > 0.0 {
        hist_max.max(pdf_max.min(1.5 * hist_max))
    } else {
        pdf_max
    };
    let y_max = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so bars fill in around it.
    let mut prev = None;
    for (x, y) in curve.iter().enumerate() {
        match y {
            Some(y) => {
                let row = map_y(*y, y_max, height);
                match prev {
                    Some((x0, y0)) => draw_line(&mut grid, x0, y0, x, row, '*'),
                    None => grid[row][x] = '*',
                }
                prev = Some((x, row));
            }
            None => prev = None,
        }
    }

    if let Some(bars) = bars {
        for (x, &density) in bars.iter().enumerate() {
            if density <= 0.0 {
                continue;
            }
            let top = map_y(density, y_max, height);
            for row in grid.iter_mut().skip(top) {
                if row[x] == ' ' {
                    row[x] = '#';
                }
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format!("Plot: x=[{x_min:.4}, {x_max:.4}] | density=[0, {y_max:.4}]\n"));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn sample_range(samples: &[f64]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in samples.iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) {
        None
    } else if max > min {
        Some((min, max))
    } else {
        Some(pad_range(min, max, 0.05))
    }
}

/// Density-normalized bin heights, one bin per column.
fn histogram(samples: &[f64], x_min: f64, x_max: f64, bins: usize) -> Vec<f64> {
    let mut counts = vec![0usize; bins];
    let mut total = 0usize;
    for &v in samples.iter().filter(|v| v.is_finite()) {
        counts[map_x(v, x_min, x_max, bins)] += 1;
        total += 1;
    }
    if total == 0 {
        return vec![0.0; bins];
    }
    let bin_width = (x_max - x_min) / bins as f64;
    counts
        .into_iter()
        .map(|c| c as f64 / (total as f64 * bin_width))
        .collect()
}

/// Density at each column center; `None` where it is not finite.
fn sample_pdf(dist: &AnyDistribution, x_min: f64, x_max: f64, columns: usize) -> Vec<Option<f64>> {
    let step = (x_max - x_min) / columns as f64;
    (0..columns)
        .map(|i| {
            let y = dist.pdf(x_min + (i as f64 + 0.5) * step);
            y.is_finite().then_some(y.max(0.0))
        })
        .collect()
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs().max(min.abs());
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

/// Bin index of `x`; the right edge falls into the last bin.
fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    ((u * width as f64) as usize).min(width - 1)
}

fn map_y(y: f64, y_max: f64, height: usize) -> usize {
    let u = (y / y_max).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            grid[y0 as usize][x0 as usize] = ch;
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
