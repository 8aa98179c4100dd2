//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::distributions::{AnyDistribution, Cumulative, Density, Moments};
use crate::domain::{FitConfig, FitReport, Interval, SampleSource, SampleStats};
use crate::fit::FitSelection;
use crate::report::QuantileResidual;

/// Format the full run summary (data stats + per-family errors + chosen family).
pub fn format_run_summary(stats: &SampleStats, selection: &FitSelection, config: &FitConfig) -> String {
    let mut out = String::new();

    out.push_str("=== distfit - method-of-quantiles fit ===\n");
    match &config.source {
        SampleSource::File(path) => out.push_str(&format!("Source: {}\n", path.display())),
        SampleSource::Synthetic { spec, count, seed } => {
            out.push_str(&format!("Source: synthetic {spec} (n={count}, seed={seed})\n"))
        }
    }
    out.push_str(&format_stats(stats));
    let (lo, hi) = config.settings.quantile_range;
    out.push_str(&format!(
        "Quantile grid: p in [{lo:.3}, {hi:.3}], {} partitions\n",
        config.settings.partitions
    ));

    out.push_str("\nFamily diagnostics (error = SSE/SST of quantiles):\n");
    for c in &selection.candidates {
        let chosen = if c.distribution == selection.best.distribution { "*" } else { " " };
        out.push_str(&format!(
            "{chosen} {:<18} error={:.3e}  {}\n",
            c.distribution.kind.display_name(),
            c.error,
            c.distribution
        ));
    }
    for s in &selection.skipped {
        out.push_str(&format!("  (skipped {}) {}\n", s.kind.display_name(), s.reason));
    }

    out.push_str("\nChosen distribution:\n");
    out.push_str(&format!("- {}\n", selection.best.distribution));
    out.push_str(&format_description(&selection.best_distribution));
    out.push('\n');

    out
}

fn format_stats(stats: &SampleStats) -> String {
    format!(
        "Samples: n={} | range=[{:.4}, {:.4}] | mean={:.4} | sd={:.4}\n",
        stats.n, stats.min, stats.max, stats.mean, stats.std_dev
    )
}

/// Support, quartiles and moments of a distribution, one per line.
pub fn format_description(dist: &AnyDistribution) -> String {
    let mut out = String::new();
    let (lo, hi) = dist.support();
    out.push_str(&format!("- support : [{}, {}]\n", fmt_num(lo), fmt_num(hi)));
    out.push_str(&format!(
        "- quartiles: {} | {} | {}\n",
        fmt_num(dist.quantile(0.25, Interval::Lower)),
        fmt_num(dist.median()),
        fmt_num(dist.quantile(0.75, Interval::Lower)),
    ));
    out.push_str(&format!("- mean    : {}\n", fmt_opt(dist.mean())));
    out.push_str(&format!("- std dev : {}\n", fmt_opt(dist.std_dev())));
    out.push_str(&format!("- skewness: {}\n", fmt_opt(dist.skewness())));
    out.push_str(&format!("- ex. kurt: {}\n", fmt_opt(dist.excess_kurtosis())));
    out
}

/// Empirical vs fitted quantiles.
pub fn format_quantile_table(rows: &[QuantileResidual]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>8} {:>14} {:>14} {:>12}", "p", "empirical", "fitted", "residual").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<8} {:-<14} {:-<14} {:-<12}", "", "", "", "").trim_end());
    out.push('\n');
    for r in rows {
        out.push_str(
            format!(
                "{:>8.4} {:>14} {:>14} {:>12}",
                r.p,
                fmt_num(r.empirical),
                fmt_num(r.fitted),
                fmt_num(r.residual)
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Summary of a saved report (used by `plot`).
pub fn format_saved_report(report: &FitReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Report from {} ({})\n",
        report.tool,
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format_stats(&report.samples));
    out.push_str(&format!("Best: {} (error={:.3e})\n", report.best.distribution, report.best.error));
    out
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(v) if v.is_finite() => fmt_num(v),
        _ => "undefined".to_string(),
    }
}

fn fmt_num(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else if v != 0.0 && (v.abs() >= 1e6 || v.abs() < 1e-4) {
        format!("{v:.6e}")
    } else {
        format!("{v:.6}")
    }
}
