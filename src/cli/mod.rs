//! Command-line parsing for the distribution toolkit.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the numerical code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::{DistributionKind, FamilySpec};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "distfit", version, about = "Continuous distributions: quantiles, sampling and method-of-quantiles fitting")]
pub struct Cli {
    /// Diagnostic log level (written to stderr).
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Quantile of a distribution at probability `p`.
    Quantile(QuantileArgs),
    /// Cumulative probability of a distribution at `x`.
    Cdf(CdfArgs),
    /// Support, quartiles and moments of a distribution.
    Describe(DistArgs),
    /// Draw seeded samples from a distribution.
    Sample(SampleArgs),
    /// Fit families to samples by the method of quantiles and select the best.
    Fit(FitArgs),
    /// Plot the density of a previously exported fit report.
    Plot(PlotArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// A distribution family and its parameters.
#[derive(Debug, Clone, Args)]
pub struct DistArgs {
    /// Distribution family.
    #[arg(short = 'd', long, value_enum)]
    pub dist: DistributionKind,

    /// Parameters in family order, comma separated (e.g. `--params 2,0.5`).
    #[arg(short = 'p', long, value_delimiter = ',', allow_negative_numbers = true, required = true)]
    pub params: Vec<f64>,
}

#[derive(Debug, Clone, Args)]
pub struct QuantileArgs {
    #[command(flatten)]
    pub dist: DistArgs,

    /// Probability in [0, 1].
    #[arg(long)]
    pub prob: f64,

    /// Interpret `--prob` as an upper-tail probability.
    #[arg(long)]
    pub upper: bool,
}

#[derive(Debug, Clone, Args)]
pub struct CdfArgs {
    #[command(flatten)]
    pub dist: DistArgs,

    /// Point at which to evaluate.
    #[arg(short = 'x', long, allow_negative_numbers = true)]
    pub x: f64,

    /// Report the upper tail `P(X > x)`.
    #[arg(long)]
    pub upper: bool,
}

#[derive(Debug, Clone, Args)]
pub struct SampleArgs {
    #[command(flatten)]
    pub dist: DistArgs,

    /// Number of samples.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Write samples to a file instead of stdout.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Options for fitting.
#[derive(Debug, Clone, Args)]
pub struct FitArgs {
    /// Text file of samples (numbers separated by newlines, commas or spaces).
    #[arg(short = 'i', long, conflicts_with = "dist")]
    pub input: Option<PathBuf>,

    /// Fit synthetic samples drawn from this family instead of a file.
    #[arg(short = 'd', long, value_enum, requires = "params")]
    pub dist: Option<DistributionKind>,

    /// Parameters of the synthetic family, comma separated.
    #[arg(short = 'p', long, value_delimiter = ',', allow_negative_numbers = true)]
    pub params: Vec<f64>,

    /// Number of synthetic samples.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub count: usize,

    /// Random seed for synthetic samples.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Which family (or families) to fit.
    #[arg(long, value_enum, default_value_t = FamilySpec::Auto)]
    pub family: FamilySpec,

    /// Lowest probability of the quantile grid.
    #[arg(long, default_value_t = 0.05)]
    pub q_lo: f64,

    /// Highest probability of the quantile grid.
    #[arg(long, default_value_t = 0.95)]
    pub q_hi: f64,

    /// Number of grid partitions (the grid has one more point).
    #[arg(long, default_value_t = 20)]
    pub partitions: usize,

    /// Probes per refinement level of the shape grid search.
    #[arg(long, default_value_t = 17)]
    pub grid_points: usize,

    /// Refinement levels of the shape grid search.
    #[arg(long, default_value_t = 10)]
    pub grid_iterations: usize,

    /// Iterations of the one-parameter shape bisection.
    #[arg(long, default_value_t = 40)]
    pub bisect_iterations: usize,

    /// Print the empirical vs fitted quantile table.
    #[arg(long)]
    pub table: bool,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the fit report to JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Options for plotting a saved report.
#[derive(Debug, Clone, Args)]
pub struct PlotArgs {
    /// Report JSON file produced by `distfit fit --export`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_negative_params() {
        let cli = Cli::try_parse_from(["distfit", "cdf", "--dist", "normal", "--params=-1,2", "-x", "-0.5"]).unwrap();
        match cli.command {
            Command::Cdf(args) => {
                assert_eq!(args.dist.params, vec![-1.0, 2.0]);
                assert_eq!(args.x, -0.5);
                assert!(!args.upper);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn fit_defaults_match_settings() {
        let cli = Cli::try_parse_from(["distfit", "fit", "--dist", "gamma", "--params", "2,1"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.family, FamilySpec::Auto);
        assert_eq!((args.q_lo, args.q_hi, args.partitions), (0.05, 0.95, 20));
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn input_and_synthetic_conflict() {
        let err = Cli::try_parse_from(["distfit", "fit", "-i", "x.txt", "-d", "normal", "-p", "0,1"]);
        assert!(err.is_err());
    }
}
