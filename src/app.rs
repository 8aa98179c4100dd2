//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs the log subscriber
//! - evaluates single-distribution queries
//! - runs fitting + family selection
//! - prints reports/plots and writes optional exports

use clap::Parser;

use crate::cli::{CdfArgs, Cli, Command, DistArgs, FitArgs, PlotArgs, QuantileArgs, SampleArgs};
use crate::distributions::{AnyDistribution, Cumulative};
use crate::domain::{DistributionSpec, FitConfig, Interval, SampleSource};
use crate::error::AppError;
use crate::fit::FitSettings;

pub mod pipeline;

/// Entry point for the `distfit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(&cli);

    match cli.command {
        Command::Quantile(args) => handle_quantile(args),
        Command::Cdf(args) => handle_cdf(args),
        Command::Describe(args) => handle_describe(args),
        Command::Sample(args) => handle_sample(args),
        Command::Fit(args) => handle_fit(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn init_logging(cli: &Cli) {
    // Diagnostics go to stderr so stdout stays pipeable.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(cli.log_level.as_tracing())
        .with_target(false)
        .try_init();
}

fn build_distribution(args: &DistArgs) -> Result<AnyDistribution, AppError> {
    Ok(DistributionSpec::new(args.dist, args.params.clone()).build()?)
}

fn interval(upper: bool) -> Interval {
    if upper { Interval::Upper } else { Interval::Lower }
}

fn handle_quantile(args: QuantileArgs) -> Result<(), AppError> {
    if !(0.0..=1.0).contains(&args.prob) {
        return Err(AppError::new(2, format!("--prob must be in [0, 1], got {}", args.prob)));
    }
    let dist = build_distribution(&args.dist)?;
    let x = dist.quantile(args.prob, interval(args.upper));
    if x.is_nan() {
        return Err(AppError::new(4, "Quantile evaluation failed (NaN)."));
    }
    println!("{x}");
    Ok(())
}

fn handle_cdf(args: CdfArgs) -> Result<(), AppError> {
    let dist = build_distribution(&args.dist)?;
    println!("{}", dist.cdf(args.x, interval(args.upper)));
    Ok(())
}

fn handle_describe(args: DistArgs) -> Result<(), AppError> {
    let dist = build_distribution(&args)?;
    println!("{}", dist.spec());
    print!("{}", crate::report::format_description(&dist));
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let spec = DistributionSpec::new(args.dist.dist, args.dist.params.clone());
    let values = crate::data::generate_samples(&spec, args.count, args.seed)?;
    match &args.output {
        Some(path) => {
            crate::io::write_samples(path, &values)?;
            tracing::info!(path = %path.display(), n = values.len(), "wrote samples");
        }
        None => {
            for v in &values {
                println!("{v}");
            }
        }
    }
    Ok(())
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args)?;
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.stats, &run.selection, &config)
    );

    if args.table {
        println!("{}", crate::report::format_quantile_table(&run.residuals));
    }

    if config.plot {
        let plot = crate::plot::render_fit_plot(
            &run.samples,
            &run.selection.best_distribution,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(path) = &config.export {
        crate::io::write_fit_json(path, &run.report)?;
        tracing::info!(path = %path.display(), "exported fit report");
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let report = crate::io::read_fit_json(&args.report)?;
    let dist = report.best.distribution.build()?;

    print!("{}", crate::report::format_saved_report(&report));
    let plot = crate::plot::render_pdf_plot(
        &dist,
        (report.samples.min, report.samples.max),
        args.width,
        args.height,
    );
    println!("{plot}");
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig, AppError> {
    let source = match (&args.input, args.dist) {
        (Some(path), None) => SampleSource::File(path.clone()),
        (None, Some(kind)) => SampleSource::Synthetic {
            spec: DistributionSpec::new(kind, args.params.clone()),
            count: args.count,
            seed: args.seed,
        },
        (None, None) => {
            return Err(AppError::new(2, "Provide samples with --input FILE or --dist/--params."));
        }
        (Some(_), Some(_)) => {
            return Err(AppError::new(2, "--input and --dist are mutually exclusive."));
        }
    };

    Ok(FitConfig {
        source,
        family: args.family,
        settings: FitSettings {
            quantile_range: (args.q_lo, args.q_hi),
            partitions: args.partitions,
            grid_points: args.grid_points,
            grid_iterations: args.grid_iterations,
            bisect_iterations: args.bisect_iterations,
        },
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export: args.export.clone(),
    })
}
