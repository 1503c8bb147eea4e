//! Main entry point for the `backup-size` CLI application.
//!
//! `backup-size` estimates how much space a backup of a fixed set of locations
//! will need and, optionally, reports what a restore actually wrote.
//!
//! # Responsibilities
//! - Parses CLI arguments via [`clap`] using the [`Args`] struct
//! - Validates the mode token before anything is measured
//! - Loads the resource configuration and builds the exclusion matcher
//! - Delegates measuring to [`ReportBuilder`] and printing to [`output`]
//! - Maps the outcome to a process exit code
//!
//! # Exit codes
//! - `0`: reports produced (recoverable problems are only logged)
//! - `1`: unknown mode token, or a fatal configuration error

use anyhow::{Context, Result};
use backup_size::logging::SpinnerAwareLogger;
use backup_size::output::{self, terminal};
use backup_size::report::{Mode, ReportBuilder, ReportKind};
use backup_size::{Args, EstimateConfig, Exclusions, SizeWalker, partitions};
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info};
use std::process::ExitCode;
use std::time::Duration;

/// Sets up the thread pool configuration based on CLI arguments.
fn setup_thread_pool(args: &Args) -> Result<()> {
    if let Some(n_threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build_global()
            .context("Failed to configure thread pool")?;
        info!("Using {} thread(s)", n_threads);
    } else {
        info!("Using all {} available CPU threads", num_cpus::get());
    }
    Ok(())
}

/// Adds a spinner to `progress`; log records suspend it while they print.
fn spinner(progress: &MultiProgress, message: &'static str) -> Result<ProgressBar> {
    let pb = progress.add(ProgressBar::new_spinner());
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner} {msg} [{elapsed}]")
            .context("Failed to set progress template")?,
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn load_config(args: &Args) -> Result<EstimateConfig> {
    let mut config = match &args.config {
        Some(path) => EstimateConfig::load(path)?,
        None => EstimateConfig::default(),
    };
    config.apply_args(args);
    Ok(config)
}

fn run(args: &Args, mode: Mode, progress: &MultiProgress) -> Result<()> {
    setup_thread_pool(args)?;
    let config = load_config(args)?;
    let walker = SizeWalker::new(Exclusions::new(&config.exclude)?);
    let builder = ReportBuilder::new(&walker);

    // Estimate → partitions → (actual) → CSV
    let pb = spinner(progress, "Estimating backup size...")?;
    let estimate = builder.estimate(&config);
    pb.finish_and_clear();
    let estimate = estimate.context("Estimate report could not be built")?;
    terminal::render(ReportKind::Estimate.title(), &estimate, args.sort)?;

    if !args.no_partitions {
        let partitions = partitions::partition_usage(&config.partition_mounts);
        terminal::render_partitions(&partitions)?;
    }

    let mut actual = None;
    if mode == Mode::EstimateAndActual {
        let pb = spinner(progress, "Measuring recovered data...")?;
        let result = builder.actual(&config.actual_target);
        pb.finish_and_clear();
        match result {
            Ok(set) => {
                terminal::render(ReportKind::Actual.title(), &set, args.sort)?;
                actual = Some(set);
            }
            Err(err) => error!("{err}"),
        }
    }

    if let Some(csv_path) = &args.output {
        let mut reports = vec![(ReportKind::Estimate, &estimate)];
        if let Some(set) = &actual {
            reports.push((ReportKind::Actual, set));
        }
        output::render_csv(csv_path, &reports, args.sort)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let progress = MultiProgress::new();
    if let Err(err) = SpinnerAwareLogger::from_env(progress.clone()).init() {
        eprintln!("Failed to initialize logging: {err}");
    }

    let mode = match Mode::from_arg(args.mode.as_deref()) {
        Ok(mode) => mode,
        Err(err) => {
            println!("{err}");
            return ExitCode::from(1);
        }
    };

    match run(&args, mode, &progress) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(1)
        }
    }
}
