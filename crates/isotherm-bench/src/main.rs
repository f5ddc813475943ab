//! isotherm-bench: CLI tool for contour parameter experimentation and diagnostics.
//!
//! Traces threshold contours over a JSON file of samples with configurable
//! parameters, printing detailed per-stage diagnostics. Useful for:
//!
//! - Tuning grid resolution, band tolerance, and smoothing width
//! - Checking how large a scan a region and resolution produce
//! - Measuring per-stage durations to identify bottlenecks
//! - Exporting contours to GeoJSON for inspection in a GIS tool
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin isotherm-bench -- [OPTIONS] <SAMPLES_PATH>
//! ```
//!
//! The samples file is a JSON array of `{"latitude", "longitude",
//! "value"}` objects (`lat`/`lon` are accepted as aliases).

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use isotherm_engine::diagnostics::{Clock, PipelineDiagnostics};
use isotherm_engine::{ContourConfig, DomainProfile, Sample, SampleSet, Threshold, ThresholdContour};
use tracing_subscriber::{EnvFilter, fmt};

/// Contour parameter experimentation and diagnostics for isotherm.
///
/// Traces one contour per threshold over the given samples and prints
/// detailed per-stage timing and count diagnostics.
#[derive(Parser)]
#[command(name = "isotherm-bench", version, allow_negative_numbers = true)]
struct Cli {
    /// Path to the samples JSON file.
    samples_path: PathBuf,

    /// Threshold to trace. Repeat for several contours.
    #[arg(long = "threshold", required_unless_present = "profile")]
    thresholds: Vec<f64>,

    /// Domain profile JSON file supplying the thresholds.
    #[arg(long, conflicts_with = "thresholds")]
    profile: Option<PathBuf>,

    /// Grid step in degrees.
    #[arg(long, default_value_t = ContourConfig::DEFAULT_RESOLUTION)]
    resolution: f64,

    /// Acceptance band half-width around the threshold.
    #[arg(long, default_value_t = ContourConfig::DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Smoothing window half-width (0 disables smoothing).
    #[arg(long, default_value_t = ContourConfig::DEFAULT_SMOOTHING_HALF_WIDTH)]
    half_width: usize,

    /// Nearest samples blended per interpolation.
    #[arg(long, default_value_t = ContourConfig::DEFAULT_NEIGHBORS, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    neighbors: usize,

    /// Degrees added around the above-threshold region before scanning.
    #[arg(long, default_value_t = ContourConfig::DEFAULT_MARGIN)]
    margin: f64,

    /// Refuse scans larger than this many grid cells.
    #[arg(long, default_value_t = ContourConfig::DEFAULT_MAX_GRID_CELLS)]
    max_grid_cells: usize,

    /// Write the contours of the first run as GeoJSON to this file.
    #[arg(long)]
    geojson: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Full contour config as a JSON string.
    ///
    /// When provided, all other contour parameter flags are ignored.
    /// Missing fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// Build a [`ContourConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.  Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<ContourConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        ContourConfig {
            resolution: cli.resolution,
            tolerance: cli.tolerance,
            smoothing_half_width: cli.half_width,
            neighbors: cli.neighbors,
            margin: cli.margin,
            max_grid_cells: cli.max_grid_cells,
        }
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Load the samples file, dropping invalid entries with a warning.
fn load_samples(path: &Path) -> Result<SampleSet, String> {
    let bytes =
        std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    let raw: Vec<Sample> = serde_json::from_slice(&bytes)
        .map_err(|e| format!("Error parsing samples in {}: {e}", path.display()))?;
    Ok(keep_valid(raw))
}

/// Build the sample set from the valid entries.
///
/// [`SampleSet::partition_valid`] already warns with the drop count; each
/// rejection is detailed at debug level.
fn keep_valid(raw: Vec<Sample>) -> SampleSet {
    let (samples, rejected) = SampleSet::partition_valid(raw);
    for error in &rejected {
        tracing::debug!(%error, "rejected sample");
    }
    samples
}

/// The thresholds to trace, from `--profile` or the `--threshold` flags.
fn thresholds_from_cli(cli: &Cli) -> Result<(String, Vec<Threshold>), String> {
    if let Some(ref path) = cli.profile {
        let bytes =
            std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))?;
        let profile: DomainProfile = serde_json::from_slice(&bytes)
            .map_err(|e| format!("Error parsing profile {}: {e}", path.display()))?;
        return Ok((profile.name, profile.thresholds));
    }
    let thresholds = cli
        .thresholds
        .iter()
        .map(|&value| Threshold::new(value.to_string(), value, ""))
        .collect();
    Ok(("thresholds".to_string(), thresholds))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let (name, thresholds) = match thresholds_from_cli(&cli) {
        Ok(t) => t,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let samples = match load_samples(&cli.samples_path) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Samples: {} ({} valid)",
        cli.samples_path.display(),
        samples.len(),
    );
    eprintln!("Thresholds: {name} ({})", thresholds.len());
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    // Indexed by threshold, then run.
    let mut all_diagnostics: Vec<Vec<PipelineDiagnostics>> =
        vec![Vec::with_capacity(cli.runs); thresholds.len()];
    let mut contours = Vec::with_capacity(thresholds.len());

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        for (index, threshold) in thresholds.iter().enumerate() {
            match isotherm_engine::diagnostics::compute_staged_with_diagnostics(
                &samples,
                threshold.value,
                &config,
                &StdClock,
            ) {
                Ok((staged, diagnostics)) => {
                    if cli.json {
                        match serde_json::to_string_pretty(&diagnostics) {
                            Ok(json) => println!("{json}"),
                            Err(e) => {
                                eprintln!("Error serializing diagnostics: {e}");
                                return ExitCode::FAILURE;
                            }
                        }
                    } else {
                        println!("[{}]", threshold.label);
                        println!("{}", diagnostics.report());
                        println!();
                    }

                    if run == 0 {
                        contours.push(ThresholdContour {
                            threshold: threshold.clone(),
                            path: staged.smoothed,
                        });
                    }
                    all_diagnostics[index].push(diagnostics);
                }
                Err(e) => {
                    eprintln!("Contour error at threshold {}: {e}", threshold.value);
                    return ExitCode::FAILURE;
                }
            }
        }

        // Write GeoJSON on the first run only.
        if run == 0
            && let Some(ref geojson_path) = cli.geojson
        {
            write_geojson(geojson_path, &name, &contours);
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    // Print summary when multiple runs.
    if cli.runs > 1 {
        for (threshold, diagnostics) in thresholds.iter().zip(&all_diagnostics) {
            print_multi_run_summary(&threshold.label, diagnostics);
        }
    }

    ExitCode::SUCCESS
}

/// Serialize `contours` and write them to `path`, reporting on stderr.
fn write_geojson(path: &Path, name: &str, contours: &[ThresholdContour]) {
    let options = isotherm_export::GeoJsonOptions {
        name: Some(name),
        ..isotherm_export::GeoJsonOptions::default()
    };
    let geojson = match isotherm_export::to_geojson(contours, &options) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error serializing GeoJSON: {e}");
            return;
        }
    };
    match std::fs::write(path, &geojson) {
        Ok(()) => {
            eprintln!(
                "GeoJSON written to {} ({} bytes)",
                path.display(),
                geojson.len(),
            );
        }
        Err(e) => {
            eprintln!("Error writing GeoJSON to {}: {e}", path.display());
        }
    }
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&PipelineDiagnostics) -> Duration;

/// Print aggregated statistics across multiple runs of one threshold.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(label: &str, all_diagnostics: &[PipelineDiagnostics]) {
    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize for {label}");
        return;
    }

    println!();
    println!(
        "Summary: {label} ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    // Per-stage means.
    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Extraction", |d| d.extraction.duration),
        ("Ordering", |d| d.ordering.duration),
        ("Smoothing", |d| d.smoothing.duration),
    ];

    for (name, extractor) in stage_extractors {
        let stage_mean = all_diagnostics
            .iter()
            .map(|d| extractor(d).as_secs_f64() * 1000.0)
            .sum::<f64>()
            / all_diagnostics.len() as f64;
        println!("{name:<24} {stage_mean:>10.3}ms");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("isotherm-bench").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_build_config() {
        let cli = parse(&[
            "samples.json",
            "--threshold",
            "20",
            "--resolution",
            "0.5",
            "--margin",
            "0.25",
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert!((config.resolution - 0.5).abs() < f64::EPSILON);
        assert!((config.margin - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.neighbors, ContourConfig::DEFAULT_NEIGHBORS);
    }

    #[test]
    fn config_json_overrides_flags() {
        let cli = parse(&[
            "samples.json",
            "--threshold",
            "20",
            "--resolution",
            "0.5",
            "--config-json",
            r#"{"resolution": 0.1, "smoothing_half_width": 2}"#,
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert!((config.resolution - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.smoothing_half_width, 2);
    }

    #[test]
    fn invalid_config_is_reported() {
        let cli = parse(&["samples.json", "--threshold", "20", "--resolution", "0"]);
        assert!(config_from_cli(&cli).unwrap_err().contains("resolution"));
    }

    #[test]
    fn repeated_thresholds_keep_order() {
        let cli = parse(&["samples.json", "--threshold", "300", "--threshold", "150"]);
        let (_, thresholds) = thresholds_from_cli(&cli).unwrap();
        let values: Vec<f64> = thresholds.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![300.0, 150.0]);
        assert_eq!(thresholds[0].label, "300");
    }

    #[test]
    fn invalid_samples_are_dropped() {
        let samples = keep_valid(vec![
            Sample::new(35.0, 139.0, 120.0),
            Sample::new(35.0, f64::NAN, 130.0),
            Sample::new(36.0, 140.0, f64::INFINITY),
        ]);
        assert_eq!(samples.samples(), &[Sample::new(35.0, 139.0, 120.0)]);
    }

    #[test]
    fn threshold_or_profile_is_required() {
        let result = Cli::try_parse_from(["isotherm-bench", "samples.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn threshold_and_profile_conflict() {
        let result = Cli::try_parse_from([
            "isotherm-bench",
            "samples.json",
            "--threshold",
            "20",
            "--profile",
            "moth.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn zero_runs_rejected() {
        let result =
            Cli::try_parse_from(["isotherm-bench", "samples.json", "--threshold", "20", "--runs", "0"]);
        assert!(result.is_err());
    }
}
