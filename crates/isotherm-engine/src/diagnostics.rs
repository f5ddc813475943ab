//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! These diagnostics are permanent instrumentation intended for parameter
//! tuning: how large a grid a resolution produces, how many cells a
//! tolerance accepts, where the time goes.
//!
//! The engine never reads a clock itself. Callers pass a [`Clock`], which
//! keeps this crate free of platform timing APIs.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::Pipeline;
use crate::region::BoundingRegion;
use crate::sample::SampleSet;
use crate::types::{ContourConfig, ContourPath, EngineError, GeoPoint, StagedResult};

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque timestamp.
    type Instant;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: threshold scan.
    pub extraction: StageDiagnostics,
    /// Stage 2: angular ordering.
    pub ordering: StageDiagnostics,
    /// Stage 3: circular smoothing.
    pub smoothing: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Threshold scan metrics.
    Extraction {
        /// Grid step in degrees.
        resolution: f64,
        /// Acceptance band half-width.
        tolerance: f64,
        /// Padding added around the above-threshold region.
        margin: f64,
        /// Region scanned, `None` when nothing reached the threshold.
        region: Option<BoundingRegion>,
        /// Samples at or above the threshold.
        above_threshold: usize,
        /// Grid cells visited.
        cells_scanned: usize,
        /// Cells whose interpolation failed.
        cells_skipped: usize,
        /// Cells inside the band.
        points_accepted: usize,
    },
    /// Angular ordering metrics.
    Ordering {
        /// Points ordered.
        point_count: usize,
        /// Centroid the angles were measured around.
        centroid: Option<GeoPoint>,
    },
    /// Smoothing metrics.
    Smoothing {
        /// Window half-width.
        half_width: usize,
        /// Points in the smoothed path.
        point_count: usize,
        /// Mean distance each point moved, in degrees.
        mean_displacement: f64,
    },
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Threshold traced.
    pub threshold: f64,
    /// Samples in the input set.
    pub sample_count: usize,
    /// Grid cells visited.
    pub cells_scanned: usize,
    /// Points in the final output path.
    pub final_point_count: usize,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Contour Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Threshold: {}  |  Samples: {}",
            self.summary.threshold, self.summary.sample_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Extraction", &self.extraction),
            ("Ordering", &self.ordering),
            ("Smoothing", &self.smoothing),
        ];
        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Cells scanned: {}  |  Final path points: {}",
            self.summary.cells_scanned, self.summary.final_point_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Extraction {
            resolution,
            tolerance,
            margin,
            region,
            above_threshold,
            cells_scanned,
            cells_skipped,
            points_accepted,
        } => {
            let region = region.map_or_else(
                || "none".to_string(),
                |r| {
                    format!(
                        "[{:.3},{:.3}]x[{:.3},{:.3}]",
                        r.min_lat, r.max_lat, r.min_lon, r.max_lon
                    )
                },
            );
            format!(
                "res={resolution} tol={tolerance} margin={margin} region={region} above={above_threshold} cells={cells_scanned} skipped={cells_skipped} accepted={points_accepted}",
            )
        }
        StageMetrics::Ordering {
            point_count,
            centroid,
        } => match centroid {
            Some(c) => format!("{point_count} pts around ({:.4}, {:.4})", c.lat, c.lon),
            None => format!("{point_count} pts"),
        },
        StageMetrics::Smoothing {
            half_width,
            point_count,
            mean_displacement,
        } => {
            format!("w={half_width} {point_count} pts (mean shift {mean_displacement:.5} deg)")
        }
    }
}

/// Mean distance between corresponding points of two equal-length paths.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean_displacement(before: &ContourPath, after: &ContourPath) -> f64 {
    if before.is_empty() {
        return 0.0;
    }
    let total: f64 = before
        .points()
        .iter()
        .zip(after.points())
        .map(|(a, b)| a.distance(*b))
        .sum();
    total / before.len() as f64
}

/// Run the staged pipeline, timing each stage with `clock`.
///
/// Produces the same [`StagedResult`] as [`crate::compute_staged`] plus a
/// [`PipelineDiagnostics`] record.
///
/// # Errors
///
/// Same as [`crate::compute_staged`].
pub fn compute_staged_with_diagnostics<C: Clock>(
    samples: &SampleSet,
    threshold: f64,
    config: &ContourConfig,
    clock: &C,
) -> Result<(StagedResult, PipelineDiagnostics), EngineError> {
    let start = clock.now();

    let stage = clock.now();
    let extracted = Pipeline::new(samples, threshold, config.clone())?.extract()?;
    let extraction_time = clock.elapsed(&stage);
    let extraction = extracted.extraction();
    let extraction_metrics = StageMetrics::Extraction {
        resolution: config.resolution,
        tolerance: config.tolerance,
        margin: config.margin,
        region: extraction.region,
        above_threshold: extraction.above_threshold,
        cells_scanned: extraction.cells_scanned,
        cells_skipped: extraction.cells_skipped,
        points_accepted: extraction.points.len(),
    };

    let stage = clock.now();
    let ordered = extracted.order();
    let ordering_time = clock.elapsed(&stage);
    let ordering_metrics = StageMetrics::Ordering {
        point_count: ordered.ordered().len(),
        centroid: crate::order::centroid(ordered.ordered().points()),
    };

    let stage = clock.now();
    let smoothed = ordered.smooth();
    let smoothing_time = clock.elapsed(&stage);

    let result = smoothed.into_result();
    let total_duration = clock.elapsed(&start);

    let diagnostics = PipelineDiagnostics {
        extraction: StageDiagnostics {
            duration: extraction_time,
            metrics: extraction_metrics,
        },
        ordering: StageDiagnostics {
            duration: ordering_time,
            metrics: ordering_metrics,
        },
        smoothing: StageDiagnostics {
            duration: smoothing_time,
            metrics: StageMetrics::Smoothing {
                half_width: config.smoothing_half_width,
                point_count: result.smoothed.len(),
                mean_displacement: mean_displacement(&result.ordered, &result.smoothed),
            },
        },
        total_duration,
        summary: PipelineSummary {
            threshold,
            sample_count: samples.len(),
            cells_scanned: result.extraction.cells_scanned,
            final_point_count: result.smoothed.len(),
        },
    };

    tracing::debug!(
        threshold,
        total_ms = duration_ms(total_duration),
        final_points = result.smoothed.len(),
        "contour pipeline complete"
    );

    Ok((result, diagnostics))
}
