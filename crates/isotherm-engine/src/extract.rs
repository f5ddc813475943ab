//! Threshold extraction: find grid cells where the field sits on a threshold.
//!
//! The scan is confined to the bounding region of the samples at or above
//! the threshold (optionally padded by `margin`). This concentrates the
//! work where a crossing is plausible but means a crossing far from any
//! above-threshold sample is never found. The field itself is
//! interpolated from the whole sample set.
//!
//! This is step 1 of the pipeline, followed by ordering.

use serde::{Deserialize, Serialize};

use crate::interpolate::{InverseDistance, Interpolator};
use crate::region::{BoundingRegion, Grid};
use crate::sample::SampleSet;
use crate::types::{ContourConfig, EngineError, GeoPoint};

/// Result of scanning one threshold.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Extraction {
    /// Region that was scanned (after margin), `None` when no sample
    /// reached the threshold.
    pub region: Option<BoundingRegion>,
    /// Samples at or above the threshold.
    pub above_threshold: usize,
    /// Grid cells visited.
    pub cells_scanned: usize,
    /// Cells skipped because interpolation had no data.
    pub cells_skipped: usize,
    /// Accepted cells in scan order (latitude outer, longitude inner).
    pub points: Vec<GeoPoint>,
}

/// Outcome of running an [`Interpolator`] over a grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scan {
    /// Cells whose estimate fell inside the tolerance band.
    pub points: Vec<GeoPoint>,
    /// Grid cells visited.
    pub cells_scanned: usize,
    /// Cells skipped because interpolation failed.
    pub cells_skipped: usize,
}

/// Reject thresholds the comparison logic cannot work with.
pub(crate) fn check_threshold(threshold: f64) -> Result<(), EngineError> {
    if threshold.is_finite() {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!(
            "threshold must be finite, got {threshold}"
        )))
    }
}

/// Collect the grid cells near `threshold`.
///
/// Only the samples at or above `threshold` bound the scan, but every cell
/// is interpolated from the whole set, so samples below the threshold
/// pull the field down toward the crossing.
///
/// # Errors
///
/// Returns [`EngineError::InvalidConfig`] for an unusable config or a
/// non-finite threshold, and [`EngineError::GridTooLarge`] when the scan
/// would exceed `config.max_grid_cells`. No samples at or above the
/// threshold is not an error: the extraction is simply empty.
pub fn extract(
    samples: &SampleSet,
    threshold: f64,
    config: &ContourConfig,
) -> Result<Extraction, EngineError> {
    config.validate()?;
    check_threshold(threshold)?;

    let above: Vec<GeoPoint> = samples.at_or_above(threshold).map(|s| s.location()).collect();
    let Some(region) = BoundingRegion::from_points(above.iter().copied()) else {
        tracing::debug!(threshold, samples = samples.len(), "no samples reach threshold");
        return Ok(Extraction::default());
    };
    let region = region.expand(config.margin);

    let cells = region.cell_count(config.resolution);
    if cells > config.max_grid_cells {
        return Err(EngineError::GridTooLarge {
            cells,
            limit: config.max_grid_cells,
        });
    }

    let interpolator = InverseDistance::new(samples, config.neighbors);
    let scan = scan(
        &interpolator,
        region.grid(config.resolution),
        threshold,
        config.tolerance,
    );

    tracing::debug!(
        threshold,
        samples = samples.len(),
        above_threshold = above.len(),
        cells_scanned = scan.cells_scanned,
        cells_skipped = scan.cells_skipped,
        accepted = scan.points.len(),
        "threshold scan complete"
    );

    Ok(Extraction {
        region: Some(region),
        above_threshold: above.len(),
        cells_scanned: scan.cells_scanned,
        cells_skipped: scan.cells_skipped,
        points: scan.points,
    })
}

/// Evaluate `interpolator` at every cell of `grid`, keeping the cells with
/// `|value - threshold| < tolerance`.
///
/// A cell whose interpolation fails is counted and skipped; the scan
/// always runs to the end of the grid.
pub fn scan<I: Interpolator + ?Sized>(
    interpolator: &I,
    grid: Grid,
    threshold: f64,
    tolerance: f64,
) -> Scan {
    let mut result = Scan {
        points: Vec::new(),
        cells_scanned: grid.len(),
        cells_skipped: 0,
    };
    for cell in grid {
        match interpolator.interpolate(cell) {
            Ok(estimate) if (estimate.value - threshold).abs() < tolerance => {
                result.points.push(cell);
            }
            Ok(_) => {}
            Err(_) => result.cells_skipped += 1,
        }
    }
    result
}
