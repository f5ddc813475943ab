//! Compact `[lat, lon]` JSON for map front ends.
//!
//! Emits an array of `{label, value, color, path}` objects, one per
//! contour in input order (empty paths included), where `path` is a list
//! of `[lat, lon]` pairs. Leaflet-style map libraries take this shape
//! directly as polygon or polyline vertices.

use isotherm_engine::ThresholdContour;
use serde::Serialize;

use crate::{ExportError, check_finite, display_color};

#[derive(Serialize)]
struct LatLonContour<'a> {
    label: &'a str,
    value: f64,
    color: &'a str,
    path: Vec<[f64; 2]>,
}

/// Serialize contours as `[{label, value, color, path: [[lat, lon], ...]}]`.
///
/// # Errors
///
/// Returns [`ExportError::NonFiniteCoordinate`] if any path point is NaN
/// or infinite.
pub fn to_lat_lon_json(contours: &[ThresholdContour]) -> Result<String, ExportError> {
    check_finite(contours)?;
    let entries: Vec<LatLonContour<'_>> = contours
        .iter()
        .map(|c| LatLonContour {
            label: &c.threshold.label,
            value: c.threshold.value,
            color: display_color(&c.threshold.color),
            path: c.path.to_lat_lon_pairs(),
        })
        .collect();
    Ok(serde_json::to_string(&entries)?)
}
