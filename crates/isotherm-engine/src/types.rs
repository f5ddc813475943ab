//! Shared types for the isotherm contour engine.

use serde::{Deserialize, Serialize};

use crate::extract::Extraction;
use crate::region::BoundingRegion;

/// A geographic coordinate in degrees.
///
/// Distances are computed in the flat (latitude, longitude) plane, which
/// is adequate at the scale of a few degrees.
///
/// Serializes as a `[lat, lon]` pair, the shape map front ends expect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new point.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Squared Euclidean distance to another point in degree space.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        dlat.mul_add(dlat, dlon * dlon)
    }

    /// Euclidean distance to another point in degree space.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Returns `true` if both coordinates are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Convert to a `geo::Coord` (`x` = longitude, `y` = latitude).
    #[must_use]
    pub const fn to_coord(self) -> geo::Coord<f64> {
        geo::Coord {
            x: self.lon,
            y: self.lat,
        }
    }

    /// Convert from a `geo::Coord` (`x` = longitude, `y` = latitude).
    #[must_use]
    pub const fn from_coord(coord: geo::Coord<f64>) -> Self {
        Self {
            lat: coord.y,
            lon: coord.x,
        }
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(p: GeoPoint) -> Self {
        [p.lat, p.lon]
    }
}

/// A field estimate produced by an [`Interpolator`](crate::Interpolator).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterpolatedPoint {
    /// Where the field was evaluated.
    pub point: GeoPoint,
    /// Estimated scalar value at `point`.
    pub value: f64,
}

/// An ordered boundary path, traversed circularly.
///
/// The last point is implicitly connected back to the first. May be empty
/// or hold a single point when the threshold region is degenerate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContourPath(Vec<GeoPoint>);

impl ContourPath {
    /// Create a new path from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<GeoPoint>) -> Self {
        Self(points)
    }

    /// Returns `true` if the path has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the path.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&GeoPoint> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&GeoPoint> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[GeoPoint] {
        &self.0
    }

    /// Consumes the path and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<GeoPoint> {
        self.0
    }

    /// The path as `[lat, lon]` pairs.
    #[must_use]
    pub fn to_lat_lon_pairs(&self) -> Vec<[f64; 2]> {
        self.0.iter().map(|&p| p.into()).collect()
    }
}

/// A named target value supplied by a [`DomainProfile`](crate::DomainProfile).
///
/// Only `value` matters to the engine. `label` and `color` are carried
/// through untouched for presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    /// Human-readable name, e.g. a development stage.
    pub label: String,
    /// Scalar target the contour is traced at.
    pub value: f64,
    /// Presentation color, opaque to the engine.
    #[serde(default)]
    pub color: String,
}

impl Threshold {
    /// Create a new threshold.
    #[must_use]
    pub fn new(label: impl Into<String>, value: f64, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value,
            color: color.into(),
        }
    }
}

/// Parameters for a single contour computation.
///
/// Missing fields fall back to the `DEFAULT_*` constants when
/// deserialized, so a partial JSON document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    /// Grid step in degrees for the threshold scan.
    pub resolution: f64,

    /// Half-width of the accepted band: a cell is on the contour when
    /// `|value - threshold| < tolerance`.
    pub tolerance: f64,

    /// Half-width `w` of the circular smoothing window (`2w + 1` points).
    /// Zero disables smoothing.
    pub smoothing_half_width: usize,

    /// Number of nearest samples blended by inverse-distance weighting.
    pub neighbors: usize,

    /// Degrees added on every side of the above-threshold bounding region
    /// before the grid scan. Zero scans the filtered region exactly.
    pub margin: f64,

    /// Upper bound on grid cells per scan. Larger grids fail with
    /// [`EngineError::GridTooLarge`].
    pub max_grid_cells: usize,
}

impl ContourConfig {
    /// Default grid step (about 2 km of latitude).
    pub const DEFAULT_RESOLUTION: f64 = 0.02;
    /// Default acceptance band half-width.
    pub const DEFAULT_TOLERANCE: f64 = 0.1;
    /// Default smoothing half-width.
    pub const DEFAULT_SMOOTHING_HALF_WIDTH: usize = 5;
    /// Default IDW neighbor count.
    pub const DEFAULT_NEIGHBORS: usize = 4;
    /// Default region margin.
    pub const DEFAULT_MARGIN: f64 = 0.0;
    /// Default grid cell limit.
    pub const DEFAULT_MAX_GRID_CELLS: usize = 4_000_000;

    /// Check the parameters for values the engine cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "resolution must be finite and positive, got {}",
                self.resolution
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "margin must be finite and non-negative, got {}",
                self.margin
            )));
        }
        if self.neighbors == 0 {
            return Err(EngineError::InvalidConfig(
                "neighbors must be at least 1".to_string(),
            ));
        }
        if self.max_grid_cells == 0 {
            return Err(EngineError::InvalidConfig(
                "max_grid_cells must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            resolution: Self::DEFAULT_RESOLUTION,
            tolerance: Self::DEFAULT_TOLERANCE,
            smoothing_half_width: Self::DEFAULT_SMOOTHING_HALF_WIDTH,
            neighbors: Self::DEFAULT_NEIGHBORS,
            margin: Self::DEFAULT_MARGIN,
            max_grid_cells: Self::DEFAULT_MAX_GRID_CELLS,
        }
    }
}

/// Errors that can occur while building samples or computing contours.
///
/// An empty sample set or an empty above-threshold subset is not an
/// error: both produce an empty [`ContourPath`].
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum EngineError {
    /// Interpolation was requested with no samples to draw from.
    #[error("no samples available for interpolation")]
    InsufficientData,

    /// A sample carried a non-finite coordinate or value.
    #[error("sample {index} is invalid: {reason}")]
    InvalidSample {
        /// Position of the offending sample in the input.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Contour configuration or threshold is unusable.
    #[error("invalid contour configuration: {0}")]
    InvalidConfig(String),

    /// The grid scan would exceed the configured cell limit.
    #[error("grid of {cells} cells exceeds the limit of {limit}")]
    GridTooLarge {
        /// Cells the scan would visit.
        cells: usize,
        /// Configured `max_grid_cells`.
        limit: usize,
    },
}

/// Every intermediate of one contour computation.
///
/// Produced by [`crate::compute_staged`] or by driving a
/// [`Pipeline`](crate::Pipeline) to completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedResult {
    /// The threshold the contour was traced at.
    pub threshold: f64,
    /// Stage 1: scanned region, counts, and accepted grid cells.
    pub extraction: Extraction,
    /// Stage 2: accepted cells ordered by angle around their centroid.
    pub ordered: ContourPath,
    /// Stage 3: the ordered path after circular smoothing.
    pub smoothed: ContourPath,
}

impl StagedResult {
    /// The scanned region, `None` when no sample reached the threshold.
    #[must_use]
    pub const fn region(&self) -> Option<&BoundingRegion> {
        self.extraction.region.as_ref()
    }

    /// Accepted grid cells in scan order.
    #[must_use]
    pub fn extracted(&self) -> &[GeoPoint] {
        &self.extraction.points
    }

    /// Returns the final output path.
    #[must_use]
    pub const fn final_path(&self) -> &ContourPath {
        &self.smoothed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- GeoPoint tests ---

    #[test]
    fn geo_point_distance() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(3.0, 4.0);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn geo_point_coord_axes() {
        let p = GeoPoint::new(35.5, 139.7);
        let c = p.to_coord();
        assert!((c.x - 139.7).abs() < f64::EPSILON);
        assert!((c.y - 35.5).abs() < f64::EPSILON);
        assert_eq!(GeoPoint::from_coord(c), p);
    }

    #[test]
    fn geo_point_finiteness() {
        assert!(GeoPoint::new(1.0, 2.0).is_finite());
        assert!(!GeoPoint::new(f64::NAN, 2.0).is_finite());
        assert!(!GeoPoint::new(1.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn geo_point_serializes_as_lat_lon_pair() {
        let json = serde_json::to_string(&GeoPoint::new(35.5, 139.25)).unwrap();
        assert_eq!(json, "[35.5,139.25]");
        let back: GeoPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, GeoPoint::new(35.5, 139.25));
    }

    // --- ContourPath tests ---

    #[test]
    fn contour_path_accessors() {
        let path = ContourPath::new(vec![GeoPoint::new(1.0, 2.0), GeoPoint::new(3.0, 4.0)]);
        assert_eq!(path.len(), 2);
        assert!(!path.is_empty());
        assert_eq!(path.first(), Some(&GeoPoint::new(1.0, 2.0)));
        assert_eq!(path.last(), Some(&GeoPoint::new(3.0, 4.0)));
        assert_eq!(path.to_lat_lon_pairs(), vec![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn contour_path_default_is_empty() {
        let path = ContourPath::default();
        assert!(path.is_empty());
        assert!(path.first().is_none());
        assert_eq!(serde_json::to_string(&path).unwrap(), "[]");
    }

    // --- ContourConfig tests ---

    #[test]
    fn config_defaults() {
        let config = ContourConfig::default();
        assert!((config.resolution - 0.02).abs() < f64::EPSILON);
        assert!((config.tolerance - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.smoothing_half_width, 5);
        assert_eq!(config.neighbors, 4);
        assert!(config.margin.abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_bad_resolution() {
        for resolution in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let config = ContourConfig {
                resolution,
                ..ContourConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(EngineError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn config_rejects_zero_neighbors_and_negative_tolerance() {
        let config = ContourConfig {
            neighbors: 0,
            ..ContourConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ContourConfig {
            tolerance: -0.1,
            ..ContourConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ContourConfig {
            margin: f64::NAN,
            ..ContourConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_partial_json_uses_defaults() {
        let config: ContourConfig = serde_json::from_str(r#"{"resolution": 0.5}"#).unwrap();
        assert!((config.resolution - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.neighbors, ContourConfig::DEFAULT_NEIGHBORS);
        assert_eq!(
            config.smoothing_half_width,
            ContourConfig::DEFAULT_SMOOTHING_HALF_WIDTH
        );
    }

    // --- EngineError tests ---

    #[test]
    fn error_display() {
        assert_eq!(
            EngineError::InsufficientData.to_string(),
            "no samples available for interpolation"
        );
        let err = EngineError::InvalidSample {
            index: 3,
            reason: "latitude is not finite".to_string(),
        };
        assert_eq!(err.to_string(), "sample 3 is invalid: latitude is not finite");
        let err = EngineError::GridTooLarge {
            cells: 10,
            limit: 5,
        };
        assert_eq!(err.to_string(), "grid of 10 cells exceeds the limit of 5");
    }

    #[test]
    fn error_serde_round_trip() {
        let err = EngineError::InvalidConfig("bad value".to_string());
        let json = serde_json::to_string(&err).unwrap();
        let back: EngineError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }
}
