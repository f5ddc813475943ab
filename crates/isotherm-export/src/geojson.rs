//! GeoJSON export serializer.
//!
//! Converts traced contours into an RFC 7946 `FeatureCollection` with one
//! feature per non-empty contour. GeoJSON orders positions as
//! `[longitude, latitude]`, the reverse of the engine's `[lat, lon]`.
//!
//! - Paths of two or more points become a `LineString`, closed by
//!   repeating the first point when [`GeoJsonOptions::close_rings`] is set
//!   and the path has at least three points.
//! - A single-point path becomes a `Point`.
//!
//! Each feature carries the threshold's `label`, `value`, and `color`
//! plus the `point_count` of the engine path.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use isotherm_engine::{GeoPoint, ThresholdContour};
use serde::Serialize;

use crate::{ExportError, check_finite, display_color};

/// Options for [`to_geojson`].
#[derive(Debug, Clone)]
pub struct GeoJsonOptions<'a> {
    /// Collection name, emitted as a top-level `name` member.
    pub name: Option<&'a str>,

    /// Repeat the first position at the end of each line so GIS tools
    /// draw the loop closed.
    pub close_rings: bool,

    /// Round coordinates to this many decimal places. Values above
    /// [`MAX_PRECISION`] behave like [`MAX_PRECISION`].
    pub precision: Option<u32>,
}

impl Default for GeoJsonOptions<'_> {
    fn default() -> Self {
        Self {
            name: None,
            close_rings: true,
            precision: None,
        }
    }
}

#[derive(Serialize)]
struct FeatureCollection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    features: Vec<Feature<'a>>,
}

#[derive(Serialize)]
struct Feature<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: Geometry,
    properties: Properties<'a>,
}

#[derive(Serialize)]
#[serde(tag = "type", content = "coordinates")]
enum Geometry {
    Point([f64; 2]),
    LineString(Vec<[f64; 2]>),
}

#[derive(Serialize)]
struct Properties<'a> {
    label: &'a str,
    value: f64,
    color: &'a str,
    point_count: usize,
}

/// Serialize contours into a GeoJSON `FeatureCollection` string.
///
/// Contours with an empty path are omitted.
///
/// # Examples
///
/// ```
/// use isotherm_engine::{ContourPath, GeoPoint, Threshold, ThresholdContour};
/// use isotherm_export::{GeoJsonOptions, to_geojson};
///
/// let contours = vec![ThresholdContour {
///     threshold: Threshold::new("peak", 250.0, "#00FF00"),
///     path: ContourPath::new(vec![GeoPoint::new(35.0, 139.0)]),
/// }];
/// let json = to_geojson(&contours, &GeoJsonOptions::default()).unwrap();
/// assert!(json.contains(r#""coordinates":[139.0,35.0]"#));
/// ```
///
/// # Errors
///
/// Returns [`ExportError::NonFiniteCoordinate`] if any path point is NaN
/// or infinite.
pub fn to_geojson(
    contours: &[ThresholdContour],
    options: &GeoJsonOptions<'_>,
) -> Result<String, ExportError> {
    check_finite(contours)?;

    let features = contours
        .iter()
        .filter_map(|contour| {
            let geometry = geometry(contour.path.points(), options)?;
            Some(Feature {
                kind: "Feature",
                geometry,
                properties: Properties {
                    label: &contour.threshold.label,
                    value: contour.threshold.value,
                    color: display_color(&contour.threshold.color),
                    point_count: contour.path.len(),
                },
            })
        })
        .collect();

    let collection = FeatureCollection {
        kind: "FeatureCollection",
        name: options.name,
        features,
    };
    Ok(serde_json::to_string(&collection)?)
}

/// Geometry for one path, `None` when the path is empty.
fn geometry(points: &[GeoPoint], options: &GeoJsonOptions<'_>) -> Option<Geometry> {
    let position = |p: &GeoPoint| {
        let round = |x: f64| options.precision.map_or(x, |digits| round_to(x, digits));
        [round(p.lon), round(p.lat)]
    };
    match points {
        [] => None,
        [only] => Some(Geometry::Point(position(only))),
        _ => {
            let mut line: Vec<[f64; 2]> = points.iter().map(position).collect();
            if options.close_rings && points.len() >= 3 {
                line.push(line[0]);
            }
            Some(Geometry::LineString(line))
        }
    }
}

/// Decimal places beyond which an `f64` coordinate carries no more
/// information.
pub const MAX_PRECISION: u32 = 17;

fn round_to(x: f64, digits: u32) -> f64 {
    let scale = 10f64.powi(i32::try_from(digits.min(MAX_PRECISION)).unwrap_or(0));
    let scaled = x * scale;
    if !scaled.is_finite() {
        // Too large to have digits at this scale.
        return x;
    }
    scaled.round() / scale
}
