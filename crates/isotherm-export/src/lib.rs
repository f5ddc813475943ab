//! isotherm-export: Pure format serializers (sans-IO)
//!
//! Converts traced contours into output formats: GeoJSON for GIS tools
//! and the compact `[lat, lon]` JSON consumed by map front ends.

pub mod geojson;
pub mod latlon;

pub use geojson::{GeoJsonOptions, to_geojson};
pub use latlon::to_lat_lon_json;

/// Color used for thresholds that carry none.
pub const DEFAULT_COLOR: &str = "#FF0000";

/// Errors raised while serializing contours.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A contour point had a NaN or infinite coordinate, which JSON
    /// cannot represent.
    #[error("contour {contour} point {point} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Index of the contour in the input slice.
        contour: usize,
        /// Index of the point within the contour path.
        point: usize,
    },

    /// JSON encoding failed.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// The color to emit for a threshold, falling back to [`DEFAULT_COLOR`].
pub(crate) fn display_color(color: &str) -> &str {
    if color.is_empty() { DEFAULT_COLOR } else { color }
}

/// Reject contours JSON cannot encode faithfully.
pub(crate) fn check_finite(
    contours: &[isotherm_engine::ThresholdContour],
) -> Result<(), ExportError> {
    for (contour, c) in contours.iter().enumerate() {
        if let Some(point) = c.path.points().iter().position(|p| !p.is_finite()) {
            return Err(ExportError::NonFiniteCoordinate { contour, point });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use isotherm_engine::{ContourPath, GeoPoint, Threshold, ThresholdContour};

    use super::*;

    #[test]
    fn empty_color_falls_back() {
        assert_eq!(display_color(""), DEFAULT_COLOR);
        assert_eq!(display_color("#00FF00"), "#00FF00");
    }

    #[test]
    fn non_finite_point_is_located() {
        let contours = vec![
            ThresholdContour {
                threshold: Threshold::new("a", 1.0, ""),
                path: ContourPath::new(vec![GeoPoint::new(0.0, 0.0)]),
            },
            ThresholdContour {
                threshold: Threshold::new("b", 2.0, ""),
                path: ContourPath::new(vec![
                    GeoPoint::new(0.0, 0.0),
                    GeoPoint::new(f64::NAN, 0.0),
                ]),
            },
        ];
        let err = check_finite(&contours).unwrap_err();
        assert!(matches!(
            err,
            ExportError::NonFiniteCoordinate {
                contour: 1,
                point: 1
            }
        ));
        assert_eq!(
            err.to_string(),
            "contour 1 point 1 has a non-finite coordinate"
        );
    }
}
