//! Path ordering: arrange unordered contour points into a drawable loop.
//!
//! Points are sorted by their angle around the centroid, which traces the
//! boundary of a star-shaped region correctly. Concave or multi-lobed
//! boundaries come out with spokes that cut across the shape; this is a
//! known limitation of angular ordering.
//!
//! This is step 2 of the pipeline, between extraction and smoothing.

use geo::{Centroid, MultiPoint};

use crate::types::{ContourPath, GeoPoint};

/// Arithmetic mean of `points`, or `None` when empty.
#[must_use]
pub fn centroid(points: &[GeoPoint]) -> Option<GeoPoint> {
    let multi: MultiPoint<f64> = points.iter().map(|p| geo::Point::from(p.to_coord())).collect();
    multi.centroid().map(|c| GeoPoint::from_coord(c.0))
}

/// Angle of `p` around `center`, measured as `atan2(Δlat, Δlon)`.
///
/// Ranges over `(-π, π]`, starting due west and turning through south.
#[must_use]
pub fn angle_around(p: GeoPoint, center: GeoPoint) -> f64 {
    (p.lat - center.lat).atan2(p.lon - center.lon)
}

/// Order `points` by ascending angle around their centroid.
///
/// The sort is stable: points at equal angle keep their input order, so
/// ordering the same input twice gives the same path. Fewer than three
/// points are returned as-is.
#[must_use = "returns the ordered path"]
pub fn order_by_angle(points: &[GeoPoint]) -> ContourPath {
    if points.len() < 3 {
        return ContourPath::new(points.to_vec());
    }
    let Some(center) = centroid(points) else {
        return ContourPath::new(points.to_vec());
    };

    let mut keyed: Vec<(f64, GeoPoint)> = points
        .iter()
        .map(|&p| (angle_around(p, center), p))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

    ContourPath::new(keyed.into_iter().map(|(_, p)| p).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn centroid_is_mean() {
        let c = centroid(&[
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(2.0, 0.0),
            GeoPoint::new(2.0, 4.0),
            GeoPoint::new(0.0, 4.0),
        ])
        .unwrap();
        assert!((c.lat - 1.0).abs() < 1e-12);
        assert!((c.lon - 2.0).abs() < 1e-12);
    }

    #[test]
    fn centroid_of_nothing_is_none() {
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn short_inputs_pass_through() {
        assert!(order_by_angle(&[]).is_empty());
        let two = [GeoPoint::new(1.0, 1.0), GeoPoint::new(0.0, 0.0)];
        assert_eq!(order_by_angle(&two).points(), &two);
    }

    #[test]
    fn square_corners_sorted_by_angle() {
        // Shuffled corners of a square centered on the origin.
        let points = [
            GeoPoint::new(1.0, 1.0),   // 45°
            GeoPoint::new(-1.0, -1.0), // -135°
            GeoPoint::new(1.0, -1.0),  // 135°
            GeoPoint::new(-1.0, 1.0),  // -45°
        ];
        let ordered = order_by_angle(&points);
        assert_eq!(
            ordered.points(),
            &[
                GeoPoint::new(-1.0, -1.0),
                GeoPoint::new(-1.0, 1.0),
                GeoPoint::new(1.0, 1.0),
                GeoPoint::new(1.0, -1.0),
            ]
        );
    }

    #[test]
    fn ordering_is_deterministic() {
        let points: Vec<GeoPoint> = (0..40)
            .map(|i| {
                let t = f64::from(i) * 0.37;
                GeoPoint::new(35.0 + t.sin() * (1.0 + 0.1 * t.cos()), 139.0 + t.cos())
            })
            .collect();
        let first = order_by_angle(&points);
        let second = order_by_angle(&points);
        assert_eq!(first, second);
        assert_eq!(first.len(), points.len());
    }

    #[test]
    fn angles_are_non_decreasing() {
        let points: Vec<GeoPoint> = (0..25)
            .map(|i| {
                let t = f64::from(i * 7 % 25) / 25.0 * std::f64::consts::TAU;
                GeoPoint::new(t.sin() * 2.0, t.cos())
            })
            .collect();
        let ordered = order_by_angle(&points);
        let center = centroid(&points).unwrap();
        let angles: Vec<f64> = ordered
            .points()
            .iter()
            .map(|&p| angle_around(p, center))
            .collect();
        assert!(angles.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn equal_angles_keep_input_order() {
        // Two points on the same ray from the centroid.
        let points = [
            GeoPoint::new(0.0, 2.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(0.0, -3.0),
            GeoPoint::new(3.0, 0.0),
            GeoPoint::new(-3.0, 0.0),
        ];
        // Centroid is (0, 0): (0,2) and (0,1) both sit at angle 0.
        let ordered = order_by_angle(&points);
        let zero_ray: Vec<GeoPoint> = ordered
            .points()
            .iter()
            .copied()
            .filter(|p| p.lat == 0.0 && p.lon > 0.0)
            .collect();
        assert_eq!(zero_ray, vec![GeoPoint::new(0.0, 2.0), GeoPoint::new(0.0, 1.0)]);
    }
}
