//! Path smoothing: circular triangular moving average.
//!
//! Grid extraction quantizes the boundary to the scan resolution, which
//! shows up as jagged steps once the points are ordered. A weighted moving
//! average over a window of `2w + 1` neighbors, wrapping around the closed
//! loop, removes that noise. Like any low-pass filter it also rounds off
//! sharp corners and pulls the loop slightly inward.
//!
//! This is step 3 of the pipeline, applied after ordering.

use crate::types::{ContourPath, GeoPoint};

/// Triangular weight for a window member `offset` steps from the center.
///
/// `1 - |offset| / (w + 1)`: the center gets 1, the window edges get
/// `1 / (w + 1)`, and nothing outside the window is weighted.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn triangular_weight(offset: isize, half_width: usize) -> f64 {
    1.0 - offset.unsigned_abs() as f64 / (half_width as f64 + 1.0)
}

/// Smooth a closed path with a circular triangular moving average.
///
/// Each output point is the weighted mean of the `2 * half_width + 1`
/// input points centered on it, indices wrapping modulo the path length
/// (more than once when the path is shorter than the window). Latitude and
/// longitude are averaged independently.
///
/// The output has the same length as the input. Paths with fewer than
/// three points are returned unchanged, and a `half_width` of zero is the
/// identity.
#[must_use = "returns the smoothed path"]
pub fn smooth_circular(path: &ContourPath, half_width: usize) -> ContourPath {
    let points = path.points();
    let n = points.len();
    if n < 3 || half_width == 0 {
        return path.clone();
    }

    #[allow(clippy::cast_possible_wrap)]
    let w = half_width as isize;
    let weights: Vec<(isize, f64)> = (-w..=w)
        .map(|offset| (offset, triangular_weight(offset, half_width)))
        .collect();
    let total: f64 = weights.iter().map(|&(_, weight)| weight).sum();

    #[allow(clippy::cast_possible_wrap)]
    let len = n as isize;
    let smoothed = (0..n)
        .map(|i| {
            let center = points[i];
            // Average the offsets from the center rather than the raw
            // coordinates, so identical neighbors contribute exactly zero.
            let (dlat, dlon) = weights.iter().fold((0.0, 0.0), |(dlat, dlon), &(offset, weight)| {
                #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
                let j = (i as isize + offset).rem_euclid(len) as usize;
                let p = points[j];
                (
                    (p.lat - center.lat).mul_add(weight, dlat),
                    (p.lon - center.lon).mul_add(weight, dlon),
                )
            });
            GeoPoint::new(center.lat + dlat / total, center.lon + dlon / total)
        })
        .collect();

    ContourPath::new(smoothed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn path(coords: &[(f64, f64)]) -> ContourPath {
        ContourPath::new(coords.iter().map(|&(lat, lon)| GeoPoint::new(lat, lon)).collect())
    }

    #[test]
    fn weights_fall_off_linearly() {
        assert!((triangular_weight(0, 5) - 1.0).abs() < f64::EPSILON);
        assert!((triangular_weight(3, 5) - 0.5).abs() < f64::EPSILON);
        assert!((triangular_weight(-3, 5) - 0.5).abs() < f64::EPSILON);
        assert!((triangular_weight(5, 5) - 1.0 / 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn short_paths_pass_through() {
        let empty = path(&[]);
        assert_eq!(smooth_circular(&empty, 5), empty);
        let two = path(&[(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(smooth_circular(&two, 5), two);
    }

    #[test]
    fn zero_half_width_is_identity() {
        let p = path(&[(0.0, 0.0), (1.0, 3.0), (2.0, -1.0), (5.0, 5.0)]);
        assert_eq!(smooth_circular(&p, 0), p);
    }

    #[test]
    fn constant_path_is_unchanged() {
        let p = path(&[(35.123_456, 139.654_321); 17]);
        assert_eq!(smooth_circular(&p, 5), p);
        // Shorter than the window: indices wrap several times.
        let short = path(&[(35.123_456, 139.654_321); 4]);
        assert_eq!(smooth_circular(&short, 5), short);
    }

    #[test]
    fn preserves_length() {
        let coords: Vec<(f64, f64)> = (0..50)
            .map(|i| (f64::from(i).sin(), f64::from(i).cos()))
            .collect();
        let p = path(&coords);
        assert_eq!(smooth_circular(&p, 5).len(), 50);
    }

    #[test]
    fn matches_hand_computed_window() {
        // half_width 1: weights 0.5, 1, 0.5 (total 2).
        let p = path(&[(0.0, 0.0), (4.0, 0.0), (0.0, 8.0), (0.0, 0.0)]);
        let s = smooth_circular(&p, 1);
        // Point 1: (0.5*0 + 1*4 + 0.5*0) / 2 = 2 lat, (0 + 0 + 0.5*8) / 2 = 2 lon.
        assert!((s.points()[1].lat - 2.0).abs() < 1e-12);
        assert!((s.points()[1].lon - 2.0).abs() < 1e-12);
        // Point 0 wraps to point 3 on the left: (0 + 0 + 0.5*4) / 2 = 1 lat.
        assert!((s.points()[0].lat - 1.0).abs() < 1e-12);
        assert!(s.points()[0].lon.abs() < 1e-12);
    }

    #[test]
    fn reduces_jaggedness() {
        // Alternating zig-zag around a circle.
        let n = 60;
        let coords: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let t = f64::from(i) / f64::from(n) * std::f64::consts::TAU;
                let r = if i % 2 == 0 { 1.05 } else { 0.95 };
                (r * t.sin(), r * t.cos())
            })
            .collect();
        // Largest radius jump between neighbors.
        let roughness = |p: &ContourPath| {
            p.points()
                .windows(2)
                .map(|w| (w[0].lat.hypot(w[0].lon) - w[1].lat.hypot(w[1].lon)).abs())
                .fold(0.0, f64::max)
        };
        let raw = path(&coords);
        let smoothed = smooth_circular(&raw, 5);
        assert!(roughness(&smoothed) < roughness(&raw) / 2.0);
    }

    #[test]
    fn centroid_preserved_on_closed_loop() {
        // Every point appears in the same set of windows, so the mean of
        // the smoothed loop equals the mean of the input.
        let coords: Vec<(f64, f64)> = (0..30)
            .map(|i| (f64::from(i * i % 7), f64::from(i % 5)))
            .collect();
        let p = path(&coords);
        let s = smooth_circular(&p, 5);
        let mean = |q: &ContourPath| {
            let n = q.len() as f64;
            (
                q.points().iter().map(|g| g.lat).sum::<f64>() / n,
                q.points().iter().map(|g| g.lon).sum::<f64>() / n,
            )
        };
        let (a, b) = (mean(&p), mean(&s));
        assert!((a.0 - b.0).abs() < 1e-9);
        assert!((a.1 - b.1).abs() < 1e-9);
    }
}
