//! Bounding regions and the lattice of grid cells inside them.
//!
//! Grid coordinates are computed as `min + i * step` rather than by
//! repeated addition, so long scans do not drift. A small slack on the
//! step count lets a span that is an exact multiple of the step include
//! its far edge despite rounding in the division.

use serde::{Deserialize, Serialize};

use crate::types::{ContourConfig, EngineError, GeoPoint};

/// Fraction of a step tolerated when deciding whether the far edge of a
/// span is reached.
const GRID_SLACK: f64 = 1e-9;

/// Decimal places kept by [`sampling_grid`].
const SAMPLING_DECIMALS: i32 = 3;

/// An axis-aligned latitude/longitude rectangle.
///
/// Invariant: `min_lat <= max_lat` and `min_lon <= max_lon`. A region
/// collapsed to a single point is valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingRegion {
    /// Southern edge.
    pub min_lat: f64,
    /// Northern edge.
    pub max_lat: f64,
    /// Western edge.
    pub min_lon: f64,
    /// Eastern edge.
    pub max_lon: f64,
}

impl BoundingRegion {
    /// A zero-area region at `p`.
    #[must_use]
    pub const fn point(p: GeoPoint) -> Self {
        Self {
            min_lat: p.lat,
            max_lat: p.lat,
            min_lon: p.lon,
            max_lon: p.lon,
        }
    }

    /// The smallest region enclosing all `points`, or `None` when there
    /// are none.
    #[must_use]
    pub fn from_points<I: IntoIterator<Item = GeoPoint>>(points: I) -> Option<Self> {
        points.into_iter().fold(None, |acc: Option<Self>, p| {
            Some(acc.map_or_else(
                || Self::point(p),
                |r| Self {
                    min_lat: r.min_lat.min(p.lat),
                    max_lat: r.max_lat.max(p.lat),
                    min_lon: r.min_lon.min(p.lon),
                    max_lon: r.max_lon.max(p.lon),
                },
            ))
        })
    }

    /// Grow the region by `margin` degrees on every side.
    #[must_use]
    pub fn expand(self, margin: f64) -> Self {
        Self {
            min_lat: self.min_lat - margin,
            max_lat: self.max_lat + margin,
            min_lon: self.min_lon - margin,
            max_lon: self.max_lon + margin,
        }
    }

    /// North-south extent in degrees.
    #[must_use]
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// East-west extent in degrees.
    #[must_use]
    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Returns `true` if the region has zero area on both axes.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_point(&self) -> bool {
        self.min_lat == self.max_lat && self.min_lon == self.max_lon
    }

    /// Returns `true` if `p` lies inside or on the edge of the region.
    #[must_use]
    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&p.lat)
            && (self.min_lon..=self.max_lon).contains(&p.lon)
    }

    /// Number of grid cells [`grid`](Self::grid) yields for `step`.
    ///
    /// Saturates at `usize::MAX` for absurdly fine steps.
    #[must_use]
    pub fn cell_count(&self, step: f64) -> usize {
        let rows = steps_along(self.lat_span(), step).saturating_add(1);
        let cols = steps_along(self.lon_span(), step).saturating_add(1);
        rows.saturating_mul(cols)
    }

    /// Iterate the lattice `min + i * step` over the region, both ends
    /// inclusive, latitude outer and longitude inner.
    ///
    /// A zero-area region yields exactly one cell. `step` must be finite
    /// and positive; callers validate it through
    /// [`ContourConfig::validate`](crate::ContourConfig::validate).
    #[must_use]
    pub fn grid(&self, step: f64) -> Grid {
        let lat_steps = steps_along(self.lat_span(), step);
        let lon_steps = steps_along(self.lon_span(), step);
        let cols = lon_steps.saturating_add(1);
        Grid {
            origin: GeoPoint::new(self.min_lat, self.min_lon),
            step,
            cols,
            next: 0,
            total: lat_steps.saturating_add(1).saturating_mul(cols),
        }
    }
}

/// Whole steps that fit in `span`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn steps_along(span: f64, step: f64) -> usize {
    if span <= 0.0 || step <= 0.0 || !step.is_finite() {
        return 0;
    }
    // Float-to-int `as` saturates, which is what an oversized grid needs.
    (span / step + GRID_SLACK).floor() as usize
}

/// Iterator over the grid cells of a [`BoundingRegion`].
///
/// Cells are transient: they are computed on demand and never stored.
#[derive(Debug, Clone)]
pub struct Grid {
    origin: GeoPoint,
    step: f64,
    cols: usize,
    next: usize,
    total: usize,
}

impl Iterator for Grid {
    type Item = GeoPoint;

    fn next(&mut self) -> Option<GeoPoint> {
        if self.next >= self.total {
            return None;
        }
        let row = self.next / self.cols;
        let col = self.next % self.cols;
        self.next += 1;
        #[allow(clippy::cast_precision_loss)]
        let cell = GeoPoint::new(
            (row as f64).mul_add(self.step, self.origin.lat),
            (col as f64).mul_add(self.step, self.origin.lon),
        );
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Grid {}

/// Coordinates at which to acquire samples over `region`.
///
/// An inclusive lattice with spacing `step`, each coordinate rounded to
/// three decimals so repeated acquisitions hit identical keys.
///
/// # Errors
///
/// Returns [`EngineError::InvalidConfig`] if `step` is not finite and
/// positive, and [`EngineError::GridTooLarge`] if the lattice would exceed
/// [`ContourConfig::DEFAULT_MAX_GRID_CELLS`] points.
pub fn sampling_grid(region: &BoundingRegion, step: f64) -> Result<Vec<GeoPoint>, EngineError> {
    if !step.is_finite() || step <= 0.0 {
        return Err(EngineError::InvalidConfig(format!(
            "sampling step must be finite and positive, got {step}"
        )));
    }
    let cells = region.cell_count(step);
    if cells > ContourConfig::DEFAULT_MAX_GRID_CELLS {
        return Err(EngineError::GridTooLarge {
            cells,
            limit: ContourConfig::DEFAULT_MAX_GRID_CELLS,
        });
    }
    let scale = 10f64.powi(SAMPLING_DECIMALS);
    let round = |x: f64| (x * scale).round() / scale;
    Ok(region
        .grid(step)
        .map(|p| GeoPoint::new(round(p.lat), round(p.lon)))
        .collect())
}
