//! Field interpolation: estimate the sampled scalar at arbitrary coordinates.
//!
//! This module defines the [`Interpolator`] trait for field estimators and
//! the [`InverseDistance`] implementation used by the threshold scan.
//!
//! # Inverse-distance weighting
//!
//! The estimate at `q` blends the `k` nearest samples (Euclidean distance
//! in degree space) with weights `1 / d²`. A query that lands exactly on a
//! sample returns that sample's value, which also keeps the weights free
//! of division by zero.
//!
//! Nearest samples come from an R\*-tree. Samples at equal distance are
//! ranked by their position in the [`SampleSet`], so results never depend
//! on tree layout.

use rstar::primitives::GeomWithData;
use rstar::{PointDistance, RTree};

use crate::sample::SampleSet;
use crate::types::{EngineError, GeoPoint, InterpolatedPoint};

/// R-tree entry: `[lat, lon]` tagged with the sample's index.
type IndexedLocation = GeomWithData<[f64; 2], usize>;

/// Trait for field estimators.
///
/// Input: a query coordinate. Output: the estimated value there.
pub trait Interpolator {
    /// Estimate the field at `at`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InsufficientData`] if the estimator has no
    /// samples to draw from.
    fn interpolate(&self, at: GeoPoint) -> Result<InterpolatedPoint, EngineError>;
}

/// A sample selected as one of the `k` nearest to a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index of the sample in its [`SampleSet`].
    pub index: usize,
    /// Squared distance from the query.
    pub distance_squared: f64,
}

/// Inverse-distance-squared interpolation over the `k` nearest samples.
pub struct InverseDistance<'a> {
    samples: &'a SampleSet,
    tree: RTree<IndexedLocation>,
    neighbors: usize,
}

impl<'a> InverseDistance<'a> {
    /// Index `samples` for queries blending `neighbors` samples each.
    ///
    /// A `neighbors` of zero is treated as one.
    #[must_use]
    pub fn new(samples: &'a SampleSet, neighbors: usize) -> Self {
        let entries = samples
            .iter()
            .enumerate()
            .map(|(index, s)| GeomWithData::new([s.latitude, s.longitude], index))
            .collect();
        Self {
            samples,
            tree: RTree::bulk_load(entries),
            neighbors: neighbors.max(1),
        }
    }

    /// The `k` nearest samples to `at`, closest first.
    ///
    /// Ties at equal distance go to the lower sample index. Returns fewer
    /// than `k` entries only when the set is smaller than `k`.
    #[must_use]
    pub fn nearest(&self, at: GeoPoint) -> Vec<Neighbor> {
        let query = [at.lat, at.lon];
        let mut found: Vec<Neighbor> = Vec::with_capacity(self.neighbors + 1);

        // The iterator yields entries in non-decreasing distance. Keep
        // collecting past `k` while the distance still equals the k-th, so
        // every sample tied for the last slot is a candidate.
        for entry in self.tree.nearest_neighbor_iter(&query) {
            // Same metric the tree orders by.
            let distance_squared = entry.distance_2(&query);
            if found.len() >= self.neighbors {
                let cutoff = found[self.neighbors - 1].distance_squared;
                if distance_squared > cutoff {
                    break;
                }
            }
            found.push(Neighbor {
                index: entry.data,
                distance_squared,
            });
        }

        found.sort_by(|a, b| {
            a.distance_squared
                .total_cmp(&b.distance_squared)
                .then(a.index.cmp(&b.index))
        });
        found.truncate(self.neighbors);
        found
    }

    /// Normalized weight of each contributing sample at `at`.
    ///
    /// Returns `(sample index, weight)` pairs summing to one, closest
    /// sample first. On an exact hit the coinciding sample carries the
    /// full weight.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InsufficientData`] if the set is empty.
    pub fn influence(&self, at: GeoPoint) -> Result<Vec<(usize, f64)>, EngineError> {
        let nearest = self.nearest(at);
        let Some(first) = nearest.first() else {
            return Err(EngineError::InsufficientData);
        };
        if first.distance_squared == 0.0 {
            return Ok(vec![(first.index, 1.0)]);
        }
        let total: f64 = nearest.iter().map(|n| n.distance_squared.recip()).sum();
        Ok(nearest
            .iter()
            .map(|n| (n.index, n.distance_squared.recip() / total))
            .collect())
    }
}

impl Interpolator for InverseDistance<'_> {
    fn interpolate(&self, at: GeoPoint) -> Result<InterpolatedPoint, EngineError> {
        let nearest = self.nearest(at);
        let Some(first) = nearest.first() else {
            return Err(EngineError::InsufficientData);
        };
        let samples = self.samples.samples();

        if first.distance_squared == 0.0 {
            return Ok(InterpolatedPoint {
                point: at,
                value: samples[first.index].value,
            });
        }

        let (weighted, total) = nearest.iter().fold((0.0, 0.0), |(weighted, total), n| {
            let w = n.distance_squared.recip();
            (samples[n.index].value.mul_add(w, weighted), total + w)
        });

        Ok(InterpolatedPoint {
            point: at,
            value: weighted / total,
        })
    }
}
