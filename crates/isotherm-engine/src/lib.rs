//! isotherm-engine: Pure threshold contour engine (sans-IO).
//!
//! Turns scattered scalar samples (accumulated temperature at weather
//! stations or grid points) into a closed boundary path marking where the
//! field crosses a threshold:
//! extraction (IDW-interpolated grid scan) -> angular ordering ->
//! circular smoothing.
//!
//! This crate has **no I/O dependencies**. It operates on in-memory
//! samples and returns structured data. Serialization formats live in
//! `isotherm-export` and the command-line driver in `isotherm-bench`.

pub mod accumulate;
pub mod diagnostics;
pub mod extract;
pub mod fingerprint;
pub mod interpolate;
pub mod order;
pub mod pipeline;
pub mod profile;
pub mod region;
pub mod sample;
pub mod smooth;
pub mod types;

pub use interpolate::{Interpolator, InverseDistance};
pub use pipeline::Pipeline;
pub use profile::{DomainProfile, ThresholdContour, compute_profile};
pub use region::BoundingRegion;
pub use sample::{Sample, SampleSet};
pub use types::{
    ContourConfig, ContourPath, EngineError, GeoPoint, InterpolatedPoint, StagedResult, Threshold,
};

/// Trace the contour of `threshold` over `samples`.
///
/// # Steps
///
/// 1. Scan the grid over the above-threshold region, keeping cells whose
///    interpolated value lies within `config.tolerance` of the threshold
/// 2. Order the kept cells by angle around their centroid
/// 3. Smooth the ordered loop with a circular triangular moving average
///
/// The result is empty when no sample reaches the threshold or no cell
/// falls inside the band, and may hold a single point for a single
/// above-threshold sample.
///
/// # Errors
///
/// Returns [`EngineError::InvalidConfig`] for an unusable `config` or a
/// non-finite threshold. Returns [`EngineError::GridTooLarge`] if the scan
/// would exceed `config.max_grid_cells`.
pub fn compute(
    samples: &SampleSet,
    threshold: f64,
    config: &ContourConfig,
) -> Result<ContourPath, EngineError> {
    // 1. Threshold extraction.
    let extraction = extract::extract(samples, threshold, config)?;

    // 2. Angular ordering.
    let ordered = order::order_by_angle(&extraction.points);

    // 3. Circular smoothing.
    Ok(smooth::smooth_circular(&ordered, config.smoothing_half_width))
}

/// Trace the contour of `threshold`, keeping every intermediate.
///
/// Same computation as [`compute`], returned as a [`StagedResult`] with
/// the scan region, raw cells, ordered path, and smoothed path.
///
/// # Errors
///
/// Same as [`compute`].
pub fn compute_staged(
    samples: &SampleSet,
    threshold: f64,
    config: &ContourConfig,
) -> Result<StagedResult, EngineError> {
    Ok(Pipeline::new(samples, threshold, config.clone())?
        .extract()?
        .order()
        .smooth()
        .into_result())
}
