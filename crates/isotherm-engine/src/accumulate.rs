//! Accumulated temperature (growing degree-days).
//!
//! Pest development tracks the heat a location has gathered above a base
//! temperature. Each day contributes `max(0, t - base)`; the running sum
//! of those contributions is the scalar field the contours are drawn on.

use serde::{Deserialize, Serialize};

use crate::sample::{Sample, SampleSet};
use crate::types::{EngineError, GeoPoint};

/// Base temperature below which a day contributes nothing, in °C.
pub const DEFAULT_BASE_TEMPERATURE: f64 = 10.0;

/// One day's contribution: `max(0, temperature - base)`.
#[must_use]
pub fn effective_temperature(temperature: f64, base: f64) -> f64 {
    (temperature - base).max(0.0)
}

/// Total heat accumulated over `daily` mean temperatures.
#[must_use]
pub fn accumulated_temperature(daily: &[f64], base: f64) -> f64 {
    daily.iter().map(|&t| effective_temperature(t, base)).sum()
}

/// Cumulative accumulation after each day.
///
/// Element `i` is the accumulation over `daily[..=i]`, so the series is
/// non-decreasing and its last element equals
/// [`accumulated_temperature`].
#[must_use]
pub fn running_accumulation(daily: &[f64], base: f64) -> Vec<f64> {
    daily
        .iter()
        .scan(0.0, |total, &t| {
            *total += effective_temperature(t, base);
            Some(*total)
        })
        .collect()
}

/// Daily mean temperatures recorded at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSeries {
    /// Where the series was recorded.
    pub location: GeoPoint,
    /// Daily means in chronological order.
    pub daily: Vec<f64>,
}

/// Turn per-location temperature series into accumulation samples.
///
/// Each series becomes one [`Sample`] whose value is its accumulated
/// temperature above `base`. Sample order follows `series`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidSample`] for the first series with a
/// non-finite location or daily value, or [`EngineError::InvalidConfig`]
/// if `base` is not finite.
pub fn accumulated_samples(series: &[StationSeries], base: f64) -> Result<SampleSet, EngineError> {
    if !base.is_finite() {
        return Err(EngineError::InvalidConfig(format!(
            "base temperature must be finite, got {base}"
        )));
    }
    let samples = series
        .iter()
        .enumerate()
        .map(|(index, s)| {
            if let Some(day) = s.daily.iter().position(|t| !t.is_finite()) {
                return Err(EngineError::InvalidSample {
                    index,
                    reason: format!("daily temperature {day} is not finite"),
                });
            }
            Ok(Sample::new(
                s.location.lat,
                s.location.lon,
                accumulated_temperature(&s.daily, base),
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(stations = samples.len(), base, "accumulated samples built");
    SampleSet::try_new(samples)
}
