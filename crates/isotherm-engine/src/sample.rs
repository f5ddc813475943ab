//! Scattered input samples and the validated, immutable set they form.
//!
//! A [`SampleSet`] is the only way samples enter the engine. Building one
//! checks every sample for finite coordinates and value, so the
//! interpolation and extraction stages never see `NaN` or infinities.

use serde::{Deserialize, Serialize};

use crate::types::{EngineError, GeoPoint};

/// A scalar measurement (e.g. accumulated temperature) at a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Latitude in degrees.
    #[serde(alias = "lat")]
    pub latitude: f64,
    /// Longitude in degrees.
    #[serde(alias = "lon")]
    pub longitude: f64,
    /// Measured value.
    pub value: f64,
}

impl Sample {
    /// Create a new sample.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64, value: f64) -> Self {
        Self {
            latitude,
            longitude,
            value,
        }
    }

    /// The sample's coordinate.
    #[must_use]
    pub const fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Check that coordinate and value are finite.
    ///
    /// `index` is only used to label the error.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSample`] naming the first non-finite
    /// field.
    pub fn validate(&self, index: usize) -> Result<(), EngineError> {
        let field = if !self.latitude.is_finite() {
            "latitude"
        } else if !self.longitude.is_finite() {
            "longitude"
        } else if !self.value.is_finite() {
            "value"
        } else {
            return Ok(());
        };
        Err(EngineError::InvalidSample {
            index,
            reason: format!("{field} is not finite"),
        })
    }
}

/// An immutable, validated collection of samples.
///
/// Sample order is preserved: it is the tie-break order for nearest
/// neighbor selection. Duplicate coordinates are kept as-is.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct SampleSet {
    samples: Vec<Sample>,
}

impl SampleSet {
    /// Build a set, rejecting the whole input if any sample is invalid.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSample`] for the first sample with a
    /// non-finite field.
    pub fn try_new(samples: Vec<Sample>) -> Result<Self, EngineError> {
        for (index, sample) in samples.iter().enumerate() {
            sample.validate(index)?;
        }
        Ok(Self { samples })
    }

    /// Build a set from the valid samples and return the rejections.
    ///
    /// Each rejection is an [`EngineError::InvalidSample`] carrying the
    /// sample's index in `samples`.
    #[must_use]
    pub fn partition_valid(samples: Vec<Sample>) -> (Self, Vec<EngineError>) {
        let mut valid = Vec::with_capacity(samples.len());
        let mut rejected = Vec::new();
        for (index, sample) in samples.into_iter().enumerate() {
            match sample.validate(index) {
                Ok(()) => valid.push(sample),
                Err(e) => rejected.push(e),
            }
        }
        if !rejected.is_empty() {
            tracing::warn!(
                rejected = rejected.len(),
                kept = valid.len(),
                "dropped invalid samples"
            );
        }
        (Self { samples: valid }, rejected)
    }

    /// An empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Returns `true` if the set holds no samples.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of samples.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.samples.len()
    }

    /// All samples in input order.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Iterate over the samples in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Samples whose value is at or above `threshold`.
    pub fn at_or_above(&self, threshold: f64) -> impl Iterator<Item = &Sample> {
        self.samples.iter().filter(move |s| s.value >= threshold)
    }
}

impl<'de> Deserialize<'de> for SampleSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let samples = Vec::<Sample>::deserialize(deserializer)?;
        Self::try_new(samples).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
