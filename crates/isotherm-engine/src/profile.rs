//! Domain profiles: named sets of thresholds traced together.
//!
//! A profile describes one organism (or any other domain subject): the
//! base temperature its development is measured against and the
//! accumulation levels that mark its stages.

use serde::{Deserialize, Serialize};

use crate::accumulate::DEFAULT_BASE_TEMPERATURE;
use crate::sample::SampleSet;
use crate::types::{ContourConfig, ContourPath, EngineError, Threshold};

/// A named set of thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainProfile {
    /// Display name.
    pub name: String,
    /// Base temperature for accumulation, in °C.
    #[serde(default = "default_base_temperature")]
    pub base_temperature: f64,
    /// Thresholds in presentation order.
    pub thresholds: Vec<Threshold>,
}

const fn default_base_temperature() -> f64 {
    DEFAULT_BASE_TEMPERATURE
}

/// The contour traced for one threshold of a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdContour {
    /// The threshold, with its label and color.
    pub threshold: Threshold,
    /// The smoothed contour path (possibly empty).
    pub path: ContourPath,
}

/// Trace every threshold of `profile` over `samples`.
///
/// Contours come back in profile order, one per threshold, including
/// those whose path is empty.
///
/// # Errors
///
/// Returns the first error raised by [`crate::compute`] for any threshold.
pub fn compute_profile(
    samples: &SampleSet,
    profile: &DomainProfile,
    config: &ContourConfig,
) -> Result<Vec<ThresholdContour>, EngineError> {
    let contours = profile
        .thresholds
        .iter()
        .map(|threshold| {
            let path = crate::compute(samples, threshold.value, config)?;
            tracing::debug!(
                profile = %profile.name,
                label = %threshold.label,
                value = threshold.value,
                points = path.len(),
                "threshold traced"
            );
            Ok(ThresholdContour {
                threshold: threshold.clone(),
                path,
            })
        })
        .collect::<Result<Vec<_>, EngineError>>()?;
    Ok(contours)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::sample::Sample;

    fn square() -> SampleSet {
        SampleSet::try_new(vec![
            Sample::new(0.0, 0.0, 15.0),
            Sample::new(0.0, 1.0, 25.0),
            Sample::new(1.0, 0.0, 18.0),
            Sample::new(1.0, 1.0, 28.0),
        ])
        .unwrap()
    }

    fn profile() -> DomainProfile {
        DomainProfile {
            name: "test moth".to_string(),
            base_temperature: 10.0,
            thresholds: vec![
                Threshold::new("emergence", 20.0, "#00FF00"),
                Threshold::new("second generation", 26.0, "#FFFF00"),
                Threshold::new("unreachable", 100.0, "#FF0000"),
            ],
        }
    }

    #[test]
    fn contours_follow_profile_order() {
        let config = ContourConfig {
            resolution: 0.05,
            tolerance: 0.5,
            margin: 0.5,
            ..ContourConfig::default()
        };
        let contours = compute_profile(&square(), &profile(), &config).unwrap();
        let labels: Vec<&str> = contours
            .iter()
            .map(|c| c.threshold.label.as_str())
            .collect();
        assert_eq!(labels, vec!["emergence", "second generation", "unreachable"]);
        assert!(!contours[0].path.is_empty());
        assert!(contours[2].path.is_empty());
    }

    #[test]
    fn each_contour_matches_single_compute() {
        let config = ContourConfig::default();
        let samples = square();
        let contours = compute_profile(&samples, &profile(), &config).unwrap();
        for contour in &contours {
            let expected = crate::compute(&samples, contour.threshold.value, &config).unwrap();
            assert_eq!(contour.path, expected);
        }
    }

    #[test]
    fn empty_profile_yields_nothing() {
        let empty = DomainProfile {
            name: "none".to_string(),
            base_temperature: 10.0,
            thresholds: Vec::new(),
        };
        let contours = compute_profile(&square(), &empty, &ContourConfig::default()).unwrap();
        assert!(contours.is_empty());
    }

    #[test]
    fn first_error_is_returned() {
        let config = ContourConfig {
            resolution: 1e-5,
            max_grid_cells: 100,
            ..ContourConfig::default()
        };
        assert!(matches!(
            compute_profile(&square(), &profile(), &config),
            Err(EngineError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn profile_json_defaults_base_and_color() {
        let json = r##"{
            "name": "rice stem borer",
            "thresholds": [
                {"label": "peak", "value": 250.0, "color": "#00FF00"},
                {"label": "second", "value": 800.0}
            ]
        }"##;
        let profile: DomainProfile = serde_json::from_str(json).unwrap();
        assert!((profile.base_temperature - DEFAULT_BASE_TEMPERATURE).abs() < f64::EPSILON);
        assert_eq!(profile.thresholds.len(), 2);
        assert_eq!(profile.thresholds[1].color, "");
    }
}
