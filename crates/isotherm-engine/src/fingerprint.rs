//! Stable fingerprints of contour inputs.
//!
//! A contour is a pure function of the samples, the threshold, and the
//! config, so a hash of those three identifies the result. Callers use it
//! to key caches of computed contours.
//!
//! The hash is SipHash-1-3 with fixed keys over little-endian encodings,
//! so it is the same on every platform and across runs. It is not a
//! cryptographic commitment.

use std::hash::Hasher;

use siphasher::sip::SipHasher13;

use crate::sample::SampleSet;
use crate::types::ContourConfig;

const KEY_0: u64 = 0x6973_6f74_6865_726d;
const KEY_1: u64 = 0x636f_6e74_6f75_7273;

/// Input encoding version, bumped whenever the hashed layout changes.
const FORMAT_VERSION: u64 = 1;

/// Fingerprint of one `(samples, threshold, config)` contour request.
#[must_use]
pub fn fingerprint(samples: &SampleSet, threshold: f64, config: &ContourConfig) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(KEY_0, KEY_1);
    write_u64(&mut hasher, FORMAT_VERSION);

    write_usize(&mut hasher, samples.len());
    for sample in samples {
        write_f64(&mut hasher, sample.latitude);
        write_f64(&mut hasher, sample.longitude);
        write_f64(&mut hasher, sample.value);
    }

    write_f64(&mut hasher, threshold);

    write_f64(&mut hasher, config.resolution);
    write_f64(&mut hasher, config.tolerance);
    write_usize(&mut hasher, config.smoothing_half_width);
    write_usize(&mut hasher, config.neighbors);
    write_f64(&mut hasher, config.margin);
    write_usize(&mut hasher, config.max_grid_cells);

    hasher.finish()
}

fn write_u64(hasher: &mut SipHasher13, value: u64) {
    hasher.write(&value.to_le_bytes());
}

fn write_usize(hasher: &mut SipHasher13, value: usize) {
    write_u64(hasher, value as u64);
}

/// `-0.0` hashes like `0.0`, matching how the engine compares them.
fn write_f64(hasher: &mut SipHasher13, value: f64) {
    let normalized = if value == 0.0 { 0.0 } else { value };
    write_u64(hasher, normalized.to_bits());
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::sample::Sample;

    fn samples() -> SampleSet {
        SampleSet::try_new(vec![
            Sample::new(35.0, 139.0, 250.0),
            Sample::new(35.5, 139.5, 310.0),
        ])
        .unwrap()
    }

    #[test]
    fn same_inputs_same_fingerprint() {
        let config = ContourConfig::default();
        assert_eq!(
            fingerprint(&samples(), 300.0, &config),
            fingerprint(&samples(), 300.0, &config)
        );
    }

    #[test]
    fn every_input_changes_the_fingerprint() {
        let config = ContourConfig::default();
        let base = fingerprint(&samples(), 300.0, &config);

        assert_ne!(base, fingerprint(&samples(), 300.5, &config));

        let moved = SampleSet::try_new(vec![
            Sample::new(35.0, 139.0, 250.0),
            Sample::new(35.5, 139.5, 311.0),
        ])
        .unwrap();
        assert_ne!(base, fingerprint(&moved, 300.0, &config));

        let finer = ContourConfig {
            resolution: 0.01,
            ..ContourConfig::default()
        };
        assert_ne!(base, fingerprint(&samples(), 300.0, &finer));

        let wider = ContourConfig {
            smoothing_half_width: 3,
            ..ContourConfig::default()
        };
        assert_ne!(base, fingerprint(&samples(), 300.0, &wider));
    }

    #[test]
    fn sample_order_matters() {
        let config = ContourConfig::default();
        let reversed = SampleSet::try_new(vec![
            Sample::new(35.5, 139.5, 310.0),
            Sample::new(35.0, 139.0, 250.0),
        ])
        .unwrap();
        assert_ne!(
            fingerprint(&samples(), 300.0, &config),
            fingerprint(&reversed, 300.0, &config)
        );
    }

    #[test]
    fn negative_zero_matches_zero() {
        let config = ContourConfig::default();
        assert_eq!(
            fingerprint(&samples(), 0.0, &config),
            fingerprint(&samples(), -0.0, &config)
        );
    }

    #[test]
    fn empty_set_differs_from_populated() {
        let config = ContourConfig::default();
        assert_ne!(
            fingerprint(&SampleSet::empty(), 300.0, &config),
            fingerprint(&samples(), 300.0, &config)
        );
    }
}
