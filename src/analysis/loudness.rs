// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

/// Default loudness below which a stem is considered silent.
pub const DEFAULT_QUIET_THRESHOLD_DB: f32 = -40.0;

/// RMS level of the samples relative to full scale. Digital silence (and an empty
/// buffer) is negative infinity.
pub fn dbfs(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return f32::NEG_INFINITY;
    }
    let mean_square =
        samples.iter().map(|s| (*s as f64) * (*s as f64)).sum::<f64>() / samples.len() as f64;
    if mean_square <= 0.0 {
        return f32::NEG_INFINITY;
    }
    (10.0 * mean_square.log10()) as f32
}

/// Whether the samples are quieter than the threshold.
pub fn is_quiet(samples: &[f32], threshold_db: f32) -> bool {
    dbfs(samples) < threshold_db
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::audio_test_utils::{calculate_rms, generate_multi_frequency_signal};

    #[test]
    fn test_full_scale_square() {
        let samples: Vec<f32> = (0..1000).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert!(dbfs(&samples).abs() < 1e-4);
    }

    #[test]
    fn test_sine_level() {
        // A sine at amplitude 0.5 has an RMS of 0.5 / sqrt(2), about -9 dBFS.
        let samples = generate_multi_frequency_signal(&[440.0], &[0.5], 44100, 1.0);
        let expected = 20.0 * calculate_rms(&samples).log10();
        assert!((dbfs(&samples) - expected).abs() < 0.01);
        assert!((dbfs(&samples) + 9.03).abs() < 0.1);
        assert!(!is_quiet(&samples, DEFAULT_QUIET_THRESHOLD_DB));
    }

    #[test]
    fn test_silence_is_quiet() {
        assert_eq!(dbfs(&[0.0; 128]), f32::NEG_INFINITY);
        assert_eq!(dbfs(&[]), f32::NEG_INFINITY);
        assert!(is_quiet(&[0.0; 128], DEFAULT_QUIET_THRESHOLD_DB));
    }

    #[test]
    fn test_threshold() {
        // -46 dBFS
        let faint = generate_multi_frequency_signal(&[440.0], &[0.007], 44100, 0.5);
        assert!(is_quiet(&faint, DEFAULT_QUIET_THRESHOLD_DB));
        assert!(!is_quiet(&faint, -50.0));
    }
}
