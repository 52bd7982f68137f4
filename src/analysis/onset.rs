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

//! Spectral-flux onset detection.

use super::spectrum::PowerSpectrogram;

/// Dynamic range kept when converting power to decibels.
const TOP_DB: f32 = 80.0;

/// Minimum power before taking the logarithm.
const AMIN: f32 = 1e-10;

/// Peak picking window sizes in seconds. These mirror the usual librosa defaults.
const PRE_MAX_SECS: f32 = 0.03;
const POST_MAX_SECS: f32 = 0.0;
const PRE_AVG_SECS: f32 = 0.10;
const POST_AVG_SECS: f32 = 0.10;
const WAIT_SECS: f32 = 0.03;

/// Threshold above the local mean a peak must reach.
const DELTA: f32 = 0.07;

/// Computes the onset strength envelope: the mean positive change in log power across
/// all frequency bins between consecutive frames. The first frame is always zero.
pub fn onset_strength(spectrogram: &PowerSpectrogram) -> Vec<f32> {
    let frames = spectrogram.frames();
    if frames.is_empty() {
        return Vec::new();
    }

    let log_frames: Vec<Vec<f32>> = frames
        .iter()
        .map(|frame| frame.iter().map(|p| 10.0 * p.max(AMIN).log10()).collect())
        .collect();
    let peak_db = log_frames
        .iter()
        .flatten()
        .copied()
        .fold(f32::NEG_INFINITY, f32::max);
    let floor_db = peak_db - TOP_DB;

    let mut envelope = Vec::with_capacity(frames.len());
    envelope.push(0.0);
    for pair in log_frames.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);
        let bins = current.len().max(1) as f32;
        let flux: f32 = current
            .iter()
            .zip(previous.iter())
            .map(|(c, p)| (c.max(floor_db) - p.max(floor_db)).max(0.0))
            .sum();
        envelope.push(flux / bins);
    }
    envelope
}

/// Detects onsets in a mono signal. Returns the onset positions as frame indices
/// (multiply by `hop` for sample positions), in increasing order.
pub fn detect_onsets(samples: &[f32], sample_rate: u32, hop: usize) -> Vec<usize> {
    let spectrogram = PowerSpectrogram::compute(samples, sample_rate, hop);
    let envelope = onset_strength(&spectrogram);
    pick_peaks(&normalize(&envelope), spectrogram.frame_rate())
}

/// Scales the envelope into [0, 1]. A flat envelope has no onsets and becomes all zeros.
fn normalize(envelope: &[f32]) -> Vec<f32> {
    let min = envelope.iter().copied().fold(f32::INFINITY, f32::min);
    let max = envelope.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;
    if !range.is_finite() || range <= f32::EPSILON {
        return vec![0.0; envelope.len()];
    }
    envelope.iter().map(|v| (v - min) / range).collect()
}

/// Picks peaks that are a local maximum, exceed the local mean by `DELTA` and are at
/// least the wait time after the previous peak.
fn pick_peaks(envelope: &[f32], frame_rate: f32) -> Vec<usize> {
    let frames = |secs: f32| (secs * frame_rate) as usize;
    let pre_max = frames(PRE_MAX_SECS);
    let post_max = frames(POST_MAX_SECS) + 1;
    let pre_avg = frames(PRE_AVG_SECS);
    let post_avg = frames(POST_AVG_SECS) + 1;
    let wait = frames(WAIT_SECS);

    let mut peaks = Vec::new();
    let mut last_peak: Option<usize> = None;
    let len = envelope.len();
    for (n, value) in envelope.iter().enumerate() {
        if *value <= 0.0 {
            continue;
        }

        let max_window = &envelope[n.saturating_sub(pre_max)..(n + post_max).min(len)];
        let local_max = max_window.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if *value < local_max {
            continue;
        }

        let avg_window = &envelope[n.saturating_sub(pre_avg)..(n + post_avg).min(len)];
        let local_mean = avg_window.iter().sum::<f32>() / avg_window.len() as f32;
        if *value < local_mean + DELTA {
            continue;
        }

        if last_peak.is_some_and(|last| n - last <= wait) {
            continue;
        }
        peaks.push(n);
        last_peak = Some(n);
    }
    peaks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::audio_test_utils::generate_click_track;

    #[test]
    fn test_click_track_onsets() {
        // A quarter second of silence, then 120 BPM for 3 seconds: clicks at 0.25,
        // 0.75, ... 2.75 seconds.
        let mut samples = vec![0.0; 11025];
        samples.extend(generate_click_track(120.0, 44100, 3.0));
        let onsets = detect_onsets(&samples, 44100, 512);

        assert_eq!(onsets.len(), 6, "onsets: {:?}", onsets);
        for (i, onset) in onsets.iter().enumerate() {
            let seconds = (*onset * 512) as f32 / 44100.0;
            let expected = 0.25 + i as f32 * 0.5;
            assert!(
                (seconds - expected).abs() < 0.05,
                "onset {} at {}s, expected {}s",
                i,
                seconds,
                expected
            );
        }
    }

    #[test]
    fn test_silence_has_no_onsets() {
        assert!(detect_onsets(&vec![0.0; 44100], 44100, 512).is_empty());
        assert!(detect_onsets(&[], 44100, 512).is_empty());
    }

    #[test]
    fn test_onsets_are_deterministic() {
        let samples = generate_click_track(100.0, 44100, 2.0);
        assert_eq!(
            detect_onsets(&samples, 44100, 512),
            detect_onsets(&samples, 44100, 512)
        );
    }

    #[test]
    fn test_pick_peaks_respects_wait() {
        let envelope = [0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        // At 100 frames per second the wait is 3 frames.
        assert_eq!(pick_peaks(&envelope, 100.0), vec![1, 8]);
    }
}
