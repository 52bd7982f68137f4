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

//! Tempo helpers around stratum-dsp's BPM detection.
//!
//! stratum-dsp needs a few seconds of audio to settle on a tempo. One-shot slices are
//! often shorter than a second, so they fall back to the autocorrelation of the onset
//! strength envelope weighted by a tempo prior, evaluated over whatever lags the clip
//! has.

use super::onset::onset_strength;
use super::spectrum::PowerSpectrogram;

/// Slowest tempo considered.
const MIN_BPM: f32 = 60.0;

/// Fastest tempo considered.
const MAX_BPM: f32 = 200.0;

/// Center of the log-normal tempo prior.
const PRIOR_BPM: f32 = 120.0;

/// Width of the tempo prior in octaves.
const PRIOR_OCTAVES: f32 = 1.0;

/// Fraction of the zero-lag autocorrelation the chosen lag must reach to count as a beat.
const MIN_PERIODICITY: f32 = 0.2;

/// Rounds a detected BPM. None if the detector didn't find a tempo.
pub fn from_bpm(bpm: f32) -> Option<u32> {
    if bpm.is_finite() && bpm >= 0.5 {
        Some(bpm.round() as u32)
    } else {
        None
    }
}

/// Estimates the tempo of a mono signal in BPM, rounded to the nearest integer.
///
/// Returns 0 when there is nothing to track: an empty or silent signal, or one too
/// short to hold more than two analysis frames.
pub fn estimate_tempo(samples: &[f32], sample_rate: u32, hop: usize) -> u32 {
    if samples.is_empty() || sample_rate == 0 {
        return 0;
    }

    let spectrogram = PowerSpectrogram::compute(samples, sample_rate, hop);
    let envelope = onset_strength(&spectrogram);
    if envelope.len() <= 2 || !envelope.iter().any(|v| *v > 0.0) {
        return 0;
    }
    let frame_rate = spectrogram.frame_rate();

    let bpm = periodic_tempo(&envelope, frame_rate)
        .unwrap_or_else(|| short_clip_tempo(&envelope, frame_rate));
    bpm.round() as u32
}

/// The tempo of a clip long enough to hold two beats at the slowest tempo, if its
/// onsets repeat.
fn periodic_tempo(envelope: &[f32], frame_rate: f32) -> Option<f32> {
    let mean = envelope.iter().sum::<f32>() / envelope.len() as f32;
    let envelope: Vec<f32> = envelope.iter().map(|v| v - mean).collect();

    let min_lag = min_lag(frame_rate);
    let max_lag = ((60.0 * frame_rate / MIN_BPM).ceil() as usize).min(envelope.len() / 2);
    if max_lag <= min_lag {
        return None;
    }

    let acf: Vec<f32> = (0..=max_lag + 1)
        .map(|lag| autocorrelation(&envelope, lag))
        .collect();
    let best_lag = (min_lag..=max_lag)
        .max_by(|a, b| weighted(&acf, *a, frame_rate).total_cmp(&weighted(&acf, *b, frame_rate)))
        .filter(|lag| acf[*lag] > 0.0 && acf[*lag] >= MIN_PERIODICITY * acf[0])?;

    // Refine the lag with a parabola through the neighboring autocorrelation values.
    let (before, peak, after) = (acf[best_lag - 1], acf[best_lag], acf[best_lag + 1]);
    let curvature = before - 2.0 * peak + after;
    let offset = if curvature < 0.0 {
        (0.5 * (before - after) / curvature).clamp(-0.5, 0.5)
    } else {
        0.0
    };
    Some(60.0 * frame_rate / (best_lag as f32 + offset))
}

/// The tempo of a clip without a repeating pattern. Every available lag is scored by
/// its log-compressed, normalized autocorrelation plus the log tempo prior, so a clip
/// with a single onset lands near the prior.
fn short_clip_tempo(envelope: &[f32], frame_rate: f32) -> f32 {
    let acf: Vec<f32> = (0..envelope.len())
        .map(|lag| autocorrelation(envelope, lag))
        .collect();
    let peak = acf[0].max(f32::MIN_POSITIVE);

    let score = |lag: usize| {
        let octaves = (lag_bpm(lag, frame_rate) / PRIOR_BPM).log2() / PRIOR_OCTAVES;
        (1.0 + 1e6 * acf[lag].max(0.0) / peak).ln() - 0.5 * octaves * octaves
    };
    let lags = if min_lag(frame_rate) < envelope.len() {
        min_lag(frame_rate)..envelope.len()
    } else {
        1..envelope.len()
    };
    let best_lag = lags
        .max_by(|a, b| score(*a).total_cmp(&score(*b)))
        .unwrap_or(1);

    let mut bpm = lag_bpm(best_lag, frame_rate);
    while bpm > MAX_BPM {
        bpm /= 2.0;
    }
    bpm
}

/// The shortest lag considered, i.e. the one of the fastest tempo.
fn min_lag(frame_rate: f32) -> usize {
    ((60.0 * frame_rate / MAX_BPM).floor() as usize).max(1)
}

fn lag_bpm(lag: usize, frame_rate: f32) -> f32 {
    60.0 * frame_rate / lag as f32
}

/// Autocorrelation of the envelope at the given lag, normalized by the number of
/// overlapping frames so that long lags are not penalized.
fn autocorrelation(envelope: &[f32], lag: usize) -> f32 {
    if lag >= envelope.len() {
        return 0.0;
    }
    let overlap = envelope.len() - lag;
    let sum: f32 = envelope[..overlap]
        .iter()
        .zip(&envelope[lag..])
        .map(|(a, b)| a * b)
        .sum();
    sum / overlap as f32
}

/// The autocorrelation at a lag, weighted by how plausible its tempo is.
fn weighted(acf: &[f32], lag: usize, frame_rate: f32) -> f32 {
    let octaves = (lag_bpm(lag, frame_rate) / PRIOR_BPM).log2() / PRIOR_OCTAVES;
    acf[lag] * (-0.5 * octaves * octaves).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::audio_test_utils::generate_click_track;

    #[test]
    fn test_click_track_tempo() {
        for bpm in [90.0, 120.0, 140.0] {
            let samples = generate_click_track(bpm, 44100, 6.0);
            let estimate = estimate_tempo(&samples, 44100, 512);
            assert!(
                (estimate as f32 - bpm).abs() <= 2.0,
                "expected ~{} BPM, got {}",
                bpm,
                estimate
            );
        }
    }

    #[test]
    fn test_short_clips_have_a_tempo() {
        for seconds in [0.25, 0.5, 0.75, 1.0] {
            let samples = generate_click_track(120.0, 44100, seconds);
            let estimate = estimate_tempo(&samples, 44100, 512);
            assert!(
                (MIN_BPM as u32..=MAX_BPM as u32).contains(&estimate),
                "{}s clip got {} BPM",
                seconds,
                estimate
            );
        }
    }

    #[test]
    fn test_nothing_to_track() {
        assert_eq!(estimate_tempo(&[], 44100, 512), 0);
        assert_eq!(estimate_tempo(&vec![0.0; 44100], 44100, 512), 0);
        // Two analysis frames.
        assert_eq!(estimate_tempo(&vec![0.5; 1000], 44100, 512), 0);
    }

    #[test]
    fn test_from_bpm() {
        assert_eq!(from_bpm(119.6), Some(120));
        assert_eq!(from_bpm(0.0), None);
        assert_eq!(from_bpm(f32::NAN), None);
        assert_eq!(from_bpm(-3.0), None);
    }
}
