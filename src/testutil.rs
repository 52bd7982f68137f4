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
use std::{error::Error, path::Path};

use hound::{SampleFormat, WavSpec, WavWriter};

/// Audio test utilities for generating test signals and validating results
pub mod audio_test_utils {
    use std::f32::consts::PI;

    /// Generate a multi-frequency signal (sum of sine waves)
    pub fn generate_multi_frequency_signal(
        frequencies: &[f32],
        amplitudes: &[f32],
        sample_rate: u32,
        duration_seconds: f32,
    ) -> Vec<f32> {
        assert_eq!(
            frequencies.len(),
            amplitudes.len(),
            "Frequencies and amplitudes must have same length"
        );

        let sample_count = (sample_rate as f32 * duration_seconds) as usize;
        let mut samples = vec![0.0; sample_count];

        for (i, sample) in samples.iter_mut().enumerate() {
            let t = i as f32 / sample_rate as f32;
            for (freq, amp) in frequencies.iter().zip(amplitudes.iter()) {
                *sample += amp * (2.0 * PI * freq * t).sin();
            }
        }

        samples
    }

    /// Generate a chord from MIDI note numbers, each partial at the given amplitude.
    pub fn generate_chord(
        midi_notes: &[u8],
        amplitude: f32,
        sample_rate: u32,
        duration_seconds: f32,
    ) -> Vec<f32> {
        let frequencies: Vec<f32> = midi_notes
            .iter()
            .map(|note| 440.0 * 2f32.powf((*note as f32 - 69.0) / 12.0))
            .collect();
        let amplitudes = vec![amplitude; frequencies.len()];
        generate_multi_frequency_signal(&frequencies, &amplitudes, sample_rate, duration_seconds)
    }

    /// Generate a click track: a short, exponentially decaying 1kHz burst on every beat.
    pub fn generate_click_track(bpm: f32, sample_rate: u32, duration_seconds: f32) -> Vec<f32> {
        let sample_count = (sample_rate as f32 * duration_seconds) as usize;
        let beat_interval = (60.0 / bpm * sample_rate as f32) as usize;
        let click_length = (0.03 * sample_rate as f32) as usize;

        let mut samples = vec![0.0; sample_count];
        for beat_start in (0..sample_count).step_by(beat_interval) {
            for offset in 0..click_length.min(sample_count - beat_start) {
                let t = offset as f32 / sample_rate as f32;
                let envelope = 0.8 * (-t * 150.0).exp();
                samples[beat_start + offset] = envelope * (2.0 * PI * 1000.0 * t).sin();
            }
        }
        samples
    }

    /// Calculate RMS (Root Mean Square) of a signal
    pub fn calculate_rms(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }

        let sum_squares: f32 = samples.iter().map(|&x| x * x).sum();
        (sum_squares / samples.len() as f32).sqrt()
    }
}

/// Writes one buffer per channel to a 16-bit WAV file, interleaving the channels.
pub fn write_wav_i16<P: AsRef<Path>>(
    path: P,
    channels: &[Vec<i16>],
    sample_rate: u32,
) -> Result<(), Box<dyn Error>> {
    assert!(channels.len() <= u16::MAX.into(), "Too many channels!");
    let mut writer = WavWriter::create(
        path,
        WavSpec {
            channels: channels.len() as u16,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        },
    )?;

    let frames = channels.iter().map(|c| c.len()).min().unwrap_or(0);
    for frame in 0..frames {
        for channel in channels {
            writer.write_sample(channel[frame])?;
        }
    }
    writer.finalize()?;

    Ok(())
}

/// Writes a mono f32 signal to a 32-bit float WAV file.
pub fn write_wav_f32<P: AsRef<Path>>(
    path: P,
    samples: &[f32],
    sample_rate: u32,
) -> Result<(), Box<dyn Error>> {
    let mut writer = WavWriter::create(
        path,
        WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        },
    )?;
    for sample in samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;

    Ok(())
}
