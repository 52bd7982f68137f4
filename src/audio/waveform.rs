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
use std::time::Duration;

/// Decoded PCM audio. Samples are interleaved f32 values in [-1.0, 1.0].
#[derive(Clone, Debug, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl Waveform {
    /// Creates a waveform from interleaved samples. Any trailing partial frame is dropped.
    pub fn new(mut samples: Vec<f32>, channels: u16, sample_rate: u32) -> Waveform {
        let channels = channels.max(1);
        let whole_frames = samples.len() / channels as usize;
        samples.truncate(whole_frames * channels as usize);
        Waveform {
            samples,
            channels,
            sample_rate,
        }
    }

    /// Creates a waveform from one buffer per channel.
    pub fn from_planar(planar: &[Vec<f32>], sample_rate: u32) -> Waveform {
        let channels = planar.len().max(1);
        let frames = planar.iter().map(|c| c.len()).min().unwrap_or(0);
        let mut samples = Vec::with_capacity(frames * channels);
        for frame in 0..frames {
            for channel in planar {
                samples.push(channel[frame]);
            }
        }
        Waveform::new(samples, channels as u16, sample_rate)
    }

    /// The interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Averages all channels down to a single channel.
    pub fn to_mono(&self) -> Vec<f32> {
        if self.channels == 1 {
            return self.samples.clone();
        }
        let channels = self.channels as usize;
        self.samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    }

    /// Splits the interleaved samples into one buffer per channel.
    pub fn to_planar(&self) -> Vec<Vec<f32>> {
        let channels = self.channels as usize;
        let mut planar = vec![Vec::with_capacity(self.frames()); channels];
        for frame in self.samples.chunks_exact(channels) {
            for (channel, sample) in frame.iter().enumerate() {
                planar[channel].push(*sample);
            }
        }
        planar
    }

    /// Copies the frames in `[start, end)`. Bounds are clamped to the waveform.
    pub fn slice_frames(&self, start: usize, end: usize) -> Waveform {
        let frames = self.frames();
        let end = end.min(frames);
        let start = start.min(end);
        let channels = self.channels as usize;
        Waveform {
            samples: self.samples[start * channels..end * channels].to_vec(),
            channels: self.channels,
            sample_rate: self.sample_rate,
        }
    }
}
