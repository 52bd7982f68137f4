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

//! Short-time Fourier transform behind the onset envelope.

use std::f32::consts::PI;

use num_complex::Complex32;
use rustfft::FftPlanner;

/// FFT window length used for all analysis.
pub const N_FFT: usize = 2048;

/// Power spectrogram of a mono signal.
///
/// Frames are centered: frame `t` covers the samples around `t * hop`, with the signal
/// zero-padded by half a window at both ends. Each frame holds `N_FFT / 2 + 1` power bins.
pub struct PowerSpectrogram {
    frames: Vec<Vec<f32>>,
    hop: usize,
    sample_rate: u32,
}

impl PowerSpectrogram {
    /// Computes the spectrogram with a Hann window.
    pub fn compute(samples: &[f32], sample_rate: u32, hop: usize) -> PowerSpectrogram {
        let hop = hop.max(1);
        if samples.is_empty() {
            return PowerSpectrogram {
                frames: Vec::new(),
                hop,
                sample_rate,
            };
        }

        let half = N_FFT / 2;
        let mut padded = vec![0.0f32; samples.len() + N_FFT];
        padded[half..half + samples.len()].copy_from_slice(samples);

        let window: Vec<f32> = (0..N_FFT)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / N_FFT as f32).cos())
            .collect();
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(N_FFT);
        let mut buffer = vec![Complex32::new(0.0, 0.0); N_FFT];

        let frame_count = 1 + samples.len() / hop;
        let mut frames = Vec::with_capacity(frame_count);
        for t in 0..frame_count {
            let start = t * hop;
            for (i, slot) in buffer.iter_mut().enumerate() {
                *slot = Complex32::new(padded[start + i] * window[i], 0.0);
            }
            fft.process(&mut buffer);
            frames.push(buffer[..=half].iter().map(|c| c.norm_sqr()).collect());
        }

        PowerSpectrogram {
            frames,
            hop,
            sample_rate,
        }
    }

    pub fn frames(&self) -> &[Vec<f32>] {
        &self.frames
    }

    /// Frames per second.
    pub fn frame_rate(&self) -> f32 {
        self.sample_rate as f32 / self.hop as f32
    }
}
