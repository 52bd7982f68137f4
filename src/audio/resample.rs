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
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

use super::error::AudioError;
use super::waveform::Waveform;

/// Input block size for the sinc resampler.
const INPUT_BLOCK_SIZE: usize = 1024;

/// Resamples a whole waveform to the target rate with a sinc resampler.
///
/// The output has exactly `round(frames * target / source)` frames: the resampler's
/// delay is trimmed from the front and the tail is flushed until the expected length
/// is reached.
pub fn resample(waveform: &Waveform, target_rate: u32) -> Result<Waveform, AudioError> {
    let source_rate = waveform.sample_rate();
    if source_rate == target_rate || waveform.is_empty() {
        return Ok(Waveform::new(
            waveform.samples().to_vec(),
            waveform.channels(),
            target_rate,
        ));
    }
    if source_rate == 0 || target_rate == 0 {
        return Err(AudioError::ResamplingFailed(source_rate, target_rate));
    }

    let failed = |_| AudioError::ResamplingFailed(source_rate, target_rate);

    let sinc_params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        oversampling_factor: 128,
        interpolation: SincInterpolationType::Linear,
        window: WindowFunction::BlackmanHarris2,
    };
    let ratio = target_rate as f64 / source_rate as f64;
    let channels = waveform.channels() as usize;
    let mut resampler =
        SincFixedIn::<f32>::new(ratio, 1.0, sinc_params, INPUT_BLOCK_SIZE, channels)
            .map_err(|_| AudioError::ResamplingFailed(source_rate, target_rate))?;

    let planar = waveform.to_planar();
    let frames = waveform.frames();
    let expected = (frames as f64 * ratio).round() as usize;
    let delay = resampler.output_delay();
    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(expected + delay); channels];

    let mut position = 0;
    while position + INPUT_BLOCK_SIZE <= frames {
        let block: Vec<&[f32]> = planar
            .iter()
            .map(|channel| &channel[position..position + INPUT_BLOCK_SIZE])
            .collect();
        let resampled = resampler.process(&block, None).map_err(failed)?;
        append_planar(&mut output, resampled);
        position += INPUT_BLOCK_SIZE;
    }

    if position < frames {
        let tail: Vec<&[f32]> = planar.iter().map(|channel| &channel[position..]).collect();
        let resampled = resampler
            .process_partial(Some(&tail[..]), None)
            .map_err(failed)?;
        append_planar(&mut output, resampled);
    }

    // Flush the resampler's delay line.
    while output[0].len() < expected + delay {
        let resampled = resampler
            .process_partial::<Vec<f32>>(None, None)
            .map_err(failed)?;
        if resampled.first().map_or(true, |c| c.is_empty()) {
            break;
        }
        append_planar(&mut output, resampled);
    }

    for channel in output.iter_mut() {
        channel.drain(..delay.min(channel.len()));
        channel.resize(expected, 0.0);
    }

    debug!(
        source_rate,
        target_rate,
        source_frames = frames,
        output_frames = expected,
        "Resampled waveform"
    );
    Ok(Waveform::from_planar(&output, target_rate))
}

fn append_planar(output: &mut [Vec<f32>], resampled: Vec<Vec<f32>>) {
    for (out, chunk) in output.iter_mut().zip(resampled) {
        out.extend_from_slice(&chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::audio_test_utils::{calculate_rms, generate_multi_frequency_signal};

    #[test]
    fn test_resample_length() {
        let signal = generate_multi_frequency_signal(&[440.0], &[0.5], 44100, 0.5);
        let waveform = Waveform::new(signal, 1, 44100);

        let resampled = resample(&waveform, 48000).unwrap();
        assert_eq!(resampled.sample_rate(), 48000);
        assert_eq!(resampled.frames(), 24000);
    }

    #[test]
    fn test_resample_preserves_energy() {
        let signal = generate_multi_frequency_signal(&[440.0], &[0.5], 48000, 1.0);
        let input_rms = calculate_rms(&signal);
        let waveform = Waveform::new(signal, 1, 48000);

        let resampled = resample(&waveform, 44100).unwrap();
        let output_rms = calculate_rms(resampled.samples());
        assert!(
            (input_rms - output_rms).abs() < 0.02,
            "input rms {} output rms {}",
            input_rms,
            output_rms
        );
    }

    #[test]
    fn test_resample_stereo_keeps_channels() {
        let left = generate_multi_frequency_signal(&[220.0], &[0.5], 22050, 0.25);
        let right: Vec<f32> = left.iter().map(|s| -s).collect();
        let source_frames = left.len();
        let waveform = Waveform::from_planar(&[left, right], 22050);

        let resampled = resample(&waveform, 44100).unwrap();
        assert_eq!(resampled.channels(), 2);
        assert_eq!(resampled.frames(), source_frames * 2);
        for frame in resampled.samples().chunks_exact(2) {
            assert!((frame[0] + frame[1]).abs() < 0.001);
        }
    }

    #[test]
    fn test_same_rate_is_identity() {
        let waveform = Waveform::new(vec![0.1, 0.2, 0.3], 1, 44100);
        assert_eq!(resample(&waveform, 44100).unwrap(), waveform);
    }
}
