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
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use super::error::AudioError;
use super::waveform::Waveform;

/// Bit depth of exported slices. 16-bit at 44.1kHz stereo is CD quality (1411 kbps).
const EXPORT_BITS_PER_SAMPLE: u16 = 16;

/// Writes the waveform to a 16-bit PCM WAV file, clipping anything outside [-1.0, 1.0].
pub fn write_wav<P: AsRef<Path>>(path: P, waveform: &Waveform) -> Result<(), AudioError> {
    let spec = WavSpec {
        channels: waveform.channels(),
        sample_rate: waveform.sample_rate(),
        bits_per_sample: EXPORT_BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    let scale = i16::MAX as f32;
    for sample in waveform.samples() {
        writer.write_sample((sample.clamp(-1.0, 1.0) * scale).round() as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::audio::decode_file;

    #[test]
    fn test_write_then_decode() {
        let tempdir = tempdir().unwrap();
        let path = tempdir.path().join("slice.wav");
        let waveform = Waveform::new(vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.25], 2, 44100);

        write_wav(&path, &waveform).unwrap();
        let decoded = decode_file(&path).unwrap();

        assert_eq!(decoded.channels(), 2);
        assert_eq!(decoded.sample_rate(), 44100);
        assert_eq!(decoded.frames(), 3);
        for (actual, expected) in decoded.samples().iter().zip(waveform.samples()) {
            assert!((actual - expected).abs() < 0.001, "{} != {}", actual, expected);
        }
    }

    #[test]
    fn test_write_clips() {
        let tempdir = tempdir().unwrap();
        let path = tempdir.path().join("loud.wav");
        write_wav(&path, &Waveform::new(vec![4.0, -4.0], 1, 8000)).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![i16::MAX, -i16::MAX]);
    }
}
