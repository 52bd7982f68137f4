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
use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};
use tracing::debug;

use super::error::AudioError;
use super::resample::resample;
use super::waveform::Waveform;

/// Decodes an entire audio file (WAV, FLAC, MP3, etc.) into memory at its native rate.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<Waveform, AudioError> {
    let path = path.as_ref();
    let path_display = path.display().to_string();

    // Include the path in the error so the log shows which file failed.
    let file = File::open(path).map_err(|e| {
        AudioError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path_display, e),
        ))
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();
    let probed = get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| AudioError::Unsupported {
            path: path_display.clone(),
            reason: e.to_string(),
        })?;
    let mut format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Unsupported {
            path: path_display.clone(),
            reason: "no audio track found".to_string(),
        })?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let sample_rate = params.sample_rate.ok_or_else(|| AudioError::Unsupported {
        path: path_display.clone(),
        reason: "sample rate not specified".to_string(),
    })?;

    let decoder_opts: DecoderOptions = Default::default();
    let mut decoder = get_codecs()
        .make(&params, &decoder_opts)
        .map_err(|e| AudioError::Unsupported {
            path: path_display.clone(),
            reason: e.to_string(),
        })?;

    // Prefer the container's channel count. When it is missing, the first decoded
    // buffer decides.
    let mut channels = params.channels.map(|c| c.count() as u16).unwrap_or(0);
    let mut samples: Vec<f32> = Vec::new();
    if let Some(n_frames) = params.n_frames {
        samples.reserve(n_frames as usize * channels.max(1) as usize);
    }

    while let Some(packet) = read_next_packet(format_reader.as_mut(), decoder.as_mut())? {
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                decoder.decode(&packet)?
            }
            // A corrupt packet is skipped rather than failing the whole file.
            Err(SymphoniaError::DecodeError(reason)) => {
                debug!(path = %path_display, reason = %reason, "Skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if decoded.frames() == 0 {
            continue;
        }
        let spec = *decoded.spec();
        if channels == 0 {
            channels = spec.channels.count() as u16;
        }

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buffer.samples());
    }

    if channels == 0 {
        // Nothing was decoded and the container did not say how many channels it had.
        channels = 1;
    }

    debug!(
        path = %path_display,
        channels,
        sample_rate,
        frames = samples.len() / channels as usize,
        "Decoded audio file"
    );
    Ok(Waveform::new(samples, channels, sample_rate))
}

/// Decodes an audio file and resamples it to the given rate.
pub fn decode_file_at_rate<P: AsRef<Path>>(
    path: P,
    sample_rate: u32,
) -> Result<Waveform, AudioError> {
    let waveform = decode_file(path)?;
    resample(&waveform, sample_rate)
}

/// Reads the next packet, treating the end of the stream as `Ok(None)`.
///
/// Some decoders report the end of the stream as a DecodeError rather than an
/// UnexpectedEof, so both are treated as EOF. ResetRequired resets the decoder
/// and keeps reading.
fn read_next_packet(
    format_reader: &mut dyn FormatReader,
    decoder: &mut dyn Decoder,
) -> Result<Option<Packet>, AudioError> {
    loop {
        match format_reader.next_packet() {
            Ok(packet) => return Ok(Some(packet)),
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(None)
            }
            Err(SymphoniaError::DecodeError(_)) => return Ok(None),
            Err(e) => return Err(AudioError::Decode(e)),
        }
    }
}
