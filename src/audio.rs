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

//! Audio file I/O: decoding any symphonia-supported format into a [`Waveform`],
//! resampling it to a fixed rate and writing slices back out as WAV.

pub mod decode;
pub mod encode;
pub mod error;
pub mod resample;
pub mod waveform;

pub use decode::{decode_file, decode_file_at_rate};
pub use encode::write_wav;
pub use error::AudioError;
pub use waveform::Waveform;
