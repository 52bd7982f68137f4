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

//! Cuts a source recording into slices that start at each detected transient.

use std::path::Path;

use tracing::{debug, info};

use crate::analysis::onset::detect_onsets;
use crate::audio::{decode_file_at_rate, AudioError, Waveform};

/// A span of a decoded source, in sample frames. `start` is inclusive and `end` is
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSlice {
    /// Position of the slice among all non-empty slices of its source.
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl AudioSlice {
    pub fn frames(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// A fixed-size group of consecutive slices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub index: usize,
    pub slices: Vec<AudioSlice>,
}

/// Decodes sources at a fixed sample rate and finds their transients.
#[derive(Debug, Clone)]
pub struct TransientSlicer {
    sample_rate: u32,
    hop: usize,
}

impl TransientSlicer {
    pub fn new(sample_rate: u32, hop: usize) -> TransientSlicer {
        TransientSlicer {
            sample_rate,
            hop: hop.max(1),
        }
    }

    /// Decodes and resamples the file, then detects its onsets.
    pub fn load(&self, path: &Path) -> Result<SlicedSource, AudioError> {
        let waveform = decode_file_at_rate(path, self.sample_rate)?;
        let source = self.slice_waveform(waveform);
        info!(
            path = ?path,
            frames = source.waveform.frames(),
            onsets = source.onsets.len(),
            "Sliced source"
        );
        Ok(source)
    }

    /// Detects the onsets of an already decoded waveform.
    pub fn slice_waveform(&self, waveform: Waveform) -> SlicedSource {
        let onsets = detect_onsets(&waveform.to_mono(), waveform.sample_rate(), self.hop)
            .into_iter()
            .map(|frame| frame * self.hop)
            .collect();
        SlicedSource { waveform, onsets }
    }
}

/// A decoded source together with the sample positions of its onsets.
#[derive(Debug)]
pub struct SlicedSource {
    waveform: Waveform,
    onsets: Vec<usize>,
}

impl SlicedSource {
    #[cfg(test)]
    pub fn waveform(&self) -> &Waveform {
        &self.waveform
    }

    /// Onset positions in sample frames.
    pub fn onsets(&self) -> &[usize] {
        &self.onsets
    }

    /// Iterates the non-empty slices in order. Each call starts from the beginning.
    pub fn slices(&self) -> Slices<'_> {
        Slices {
            onsets: &self.onsets,
            len: self.waveform.frames(),
            position: 0,
            index: 0,
        }
    }

    /// Groups the slices into batches of at most `size` slices.
    pub fn batches(&self, size: usize) -> impl Iterator<Item = Batch> + '_ {
        let size = size.max(1);
        let mut slices = self.slices().peekable();
        let mut index = 0;
        std::iter::from_fn(move || {
            slices.peek()?;
            let batch = Batch {
                index,
                slices: slices.by_ref().take(size).collect(),
            };
            index += 1;
            Some(batch)
        })
    }

    /// The audio of a slice. Returns None if the slice runs past the decoded audio.
    pub fn audio(&self, slice: &AudioSlice) -> Option<Waveform> {
        if slice.end > self.waveform.frames() || slice.is_empty() {
            debug!(
                start = slice.start,
                end = slice.end,
                frames = self.waveform.frames(),
                "Slice is outside of the decoded audio"
            );
            return None;
        }
        Some(self.waveform.slice_frames(slice.start, slice.end))
    }
}

/// Lazy iterator over the slices of a [`SlicedSource`].
pub struct Slices<'a> {
    onsets: &'a [usize],
    len: usize,
    position: usize,
    index: usize,
}

impl Iterator for Slices<'_> {
    type Item = AudioSlice;

    fn next(&mut self) -> Option<AudioSlice> {
        while self.position < self.onsets.len() {
            let start = self.onsets[self.position];
            let end = self
                .onsets
                .get(self.position + 1)
                .copied()
                .unwrap_or(self.len);
            self.position += 1;

            if end <= start {
                continue;
            }
            let slice = AudioSlice {
                index: self.index,
                start,
                end,
            };
            self.index += 1;
            return Some(slice);
        }
        None
    }
}
