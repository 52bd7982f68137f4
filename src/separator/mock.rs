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
use std::{
    collections::HashMap,
    fs,
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use tracing::debug;

use crate::audio::{decode_file, write_wav, Waveform};
use crate::library::StemCategory;

use super::{expected_stems, stem_dir, SeparatorError, StemSeparator};

/// Call counters shared with whoever created the mock.
#[derive(Debug, Default)]
pub struct MockStats {
    pub calls: AtomicUsize,
    pub resets: AtomicUsize,
}

/// A mock separator. Doesn't separate anything: every stem is a copy of the input
/// scaled by a per-category gain (1.0 unless configured).
pub struct MockSeparator {
    gains: HashMap<StemCategory, f32>,
    stats: Arc<MockStats>,
}

impl Default for MockSeparator {
    fn default() -> Self {
        MockSeparator::new()
    }
}

impl MockSeparator {
    pub fn new() -> MockSeparator {
        MockSeparator {
            gains: HashMap::new(),
            stats: Arc::new(MockStats::default()),
        }
    }

    /// Scales the given stem. A gain of 0.0 produces a silent stem.
    #[cfg(test)]
    pub fn with_gain(mut self, category: StemCategory, gain: f32) -> MockSeparator {
        self.gains.insert(category, gain);
        self
    }

    #[cfg(test)]
    pub fn stats(&self) -> Arc<MockStats> {
        self.stats.clone()
    }
}

impl StemSeparator for MockSeparator {
    fn name(&self) -> &str {
        "mock"
    }

    fn separate(&mut self, input: &Path, output_dir: &Path) -> Result<(), SeparatorError> {
        self.stats.calls.fetch_add(1, Ordering::Relaxed);
        let source = decode_file(input)?;
        fs::create_dir_all(stem_dir(input, output_dir)?)?;

        for (category, path) in expected_stems(input, output_dir)? {
            let gain = self.gains.get(&category).copied().unwrap_or(1.0);
            let samples = source.samples().iter().map(|s| s * gain).collect();
            write_wav(
                &path,
                &Waveform::new(samples, source.channels(), source.sample_rate()),
            )?;
        }
        debug!(input = ?input, "Wrote mock stems");
        Ok(())
    }

    fn reset(&mut self) {
        self.stats.resets.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::testutil::audio_test_utils::generate_multi_frequency_signal;

    #[test]
    fn test_writes_scaled_stems() {
        let tempdir = tempdir().unwrap();
        let input = tempdir.path().join("slice_001.wav");
        let samples = generate_multi_frequency_signal(&[440.0], &[0.5], 22050, 0.1);
        write_wav(&input, &Waveform::new(samples, 1, 22050)).unwrap();

        let mut separator = MockSeparator::new().with_gain(StemCategory::Vocals, 0.0);
        let output_dir = tempdir.path().join("stems");
        separator.separate(&input, &output_dir).unwrap();

        let drums = decode_file(output_dir.join("slice_001/drums.wav")).unwrap();
        let vocals = decode_file(output_dir.join("slice_001/vocals.wav")).unwrap();
        assert_eq!(drums.frames(), 2205);
        assert_eq!(drums.sample_rate(), 22050);
        assert!(drums.samples().iter().any(|s| s.abs() > 0.4));
        assert!(vocals.samples().iter().all(|s| *s == 0.0));
        assert_eq!(separator.stats().calls.load(Ordering::Relaxed), 1);
    }
}
