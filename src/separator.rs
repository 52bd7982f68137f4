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

//! Four-stem source separation.

pub mod error;
pub mod mock;
pub mod spleeter;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{SeparatorEngine, SeparatorSettings};
use crate::library::StemCategory;

pub use error::SeparatorError;

/// Splits an audio file into drums, bass, other and vocals stems.
pub trait StemSeparator {
    /// The name of the separator, for logging.
    fn name(&self) -> &str;

    /// Separates `input`, writing one WAV file per category into
    /// `output_dir/<input file stem>/`.
    fn separate(&mut self, input: &Path, output_dir: &Path) -> Result<(), SeparatorError>;

    /// Releases any state kept from the previous call.
    fn reset(&mut self);
}

/// The directory a separator writes the stems of `input` into.
pub fn stem_dir(input: &Path, output_dir: &Path) -> Result<PathBuf, SeparatorError> {
    let stem = input
        .file_stem()
        .ok_or_else(|| SeparatorError::InvalidInput(input.to_path_buf()))?;
    Ok(output_dir.join(stem))
}

/// The stem files a separator is expected to produce for `input`.
pub fn expected_stems(
    input: &Path,
    output_dir: &Path,
) -> Result<Vec<(StemCategory, PathBuf)>, SeparatorError> {
    let dir = stem_dir(input, output_dir)?;
    Ok(StemCategory::ALL
        .into_iter()
        .map(|category| (category, dir.join(category.stem_file_name())))
        .collect())
}

/// Creates the separator selected in the settings.
pub fn from_settings(settings: &SeparatorSettings) -> Box<dyn StemSeparator> {
    match settings.engine {
        SeparatorEngine::Spleeter => Box::new(spleeter::SpleeterSeparator::new(settings)),
        SeparatorEngine::Mock => Box::new(mock::MockSeparator::new()),
    }
}

/// One separator shared by every separation of a run. The separator is reset after
/// every call and the session must be closed when the run is done.
pub struct SeparationSession {
    separator: Box<dyn StemSeparator>,
    calls: usize,
    failures: usize,
}

impl SeparationSession {
    pub fn new(separator: Box<dyn StemSeparator>) -> SeparationSession {
        info!(separator = separator.name(), "Opened separation session");
        SeparationSession {
            separator,
            calls: 0,
            failures: 0,
        }
    }

    /// Separates one file and resets the separator afterwards, whether or not the
    /// separation succeeded.
    pub fn separate(&mut self, input: &Path, output_dir: &Path) -> Result<(), SeparatorError> {
        self.calls += 1;
        debug!(
            separator = self.separator.name(),
            input = ?input,
            output_dir = ?output_dir,
            "Separating stems"
        );
        let result = self.separator.separate(input, output_dir);
        self.separator.reset();
        if result.is_err() {
            self.failures += 1;
        }
        result
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn close(self) {
        info!(
            separator = self.separator.name(),
            calls = self.calls,
            failures = self.failures,
            "Closed separation session"
        );
    }
}
