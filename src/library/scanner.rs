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
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::camelot::CamelotKey;

use super::{LibraryError, SampleName};

/// What to do with a library entry whose name can't be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Fail the whole scan.
    #[default]
    Abort,
    /// Log a warning and leave the entry out.
    Skip,
}

/// Decides whether a sample's tempo can be played against a target tempo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoRule {
    /// Maximum distance from the target in BPM.
    pub window: u32,
    /// Tolerance for the double and half tempo comparisons.
    pub epsilon: f64,
}

impl Default for TempoRule {
    fn default() -> Self {
        TempoRule {
            window: 10,
            epsilon: 0.0,
        }
    }
}

impl TempoRule {
    pub fn matches(&self, tempo: u32, target: u32) -> bool {
        let (tempo, target) = (tempo as f64, target as f64);
        (tempo - target).abs() <= self.window as f64
            || (tempo - 2.0 * target).abs() <= self.epsilon
            || (tempo - target / 2.0).abs() <= self.epsilon
    }
}

/// Options shared by every scan of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScanOptions {
    pub tempo: TempoRule,
    pub malformed: MalformedPolicy,
}

/// Lists the file names in a category folder whose key is one of `compatible_keys` and
/// whose tempo is compatible with `target_tempo`, sorted by name.
///
/// Hidden files and directories are ignored and a missing folder has no matches.
pub fn scan(
    folder: &Path,
    compatible_keys: &[CamelotKey],
    target_tempo: u32,
    options: &ScanOptions,
) -> Result<Vec<String>, LibraryError> {
    let mut matches = Vec::new();
    for path in entries(folder)? {
        let name = match SampleName::parse(&path) {
            Ok(name) => name,
            Err(e) => match options.malformed {
                MalformedPolicy::Abort => return Err(e),
                MalformedPolicy::Skip => {
                    warn!(err = %e, "Skipping malformed library entry");
                    continue;
                }
            },
        };

        if compatible_keys.contains(&name.key)
            && options.tempo.matches(name.tempo, target_tempo)
        {
            // Stored spelling, not the canonical one.
            if let Some(file_name) = path.file_name() {
                matches.push(file_name.to_string_lossy().into_owned());
            }
        }
    }

    matches.sort();
    debug!(
        folder = ?folder,
        target_tempo,
        matches = matches.len(),
        "Scanned library folder"
    );
    Ok(matches)
}

/// The visible regular files directly inside the folder, sorted by name.
pub(super) fn entries(folder: &Path) -> Result<Vec<PathBuf>, LibraryError> {
    if !folder.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| LibraryError::Io {
            path: e.path().unwrap_or(folder).to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() || entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        files.push(entry.into_path());
    }
    Ok(files)
}
