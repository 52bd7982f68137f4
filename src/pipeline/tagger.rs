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

//! Turns separated stems into library samples: analyze, reject or name, and move.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::analysis::Analyzer;
use crate::audio::decode_file;
use crate::library::{
    name::artist_and_track, Library, LibraryError, SampleName, StemCategory,
};

use super::PipelineError;

/// What happened to one stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    /// Moved into the library under this name.
    Committed(SampleName),
    Empty,
    Undecodable,
    Quiet,
    UnknownKey,
}

/// Tags stems and commits them to the library. Sequence ids are tracked per artist,
/// track and category for the lifetime of the tagger.
pub struct Tagger<'a> {
    library: &'a Library,
    analyzer: &'a Analyzer,
    next_ids: HashMap<(String, String, StemCategory), u32>,
}

impl<'a> Tagger<'a> {
    pub fn new(library: &'a Library, analyzer: &'a Analyzer) -> Tagger<'a> {
        Tagger {
            library,
            analyzer,
            next_ids: HashMap::new(),
        }
    }

    /// Tags one stem of the given category. Rejected stems are deleted. `source_file_name`
    /// is the name of the recording the stem came from.
    pub fn tag(
        &mut self,
        stem: &Path,
        category: StemCategory,
        source_file_name: &str,
    ) -> Result<TagOutcome, PipelineError> {
        let waveform = match decode_file(stem) {
            Ok(waveform) => waveform,
            Err(e) => {
                warn!(stem = ?stem, err = %e, "Unable to decode stem");
                discard(stem);
                return Ok(TagOutcome::Undecodable);
            }
        };
        if waveform.is_empty() {
            info!(stem = ?stem, "Skipping empty stem");
            discard(stem);
            return Ok(TagOutcome::Empty);
        }

        let analysis = self.analyzer.analyze(&waveform);
        if analysis.quiet {
            debug!(stem = ?stem, dbfs = analysis.dbfs, "Discarding quiet stem");
            discard(stem);
            return Ok(TagOutcome::Quiet);
        }
        let Some(key) = analysis.key.key() else {
            debug!(stem = ?stem, "Discarding stem without a detectable key");
            discard(stem);
            return Ok(TagOutcome::UnknownKey);
        };

        let (artist, track) = artist_and_track(source_file_name);
        let extension = stem
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("wav")
            .to_string();
        let mut name = SampleName {
            key,
            tempo: analysis.tempo,
            artist,
            track,
            category,
            id: 0,
            extension,
        };

        let folder = self.library.category_dir(category);
        fs::create_dir_all(&folder).map_err(|source| LibraryError::Io {
            path: folder.clone(),
            source,
        })?;
        let id_key = (name.artist.clone(), name.track.clone(), category);
        let mut id = self.next_ids.get(&id_key).copied().unwrap_or(0);
        let destination = loop {
            name.id = id;
            let destination = folder.join(name.file_name());
            if !destination.exists() {
                break destination;
            }
            id += 1;
        };

        move_file(stem, &destination).map_err(|source| PipelineError::Io {
            path: destination.clone(),
            source,
        })?;
        self.next_ids.insert(id_key, id + 1);
        info!(sample = %name, "Committed sample");
        Ok(TagOutcome::Committed(name))
    }
}

/// Deletes a rejected stem. Whatever is left behind goes with the working tree cleanup.
fn discard(stem: &Path) {
    if let Err(e) = fs::remove_file(stem) {
        warn!(stem = ?stem, err = %e, "Unable to delete stem");
    }
}

/// Moves a file, copying it when a rename isn't possible (e.g. across filesystems).
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}

/// Finds the stem files of one category under the folder, at any depth, sorted by path.
pub fn find_stems(folder: &Path, category: StemCategory) -> Vec<PathBuf> {
    if !folder.exists() {
        return Vec::new();
    }
    let file_name = category.stem_file_name();
    walkdir::WalkDir::new(folder)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(folder = ?folder, err = %e, "Unable to read stem folder entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == file_name.as_str())
        .map(|entry| entry.into_path())
        .collect()
}
