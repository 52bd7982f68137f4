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

//! The extraction pipeline: slices source recordings at their transients, separates
//! every slice into stems and commits the usable stems to the sample library.

pub mod cleanup;
pub mod report;
pub mod tagger;

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, span, warn, Level};

use crate::analysis::Analyzer;
use crate::audio::{write_wav, AudioError};
use crate::config::Settings;
use crate::library::{Library, LibraryError, StemCategory};
use crate::separator::{SeparationSession, SeparatorError};
use crate::slicer::{Batch, SlicedSource, TransientSlicer};

pub use cleanup::clean_up;
pub use report::ExtractionReport;
pub use tagger::Tagger;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error(transparent)]
    Separator(#[from] SeparatorError),

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("source {0} has no usable file name")]
    InvalidSource(PathBuf),
}

/// Which stems are collected after a batch has been separated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StemScan {
    /// Each batch separates into its own folder and only that folder is collected.
    #[default]
    Batch,
    /// Every batch separates into one folder per source, which is collected in full
    /// after each batch. Stems left over from an earlier batch are visited again.
    Accumulated,
}

/// Where a source is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Decoded,
    Sliced,
    Separating(usize),
    Collecting(usize),
    Tagging(usize),
    Committed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Decoded => f.write_str("decoded"),
            Stage::Sliced => f.write_str("sliced"),
            Stage::Separating(batch) => write!(f, "batch {} separating", batch),
            Stage::Collecting(batch) => write!(f, "batch {} collecting", batch),
            Stage::Tagging(batch) => write!(f, "batch {} tagging", batch),
            Stage::Committed => f.write_str("committed"),
        }
    }
}

fn enter(source: &str, stage: Stage) {
    debug!(source, stage = %stage, "Pipeline stage");
}

/// Runs the extraction pipeline over every source in the input folder.
pub struct Extractor {
    settings: Settings,
    analyzer: Analyzer,
    slicer: TransientSlicer,
    library: Library,
}

impl Extractor {
    pub fn new(settings: Settings) -> Extractor {
        Extractor {
            analyzer: Analyzer::new(settings.quiet_threshold_db),
            slicer: TransientSlicer::new(settings.sample_rate, settings.hop_length),
            library: Library::new(&settings.library_root),
            settings,
        }
    }

    /// The source files in the input folder, sorted by name.
    pub fn sources(&self) -> Result<Vec<PathBuf>, PipelineError> {
        let folder = &self.settings.input_folder;
        let io_error = |source| PipelineError::Io {
            path: folder.clone(),
            source,
        };

        let mut sources = Vec::new();
        for entry in fs::read_dir(folder).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.is_file() && self.settings.is_source(&path) {
                sources.push(path);
            }
        }
        sources.sort();
        Ok(sources)
    }

    /// Processes every source. A source that fails is logged, kept and counted, and the
    /// run moves on to the next one. The working folders are emptied at the end.
    pub fn run(
        &self,
        session: &mut SeparationSession,
    ) -> Result<ExtractionReport, PipelineError> {
        self.library.create_dirs()?;
        let sources = self.sources()?;
        info!(
            folder = ?self.settings.input_folder,
            sources = sources.len(),
            "Starting extraction"
        );

        let mut report = ExtractionReport::default();
        let mut tagger = Tagger::new(&self.library, &self.analyzer);
        for source in sources {
            let span = span!(Level::INFO, "extract source", source = ?source);
            let _enter = span.enter();

            match self.process_source(&source, session, &mut tagger, &mut report) {
                Ok(()) => {
                    report.sources_processed += 1;
                    if self.settings.delete_sources {
                        match fs::remove_file(&source) {
                            Ok(()) => debug!("Deleted source"),
                            Err(e) => warn!(err = %e, "Unable to delete source"),
                        }
                    }
                }
                Err(e) => {
                    report.sources_failed += 1;
                    error!(err = %e, "Failed to process source");
                }
            }
        }

        clean_up(&self.settings.slices_root);
        clean_up(&self.settings.stems_root);
        info!(
            sources = report.sources_processed,
            failed = report.sources_failed,
            committed = report.stems_committed,
            separations = session.calls(),
            "Finished extraction"
        );
        Ok(report)
    }

    fn process_source(
        &self,
        source: &Path,
        session: &mut SeparationSession,
        tagger: &mut Tagger,
        report: &mut ExtractionReport,
    ) -> Result<(), PipelineError> {
        let (Some(file_name), Some(name)) = (
            source.file_name().and_then(|name| name.to_str()),
            source.file_stem().and_then(|stem| stem.to_str()),
        ) else {
            return Err(PipelineError::InvalidSource(source.to_path_buf()));
        };

        let sliced = self.slicer.load(source)?;
        enter(name, Stage::Decoded);
        enter(name, Stage::Sliced);

        let slices_dir = self.settings.slices_root.join(name);
        let stems_dir = self.settings.stems_root.join(name);
        for batch in sliced.batches(self.settings.batch_size) {
            let stem_output = match self.settings.stem_scan {
                StemScan::Batch => stems_dir.join(format!("batch{}", batch.index)),
                StemScan::Accumulated => stems_dir.clone(),
            };

            enter(name, Stage::Separating(batch.index));
            let batch_dir = slices_dir.join(format!("batch{}", batch.index));
            report.slices_exported +=
                self.separate_batch(&sliced, &batch, &batch_dir, &stem_output, session)?;

            enter(name, Stage::Collecting(batch.index));
            let stems: Vec<(StemCategory, PathBuf)> = StemCategory::ALL
                .into_iter()
                .flat_map(|category| {
                    tagger::find_stems(&stem_output, category)
                        .into_iter()
                        .map(move |path| (category, path))
                })
                .collect();
            debug!(batch = batch.index, stems = stems.len(), "Collected stems");

            enter(name, Stage::Tagging(batch.index));
            for (category, stem) in stems {
                match tagger.tag(&stem, category, file_name) {
                    Ok(outcome) => report.record(outcome),
                    Err(e) => error!(stem = ?stem, err = %e, "Failed to tag stem"),
                }
            }
        }

        enter(name, Stage::Committed);
        Ok(())
    }

    /// Exports every slice of the batch and separates it. Returns the number of slices
    /// exported. A slice past the end of the decoded audio ends the batch.
    fn separate_batch(
        &self,
        sliced: &SlicedSource,
        batch: &Batch,
        batch_dir: &Path,
        stem_output: &Path,
        session: &mut SeparationSession,
    ) -> Result<usize, PipelineError> {
        fs::create_dir_all(batch_dir).map_err(|source| PipelineError::Io {
            path: batch_dir.to_path_buf(),
            source,
        })?;

        let mut exported = 0;
        for slice in &batch.slices {
            let Some(audio) = sliced.audio(slice) else {
                break;
            };
            let path = batch_dir.join(format!("slice_{:03}.wav", slice.index));
            write_wav(&path, &audio)?;
            debug!(slice = slice.index, frames = slice.frames(), "Exported slice");
            exported += 1;
            session.separate(&path, stem_output)?;
        }
        Ok(exported)
    }
}
