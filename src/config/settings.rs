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

use config::{Config, Environment, File, Map};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::library::{MalformedPolicy, ScanOptions, TempoRule};
use crate::pipeline::StemScan;

use super::error::ConfigError;

/// Prefix of the environment variables that override settings, e.g.
/// `STEMDECK_BATCH_SIZE=10` or `STEMDECK_SEPARATOR__PROGRAM=/opt/spleeter`.
const ENV_PREFIX: &str = "STEMDECK";

/// Which separation engine to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparatorEngine {
    /// The spleeter command line tool.
    #[default]
    Spleeter,
    /// Copies the input into every stem. Useful for trying out the pipeline without a
    /// separation engine installed.
    Mock,
}

/// How to invoke the separation engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SeparatorSettings {
    pub engine: SeparatorEngine,
    pub program: String,
    pub model: String,
    pub codec: String,
    pub bitrate: String,
}

impl Default for SeparatorSettings {
    fn default() -> Self {
        SeparatorSettings {
            engine: SeparatorEngine::Spleeter,
            program: "spleeter".to_string(),
            model: "spleeter:4stems".to_string(),
            codec: "wav".to_string(),
            bitrate: "1411k".to_string(),
        }
    }
}

/// All settings for a run. Every field has a default, so an empty config file is valid.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the sample library. Holds one folder per stem category.
    pub library_root: PathBuf,

    /// Folder the extraction pipeline reads sources from.
    pub input_folder: PathBuf,

    /// Working tree for exported slices.
    pub slices_root: PathBuf,

    /// Working tree for separated stems.
    pub stems_root: PathBuf,

    /// Sample rate sources are resampled to before slicing.
    pub sample_rate: u32,

    /// STFT hop length in samples.
    pub hop_length: usize,

    /// Number of slices separated before their stems are collected.
    pub batch_size: usize,

    /// Stems quieter than this, in dBFS, are discarded.
    pub quiet_threshold_db: f32,

    pub tempo_window: u32,
    pub tempo_epsilon: f64,

    pub malformed_entries: MalformedPolicy,
    pub stem_scan: StemScan,

    /// Extensions (case-insensitive, without the dot) of the files treated as sources.
    pub source_extensions: Vec<String>,

    /// Delete each source once it has been processed successfully.
    pub delete_sources: bool,

    pub separator: SeparatorSettings,

    pub program_name: String,
    pub program_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            library_root: PathBuf::from("samples"),
            input_folder: PathBuf::from("input_flac_files"),
            slices_root: PathBuf::from("output_slices"),
            stems_root: PathBuf::from("output_stems"),
            sample_rate: 44100,
            hop_length: 512,
            batch_size: 5,
            quiet_threshold_db: -40.0,
            tempo_window: 10,
            tempo_epsilon: 0.0,
            malformed_entries: MalformedPolicy::Abort,
            stem_scan: StemScan::Batch,
            source_extensions: vec!["flac".to_string()],
            delete_sources: true,
            separator: SeparatorSettings::default(),
            program_name: "Random Drum Program".to_string(),
            program_file: PathBuf::from("Random_Drum_Program.pgm"),
        }
    }
}

impl Settings {
    /// Loads the settings: built-in defaults, then the optional YAML file, then
    /// `STEMDECK_` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
        Settings::load_with_env(path, None)
    }

    /// Loads the settings with the environment taken from `env` instead of the process
    /// environment when given.
    pub(crate) fn load_with_env(
        path: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);
        if let Some(path) = path {
            debug!(path = ?path, "Loading config file");
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("source_extensions")
                .source(env),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects settings the pipeline can't run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str| {
            Err(ConfigError::Invalid(format!(
                "{} must be greater than zero",
                field
            )))
        };
        if self.batch_size == 0 {
            return invalid("batch_size");
        }
        if self.hop_length == 0 {
            return invalid("hop_length");
        }
        if self.sample_rate == 0 {
            return invalid("sample_rate");
        }
        if self.tempo_epsilon < 0.0 || !self.tempo_epsilon.is_finite() {
            return Err(ConfigError::Invalid(
                "tempo_epsilon must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }

    /// Library scan options derived from the tempo and malformed entry settings.
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            tempo: TempoRule {
                window: self.tempo_window,
                epsilon: self.tempo_epsilon,
            },
            malformed: self.malformed_entries,
        }
    }

    /// Whether the path has one of the configured source extensions.
    pub fn is_source(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.source_extensions
                    .iter()
                    .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }

    /// The settings rendered as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yml::to_string(self)?)
    }
}
