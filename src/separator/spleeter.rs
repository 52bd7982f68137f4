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
    ffi::OsString,
    fs,
    path::Path,
    process::Command,
};

use tracing::{debug, span, Level};

use crate::config::SeparatorSettings;

use super::{expected_stems, SeparatorError, StemSeparator};

/// Runs the spleeter command line tool once per file.
pub struct SpleeterSeparator {
    program: String,
    model: String,
    codec: String,
    bitrate: String,
}

impl SpleeterSeparator {
    pub fn new(settings: &SeparatorSettings) -> SpleeterSeparator {
        SpleeterSeparator {
            program: settings.program.clone(),
            model: settings.model.clone(),
            codec: settings.codec.clone(),
            bitrate: settings.bitrate.clone(),
        }
    }

    /// The arguments passed to the program for one separation.
    fn args(&self, input: &Path, output_dir: &Path) -> Vec<OsString> {
        vec![
            "separate".into(),
            "-p".into(),
            self.model.clone().into(),
            "-c".into(),
            self.codec.clone().into(),
            "-b".into(),
            self.bitrate.clone().into(),
            "-o".into(),
            output_dir.into(),
            input.into(),
        ]
    }
}

impl StemSeparator for SpleeterSeparator {
    fn name(&self) -> &str {
        &self.program
    }

    fn separate(&mut self, input: &Path, output_dir: &Path) -> Result<(), SeparatorError> {
        let span = span!(Level::DEBUG, "spleeter");
        let _enter = span.enter();

        fs::create_dir_all(output_dir)?;
        let output = Command::new(&self.program)
            .args(self.args(input, output_dir))
            .output()
            .map_err(|source| SeparatorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SeparatorError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        for (_, path) in expected_stems(input, output_dir)? {
            if !path.is_file() {
                return Err(SeparatorError::MissingStem(path));
            }
        }
        debug!(input = ?input, "Separated stems");
        Ok(())
    }

    /// Nothing to release: the model lives in the child process and is freed
    /// when it exits at the end of every `separate` call.
    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn settings(program: &str) -> SeparatorSettings {
        SeparatorSettings {
            program: program.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_args() {
        let separator = SpleeterSeparator::new(&SeparatorSettings::default());
        let args = separator.args(Path::new("in/slice_000.wav"), Path::new("out"));
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert_eq!(
            args,
            vec![
                "separate",
                "-p",
                "spleeter:4stems",
                "-c",
                "wav",
                "-b",
                "1411k",
                "-o",
                "out",
                "in/slice_000.wav"
            ]
        );
    }

    #[test]
    fn test_missing_program() {
        let tempdir = tempdir().unwrap();
        let mut separator = SpleeterSeparator::new(&settings("stemdeck-no-such-program"));
        let result = separator.separate(&tempdir.path().join("a.wav"), tempdir.path());
        assert!(matches!(result, Err(SeparatorError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_program() {
        // `false` ignores its arguments and exits with 1.
        let tempdir = tempdir().unwrap();
        let mut separator = SpleeterSeparator::new(&settings("false"));
        let result = separator.separate(&tempdir.path().join("a.wav"), tempdir.path());
        assert!(matches!(result, Err(SeparatorError::Failed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_stems() {
        // `true` succeeds without writing anything.
        let tempdir = tempdir().unwrap();
        let mut separator = SpleeterSeparator::new(&settings("true"));
        let result = separator.separate(&tempdir.path().join("a.wav"), tempdir.path());
        match result {
            Err(SeparatorError::MissingStem(path)) => assert!(path.ends_with("a/drums.wav")),
            other => panic!("expected a missing stem, got {:?}", other),
        }
    }
}
