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

//! The sample library: one folder per stem category holding canonically named files.

pub mod name;
pub mod scanner;
pub mod verify;

use std::{
    fmt, fs, io,
    path::PathBuf,
    str::FromStr,
};

pub use name::SampleName;
pub use scanner::{scan, MalformedPolicy, ScanOptions, TempoRule};

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("malformed library entry {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One of the four stems produced by source separation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StemCategory {
    Drums,
    Bass,
    Other,
    Vocals,
}

impl StemCategory {
    /// All categories, in the order pad regions are filled.
    pub const ALL: [StemCategory; 4] = [
        StemCategory::Drums,
        StemCategory::Bass,
        StemCategory::Other,
        StemCategory::Vocals,
    ];

    /// The category's name as used in folder names, stem files and sample names.
    pub fn as_str(&self) -> &'static str {
        match self {
            StemCategory::Drums => "drums",
            StemCategory::Bass => "bass",
            StemCategory::Other => "other",
            StemCategory::Vocals => "vocals",
        }
    }

    /// The file name the separator gives this stem.
    pub fn stem_file_name(&self) -> String {
        format!("{}.wav", self.as_str())
    }
}

impl fmt::Display for StemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StemCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StemCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| format!("unknown stem category \"{}\"", s))
    }
}

/// The library root and its category folders.
#[derive(Debug, Clone)]
pub struct Library {
    root: PathBuf,
}

impl Library {
    pub fn new<P: Into<PathBuf>>(root: P) -> Library {
        Library { root: root.into() }
    }

    /// The folder holding samples of the given category.
    pub fn category_dir(&self, category: StemCategory) -> PathBuf {
        self.root.join(category.as_str())
    }

    /// Creates the category folders if they don't exist.
    pub fn create_dirs(&self) -> Result<(), LibraryError> {
        for category in StemCategory::ALL {
            let dir = self.category_dir(category);
            fs::create_dir_all(&dir).map_err(|source| LibraryError::Io { path: dir, source })?;
        }
        Ok(())
    }

    /// Lists the compatible samples of one category.
    pub fn scan(
        &self,
        category: StemCategory,
        compatible_keys: &[crate::camelot::CamelotKey],
        target_tempo: u32,
        options: &ScanOptions,
    ) -> Result<Vec<String>, LibraryError> {
        scan(
            &self.category_dir(category),
            compatible_keys,
            target_tempo,
            options,
        )
    }
}
