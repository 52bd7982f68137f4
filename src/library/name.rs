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

//! The canonical sample file name: `KEY-TEMPO-ARTIST-TRACK-CATEGORY###.ext`.

use std::{fmt, path::Path};

use crate::camelot::CamelotKey;

use super::{LibraryError, StemCategory};

/// Token used when an artist or track name can't be determined.
pub const UNKNOWN_TOKEN: &str = "Unknown";

/// Minimum number of digits in the sequence id.
const ID_DIGITS: usize = 3;

/// The decoded form of a library file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampleName {
    pub key: CamelotKey,
    pub tempo: u32,
    pub artist: String,
    pub track: String,
    pub category: StemCategory,
    pub id: u32,
    pub extension: String,
}

impl SampleName {
    /// Parses the file name component of the path.
    pub fn parse(path: &Path) -> Result<SampleName, LibraryError> {
        let malformed = |reason: &str| LibraryError::Malformed {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| malformed("file name is not valid UTF-8"))?;
        let (stem, extension) = file_name
            .rsplit_once('.')
            .filter(|(stem, extension)| !stem.is_empty() && !extension.is_empty())
            .ok_or_else(|| malformed("missing file extension"))?;

        let fields: Vec<&str> = stem.split('-').collect();
        let [key, tempo, artist, track, last] = fields[..] else {
            return Err(malformed(&format!(
                "expected 5 fields separated by '-', found {}",
                fields.len()
            )));
        };

        let key: CamelotKey = key
            .parse()
            .map_err(|_| malformed(&format!("invalid key \"{}\"", key)))?;
        if tempo.is_empty() || !tempo.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed(&format!("invalid tempo \"{}\"", tempo)));
        }
        let tempo: u32 = tempo
            .parse()
            .map_err(|_| malformed(&format!("invalid tempo \"{}\"", tempo)))?;
        if artist.is_empty() || track.is_empty() {
            return Err(malformed("empty artist or track"));
        }

        let split = last
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| malformed(&format!("missing sequence id in \"{}\"", last)))?;
        let (category, id) = last.split_at(split);
        let category: StemCategory = category.parse().map_err(|e: String| malformed(&e))?;
        if id.len() < ID_DIGITS || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed(&format!("invalid sequence id \"{}\"", id)));
        }
        let id: u32 = id
            .parse()
            .map_err(|_| malformed(&format!("invalid sequence id \"{}\"", id)))?;

        Ok(SampleName {
            key,
            tempo,
            artist: artist.to_string(),
            track: track.to_string(),
            category,
            id,
            extension: extension.to_string(),
        })
    }

    /// The file name this sample is stored under.
    pub fn file_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SampleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{}{:03}.{}",
            self.key, self.tempo, self.artist, self.track, self.category, self.id, self.extension
        )
    }
}

/// Makes a name safe to use as a single field: drops field separators and path
/// separators, and falls back to `Unknown` if nothing is left.
pub fn sanitize_token(token: &str) -> String {
    let cleaned: String = token
        .chars()
        .filter(|c| !matches!(c, '-' | '/' | '\\') && !c.is_whitespace() && !c.is_control())
        .collect();
    if cleaned.is_empty() {
        UNKNOWN_TOKEN.to_string()
    } else {
        cleaned
    }
}

/// Derives the artist and track tokens from a source file name of the form
/// `... - Artist Name - Track Title.ext`. The artist is the first word of the second
/// component and the track is the first word, cut at the first `.`, of the last.
pub fn artist_and_track(source_file_name: &str) -> (String, String) {
    let parts: Vec<&str> = source_file_name.split(" - ").collect();
    if parts.len() < 3 {
        return (UNKNOWN_TOKEN.to_string(), UNKNOWN_TOKEN.to_string());
    }

    let first_word = |s: &str| s.split(' ').next().unwrap_or_default().to_string();
    let artist = first_word(parts[1]);
    let track = first_word(parts[parts.len() - 1]);
    let track = track.split('.').next().unwrap_or_default().to_string();
    (sanitize_token(&artist), sanitize_token(&track))
}
