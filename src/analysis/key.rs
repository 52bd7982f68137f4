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

//! Camelot keys from stratum-dsp's key detection.

use std::fmt;

use stratum_dsp::Key;

use crate::camelot::{CamelotKey, Letter};

/// Camelot numbers of the major keys, indexed by pitch class starting at C.
const MAJOR_CAMELOT: [u8; 12] = [8, 3, 10, 5, 12, 7, 2, 9, 4, 11, 6, 1];

/// Camelot numbers of the minor keys, indexed by pitch class starting at C.
const MINOR_CAMELOT: [u8; 12] = [5, 12, 7, 2, 9, 4, 11, 6, 1, 8, 3, 10];

/// The result of key detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEstimate {
    Known(CamelotKey),
    /// No key could be determined. Rendered as the `0A` sentinel, which is not a valid
    /// Camelot key.
    Unknown,
}

impl KeyEstimate {
    /// The detected key, if any.
    pub fn key(&self) -> Option<CamelotKey> {
        match self {
            KeyEstimate::Known(key) => Some(*key),
            KeyEstimate::Unknown => None,
        }
    }
}

impl fmt::Display for KeyEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEstimate::Known(key) => write!(f, "{}", key),
            KeyEstimate::Unknown => f.write_str("0A"),
        }
    }
}

/// Converts a detected key. stratum-dsp reports C major with zero confidence when it
/// could not detect anything, so a key without confidence is unknown.
pub fn from_detected(key: &Key, confidence: f32) -> KeyEstimate {
    if !confidence.is_finite() || confidence <= 0.0 {
        return KeyEstimate::Unknown;
    }
    match key {
        Key::Major(pitch) => to_camelot(Letter::B, *pitch as usize),
        Key::Minor(pitch) => to_camelot(Letter::A, *pitch as usize),
    }
}

/// Maps a letter and pitch class to its Camelot key.
fn to_camelot(letter: Letter, pitch_class: usize) -> KeyEstimate {
    let table = match letter {
        Letter::B => &MAJOR_CAMELOT,
        Letter::A => &MINOR_CAMELOT,
    };
    table
        .get(pitch_class)
        .and_then(|number| CamelotKey::new(*number, letter).ok())
        .map(KeyEstimate::Known)
        .unwrap_or(KeyEstimate::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> KeyEstimate {
        KeyEstimate::Known(s.parse().unwrap())
    }

    #[test]
    fn test_camelot_mapping() {
        assert_eq!(from_detected(&Key::Major(0), 0.8), key("8B"));
        assert_eq!(from_detected(&Key::Major(9), 0.8), key("11B"));
        assert_eq!(from_detected(&Key::Minor(9), 0.8), key("8A"));
        assert_eq!(from_detected(&Key::Minor(0), 0.8), key("5A"));
        assert_eq!(from_detected(&Key::Minor(11), 0.8), key("10A"));
    }

    #[test]
    fn test_every_pitch_class_maps() {
        for pitch in 0..12 {
            assert_ne!(from_detected(&Key::Major(pitch), 0.5), KeyEstimate::Unknown);
            assert_ne!(from_detected(&Key::Minor(pitch), 0.5), KeyEstimate::Unknown);
        }
        assert_eq!(from_detected(&Key::Major(12), 0.5), KeyEstimate::Unknown);
    }

    #[test]
    fn test_no_confidence_is_unknown() {
        assert_eq!(from_detected(&Key::Major(0), 0.0), KeyEstimate::Unknown);
        assert_eq!(from_detected(&Key::Minor(9), f32::NAN), KeyEstimate::Unknown);
    }

    #[test]
    fn test_sentinel_display() {
        assert_eq!(KeyEstimate::Unknown.to_string(), "0A");
        assert_eq!(key("12B").to_string(), "12B");
        assert_eq!(KeyEstimate::Unknown.key(), None);
    }
}
