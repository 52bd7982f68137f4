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

//! The Camelot wheel.
//!
//! Twelve numbered positions on a ring, each with a minor (`A`) and a major (`B`)
//! member. Two keys are harmonically compatible when they are neighbors on the
//! ring with the same letter, or when they share a number (relative major/minor).

use std::{fmt, str::FromStr};

/// Number of positions on the wheel.
const RING_SIZE: u8 = 12;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CamelotError {
    #[error("'{0}' is not a Camelot key (expected 1A-12B)")]
    Invalid(String),
}

/// The mode half of a Camelot key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Letter {
    /// Minor keys.
    A,
    /// Major keys.
    B,
}

impl Letter {
    fn other(self) -> Letter {
        match self {
            Letter::A => Letter::B,
            Letter::B => Letter::A,
        }
    }
}

/// One of the 24 canonical Camelot keys. Only valid keys can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CamelotKey {
    number: u8,
    letter: Letter,
}

impl CamelotKey {
    /// Creates a key from its wheel position (1-12) and letter.
    pub fn new(number: u8, letter: Letter) -> Result<CamelotKey, CamelotError> {
        if !(1..=RING_SIZE).contains(&number) {
            let letter = match letter {
                Letter::A => 'A',
                Letter::B => 'B',
            };
            return Err(CamelotError::Invalid(format!("{}{}", number, letter)));
        }
        Ok(CamelotKey { number, letter })
    }

    /// All 24 keys in wheel order: 1A, 1B, 2A, ... 12B.
    #[cfg(test)]
    pub fn all() -> impl Iterator<Item = CamelotKey> {
        (1..=RING_SIZE).flat_map(|number| {
            [Letter::A, Letter::B]
                .into_iter()
                .map(move |letter| CamelotKey { number, letter })
        })
    }

    /// The same letter one step counter-clockwise.
    fn counter_clockwise(&self) -> CamelotKey {
        let number = if self.number == 1 {
            RING_SIZE
        } else {
            self.number - 1
        };
        CamelotKey {
            number,
            letter: self.letter,
        }
    }

    /// The same letter one step clockwise.
    fn clockwise(&self) -> CamelotKey {
        CamelotKey {
            number: self.number % RING_SIZE + 1,
            letter: self.letter,
        }
    }

    /// The relative major or minor.
    fn relative(&self) -> CamelotKey {
        CamelotKey {
            number: self.number,
            letter: self.letter.other(),
        }
    }
}

/// Returns the three keys that mix harmonically with the given key. The key itself
/// is not part of the result.
pub fn matching_keys(key: CamelotKey) -> [CamelotKey; 3] {
    [key.counter_clockwise(), key.relative(), key.clockwise()]
}

impl FromStr for CamelotKey {
    type Err = CamelotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CamelotError::Invalid(s.to_string());
        if !s.is_ascii() {
            return Err(invalid());
        }

        let (digits, letter) = s.split_at(s.len().saturating_sub(1));
        let letter = match letter {
            "A" | "a" => Letter::A,
            "B" | "b" => Letter::B,
            _ => return Err(invalid()),
        };
        // Reject signs and leading zeros so that only canonical spellings parse.
        if digits.is_empty()
            || digits.starts_with('0')
            || !digits.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        let number: u8 = digits.parse().map_err(|_| invalid())?;
        CamelotKey::new(number, letter).map_err(|_| invalid())
    }
}

impl fmt::Display for CamelotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self.letter {
            Letter::A => 'A',
            Letter::B => 'B',
        };
        write!(f, "{}{}", self.number, letter)
    }
}
