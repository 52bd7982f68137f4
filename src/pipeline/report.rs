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
use std::fmt;

use crate::library::SampleName;

use super::tagger::TagOutcome;

/// What an extraction run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub sources_processed: usize,
    pub sources_failed: usize,
    pub slices_exported: usize,
    pub stems_committed: usize,
    /// Stems that decoded to no audio.
    pub stems_empty: usize,
    /// Stems that couldn't be decoded at all.
    pub stems_undecodable: usize,
    pub stems_quiet: usize,
    pub stems_unknown_key: usize,
    /// Names of the committed samples, in commit order.
    pub committed: Vec<SampleName>,
}

impl ExtractionReport {
    pub fn record(&mut self, outcome: TagOutcome) {
        match outcome {
            TagOutcome::Committed(name) => {
                self.stems_committed += 1;
                self.committed.push(name);
            }
            TagOutcome::Empty => self.stems_empty += 1,
            TagOutcome::Undecodable => self.stems_undecodable += 1,
            TagOutcome::Quiet => self.stems_quiet += 1,
            TagOutcome::UnknownKey => self.stems_unknown_key += 1,
        }
    }

    pub fn stems_rejected(&self) -> usize {
        self.stems_empty + self.stems_undecodable + self.stems_quiet + self.stems_unknown_key
    }
}

impl fmt::Display for ExtractionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Sources: {} processed, {} failed",
            self.sources_processed, self.sources_failed
        )?;
        writeln!(f, "Slices exported: {}", self.slices_exported)?;
        writeln!(f, "Stems committed: {}", self.stems_committed)?;
        for name in &self.committed {
            writeln!(f, "  {}", name)?;
        }
        write!(
            f,
            "Stems rejected: {} (empty: {}, undecodable: {}, quiet: {}, unknown key: {})",
            self.stems_rejected(),
            self.stems_empty,
            self.stems_undecodable,
            self.stems_quiet,
            self.stems_unknown_key
        )
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_record() {
        let mut report = ExtractionReport::default();
        let name = SampleName::parse(Path::new("8B-120-A-B-drums000.wav")).unwrap();
        report.record(TagOutcome::Committed(name.clone()));
        report.record(TagOutcome::Quiet);
        report.record(TagOutcome::Quiet);
        report.record(TagOutcome::UnknownKey);
        report.record(TagOutcome::Empty);

        assert_eq!(report.stems_committed, 1);
        assert_eq!(report.committed, vec![name]);
        assert_eq!(report.stems_quiet, 2);
        assert_eq!(report.stems_rejected(), 4);
        let text = report.to_string();
        assert!(text.contains("Stems committed: 1\n  8B-120-A-B-drums000.wav\n"));
        assert!(text.ends_with(
            "Stems rejected: 4 (empty: 1, undecodable: 0, quiet: 2, unknown key: 1)"
        ));
    }
}
