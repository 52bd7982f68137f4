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
use std::{fmt::Write as _, fs, io, path::Path};

use tracing::info;

use super::PadGrid;

/// Name used when none is configured.
pub const DEFAULT_PROGRAM_NAME: &str = "Random Drum Program";

/// Writes pad grids as Akai program files: a three line header followed by four
/// tab-separated lines per non-empty pad.
pub struct ProgramWriter {
    name: String,
}

impl Default for ProgramWriter {
    fn default() -> Self {
        ProgramWriter::new(DEFAULT_PROGRAM_NAME)
    }
}

impl ProgramWriter {
    pub fn new(name: &str) -> ProgramWriter {
        ProgramWriter {
            name: name.to_string(),
        }
    }

    /// Renders the program file contents.
    pub fn render(&self, grid: &PadGrid) -> String {
        let mut program = String::new();
        program.push_str("Akai Program File\n");
        program.push_str("FileVersion\t3\n");
        // Writing to a String can't fail.
        let _ = writeln!(program, "Program\tName\t{}", self.name);
        for (pad, sample) in grid.pads() {
            let _ = writeln!(program, "Sample\t{}\t{}", pad, sample);
            let _ = writeln!(program, "Volume\t{}\t100", pad);
            let _ = writeln!(program, "Pan\t{}\t0", pad);
            let _ = writeln!(program, "Tune\t{}\t0", pad);
        }
        program
    }

    /// Writes the program file, replacing any existing file.
    pub fn write(&self, grid: &PadGrid, path: &Path) -> io::Result<()> {
        fs::write(path, self.render(grid))?;
        info!(
            path = ?path,
            pads = grid.pads().count(),
            "Wrote program file"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::library::StemCategory;

    #[test]
    fn test_empty_program() {
        assert_eq!(
            ProgramWriter::default().render(&PadGrid::new()),
            "Akai Program File\nFileVersion\t3\nProgram\tName\tRandom Drum Program\n"
        );
    }

    #[test]
    fn test_pads_in_row_major_order() {
        let mut grid = PadGrid::new();
        grid.fill_region(StemCategory::Drums, "d.wav");
        grid.fill_region(StemCategory::Other, "o.wav");

        let rendered = ProgramWriter::new("Test").render(&grid);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3 + 8 * 4);
        assert_eq!(lines[2], "Program\tName\tTest");
        assert_eq!(
            &lines[3..7],
            &["Sample\t1\to.wav", "Volume\t1\t100", "Pan\t1\t0", "Tune\t1\t0"]
        );

        let pads: Vec<&str> = lines
            .iter()
            .filter(|line| line.starts_with("Sample\t"))
            .map(|line| line.split('\t').nth(1).unwrap())
            .collect();
        assert_eq!(pads, vec!["1", "2", "5", "6", "9", "10", "13", "14"]);
    }

    #[test]
    fn test_write() {
        let tempdir = tempdir().unwrap();
        let path = tempdir.path().join("Random_Drum_Program.pgm");
        let mut grid = PadGrid::new();
        grid.fill_region(StemCategory::Vocals, "v.wav");

        ProgramWriter::default().write(&grid, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Akai Program File\n"));
        assert_eq!(contents.matches("Sample\t").count(), 4);
        assert!(contents.contains("Sample\t3\tv.wav\n"));
        assert!(contents.ends_with("Tune\t8\t0\n"));
    }
}
