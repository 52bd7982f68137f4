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
use rand::{seq::SliceRandom, Rng};
use tracing::info;

use crate::camelot::{matching_keys, CamelotKey};
use crate::library::{Library, LibraryError, ScanOptions, StemCategory};

use super::PadGrid;

/// Fills a pad grid with one randomly chosen compatible sample per category.
pub struct PadAssembler<'a> {
    library: &'a Library,
    options: ScanOptions,
}

impl<'a> PadAssembler<'a> {
    pub fn new(library: &'a Library, options: ScanOptions) -> PadAssembler<'a> {
        PadAssembler { library, options }
    }

    /// Assembles a grid for the target key and tempo. Compatible samples are those whose
    /// key is a Camelot neighbor of `key` and whose tempo matches `tempo`. Categories
    /// without a compatible sample leave their region empty.
    pub fn assemble<R: Rng + ?Sized>(
        &self,
        key: CamelotKey,
        tempo: u32,
        rng: &mut R,
    ) -> Result<PadGrid, LibraryError> {
        let keys = matching_keys(key);
        let mut grid = PadGrid::new();

        for category in StemCategory::ALL {
            let matches = self.library.scan(category, &keys, tempo, &self.options)?;
            match matches.choose(rng) {
                Some(sample) => {
                    info!(
                        category = %category,
                        sample = %sample,
                        candidates = matches.len(),
                        "Picked sample"
                    );
                    grid.fill_region(category, sample);
                }
                None => info!(
                    category = %category,
                    folder = ?self.library.category_dir(category),
                    "No matching files"
                ),
            }
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rand::{rngs::StdRng, SeedableRng};
    use tempfile::tempdir;

    use super::*;
    use crate::library::MalformedPolicy;
    use crate::pad::ProgramWriter;

    fn library_with(files: &[(StemCategory, &str)]) -> (tempfile::TempDir, Library) {
        let tempdir = tempdir().unwrap();
        let library = Library::new(tempdir.path());
        library.create_dirs().unwrap();
        for (category, name) in files {
            fs::write(library.category_dir(*category).join(name), b"").unwrap();
        }
        (tempdir, library)
    }

    #[test]
    fn test_fills_matching_regions_only() {
        let (_tempdir, library) = library_with(&[
            (StemCategory::Drums, "3A-115-Art-Trk-drums000.wav"),
            (StemCategory::Bass, "5A-240-Art2-Trk2-bass000.wav"),
            // Same key as the target, which is not one of its neighbors.
            (StemCategory::Other, "4A-120-Art-Trk-other000.wav"),
        ]);
        let assembler = PadAssembler::new(&library, ScanOptions::default());
        let grid = assembler
            .assemble("4A".parse().unwrap(), 120, &mut StdRng::seed_from_u64(1))
            .unwrap();

        assert_eq!(
            grid.region_sample(StemCategory::Drums),
            Some("3A-115-Art-Trk-drums000.wav")
        );
        assert_eq!(
            grid.region_sample(StemCategory::Bass),
            Some("5A-240-Art2-Trk2-bass000.wav")
        );
        assert_eq!(grid.region_sample(StemCategory::Other), None);
        assert_eq!(grid.region_sample(StemCategory::Vocals), None);
        assert_eq!(grid.pads().count(), 8);
    }

    #[test]
    fn test_assembled_program() {
        let (_tempdir, library) = library_with(&[
            (StemCategory::Drums, "3a-115-Art-Trk-drums000.wav"),
            (StemCategory::Bass, "5A-240-Art2-Trk2-bass000.wav"),
            (StemCategory::Other, "4A-120-Art-Trk-other000.wav"),
        ]);
        let grid = PadAssembler::new(&library, ScanOptions::default())
            .assemble("4A".parse().unwrap(), 120, &mut StdRng::seed_from_u64(7))
            .unwrap();
        let program = ProgramWriter::default().render(&grid);

        let samples: Vec<(&str, &str)> = program
            .lines()
            .filter_map(|line| line.strip_prefix("Sample\t"))
            .filter_map(|rest| rest.split_once('\t'))
            .collect();
        assert_eq!(samples.len(), 8);

        let mut paths: Vec<&str> = samples.iter().map(|(_, path)| *path).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(
            paths,
            vec!["3a-115-Art-Trk-drums000.wav", "5A-240-Art2-Trk2-bass000.wav"]
        );
        assert!(library
            .category_dir(StemCategory::Drums)
            .join(paths[0])
            .is_file());

        for pad in ["1", "2", "5", "6", "3", "4", "7", "8"] {
            assert!(samples.iter().all(|(number, _)| *number != pad));
        }
    }

    #[test]
    fn test_regions_hold_one_sample() {
        let (_tempdir, library) = library_with(&[
            (StemCategory::Drums, "3A-120-A-B-drums000.wav"),
            (StemCategory::Drums, "3A-120-A-B-drums001.wav"),
            (StemCategory::Drums, "5A-121-A-B-drums002.wav"),
            (StemCategory::Vocals, "4B-60-A-B-vocals000.wav"),
        ]);
        let assembler = PadAssembler::new(&library, ScanOptions::default());
        for seed in 0..20 {
            let grid = assembler
                .assemble("4A".parse().unwrap(), 120, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            for category in StemCategory::ALL {
                let cells: Vec<Option<&str>> = crate::pad::grid::region(category)
                    .iter()
                    .map(|(row, column)| grid.get(*row, *column))
                    .collect();
                assert!(cells.iter().all(|cell| *cell == cells[0]));
            }
            assert!(grid.region_sample(StemCategory::Drums).is_some());
        }
    }

    #[test]
    fn test_seeded_choice_is_reproducible() {
        let (_tempdir, library) = library_with(&[
            (StemCategory::Drums, "3A-120-A-B-drums000.wav"),
            (StemCategory::Drums, "3A-120-A-B-drums001.wav"),
            (StemCategory::Drums, "3A-120-A-B-drums002.wav"),
            (StemCategory::Drums, "3A-120-A-B-drums003.wav"),
        ]);
        let assembler = PadAssembler::new(&library, ScanOptions::default());
        let key = "4A".parse().unwrap();
        let first = assembler
            .assemble(key, 120, &mut StdRng::seed_from_u64(42))
            .unwrap();
        let second = assembler
            .assemble(key, 120, &mut StdRng::seed_from_u64(42))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_library() {
        let tempdir = tempdir().unwrap();
        let library = Library::new(tempdir.path().join("samples"));
        let grid = PadAssembler::new(&library, ScanOptions::default())
            .assemble("1A".parse().unwrap(), 90, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert!(grid.is_empty());
    }

    #[test]
    fn test_malformed_entry_aborts() {
        let (_tempdir, library) = library_with(&[(StemCategory::Bass, "bad.wav")]);
        let key = "4A".parse().unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let result = PadAssembler::new(&library, ScanOptions::default()).assemble(key, 120, &mut rng);
        assert!(matches!(result, Err(LibraryError::Malformed { .. })));

        let options = ScanOptions {
            malformed: MalformedPolicy::Skip,
            ..Default::default()
        };
        let grid = PadAssembler::new(&library, options)
            .assemble(key, 120, &mut rng)
            .unwrap();
        assert!(grid.is_empty());
    }
}
