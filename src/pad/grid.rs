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
use crate::library::StemCategory;

pub const ROWS: usize = 4;
pub const COLUMNS: usize = 4;

/// The pad number of a cell. Pads are numbered from 1 in row-major order.
pub fn pad_number(row: usize, column: usize) -> usize {
    1 + row * COLUMNS + column
}

/// The four cells, as (row, column), that hold samples of the given category.
pub fn region(category: StemCategory) -> [(usize, usize); 4] {
    let (row, column) = match category {
        StemCategory::Other => (0, 0),
        StemCategory::Vocals => (0, 2),
        StemCategory::Drums => (2, 0),
        StemCategory::Bass => (2, 2),
    };
    [
        (row, column),
        (row, column + 1),
        (row + 1, column),
        (row + 1, column + 1),
    ]
}

/// A 4x4 grid of sample references. Cells are only ever written a whole region at a
/// time, so the four cells of a region are always equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PadGrid {
    cells: [[Option<String>; COLUMNS]; ROWS],
}

impl PadGrid {
    pub fn new() -> PadGrid {
        PadGrid::default()
    }

    /// Puts the sample into every cell of the category's region.
    pub fn fill_region(&mut self, category: StemCategory, sample: &str) {
        for (row, column) in region(category) {
            self.cells[row][column] = Some(sample.to_string());
        }
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&str> {
        self.cells.get(row)?.get(column)?.as_deref()
    }

    /// The sample assigned to the category's region, if any.
    pub fn region_sample(&self, category: StemCategory) -> Option<&str> {
        let (row, column) = region(category)[0];
        self.get(row, column)
    }

    /// The non-empty cells as (pad number, sample), in row-major order.
    pub fn pads(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells.iter().enumerate().filter_map(move |(column, cell)| {
                cell.as_deref().map(|sample| (pad_number(row, column), sample))
            })
        })
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pads().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_pad_numbers() {
        assert_eq!(pad_number(0, 0), 1);
        assert_eq!(pad_number(0, 3), 4);
        assert_eq!(pad_number(2, 1), 10);
        assert_eq!(pad_number(3, 3), 16);
    }

    #[test]
    fn test_regions_partition_the_grid() {
        let cells: HashSet<(usize, usize)> = StemCategory::ALL
            .into_iter()
            .flat_map(region)
            .collect();
        assert_eq!(cells.len(), ROWS * COLUMNS);

        assert_eq!(
            region(StemCategory::Drums),
            [(2, 0), (2, 1), (3, 0), (3, 1)]
        );
        assert_eq!(
            region(StemCategory::Vocals),
            [(0, 2), (0, 3), (1, 2), (1, 3)]
        );
    }

    #[test]
    fn test_fill_region() {
        let mut grid = PadGrid::new();
        assert!(grid.is_empty());

        grid.fill_region(StemCategory::Bass, "bass.wav");
        assert_eq!(grid.region_sample(StemCategory::Bass), Some("bass.wav"));
        assert_eq!(grid.region_sample(StemCategory::Drums), None);
        assert_eq!(
            grid.pads().collect::<Vec<_>>(),
            vec![(11, "bass.wav"), (12, "bass.wav"), (15, "bass.wav"), (16, "bass.wav")]
        );
        assert_eq!(grid.get(4, 0), None);
    }
}
