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
use std::{fs, path::Path};

use tracing::{debug, warn};

/// Deletes everything inside the folder, leaving the folder itself. Failures are logged
/// and skipped. Returns the number of entries removed.
pub fn clean_up(folder: &Path) -> usize {
    let entries = match fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(folder = ?folder, err = %e, "Nothing to clean up");
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                warn!(folder = ?folder, err = %e, "Failed to read entry");
                continue;
            }
        };
        let result = if path.is_dir() && !path.is_symlink() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        match result {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = ?path, err = %e, "Failed to delete"),
        }
    }
    debug!(folder = ?folder, removed, "Cleaned up working folder");
    removed
}
