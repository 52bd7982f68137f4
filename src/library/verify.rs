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

//! Checks that every file in the library follows the naming contract.

use std::collections::{BTreeMap, HashMap};

use super::{scanner::entries, Library, LibraryError, SampleName, StemCategory};

/// Severity level for a verification issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A single verification issue found during checking.
#[derive(Debug, Clone)]
pub struct Issue {
    pub severity: Severity,
    pub kind: &'static str,
    pub category: StemCategory,
    pub file_name: String,
    pub message: String,
}

/// Result of verifying the library.
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    pub issues: Vec<Issue>,
    pub files_checked: usize,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// Merge another report into this one.
    pub fn merge(&mut self, other: VerificationReport) {
        self.issues.extend(other.issues);
        self.files_checked += other.files_checked;
    }
}

/// Checks one category folder: names must parse and must name the folder's category.
pub fn check_category(
    library: &Library,
    category: StemCategory,
) -> Result<VerificationReport, LibraryError> {
    let mut report = VerificationReport::default();
    let mut identities: HashMap<(String, String, u32), String> = HashMap::new();

    for path in entries(&library.category_dir(category))? {
        report.files_checked += 1;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let issue = |severity, kind, message| Issue {
            severity,
            kind,
            category,
            file_name: file_name.clone(),
            message,
        };

        let name = match SampleName::parse(&path) {
            Ok(name) => name,
            Err(LibraryError::Malformed { reason, .. }) => {
                report.issues.push(issue(Severity::Error, "malformed", reason));
                continue;
            }
            Err(e) => return Err(e),
        };

        if name.file_name() != file_name {
            report.issues.push(issue(
                Severity::Warning,
                "non-canonical",
                format!("canonical spelling is {}", name.file_name()),
            ));
        }

        if name.category != category {
            report.issues.push(issue(
                Severity::Error,
                "wrong-category",
                format!(
                    "{} sample is stored in the {} folder",
                    name.category, category
                ),
            ));
        }

        let identity = (name.artist.clone(), name.track.clone(), name.id);
        if let Some(existing) = identities.get(&identity) {
            report.issues.push(issue(
                Severity::Warning,
                "duplicate",
                format!("same artist, track and id as {}", existing),
            ));
        } else {
            identities.insert(identity, file_name.clone());
        }
    }
    Ok(report)
}

/// Checks every category folder of the library.
pub fn check_library(library: &Library) -> Result<VerificationReport, LibraryError> {
    let mut report = VerificationReport::default();
    for category in StemCategory::ALL {
        report.merge(check_category(library, category)?);
    }
    Ok(report)
}

/// Prints a verification report grouped by category.
pub fn print_report(report: &VerificationReport) {
    if report.is_clean() {
        println!(
            "\u{2705} All {} sample(s) passed verification.",
            report.files_checked
        );
        return;
    }

    let mut by_category: BTreeMap<StemCategory, Vec<&Issue>> = BTreeMap::new();
    for issue in &report.issues {
        by_category.entry(issue.category).or_default().push(issue);
    }

    for (category, issues) in &by_category {
        let has_errors = issues.iter().any(|i| i.severity == Severity::Error);
        let icon = if has_errors {
            "\u{274c}"
        } else {
            "\u{26a0}\u{fe0f} "
        };
        println!("{} {}", icon, category);
        for issue in issues {
            let severity_icon = match issue.severity {
                Severity::Warning => "\u{26a0}\u{fe0f} ",
                Severity::Error => "\u{274c}",
            };
            println!(
                "   {} [{}] {}: {}",
                severity_icon, issue.kind, issue.file_name, issue.message
            );
        }
    }

    println!(
        "\nSummary: {} issue(s) found in {} sample(s) across {} categor{}.",
        report.issues.len(),
        report.files_checked,
        by_category.len(),
        if by_category.len() == 1 { "y" } else { "ies" }
    );
}
