//! Time snapshot discovery
//!
//! A solver writes one directory per saved time under the case root
//! (`0/`, `0.5/`, `10/`, ...). Anything else in the root (`constant/`,
//! `system/`, `postProcessing/`, files) is not a snapshot.

use crate::error::PostError;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One saved simulation time
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Directory name exactly as written by the solver
    pub label: String,
    /// Parsed time value in seconds, used for ordering
    pub time: f64,
    /// Full path of the snapshot directory
    pub path: PathBuf,
}

impl Snapshot {
    /// Build a snapshot from a directory name, if the name is a time.
    pub fn from_dir_name(case_root: &Path, name: &str) -> Option<Self> {
        if !is_time_directory_name(name) {
            return None;
        }
        let time = name.parse::<f64>().ok()?;
        Some(Self {
            label: name.to_string(),
            time,
            path: case_root.join(name),
        })
    }

    /// Ascending by time, ties broken by label.
    pub fn cmp_by_time(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.label.cmp(&other.label))
    }
}

/// Whether a directory name denotes a simulation time.
///
/// The name must be non-empty ASCII digits once at most one `.` is removed.
/// Signs, exponents, letters and a second dot disqualify it.
pub fn is_time_directory_name(name: &str) -> bool {
    let mut dots = 0;
    let mut digits = 0;
    for c in name.chars() {
        match c {
            '.' => dots += 1,
            c if c.is_ascii_digit() => digits += 1,
            _ => return false,
        }
    }
    dots <= 1 && digits > 0
}

/// Scan `case_root` for time directories, sorted ascending by time.
///
/// An empty result means the case holds no snapshots; callers treat that as a
/// reportable condition rather than an error.
///
/// # Errors
/// Returns [`PostError::Configuration`] if the case root cannot be listed.
pub fn discover_snapshots(case_root: &Path) -> Result<Vec<Snapshot>, PostError> {
    let entries = fs::read_dir(case_root)
        .map_err(|e| PostError::configuration(case_root, e.to_string()))?;

    let mut snapshots = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PostError::configuration(case_root, e.to_string()))?;
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        // Follows symlinks so linked time directories still count
        if !entry.path().is_dir() {
            continue;
        }
        if let Some(snapshot) = Snapshot::from_dir_name(case_root, &name) {
            debug!("Found snapshot t={} ({})", snapshot.time, snapshot.label);
            snapshots.push(snapshot);
        }
    }

    snapshots.sort_by(Snapshot::cmp_by_time);
    Ok(snapshots)
}
