use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::path_map::PathMapper;
use crate::error::{Error, Result};

/// One source-to-destination conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Files left out of the task list, by reason. None of these are errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipCounts {
    /// Extension not accepted by the path mapper
    pub unsupported: usize,
    /// Destination already present and overwrite disabled
    pub existing: usize,
    /// Another source already maps to the same destination
    pub collisions: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.unsupported + self.existing + self.collisions
    }
}

#[derive(Debug, Clone, Default)]
pub struct Enumeration {
    pub tasks: Vec<Task>,
    pub skipped: SkipCounts,
    /// Directories mirrored under the destination, root excluded
    pub directories: usize,
}

/// Check both roots and create the destination root if needed.
///
/// Returns the destination as the walk would reach it when it lies inside
/// the source tree, so the walk can leave it out.
fn prepare_roots(source_root: &Path, destination_root: &Path) -> Result<Option<PathBuf>> {
    if !source_root.is_dir() {
        return Err(Error::NotADirectory {
            path: source_root.to_path_buf(),
        });
    }
    if destination_root.exists() && !destination_root.is_dir() {
        return Err(Error::DestinationConflict {
            path: destination_root.to_path_buf(),
        });
    }

    let source = source_root.canonicalize()?;
    if destination_root.exists() && destination_root.canonicalize()? == source {
        return Err(Error::SameRoots {
            path: destination_root.to_path_buf(),
        });
    }
    fs::create_dir_all(destination_root)?;

    let nested = destination_root
        .canonicalize()?
        .strip_prefix(&source)
        .ok()
        .map(|relative| source_root.join(relative));
    if let Some(nested) = &nested {
        warn!(
            "Destination {:?} is inside the source tree; it will not be walked",
            nested
        );
    }
    Ok(nested)
}

/// Walk `source_root`, mirror its directories under `destination_root`, and
/// collect the files that still need processing.
///
/// Every directory, empty or not, exists at the destination when this
/// returns. The walk is sorted by file name, so the task order is stable.
/// A destination nested inside the source tree is never walked.
pub fn enumerate_tasks(
    source_root: &Path,
    destination_root: &Path,
    mapper: &PathMapper,
    overwrite: bool,
) -> Result<Enumeration> {
    let excluded = prepare_roots(source_root, destination_root)?;

    let mut enumeration = Enumeration::default();
    let mut claimed: HashSet<PathBuf> = HashSet::new();

    let walk = WalkDir::new(source_root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| excluded.as_deref() != Some(entry.path()));
    for entry in walk {
        let entry = entry.map_err(|e| match e.into_io_error() {
            Some(io) => Error::Io(io),
            None => Error::Io(std::io::Error::other("filesystem loop detected")),
        })?;
        let relative = match entry.path().strip_prefix(source_root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => continue,
        };

        if entry.file_type().is_dir() {
            fs::create_dir_all(destination_root.join(&relative))?;
            enumeration.directories += 1;
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(mapped) = mapper.map(&relative) else {
            debug!("Skipping unsupported file: {:?}", entry.path());
            enumeration.skipped.unsupported += 1;
            continue;
        };
        let destination = destination_root.join(mapped);

        if !claimed.insert(destination.clone()) {
            warn!(
                "Skipping {:?}: destination {:?} already claimed by another source",
                entry.path(),
                destination
            );
            enumeration.skipped.collisions += 1;
            continue;
        }
        if !overwrite && destination.exists() {
            debug!("Skipping existing output: {:?}", destination);
            enumeration.skipped.existing += 1;
            continue;
        }

        enumeration.tasks.push(Task {
            source: entry.into_path(),
            destination,
        });
    }

    info!(
        "Enumerated {} task(s), mirrored {} director(ies), skipped {} file(s)",
        enumeration.tasks.len(),
        enumeration.directories,
        enumeration.skipped.total()
    );
    Ok(enumeration)
}
