//! Working-tree enumeration and wiping
//!
//! Everything here treats the metadata directory at the root as invisible.

use crate::error::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Name of the metadata directory at the working-tree root
pub const METADATA_DIR: &str = ".lumi";

/// Files and directories of a working tree, relative to its root, sorted
#[derive(Debug, Clone, Default)]
pub struct WorkTree {
    pub files: Vec<PathBuf>,
    pub directories: Vec<PathBuf>,
}

/// Check if a path (relative to the root) is inside the metadata directory
pub fn should_ignore(relative: &Path) -> bool {
    relative.starts_with(METADATA_DIR)
}

fn is_metadata(entry: &DirEntry) -> bool {
    entry.depth() == 1 && entry.file_name() == METADATA_DIR
}

/// Walk the working tree and collect every regular file and directory
///
/// Symlinks and other special files are skipped.
pub fn scan(root: &Path) -> Result<WorkTree> {
    let mut tree = WorkTree::default();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_metadata(e))
    {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
            .to_path_buf();

        let file_type = entry.file_type();
        if file_type.is_dir() {
            tree.directories.push(relative);
        } else if file_type.is_file() {
            tree.files.push(relative);
        } else {
            tracing::debug!("Skipping non-regular file {}", relative.display());
        }
    }

    Ok(tree)
}

pub fn enumerate_files(root: &Path) -> Result<Vec<PathBuf>> {
    Ok(scan(root)?.files)
}

pub fn enumerate_directories(root: &Path) -> Result<Vec<PathBuf>> {
    Ok(scan(root)?.directories)
}

/// Delete every file and directory of the working tree except the metadata
/// directory; returns the number of top-level entries removed
pub fn wipe(root: &Path) -> Result<usize> {
    let mut removed = 0;

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_name() == METADATA_DIR {
            continue;
        }

        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
        removed += 1;
    }

    tracing::debug!("Wiped {} top-level entries from {}", removed, root.display());
    Ok(removed)
}
