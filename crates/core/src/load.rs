//! Restore a package into the working tree

use crate::blob::FilebaseReader;
use crate::error::Result;
use crate::group::ManifestInfo;
use crate::hash::Fingerprint;
use crate::manifest::Manifest;
use crate::progress::Progress;
use crate::store::Repository;
use crate::worktree;
use ahash::AHashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Options for [`load`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Leave existing working-tree files in place; restored files are
    /// still truncated before their content is written
    pub keep: bool,
}

/// Outcome of a load
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub package: ManifestInfo,
    pub files_restored: usize,
    pub directories_created: usize,
    /// Fingerprints the package references that the store doesn't hold
    pub missing: Vec<Fingerprint>,
}

/// Restore the package `selector` of `group` into the working tree
///
/// The package is decoded before anything is deleted, so a malformed package
/// leaves the working tree untouched. The store is scanned once in file
/// order; each requested blob is streamed into its first path and copied to
/// the others.
pub fn load(
    repo: &Repository,
    group: &str,
    selector: Option<&str>,
    options: LoadOptions,
    progress: &mut dyn Progress,
) -> Result<LoadReport> {
    let package = repo.group(group)?.resolve(selector)?;
    let manifest = Manifest::read(&package.path)?;
    let root = repo.root();

    if !options.keep {
        progress.start("Clearing working tree");
        worktree::wipe(root)?;
    }

    progress.start("Restoring files");
    let mut directories_created = 0;
    for directory in manifest.directories() {
        if worktree::should_ignore(directory) {
            tracing::warn!("Skipping reserved directory {}", directory.display());
            continue;
        }
        ensure_dir(root, directory)?;
        directories_created += 1;
    }

    let mut requested: AHashSet<Fingerprint> = manifest.fingerprints().copied().collect();
    let mut files_restored = 0;
    let mut reader = FilebaseReader::open(&repo.layout().filebase())?;

    while !requested.is_empty() {
        let Some(fingerprint) = reader.next_blob()? else {
            break;
        };
        if !requested.remove(&fingerprint) {
            continue;
        }

        let paths: Vec<&Path> = manifest
            .paths_for(&fingerprint)
            .unwrap_or_default()
            .iter()
            .map(|p| p.as_path())
            .filter(|p| {
                let reserved = worktree::should_ignore(p);
                if reserved {
                    tracing::warn!("Skipping reserved path {}", p.display());
                }
                !reserved
            })
            .collect();
        let Some((first, rest)) = paths.split_first() else {
            continue;
        };

        let first = prepare_file(root, first)?;
        let mut out = BufWriter::new(File::create(&first)?);
        reader.read_blob_into(&mut out)?;
        out.flush()?;
        progress.item(&first);

        for other in rest {
            let target = prepare_file(root, other)?;
            fs::copy(&first, &target)?;
            progress.item(&target);
        }
        files_restored += paths.len();
    }

    let mut missing: Vec<Fingerprint> = requested.into_iter().collect();
    missing.sort();
    for fingerprint in &missing {
        for path in manifest.paths_for(fingerprint).unwrap_or_default() {
            tracing::warn!("Content of {} ({}) is missing from the store", path.display(), fingerprint);
        }
    }

    tracing::info!(
        "Loaded {}/{}: {} files, {} directories, {} missing blobs",
        group,
        package.name,
        files_restored,
        directories_created,
        missing.len()
    );
    progress.done("Loaded");

    Ok(LoadReport {
        package,
        files_restored,
        directories_created,
        missing,
    })
}

/// Make `relative` a real directory chain under `root`
///
/// Symlinks met along the way are replaced by directories; following them
/// would restore content outside the working tree.
fn ensure_dir(root: &Path, relative: &Path) -> Result<()> {
    let mut current = root.to_path_buf();
    for component in relative.components() {
        current.push(component);
        match fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {
                tracing::warn!("Replacing symlink {} with a directory", current.display());
                remove_link(&current)?;
                fs::create_dir(&current)?;
            }
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} exists and is not a directory", current.display()),
                )
                .into());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => fs::create_dir(&current)?,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Resolve the restore target of `relative`, creating its parents and
/// unlinking a symlink already sitting at the path
fn prepare_file(root: &Path, relative: &Path) -> Result<PathBuf> {
    if let Some(parent) = relative.parent() {
        ensure_dir(root, parent)?;
    }

    let target = root.join(relative);
    if let Ok(meta) = fs::symlink_metadata(&target) {
        if meta.file_type().is_symlink() {
            tracing::warn!("Replacing symlink {} with a file", target.display());
            remove_link(&target)?;
        }
    }
    Ok(target)
}

// Directory links on Windows need remove_dir
fn remove_link(path: &Path) -> io::Result<()> {
    fs::remove_file(path).or_else(|_| fs::remove_dir(path))
}
