//! Staged commits and crash recovery
//!
//! Pipelines never write straight into `filebase`, `hashes` or `packages/`.
//! They build their output in a staging directory under `.lumi/tmp/`, record
//! a `PENDING` marker describing how to undo or finish the publication, and
//! only then touch the durable files. [`recover`] runs on every
//! [`Repository::open`](crate::store::Repository::open) and brings the
//! repository back to a state where index, store and packages agree.

use crate::error::{Error, Result};
use crate::store::{atomic_write, sync_dir, Layout};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Contents of the `PENDING` marker
///
/// Paths are relative to the metadata directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum PendingCommit {
    /// Staged blobs and index entries are being appended
    Save {
        filebase_len: u64,
        hashes_len: u64,
        manifest: PathBuf,
    },
    /// Compacted store and pruned index are being renamed into place
    Cleanup { filebase: PathBuf, hashes: PathBuf },
}

/// Scratch directory removed on drop unless kept
pub(crate) struct StagingDir {
    path: PathBuf,
    keep: bool,
}

impl StagingDir {
    /// Create a fresh, uniquely named directory under `parent`
    pub fn create(parent: &Path) -> Result<Self> {
        Self::create_at(parent.join(ulid::Ulid::new().to_string()))
    }

    /// Create `path`, discarding anything left there by an earlier run
    pub fn create_at(path: PathBuf) -> Result<Self> {
        if path.exists() {
            fs::remove_dir_all(&path)?;
        }
        fs::create_dir_all(&path)?;
        Ok(Self { path, keep: false })
    }

    /// Leave the directory for recovery to finish
    pub fn keep(mut self) {
        self.keep = true;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove staging directory {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Publish a staged save
///
/// `staged_filebase` and `staged_hashes` hold complete records to append;
/// `staged_manifest` is renamed to `target_manifest` last.
pub(crate) fn commit_save(
    layout: &Layout,
    staged_filebase: &Path,
    staged_hashes: &Path,
    staged_manifest: &Path,
    target_manifest: &Path,
) -> Result<()> {
    let manifest = target_manifest
        .strip_prefix(layout.lumi_dir())
        .map_err(|_| Error::InvalidPath(target_manifest.to_path_buf()))?
        .to_path_buf();

    write_marker(
        layout,
        &PendingCommit::Save {
            filebase_len: fs::metadata(layout.filebase())?.len(),
            hashes_len: fs::metadata(layout.hashes())?.len(),
            manifest,
        },
    )?;

    append_file(staged_filebase, &layout.filebase())?;
    append_file(staged_hashes, &layout.hashes())?;

    let group_dir = target_manifest
        .parent()
        .ok_or_else(|| Error::InvalidPath(target_manifest.to_path_buf()))?;
    fs::create_dir_all(group_dir)?;
    fs::rename(staged_manifest, target_manifest)?;
    sync_dir(group_dir)?;

    clear_marker(layout)
}

/// Publish a staged cleanup by renaming both files into place
pub(crate) fn commit_cleanup(layout: &Layout, staged_filebase: &Path, staged_hashes: &Path) -> Result<()> {
    let relative = |path: &Path| -> Result<PathBuf> {
        Ok(path
            .strip_prefix(layout.lumi_dir())
            .map_err(|_| Error::InvalidPath(path.to_path_buf()))?
            .to_path_buf())
    };

    write_marker(
        layout,
        &PendingCommit::Cleanup {
            filebase: relative(staged_filebase)?,
            hashes: relative(staged_hashes)?,
        },
    )?;

    fs::rename(staged_filebase, layout.filebase())?;
    fs::rename(staged_hashes, layout.hashes())?;
    sync_dir(layout.lumi_dir())?;

    clear_marker(layout)
}

/// Finish or undo an interrupted commit, then clear the staging area
pub(crate) fn recover(layout: &Layout) -> Result<()> {
    if let Some(pending) = read_marker(layout)? {
        match &pending {
            PendingCommit::Save {
                filebase_len,
                hashes_len,
                manifest,
            } => {
                if layout.lumi_dir().join(manifest).is_file() {
                    tracing::info!("Interrupted save of {} had completed", manifest.display());
                } else {
                    tracing::warn!("Rolling back interrupted save of {}", manifest.display());
                    truncate_to(&layout.filebase(), *filebase_len)?;
                    truncate_to(&layout.hashes(), *hashes_len)?;
                }
            }
            PendingCommit::Cleanup { filebase, hashes } => {
                tracing::warn!("Completing interrupted cleanup");
                for (staged, target) in [(filebase, layout.filebase()), (hashes, layout.hashes())] {
                    let staged = layout.lumi_dir().join(staged);
                    if staged.is_file() {
                        fs::rename(&staged, &target)?;
                    }
                }
                sync_dir(layout.lumi_dir())?;
            }
        }
        clear_marker(layout)?;
    }

    clear_tmp(layout)
}

pub(crate) fn write_marker(layout: &Layout, pending: &PendingCommit) -> Result<()> {
    let json = serde_json::to_vec_pretty(pending).map_err(|e| Error::Corrupt(e.to_string()))?;
    atomic_write(&layout.tmp(), &layout.pending(), &json)
}

pub(crate) fn read_marker(layout: &Layout) -> Result<Option<PendingCommit>> {
    match fs::read(layout.pending()) {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| Error::Corrupt(format!("unreadable commit marker: {}", e))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn clear_marker(layout: &Layout) -> Result<()> {
    match fs::remove_file(layout.pending()) {
        Ok(()) => sync_dir(&layout.tmp()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Append the whole of `source` to `target` and fsync
fn append_file(source: &Path, target: &Path) -> Result<()> {
    let mut input = File::open(source)?;
    let mut output = OpenOptions::new().append(true).open(target)?;
    let copied = io::copy(&mut input, &mut output)?;
    output.sync_all()?;
    tracing::trace!("Appended {} bytes to {}", copied, target.display());
    Ok(())
}

fn truncate_to(path: &Path, len: u64) -> Result<()> {
    let file = OpenOptions::new().write(true).open(path)?;
    if file.metadata()?.len() > len {
        file.set_len(len)?;
        file.sync_all()?;
    }
    Ok(())
}

/// Remove everything under `tmp/` except a live marker
fn clear_tmp(layout: &Layout) -> Result<()> {
    let tmp = layout.tmp();
    if !tmp.is_dir() {
        fs::create_dir_all(&tmp)?;
        return Ok(());
    }

    for entry in fs::read_dir(&tmp)? {
        let entry = entry?;
        let path = entry.path();
        if path == layout.pending() {
            continue;
        }
        tracing::debug!("Removing leftover staging entry {}", path.display());
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}
