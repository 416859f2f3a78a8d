//! Snapshot the working tree into a package

use crate::blob::FilebaseWriter;
use crate::error::Result;
use crate::group::{ManifestInfo, PACKAGE_EXTENSION};
use crate::hash::hash_open_file;
use crate::index::IndexWriter;
use crate::manifest::Manifest;
use crate::progress::Progress;
use crate::staging::{self, StagingDir};
use crate::store::{validate_name, Repository};
use crate::worktree;
use std::fs::File;
use std::io::BufWriter;

/// Outcome of a save
#[derive(Debug, Clone)]
pub struct SaveReport {
    pub package: ManifestInfo,
    pub files: usize,
    pub directories: usize,
    /// Blobs appended to the store
    pub new_blobs: usize,
    /// Files whose content was already stored
    pub deduplicated: usize,
    /// Bytes appended to the store
    pub bytes_written: u64,
}

/// Save the working tree as a new package of `group`
///
/// Only content whose fingerprint is not in the hash index is written. The
/// group is created if it doesn't exist.
pub fn save(repo: &Repository, group: &str, progress: &mut dyn Progress) -> Result<SaveReport> {
    validate_name(group)?;
    let layout = repo.layout();
    let config = &repo.config().store;

    progress.start("Scanning working tree");
    let mut index = repo.hash_index()?;
    let tree = worktree::scan(layout.root())?;

    let staging = StagingDir::create(&layout.ingest())?;
    tracing::debug!("Staging save in {}", staging.path().display());
    let staged_filebase = staging.join("filebase");
    let staged_hashes = staging.join("hashes");

    let mut blobs = FilebaseWriter::new(BufWriter::new(File::create(&staged_filebase)?), config.segment_cap);
    let mut hashes = IndexWriter::open(&staged_hashes)?;
    let mut manifest = Manifest::new();

    for directory in &tree.directories {
        manifest.add_directory(directory);
    }

    progress.start("Saving files");
    let mut new_blobs = 0;
    let mut deduplicated = 0;
    for relative in &tree.files {
        let mut file = File::open(layout.root().join(relative))?;
        let len = file.metadata()?.len();
        let fingerprint = hash_open_file(&mut file, len, config.mmap_threshold)?;

        if index.insert(fingerprint) {
            hashes.append(&fingerprint)?;
            blobs.write_blob(&fingerprint, &mut file, len)?;
            new_blobs += 1;
            tracing::trace!("Stored {} as {}", relative.display(), fingerprint);
        } else {
            deduplicated += 1;
        }

        manifest.add_file(fingerprint, relative);
        progress.item(relative);
    }

    let bytes_written = blobs.bytes_written();
    blobs.flush()?;
    blobs.into_inner().get_ref().sync_all()?;
    hashes.sync()?;

    let name = format!("{}.{}", ulid::Ulid::new(), PACKAGE_EXTENSION);
    let staged_manifest = staging.join(&name);
    manifest.write(&staged_manifest)?;

    let target = layout.packages().join(group).join(&name);
    staging::commit_save(layout, &staged_filebase, &staged_hashes, &staged_manifest, &target)?;
    drop(staging);

    let package = repo.group(group)?.resolve(Some(&name))?;
    tracing::info!(
        "Saved {} files into {}/{} ({} new blobs, {} deduplicated, {} bytes)",
        tree.files.len(),
        group,
        package.name,
        new_blobs,
        deduplicated,
        bytes_written
    );
    progress.done("Saved");

    Ok(SaveReport {
        package,
        files: tree.files.len(),
        directories: tree.directories.len(),
        new_blobs,
        deduplicated,
        bytes_written,
    })
}
