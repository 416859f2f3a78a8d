//! Garbage collection of unreferenced blobs

use crate::blob::{FilebaseReader, FilebaseWriter};
use crate::error::Result;
use crate::hash::Fingerprint;
use crate::index::IndexWriter;
use crate::manifest::Manifest;
use crate::progress::Progress;
use crate::staging::{self, StagingDir};
use crate::store::Repository;
use ahash::AHashSet;
use std::fs::{self, File};
use std::io::BufWriter;

/// Outcome of a cleanup
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    pub blobs_kept: usize,
    pub blobs_removed: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
    /// Index entries dropped because their blob is gone
    pub index_pruned: usize,
}

impl CleanupReport {
    pub fn bytes_freed(&self) -> u64 {
        self.bytes_before.saturating_sub(self.bytes_after)
    }
}

/// Every fingerprint referenced by at least one package of any group
pub fn live_set(repo: &Repository) -> Result<AHashSet<Fingerprint>> {
    let mut live = AHashSet::new();
    for package in repo.all_packages()? {
        let manifest = Manifest::read(&package.path)?;
        live.extend(manifest.fingerprints().copied());
    }
    Ok(live)
}

/// Rewrite the store keeping only live blobs, and the index to match it
///
/// Records are copied verbatim in store order. Nothing durable changes until
/// the compacted files are complete.
pub fn cleanup(repo: &Repository, progress: &mut dyn Progress) -> Result<CleanupReport> {
    let layout = repo.layout();

    progress.start("Collecting referenced blobs");
    let live = live_set(repo)?;
    let index = repo.hash_index()?;
    let bytes_before = fs::metadata(layout.filebase())?.len();

    progress.start("Compacting store");
    let staging = StagingDir::create_at(layout.gc())?;
    let staged_filebase = staging.join("filebase");
    let staged_hashes = staging.join("hashes");

    let mut reader = FilebaseReader::open(&layout.filebase())?;
    let mut writer = FilebaseWriter::new(
        BufWriter::new(File::create(&staged_filebase)?),
        repo.config().store.segment_cap,
    );
    let mut hashes = IndexWriter::open(&staged_hashes)?;

    let mut copied = AHashSet::new();
    let mut report = CleanupReport {
        bytes_before,
        ..CleanupReport::default()
    };

    while let Some(fingerprint) = reader.next_blob()? {
        if live.contains(&fingerprint) && copied.insert(fingerprint) {
            writer.copy_blob(&fingerprint, &mut reader)?;
            hashes.append(&fingerprint)?;
            report.blobs_kept += 1;
        } else {
            tracing::debug!("Dropping blob {}", fingerprint);
            report.blobs_removed += 1;
        }
    }

    report.bytes_after = writer.bytes_written();
    writer.flush()?;
    writer.into_inner().get_ref().sync_all()?;
    hashes.sync()?;
    drop(reader);

    report.index_pruned = index.iter().filter(|fp| !copied.contains(*fp)).count();
    let unstored = live.iter().filter(|fp| !copied.contains(*fp)).count();
    if unstored > 0 {
        tracing::warn!("{} referenced blobs are not in the store", unstored);
    }

    if let Err(e) = staging::commit_cleanup(layout, &staged_filebase, &staged_hashes) {
        staging.keep();
        return Err(e);
    }
    drop(staging);

    tracing::info!(
        "Cleanup kept {} blobs, removed {}, pruned {} index entries ({} -> {} bytes)",
        report.blobs_kept,
        report.blobs_removed,
        report.index_pruned,
        report.bytes_before,
        report.bytes_after
    );
    progress.done("Cleaned up");
    Ok(report)
}
