//! Durable record of the fingerprints present in the filebase

use crate::codec;
use crate::error::Result;
use crate::hash::Fingerprint;
use ahash::AHashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// In-memory view of the `hashes` file
///
/// The file is a plain sequence of length-prefixed fingerprint strings in
/// append order.
#[derive(Debug, Clone, Default)]
pub struct HashIndex {
    known: AHashSet<Fingerprint>,
    order: Vec<Fingerprint>,
}

impl HashIndex {
    /// Read every record of an index file
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut index = Self::default();

        while let Some(text) = codec::read_string_or_eof(&mut reader)? {
            index.insert(Fingerprint::from_hex(&text)?);
        }

        tracing::debug!("Loaded hash index with {} entries", index.len());
        Ok(index)
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.known.contains(fingerprint)
    }

    /// Record a fingerprint in memory; returns false if it was already known
    pub fn insert(&mut self, fingerprint: Fingerprint) -> bool {
        if self.known.insert(fingerprint) {
            self.order.push(fingerprint);
            true
        } else {
            false
        }
    }

    /// Fingerprints in the order they were appended
    pub fn iter(&self) -> impl Iterator<Item = &Fingerprint> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Append-only writer for an index file
///
/// Each append is flushed before returning. Callers are responsible for not
/// appending the same fingerprint twice.
pub struct IndexWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl IndexWriter {
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn append(&mut self, fingerprint: &Fingerprint) -> Result<()> {
        codec::write_string(&mut self.writer, &fingerprint.to_hex())?;
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and fsync the underlying file
    pub fn sync(mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        tracing::trace!("Synced index file {}", self.path.display());
        Ok(())
    }
}
