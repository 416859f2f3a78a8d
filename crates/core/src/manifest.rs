//! Package (snapshot manifest) format
//!
//! ```text
//! directories: string*          ("./a", "./a/b", ...)
//! separator:   string = "-"
//! entries:     { fingerprint: string, path: string }* until EOF
//! ```
//! Paths are stored relative to the working tree with `/` separators and a
//! leading `./`, so no stored path can equal the separator.

use crate::codec;
use crate::error::{Error, Result};
use crate::hash::Fingerprint;
use ahash::AHashMap;
use smallvec::SmallVec;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};

/// Marks the end of the directory list
pub const SEPARATOR: &str = "-";

/// Paths sharing one fingerprint; almost always a single path
pub type PathList = SmallVec<[PathBuf; 1]>;

/// Decoded contents of one package
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    directories: Vec<PathBuf>,
    files: AHashMap<Fingerprint, PathList>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_directory(&mut self, path: impl Into<PathBuf>) {
        self.directories.push(path.into());
    }

    /// Associate a file path with the fingerprint of its content
    pub fn add_file(&mut self, fingerprint: Fingerprint, path: impl Into<PathBuf>) {
        self.files.entry(fingerprint).or_default().push(path.into());
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Paths holding the content of `fingerprint`, if any
    pub fn paths_for(&self, fingerprint: &Fingerprint) -> Option<&[PathBuf]> {
        self.files.get(fingerprint).map(|paths| paths.as_slice())
    }

    pub fn fingerprints(&self) -> impl Iterator<Item = &Fingerprint> {
        self.files.keys()
    }

    /// Every (fingerprint, path) pair, sorted by path
    pub fn files(&self) -> Vec<(&Fingerprint, &Path)> {
        let mut files: Vec<_> = self
            .files
            .iter()
            .flat_map(|(fp, paths)| paths.iter().map(move |p| (fp, p.as_path())))
            .collect();
        files.sort_by(|a, b| a.1.cmp(b.1));
        files
    }

    pub fn blob_count(&self) -> usize {
        self.files.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.values().map(|paths| paths.len()).sum()
    }

    pub fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        for directory in &self.directories {
            codec::write_string(writer, &encode_path(directory)?)?;
        }
        codec::write_string(writer, SEPARATOR)?;

        for (fingerprint, path) in self.files() {
            codec::write_string(writer, &fingerprint.to_hex())?;
            codec::write_string(writer, &encode_path(path)?)?;
        }
        Ok(())
    }

    /// Decode a package; `source` only labels errors
    pub fn decode<R: Read>(reader: &mut R, source: &Path) -> Result<Self> {
        let malformed = |reason: &str| Error::MalformedManifest {
            path: source.to_path_buf(),
            reason: reason.to_string(),
        };

        let mut manifest = Self::new();

        loop {
            match codec::read_string_or_eof(reader)? {
                Some(entry) if entry == SEPARATOR => break,
                Some(entry) => manifest.add_directory(decode_path(&entry, source)?),
                None => return Err(malformed("directory list has no separator")),
            }
        }

        while let Some(header) = codec::read_string_or_eof(reader)? {
            let fingerprint = Fingerprint::from_hex(&header)
                .map_err(|_| malformed(&format!("invalid fingerprint '{}'", header)))?;
            let path = codec::read_string_or_eof(reader)?
                .ok_or_else(|| malformed(&format!("fingerprint {} has no path", fingerprint)))?;
            manifest.add_file(fingerprint, decode_path(&path, source)?);
        }

        Ok(manifest)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::decode(&mut reader, path)
    }

    /// Write to a new file and fsync it
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.encode(&mut writer)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }
}

/// Render a working-tree relative path in package form
pub fn encode_path(path: &Path) -> Result<String> {
    let mut encoded = String::from(".");
    let mut parts = 0;

    for component in path.components() {
        match component {
            Component::CurDir => continue,
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| Error::InvalidPath(path.to_path_buf()))?;
                encoded.push('/');
                encoded.push_str(part);
                parts += 1;
            }
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::InvalidPath(path.to_path_buf()));
            }
        }
    }

    if parts == 0 {
        return Err(Error::InvalidPath(path.to_path_buf()));
    }
    Ok(encoded)
}

/// Parse a package path back into a relative path
///
/// Rejects anything that would escape the working tree.
pub fn decode_path(text: &str, source: &Path) -> Result<PathBuf> {
    let malformed = || Error::MalformedManifest {
        path: source.to_path_buf(),
        reason: format!("invalid path '{}'", text),
    };

    let relative = text.strip_prefix("./").unwrap_or(text);
    if relative.is_empty() || relative.starts_with('/') {
        return Err(malformed());
    }

    let mut path = PathBuf::new();
    for part in relative.split('/') {
        match part {
            "" | "." => continue,
            ".." => return Err(malformed()),
            _ => path.push(part),
        }
    }

    if path.as_os_str().is_empty() {
        return Err(malformed());
    }
    Ok(path)
}
