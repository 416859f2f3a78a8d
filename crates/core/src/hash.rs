//! BLAKE3 content fingerprints for the blob store

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::str::FromStr;

/// Size of the buffer used when streaming content through the hasher
const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Identity of a blob: the BLAKE3 digest of its bytes
///
/// Rendered as 64 lowercase hex characters wherever it is written to disk.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to the printable form stored in the index, filebase and packages
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the printable form
    pub fn from_hex(text: &str) -> Result<Self> {
        if text.len() != 64 {
            return Err(Error::Corrupt(format!(
                "invalid fingerprint length: expected 64 characters, got {}",
                text.len()
            )));
        }

        let mut bytes = [0u8; 32];
        hex::decode_to_slice(text, &mut bytes)
            .map_err(|e| Error::Corrupt(format!("invalid fingerprint '{}': {}", text, e)))?;
        Ok(Self(bytes))
    }
}

impl FromStr for Fingerprint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl std::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Fingerprint an in-memory buffer
pub fn hash_bytes(data: &[u8]) -> Fingerprint {
    Fingerprint::from_bytes(*blake3::hash(data).as_bytes())
}

/// Fingerprint a stream without holding it in memory
pub fn hash_reader<R: Read>(mut reader: R) -> Result<Fingerprint> {
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(Fingerprint::from_bytes(*hasher.finalize().as_bytes()))
}

/// Fingerprint an already open file and rewind it for the next reader
///
/// Files of at least `mmap_threshold` bytes are hashed through a memory map.
pub fn hash_open_file(file: &mut File, len: u64, mmap_threshold: u64) -> Result<Fingerprint> {
    let fingerprint = if len > 0 && len >= mmap_threshold {
        // SAFETY: the map is read-only and dropped before this function returns.
        // Concurrent modification of the file is outside the single-writer model.
        let mmap = unsafe { memmap2::Mmap::map(&*file)? };
        hash_bytes(&mmap)
    } else {
        hash_reader(&mut *file)?
    };

    file.seek(SeekFrom::Start(0))?;
    Ok(fingerprint)
}
