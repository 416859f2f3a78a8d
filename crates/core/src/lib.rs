//! Lumi Core - deduplicating snapshot storage for a working directory
//!
//! This crate provides the storage engine behind the `lumi` tool:
//! - BLAKE3 content fingerprints
//! - Append-only hash index and segmented blob store (the filebase)
//! - Package (snapshot manifest) encoding and group/selector resolution
//! - Save, load and cleanup pipelines with staged, recoverable commits

pub mod blob;
pub mod cleanup;
pub mod codec;
pub mod config;
pub mod error;
pub mod group;
pub mod hash;
pub mod index;
pub mod load;
pub mod manifest;
pub mod progress;
pub mod save;
mod staging;
pub mod store;
pub mod worktree;

// Re-export main types for convenience
pub use cleanup::{cleanup, live_set, CleanupReport};
pub use config::{RepoConfig, StoreConfig};
pub use error::{Error, Result};
pub use group::{Group, ManifestInfo};
pub use hash::Fingerprint;
pub use index::HashIndex;
pub use load::{load, LoadOptions, LoadReport};
pub use manifest::Manifest;
pub use progress::{Progress, Silent};
pub use save::{save, SaveReport};
pub use store::{GroupInfo, Layout, Repository};
