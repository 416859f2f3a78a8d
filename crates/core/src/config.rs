//! Repository configuration stored in `.lumi/config.toml`

use crate::blob::DEFAULT_SEGMENT_CAP;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Files at least this large are hashed through a memory map
pub const DEFAULT_MMAP_THRESHOLD: u64 = 4 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RepoConfig {
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Largest filebase segment in bytes
    pub segment_cap: u32,
    pub mmap_threshold: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            segment_cap: DEFAULT_SEGMENT_CAP,
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
        }
    }
}

impl RepoConfig {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let text = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, format!("# Lumi repository configuration\n{}", text))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.store.segment_cap == 0 || self.store.segment_cap > i32::MAX as u32 {
            return Err(Error::Config(format!(
                "store.segment_cap must be between 1 and {}, got {}",
                i32::MAX,
                self.store.segment_cap
            )));
        }
        Ok(())
    }
}
