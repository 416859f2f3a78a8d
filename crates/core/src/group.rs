//! Package groups and selector resolution
//!
//! Packages inside a group are ordered by write time (oldest first). Ties
//! are broken by name; names are ULIDs, so creation order wins.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// File extension of package files
pub const PACKAGE_EXTENSION: &str = "pkg";

/// One package file of a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestInfo {
    /// File name, e.g. `01HN8XYZ....pkg`
    pub name: String,
    pub path: PathBuf,
    pub modified: SystemTime,
    /// Zero-based position in write-time order
    pub index: usize,
}

/// A named directory of packages
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    dir: PathBuf,
}

impl Group {
    pub(crate) fn new(name: &str, dir: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            dir,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn modified(&self) -> Result<SystemTime> {
        Ok(fs::metadata(&self.dir)?.modified()?)
    }

    /// Every package in ascending write-time order, with display indices
    pub fn packages(&self) -> Result<Vec<ManifestInfo>> {
        let mut packages = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type()?.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(PACKAGE_EXTENSION)
            {
                continue;
            }

            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };
            packages.push(ManifestInfo {
                name,
                modified: entry.metadata()?.modified()?,
                path,
                index: 0,
            });
        }

        packages.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name)));
        for (index, package) in packages.iter_mut().enumerate() {
            package.index = index;
        }
        Ok(packages)
    }

    /// The most recently written package
    pub fn latest(&self) -> Result<ManifestInfo> {
        self.packages()?
            .pop()
            .ok_or_else(|| Error::EmptyGroup(self.name.clone()))
    }

    /// Resolve an optional selector to a package
    ///
    /// - `None`: the latest package
    /// - a package's file name (with or without `.pkg`): that package
    /// - a non-negative integer: the package at that zero-based position
    pub fn resolve(&self, selector: Option<&str>) -> Result<ManifestInfo> {
        let Some(selector) = selector else {
            return self.latest();
        };
        crate::store::validate_name(selector)?;

        let packages = self.packages()?;

        let by_name = packages.iter().find(|p| {
            p.name == selector || Path::new(&p.name).file_stem().and_then(|s| s.to_str()) == Some(selector)
        });
        if let Some(package) = by_name {
            return Ok(package.clone());
        }

        if let Ok(index) = selector.parse::<usize>() {
            if let Some(package) = packages.get(index) {
                return Ok(package.clone());
            }
        }

        Err(Error::PackageNotFound {
            group: self.name.clone(),
            selector: selector.to_string(),
        })
    }
}
