//! On-disk repository management

use crate::config::RepoConfig;
use crate::error::{Error, Result};
use crate::group::{Group, ManifestInfo};
use crate::index::HashIndex;
use crate::staging;
use crate::worktree::METADATA_DIR;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Paths of every durable file of a repository
///
/// ```text
/// .lumi/
///   config.toml
///   hashes
///   filebase
///   packages/<group>/<ULID>.pkg
///   tmp/
///     ingest/<ULID>/
///     gc/
///     PENDING
/// ```
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
    lumi_dir: PathBuf,
}

impl Layout {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            lumi_dir: root.join(METADATA_DIR),
        }
    }

    /// Working-tree root
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn lumi_dir(&self) -> &Path {
        &self.lumi_dir
    }

    pub fn config(&self) -> PathBuf {
        self.lumi_dir.join("config.toml")
    }

    pub fn hashes(&self) -> PathBuf {
        self.lumi_dir.join("hashes")
    }

    pub fn filebase(&self) -> PathBuf {
        self.lumi_dir.join("filebase")
    }

    pub fn packages(&self) -> PathBuf {
        self.lumi_dir.join("packages")
    }

    pub fn tmp(&self) -> PathBuf {
        self.lumi_dir.join("tmp")
    }

    pub fn ingest(&self) -> PathBuf {
        self.tmp().join("ingest")
    }

    pub fn gc(&self) -> PathBuf {
        self.tmp().join("gc")
    }

    pub fn pending(&self) -> PathBuf {
        self.tmp().join("PENDING")
    }

    /// Whether the four required entries exist
    pub fn is_initialized(&self) -> bool {
        self.lumi_dir.is_dir() && self.packages().is_dir() && self.filebase().is_file() && self.hashes().is_file()
    }
}

/// A group directory as seen by listings
#[derive(Debug, Clone)]
pub struct GroupInfo {
    pub name: String,
    pub modified: SystemTime,
}

/// An initialized lumi repository
pub struct Repository {
    layout: Layout,
    config: RepoConfig,
}

impl Repository {
    /// Initialize a new repository at `root` with default configuration
    pub fn init(root: &Path) -> Result<Self> {
        Self::init_with_config(root, RepoConfig::default())
    }

    pub fn init_with_config(root: &Path, config: RepoConfig) -> Result<Self> {
        let layout = Layout::new(root);
        if layout.is_initialized() {
            return Err(Error::AlreadyInitialized(layout.lumi_dir().to_path_buf()));
        }
        config.validate()?;

        fs::create_dir_all(layout.packages())?;
        fs::create_dir_all(layout.tmp())?;
        for file in [layout.filebase(), layout.hashes()] {
            if !file.exists() {
                fs::File::create(&file)?;
            }
        }
        config.save(&layout.config())?;

        tracing::info!("Initialized repository at {}", layout.lumi_dir().display());
        Ok(Self { layout, config })
    }

    /// Open an existing repository, finishing or undoing any interrupted commit
    pub fn open(root: &Path) -> Result<Self> {
        let layout = Layout::new(root);
        if !layout.is_initialized() {
            return Err(Error::NotInitialized);
        }

        let config = RepoConfig::load(&layout.config())?;
        staging::recover(&layout)?;

        Ok(Self { layout, config })
    }

    pub fn is_initialized(root: &Path) -> bool {
        Layout::new(root).is_initialized()
    }

    /// Delete the whole metadata directory under `root`
    ///
    /// Works on the layout alone: no config is read and no interrupted
    /// commit is recovered, so a damaged repository can still be removed.
    pub fn wipe(root: &Path) -> Result<()> {
        let layout = Layout::new(root);
        if !layout.is_initialized() {
            return Err(Error::NotInitialized);
        }

        fs::remove_dir_all(layout.lumi_dir())?;
        tracing::info!("Wiped repository at {}", layout.lumi_dir().display());
        Ok(())
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn hash_index(&self) -> Result<HashIndex> {
        HashIndex::load(&self.layout.hashes())
    }

    /// Look up an existing group
    pub fn group(&self, name: &str) -> Result<Group> {
        validate_name(name)?;
        let dir = self.layout.packages().join(name);
        if !dir.is_dir() {
            return Err(Error::GroupNotFound(name.to_string()));
        }
        Ok(Group::new(name, dir))
    }

    /// Every group, oldest write time first
    pub fn groups(&self) -> Result<Vec<GroupInfo>> {
        let mut groups = Vec::new();

        for entry in fs::read_dir(self.layout.packages())? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            groups.push(GroupInfo {
                name,
                modified: entry.metadata()?.modified()?,
            });
        }

        groups.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name)));
        Ok(groups)
    }

    /// Every package file of every group
    pub fn all_packages(&self) -> Result<Vec<ManifestInfo>> {
        let mut packages = Vec::new();
        for info in self.groups()? {
            packages.extend(self.group(&info.name)?.packages()?);
        }
        Ok(packages)
    }

    /// Delete a group and all its packages
    pub fn delete_group(&self, name: &str) -> Result<()> {
        let group = self.group(name)?;
        fs::remove_dir_all(group.path())?;
        tracing::info!("Deleted group {}", name);
        Ok(())
    }

    /// Delete one package; the selector must name it or index it
    pub fn delete_package(&self, group: &str, selector: &str) -> Result<ManifestInfo> {
        let package = self.group(group)?.resolve(Some(selector))?;
        fs::remove_file(&package.path)?;
        tracing::info!("Deleted package {}/{}", group, package.name);
        Ok(package)
    }
}

/// Check a group name or package selector
///
/// Names must be non-empty, must not start with `.`, and must not contain
/// path separators or characters that are invalid in file names.
pub fn validate_name(name: &str) -> Result<()> {
    const INVALID: &[char] = &['/', '\\', '<', '>', ':', '"', '|', '?', '*', '\0'];

    if name.is_empty() || name.starts_with('.') || name.contains(INVALID) || name.chars().any(char::is_control) {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Write `data` to a temp file in `tmp_dir`, fsync it, then rename it over `target`
pub fn atomic_write(tmp_dir: &Path, target: &Path, data: &[u8]) -> Result<()> {
    fs::create_dir_all(tmp_dir)?;
    let file_name = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidPath(target.to_path_buf()))?;
    let temp_path = tmp_dir.join(format!("{}-{}", ulid::Ulid::new(), file_name));

    let mut temp_file = fs::File::create(&temp_path)?;
    temp_file.write_all(data)?;
    temp_file.sync_all()?;
    drop(temp_file);

    fs::rename(&temp_path, target)?;
    sync_dir(target.parent().unwrap_or(tmp_dir))?;
    Ok(())
}

/// Fsync a directory so renames inside it are durable
#[cfg(unix)]
pub(crate) fn sync_dir(dir: &Path) -> Result<()> {
    fs::File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}
