//! Error type shared by every storage operation

use std::path::PathBuf;

/// Errors produced by the lumi storage engine
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("You have to initialize a repository to perform this action.")]
    NotInitialized,

    #[error("The repository is already initialized at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Package group '{0}' doesn't exist in the repository.")]
    GroupNotFound(String),

    #[error("Package '{selector}' doesn't exist in group '{group}'.")]
    PackageNotFound { group: String, selector: String },

    #[error("Package group '{0}' is empty.")]
    EmptyGroup(String),

    #[error("The name '{0}' is invalid.")]
    InvalidName(String),

    #[error("Path cannot be stored: {0}")]
    InvalidPath(PathBuf),

    #[error("Malformed package {}: {reason}", path.display())]
    MalformedManifest { path: PathBuf, reason: String },

    #[error("Corrupt repository data: {0}")]
    Corrupt(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error was raised before any durable state changed
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::NotInitialized
                | Error::AlreadyInitialized(_)
                | Error::GroupNotFound(_)
                | Error::PackageNotFound { .. }
                | Error::EmptyGroup(_)
                | Error::InvalidName(_)
        )
    }
}

/// Result type used throughout lumi-core
pub type Result<T> = std::result::Result<T, Error>;
