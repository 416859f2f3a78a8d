//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use lumi_core::worktree::METADATA_DIR;
use lumi_core::{Error, Repository};
use owo_colors::OwoColorize;
use std::io::Write;
use std::path::PathBuf;
use std::time::SystemTime;

/// Find repository root by walking up from cwd to find .lumi/
pub fn find_repo_root() -> Result<PathBuf> {
    let mut current = std::env::current_dir().context("Failed to get current directory")?;

    loop {
        if current.join(METADATA_DIR).is_dir() {
            return Ok(current);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return Err(Error::NotInitialized.into()),
        }
    }
}

/// Open the repository enclosing the current directory
pub fn open_repo() -> Result<Repository> {
    let root = find_repo_root()?;
    tracing::debug!("Using repository at {}", root.display());
    Ok(Repository::open(&root)?)
}

/// Ask a yes/no question on stdout; anything but `y` declines
pub fn confirm(question: &str) -> Result<bool> {
    print!("{} {} ", question, "Continue? [y/N]".bold());
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

pub fn print_error(error: &anyhow::Error) {
    eprintln!("{} {:#}", "error:".red().bold(), error);
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a write time in local time ("2024-01-03 14:30:00")
pub fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format a write time relative to now ("2 hours ago")
pub fn format_relative_time(time: SystemTime) -> String {
    let Ok(elapsed) = SystemTime::now().duration_since(time) else {
        return "in the future".to_string();
    };
    let seconds = elapsed.as_secs();

    if seconds < 60 {
        format!("{} seconds ago", seconds)
    } else if seconds < 3600 {
        format!("{} minutes ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hours ago", seconds / 3600)
    } else if seconds < 604800 {
        format!("{} days ago", seconds / 86400)
    } else {
        format!("{} weeks ago", seconds / 604800)
    }
}

/// Width of the largest zero-based index among `count` entries
pub fn index_width(count: usize) -> usize {
    count.saturating_sub(1).to_string().len()
}
