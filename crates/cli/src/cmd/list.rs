//! List package groups

use crate::util;
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn run() -> Result<()> {
    // 1. Find repository root and open it
    let repo = util::open_repo()?;

    // 2. Groups, newest first
    let mut groups = repo.groups()?;
    if groups.is_empty() {
        println!("{}", "The repository is empty.".dimmed());
        return Ok(());
    }
    groups.reverse();

    let width = groups.iter().map(|g| g.name.len()).max().unwrap_or(0);
    for group in groups {
        println!(
            "{:<width$} │ {} {}",
            group.name.bold(),
            util::format_time(group.modified),
            format!("({})", util::format_relative_time(group.modified)).dimmed(),
            width = width
        );
    }
    Ok(())
}
