//! Show the packages of one group, oldest first

use crate::util;
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn run(group: &str) -> Result<()> {
    // 1. Find repository root and open it
    let repo = util::open_repo()?;

    // 2. Packages, oldest first
    let packages = repo.group(group)?.packages()?;
    if packages.is_empty() {
        println!("{}", format!("Package group '{}' is empty.", group).dimmed());
        return Ok(());
    }

    let width = util::index_width(packages.len());
    for package in &packages {
        println!(
            "{:>width$} {} │ {}",
            package.index.to_string().yellow(),
            package.name.bold(),
            util::format_time(package.modified),
            width = width
        );
    }
    Ok(())
}
