//! Show every group and its packages as a tree

use crate::util;
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn run() -> Result<()> {
    // 1. Find repository root and open it
    let repo = util::open_repo()?;

    // 2. Groups and their packages, oldest first
    let groups = repo.groups()?;
    if groups.is_empty() {
        println!("{}", "The repository is empty.".dimmed());
        return Ok(());
    }

    println!("{}", repo.root().display().bold());
    for (i, info) in groups.iter().enumerate() {
        let last_group = i + 1 == groups.len();
        println!("{}{}", if last_group { "└─ " } else { "├─ " }, info.name.bold());

        let packages = repo.group(&info.name)?.packages()?;
        let width = util::index_width(packages.len());
        let indent = if last_group { "   " } else { "│  " };
        for (j, package) in packages.iter().enumerate() {
            let branch = if j + 1 == packages.len() { "└─ " } else { "├─ " };
            println!(
                "{}{}{:>width$} {} {}",
                indent,
                branch,
                package.index.to_string().yellow(),
                package.name,
                util::format_time(package.modified).dimmed(),
                width = width
            );
        }
    }
    Ok(())
}
