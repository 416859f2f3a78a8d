//! Delete the whole repository

use crate::util;
use anyhow::Result;
use lumi_core::{Layout, Repository};
use owo_colors::OwoColorize;

pub fn run(force: bool) -> Result<()> {
    // 1. Find repository root; the repository is not opened so a damaged one can still go
    let root = util::find_repo_root()?;
    let layout = Layout::new(&root);

    // 2. Confirm
    if !force {
        let packages = Repository::open(&root)
            .and_then(|repo| repo.all_packages())
            .map(|packages| packages.len().to_string())
            .unwrap_or_else(|_| "unreadable".to_string());
        println!("Repository to be wiped: {} ({} packages)", layout.lumi_dir().display(), packages);
        println!("{}", "Warning: every package will be lost. The working tree is not touched.".red().bold());
        if !util::confirm("Wiping deletes the repository permanently.")? {
            println!("{}", "Wipe cancelled".yellow());
            return Ok(());
        }
    }

    // 3. Remove .lumi
    Repository::wipe(&root)?;
    println!("{} The lumi repository was wiped", "✓".green());
    Ok(())
}
