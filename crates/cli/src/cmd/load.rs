//! Restore a package into the working tree

use crate::progress::Spinner;
use crate::util;
use anyhow::Result;
use lumi_core::LoadOptions;
use owo_colors::OwoColorize;

pub fn run(group: &str, package: Option<&str>, force: bool, keep: bool) -> Result<()> {
    // 1. Find repository root and open it
    let repo = util::open_repo()?;

    // 2. Resolve up front so a bad selector is reported before prompting
    let target = repo.group(group)?.resolve(package)?;

    // 3. Confirm, naming the directory that gets rewritten
    if !force {
        println!("Package to be loaded: {}/{}", group.yellow(), target.name.bright_cyan());
        println!("Working tree: {}", repo.root().display().bold());
        let warning = if keep {
            "Loading a package will overwrite files with the same paths."
        } else {
            "Loading a package will delete every file currently in the working tree."
        };
        if !util::confirm(&warning.red().bold().to_string())? {
            println!("{}", "Load cancelled".yellow());
            return Ok(());
        }
    }

    // 4. Restore
    let report = {
        let mut spinner = Spinner::new();
        lumi_core::load(&repo, group, Some(&target.name), LoadOptions { keep }, &mut spinner)?
    };

    println!(
        "{} Loaded package {} from {}",
        "✓".green(),
        report.package.name.bright_cyan(),
        group.yellow()
    );
    println!(
        "  {} files, {} directories restored",
        report.files_restored, report.directories_created
    );
    if !report.missing.is_empty() {
        println!(
            "  {} {} blobs were missing from the store",
            "!".red(),
            report.missing.len().to_string().red()
        );
    }
    Ok(())
}
