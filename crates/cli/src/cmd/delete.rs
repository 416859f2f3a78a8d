//! Delete a group or a single package

use crate::util;
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn run(group: &str, package: Option<&str>, force: bool) -> Result<()> {
    // 1. Find repository root and open it
    let repo = util::open_repo()?;

    // 2. Resolve and confirm before deleting
    match package {
        Some(selector) => {
            let target = repo.group(group)?.resolve(Some(selector))?;
            if !force {
                println!("Package to be deleted: {}/{}", group.yellow(), target.name.bright_cyan());
                if !util::confirm("Deleting a package removes it permanently.")? {
                    println!("{}", "Delete cancelled".yellow());
                    return Ok(());
                }
            }

            let deleted = repo.delete_package(group, &target.name)?;
            println!("{} Deleted package {} from {}", "✓".green(), deleted.name.bright_cyan(), group.yellow());
        }
        None => {
            let count = repo.group(group)?.packages()?.len();
            if !force {
                println!("Group to be deleted: {} ({} packages)", group.yellow(), count);
                if !util::confirm("Deleting a group removes all of its packages.")? {
                    println!("{}", "Delete cancelled".yellow());
                    return Ok(());
                }
            }

            repo.delete_group(group)?;
            println!("{} Deleted group {} ({} packages)", "✓".green(), group.yellow(), count);
        }
    }

    // 3. Content stays in the store until cleanup
    println!("{}", "Run 'lumi cleanup' to reclaim the space of unreferenced content.".dimmed());
    Ok(())
}
