//! Remove stored content that no package references

use crate::progress::Spinner;
use crate::util;
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn run() -> Result<()> {
    // 1. Find repository root and open it
    let repo = util::open_repo()?;

    // 2. Compact the store to the live set
    let report = {
        let mut spinner = Spinner::new();
        lumi_core::cleanup(&repo, &mut spinner)?
    };

    // 3. Report
    println!("{}", "Cleanup Complete".green().bold());
    if report.blobs_removed == 0 {
        println!("{}", "No garbage found - the store is already clean".dimmed());
        return Ok(());
    }

    println!("{:<22}{}", "Blobs kept:", report.blobs_kept);
    println!("{:<22}{}", "Blobs removed:", report.blobs_removed.to_string().yellow());
    println!("{:<22}{}", "Index entries pruned:", report.index_pruned.to_string().yellow());
    println!("{:<22}{}", "Space freed:", util::format_size(report.bytes_freed()).green());
    Ok(())
}
