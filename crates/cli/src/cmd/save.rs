//! Save the working tree into a group

use crate::progress::Spinner;
use crate::util;
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn run(group: &str) -> Result<()> {
    // 1. Find repository root and open it
    let repo = util::open_repo()?;

    // 2. Capture the working tree behind the spinner
    let report = {
        let mut spinner = Spinner::new();
        lumi_core::save(&repo, group, &mut spinner)?
    };

    // 3. Report
    println!(
        "{} Saved package {} into {}",
        "✓".green(),
        report.package.name.bright_cyan(),
        group.yellow()
    );
    println!(
        "  {} files, {} directories, {} new blobs ({}), {} deduplicated",
        report.files,
        report.directories,
        report.new_blobs,
        util::format_size(report.bytes_written),
        report.deduplicated
    );
    Ok(())
}
