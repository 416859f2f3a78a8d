//! Initialize a repository in the current directory

use anyhow::{Context, Result};
use lumi_core::Repository;
use owo_colors::OwoColorize;

pub fn run() -> Result<()> {
    // 1. Initialize in the current directory
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;

    let repo = Repository::init(&current_dir)?;

    // 2. Report
    println!(
        "{} Initialized new lumi repository at {}",
        "✓".green(),
        repo.layout().lumi_dir().display().bold()
    );
    println!();
    println!("Next steps:");
    println!("  - Run 'lumi save <group>' to store a snapshot of this directory");
    println!("  - Run 'lumi list' to see saved groups");
    Ok(())
}
