//! Garbage collection and repository removal

use crate::common::cli::LumiCommand;
use crate::common::TestProject;
use anyhow::Result;
use std::fs;

#[test]
fn test_cleanup_reclaims_deleted_content() -> Result<()> {
    let project = TestProject::small(4)?;
    let root = project.root();
    LumiCommand::new(root).args(&["init"]).assert_success()?;
    LumiCommand::new(root).args(&["save", "old"]).assert_success()?;

    let clean = LumiCommand::new(root).args(&["cleanup"]).assert_success()?;
    assert!(clean.contains_stdout("No garbage found"));

    project.write("assets/data.bin", b"replaced")?;
    LumiCommand::new(root).args(&["save", "new"]).assert_success()?;
    let size_before = fs::metadata(project.path(".lumi/filebase"))?.len();

    LumiCommand::new(root).args(&["delete", "old", "--force"]).assert_success()?;
    let result = LumiCommand::new(root).args(&["cleanup"]).assert_success()?;
    let removed = result
        .stdout
        .lines()
        .find(|line| line.starts_with("Blobs removed:"))
        .expect("removed count printed");
    assert!(removed.trim_end().ends_with(" 1"), "{}", removed);
    assert!(fs::metadata(project.path(".lumi/filebase"))?.len() < size_before);

    // The surviving package still restores completely
    fs::remove_dir_all(project.path("src"))?;
    LumiCommand::new(root).args(&["load", "new", "-f"]).assert_success()?;
    assert_eq!(project.read("assets/data.bin")?, b"replaced");
    assert!(project.path("src/util/mod.rs").is_file());
    Ok(())
}

#[test]
fn test_wipe_removes_repository_only() -> Result<()> {
    let project = TestProject::small(5)?;
    let root = project.root();
    LumiCommand::new(root).args(&["init"]).assert_success()?;
    LumiCommand::new(root).args(&["save", "g"]).assert_success()?;

    let declined = LumiCommand::new(root).args(&["wipe"]).stdin("no\n").assert_success()?;
    assert!(declined.contains_stdout("Wipe cancelled"));
    assert!(project.path(".lumi").is_dir());

    LumiCommand::new(root).args(&["wipe", "--force"]).assert_success()?;
    assert!(!project.path(".lumi").exists());
    assert!(project.path("README.md").is_file());

    let again = LumiCommand::new(root).args(&["wipe", "--force"]).assert_failure()?;
    assert!(again.contains_stderr("You have to initialize a repository"));
    Ok(())
}

#[test]
fn test_wipe_succeeds_with_corrupt_commit_marker() -> Result<()> {
    let project = TestProject::small(6)?;
    let root = project.root();
    LumiCommand::new(root).args(&["init"]).assert_success()?;
    LumiCommand::new(root).args(&["save", "g"]).assert_success()?;
    project.write(".lumi/tmp/PENDING", b"{garbage")?;

    // Commands that open the repository refuse to run on it
    let list = LumiCommand::new(root).args(&["list"]).assert_failure()?;
    assert!(list.contains_stderr("unreadable commit marker"));

    let declined = LumiCommand::new(root).args(&["wipe"]).stdin("n\n").assert_success()?;
    assert!(declined.contains_stdout("unreadable packages"));
    assert!(project.path(".lumi").is_dir());

    LumiCommand::new(root).args(&["wipe", "--force"]).assert_success()?;
    assert!(!project.path(".lumi").exists());
    assert!(project.path("README.md").is_file());
    Ok(())
}
