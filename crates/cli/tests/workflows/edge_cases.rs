//! Error reporting and boundary conditions

use crate::common::cli::LumiCommand;
use crate::common::TestProject;
use anyhow::Result;

#[test]
fn test_commands_require_repository() -> Result<()> {
    let project = TestProject::empty()?;

    let commands: [&[&str]; 5] = [&["save", "g"], &["list"], &["history", "g"], &["tree"], &["cleanup"]];
    for args in commands {
        let result = LumiCommand::new(project.root()).args(args).assert_failure()?;
        assert_eq!(result.exit_code, 1);
        assert!(result.contains_stderr("You have to initialize a repository to perform this action."));
    }
    Ok(())
}

#[test]
fn test_init_twice_fails() -> Result<()> {
    let project = TestProject::empty()?;
    LumiCommand::new(project.root()).args(&["init"]).assert_success()?;

    let result = LumiCommand::new(project.root()).args(&["init"]).assert_failure()?;
    assert!(result.contains_stderr("already initialized"));
    Ok(())
}

#[test]
fn test_invalid_names_are_rejected() -> Result<()> {
    let project = TestProject::empty()?;
    LumiCommand::new(project.root()).args(&["init"]).assert_success()?;

    for name in ["../escape", ".hidden", "a/b", "what?"] {
        let result = LumiCommand::new(project.root()).args(&["save", name]).assert_failure()?;
        assert!(result.contains_stderr("is invalid"), "{}: {}", name, result.stderr);
    }
    assert!(!project.path(".lumi/packages/.hidden").exists());
    Ok(())
}

#[test]
fn test_unknown_package_is_reported_without_changes() -> Result<()> {
    let project = TestProject::empty()?;
    project.write("keep.txt", b"mine")?;
    LumiCommand::new(project.root()).args(&["init"]).assert_success()?;
    LumiCommand::new(project.root()).args(&["save", "g"]).assert_success()?;
    project.write("keep.txt", b"edited")?;

    let result = LumiCommand::new(project.root())
        .args(&["load", "g", "42", "--force"])
        .assert_failure()?;
    assert!(result.contains_stderr("Package '42' doesn't exist in group 'g'."));
    assert_eq!(project.read("keep.txt")?, b"edited");

    let result = LumiCommand::new(project.root())
        .args(&["load", "nope", "--force"])
        .assert_failure()?;
    assert!(result.contains_stderr("Package group 'nope' doesn't exist"));
    Ok(())
}

#[test]
fn test_empty_group_cannot_be_loaded() -> Result<()> {
    let project = TestProject::empty()?;
    LumiCommand::new(project.root()).args(&["init"]).assert_success()?;
    LumiCommand::new(project.root()).args(&["save", "g"]).assert_success()?;
    LumiCommand::new(project.root())
        .args(&["delete", "g", "0", "--force"])
        .assert_success()?;

    let history = LumiCommand::new(project.root()).args(&["history", "g"]).assert_success()?;
    assert!(history.contains_stdout("is empty"));

    let result = LumiCommand::new(project.root())
        .args(&["load", "g", "--force"])
        .assert_failure()?;
    assert!(result.contains_stderr("Package group 'g' is empty."));
    Ok(())
}

#[test]
fn test_empty_working_tree_round_trip() -> Result<()> {
    let project = TestProject::empty()?;
    LumiCommand::new(project.root()).args(&["init"]).assert_success()?;
    LumiCommand::new(project.root()).args(&["save", "blank"]).assert_success()?;

    project.write("later.txt", b"added after save")?;
    LumiCommand::new(project.root())
        .args(&["load", "blank", "--force"])
        .assert_success()?;
    assert!(!project.path("later.txt").exists());
    assert!(project.path(".lumi").is_dir());
    Ok(())
}
