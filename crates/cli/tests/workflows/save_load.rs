//! Save and load round trips through the CLI

use crate::common::cli::LumiCommand;
use crate::common::TestProject;
use anyhow::Result;
use std::fs;

#[test]
fn test_save_then_load_restores_tree() -> Result<()> {
    let project = TestProject::small(1)?;
    let root = project.root();

    LumiCommand::new(root).args(&["init"]).assert_success()?;
    let before = project.snapshot()?;

    let saved = LumiCommand::new(root).args(&["save", "main"]).assert_success()?;
    assert!(saved.contains_stdout("Saved package"));
    assert!(saved.contains_stdout("1 deduplicated"));
    assert!(saved.parse_package_name().is_some());

    fs::remove_dir_all(project.path("src"))?;
    project.write("README.md", b"rewritten")?;
    project.write("scratch.txt", b"not in the package")?;

    LumiCommand::new(root).args(&["load", "main", "--force"]).assert_success()?;
    assert_eq!(project.snapshot()?, before);
    Ok(())
}

#[test]
fn test_load_prompt_can_be_declined() -> Result<()> {
    let project = TestProject::small(2)?;
    let root = project.root();

    LumiCommand::new(root).args(&["init"]).assert_success()?;
    LumiCommand::new(root).args(&["save", "main"]).assert_success()?;
    project.write("README.md", b"local edit")?;

    let result = LumiCommand::new(root)
        .args(&["load", "main"])
        .stdin("n\n")
        .assert_success()?;
    assert!(result.contains_stdout("Continue? [y/N]"));
    assert!(result.contains_stdout("Load cancelled"));
    assert_eq!(project.read("README.md")?, b"local edit");

    LumiCommand::new(root)
        .args(&["load", "main"])
        .stdin("y\n")
        .assert_success()?;
    assert_eq!(project.read("README.md")?, b"# sample\n");
    Ok(())
}

#[test]
fn test_load_keep_leaves_other_files() -> Result<()> {
    let project = TestProject::empty()?;
    let root = project.root();
    project.write("tracked.txt", b"v1")?;

    LumiCommand::new(root).args(&["init"]).assert_success()?;
    LumiCommand::new(root).args(&["save", "main"]).assert_success()?;

    project.write("tracked.txt", b"v2 with a longer body")?;
    project.write("untracked.txt", b"stay")?;

    LumiCommand::new(root)
        .args(&["load", "main", "--keep", "--force"])
        .assert_success()?;
    assert_eq!(project.read("tracked.txt")?, b"v1");
    assert_eq!(project.read("untracked.txt")?, b"stay");
    Ok(())
}

#[test]
fn test_load_by_index_and_name() -> Result<()> {
    let project = TestProject::empty()?;
    let root = project.root();
    LumiCommand::new(root).args(&["init"]).assert_success()?;

    project.write("f.txt", b"first")?;
    let first = LumiCommand::new(root).args(&["save", "g"]).assert_success()?;
    let first_name = first.parse_package_name().expect("package name in output");

    std::thread::sleep(std::time::Duration::from_millis(20));
    project.write("f.txt", b"second")?;
    LumiCommand::new(root).args(&["save", "g"]).assert_success()?;

    LumiCommand::new(root).args(&["load", "g", "0", "-f"]).assert_success()?;
    assert_eq!(project.read("f.txt")?, b"first");

    LumiCommand::new(root).args(&["load", "g", "-f"]).assert_success()?;
    assert_eq!(project.read("f.txt")?, b"second");

    LumiCommand::new(root).args(&["load", "g", &first_name, "-f"]).assert_success()?;
    assert_eq!(project.read("f.txt")?, b"first");
    Ok(())
}

#[test]
fn test_commands_work_from_subdirectory() -> Result<()> {
    let project = TestProject::small(3)?;
    let root = project.root();
    LumiCommand::new(root).args(&["init"]).assert_success()?;

    LumiCommand::new(project.path("src/util"))
        .args(&["save", "nested"])
        .assert_success()?;

    let list = LumiCommand::new(root).args(&["list"]).assert_success()?;
    assert!(list.contains_stdout("nested"));
    Ok(())
}

#[test]
fn test_load_prompt_names_repository_root_from_subdirectory() -> Result<()> {
    let project = TestProject::small(7)?;
    let root = project.root();
    LumiCommand::new(root).args(&["init"]).assert_success()?;
    LumiCommand::new(root).args(&["save", "main"]).assert_success()?;

    let result = LumiCommand::new(project.path("src/util"))
        .args(&["load", "main"])
        .stdin("n\n")
        .assert_success()?;
    let shown = std::fs::canonicalize(root)?;
    assert!(result.contains_stdout(&format!("Working tree: {}", shown.display())));
    assert!(result.contains_stdout("Load cancelled"));
    Ok(())
}
