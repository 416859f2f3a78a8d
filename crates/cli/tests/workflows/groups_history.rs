//! Listing, history, tree and deletion of groups and packages

use crate::common::cli::LumiCommand;
use crate::common::TestProject;
use anyhow::Result;
use std::thread::sleep;
use std::time::Duration;

fn saved_project(saves: &[&str]) -> Result<(TestProject, Vec<String>)> {
    let project = TestProject::empty()?;
    LumiCommand::new(project.root()).args(&["init"]).assert_success()?;

    let mut names = Vec::new();
    for (i, group) in saves.iter().enumerate() {
        project.write("file.txt", format!("revision {}", i).as_bytes())?;
        let result = LumiCommand::new(project.root()).args(&["save", group]).assert_success()?;
        names.push(result.parse_package_name().unwrap_or_default());
        sleep(Duration::from_millis(20));
    }
    Ok((project, names))
}

#[test]
fn test_list_shows_most_recent_group_first() -> Result<()> {
    let (project, _) = saved_project(&["alpha", "beta"])?;

    let result = LumiCommand::new(project.root()).args(&["list"]).assert_success()?;
    let beta = result.stdout.find("beta").expect("beta listed");
    let alpha = result.stdout.find("alpha").expect("alpha listed");
    assert!(beta < alpha);
    Ok(())
}

#[test]
fn test_list_empty_repository() -> Result<()> {
    let (project, _) = saved_project(&[])?;
    let result = LumiCommand::new(project.root()).args(&["list"]).assert_success()?;
    assert!(result.contains_stdout("The repository is empty."));
    Ok(())
}

#[test]
fn test_history_is_chronological_with_indices() -> Result<()> {
    let saves = ["g"; 11];
    let (project, names) = saved_project(&saves)?;

    let result = LumiCommand::new(project.root()).args(&["history", "g"]).assert_success()?;
    let lines: Vec<&str> = result.stdout.lines().collect();
    assert_eq!(lines.len(), 11);
    assert!(lines[0].starts_with(" 0 "));
    assert!(lines[0].contains(&names[0]));
    assert!(lines[10].starts_with("10 "));
    assert!(lines[10].contains(&names[10]));
    Ok(())
}

#[test]
fn test_tree_shows_groups_and_packages() -> Result<()> {
    let (project, names) = saved_project(&["one", "two", "two"])?;

    let result = LumiCommand::new(project.root()).args(&["tree"]).assert_success()?;
    assert!(result.contains_stdout("├─ one"));
    assert!(result.contains_stdout("└─ two"));
    for name in &names {
        assert!(result.contains_stdout(name));
    }
    Ok(())
}

#[test]
fn test_delete_package_then_group() -> Result<()> {
    let (project, names) = saved_project(&["g", "g"])?;
    let root = project.root();

    let result = LumiCommand::new(root).args(&["delete", "g", "0", "--force"]).assert_success()?;
    assert!(result.contains_stdout(&names[0]));

    let history = LumiCommand::new(root).args(&["history", "g"]).assert_success()?;
    assert!(!history.contains_stdout(&names[0]));
    assert!(history.contains_stdout(&names[1]));

    LumiCommand::new(root).args(&["delete", "g", "--force"]).assert_success()?;
    let missing = LumiCommand::new(root).args(&["history", "g"]).assert_failure()?;
    assert!(missing.contains_stderr("doesn't exist"));
    Ok(())
}

#[test]
fn test_delete_prompt_can_be_declined() -> Result<()> {
    let (project, _) = saved_project(&["g"])?;
    let root = project.root();

    let result = LumiCommand::new(root).args(&["delete", "g"]).stdin("\n").assert_success()?;
    assert!(result.contains_stdout("Delete cancelled"));
    LumiCommand::new(root).args(&["history", "g"]).assert_success()?;
    Ok(())
}
