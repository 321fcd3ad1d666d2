//! End-to-end tests for the create-spark binary (copy half only; the
//! install half needs a package manager and network, so it is skipped)

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// A minimal template tree with placeholders and a skippable directory.
fn fixture_template(root: &Path) {
    write(
        &root.join("package.json"),
        r#"{"name": "create-spark", "version": "1.0.0", "dependencies": {}}"#,
    );
    write(
        &root.join("app.json"),
        r#"{"expo": {"name": "{{PROJECT_NAME}}", "slug": "{{PROJECT_SLUG}}", "scheme": "createspark"}}"#,
    );
    write(&root.join("src/App.tsx"), "export default function App() {}\n");
    write(&root.join(".gitignore"), "node_modules/\n");
    write(&root.join("node_modules/leftover/index.js"), "junk");
}

#[test]
fn test_help_describes_the_command() {
    Command::cargo_bin("create-spark")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create-spark"))
        .stdout(predicate::str::contains("--skip-install"));
}

#[test]
fn test_project_name_is_required() {
    Command::cargo_bin("create-spark")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("PROJECT_NAME"));
}

#[test]
fn test_scaffolds_project_with_substitution() {
    let template = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    fixture_template(template.path());

    Command::cargo_bin("create-spark")
        .unwrap()
        .args(["My Cool App", "--skip-install"])
        .arg("--template-dir")
        .arg(template.path())
        .arg("--directory")
        .arg(target.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied 4/4 files"));

    let project = target.path().join("My Cool App");
    let app_json = fs::read_to_string(project.join("app.json")).unwrap();
    assert!(app_json.contains(r#""name": "My Cool App""#));
    assert!(app_json.contains(r#""slug": "my-cool-app""#));
    assert!(app_json.contains(r#""scheme": "mycoolapp""#));

    let package_json = fs::read_to_string(project.join("package.json")).unwrap();
    assert!(package_json.contains(r#""name": "My Cool App""#));

    assert!(project.join("src/App.tsx").is_file());
    assert!(project.join(".gitignore").is_file());
    assert!(!project.join("node_modules").exists());
}

#[test]
fn test_existing_destination_requires_force() {
    let template = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    fixture_template(template.path());
    fs::create_dir(target.path().join("taken")).unwrap();

    Command::cargo_bin("create-spark")
        .unwrap()
        .args(["taken", "--skip-install"])
        .arg("--template-dir")
        .arg(template.path())
        .arg("--directory")
        .arg(target.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    Command::cargo_bin("create-spark")
        .unwrap()
        .args(["taken", "--skip-install", "--force"])
        .arg("--template-dir")
        .arg(template.path())
        .arg("--directory")
        .arg(target.path())
        .assert()
        .success();
}

#[test]
fn test_missing_template_dir_fails_cleanly() {
    let target = tempfile::tempdir().unwrap();

    Command::cargo_bin("create-spark")
        .unwrap()
        .args(["my-app", "--skip-install"])
        .arg("--template-dir")
        .arg(target.path().join("no-such-template"))
        .arg("--directory")
        .arg(target.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("template directory not found"));
}
