use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn mdtidy() -> Command {
    let mut cmd = Command::cargo_bin("mdtidy").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_check_clean_document() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "clean.md", "# Title\n\nSome text.\n");

    mdtidy()
        .arg("check")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("No lint issues found!"));
}

#[test]
fn test_check_reports_issues_with_exit_code() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "skip.md", "# A\n\n### C\n");

    mdtidy()
        .arg("check")
        .arg(&file)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[MD001]"))
        .stdout(predicate::str::contains("1 error(s)"));
}

#[test]
fn test_check_missing_file_is_tool_error() {
    let dir = TempDir::new().unwrap();
    mdtidy()
        .arg("check")
        .arg(dir.path().join("missing.md"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Cannot open"));
}

#[test]
fn test_fix_rewrites_file() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "fix.md", "#Title\n\ntext  x \n");

    mdtidy().arg("fix").arg(&file).assert().success();
    assert_eq!(read(&file), "# Title\n\ntext  x\n");
}

#[test]
fn test_fix_leaves_unfixable_issues() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "skip.md", "# A\n\n### C\n");

    mdtidy()
        .arg("fix")
        .arg(&file)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("none fixable automatically"));
    assert_eq!(read(&file), "# A\n\n### C\n");
}

#[test]
fn test_fix_interactive_accepts_default() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "fix.md", "#Title\ntext \n");

    mdtidy()
        .args(["fix", "--interactive"])
        .arg(&file)
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("All issues fixed successfully!"));
    assert_eq!(read(&file), "# Title\n\ntext\n");
}

#[test]
fn test_fmt_and_check() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "fmt.md", "# A\n\n\n\ntext   \n");

    mdtidy().args(["fmt", "--check"]).arg(&file).assert().code(1);
    mdtidy()
        .arg("fmt")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Document formatted successfully!"));
    assert_eq!(read(&file), "# A\n\ntext\n");

    mdtidy().args(["fmt", "--check"]).arg(&file).assert().success();
    mdtidy()
        .arg("fmt")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Document is already formatted."));
}

#[test]
fn test_fmt_reports_unparsable_document() {
    let dir = TempDir::new().unwrap();
    let content = "# A\n\n```js\nlet x;\n";
    let file = write(&dir, "open.md", content);

    mdtidy()
        .arg("fmt")
        .arg(&file)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unterminated code fence"));
    assert_eq!(read(&file), content);
}

#[test]
fn test_toc_build_and_remove() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "toc.md", "# Doc\n\n## One\n\n## Two\n");

    mdtidy().arg("toc").arg(&file).assert().success();
    let with_toc = read(&file);
    assert!(with_toc.starts_with("## Table of Contents\n\n- [Doc](#doc)\n  - [One](#one)\n  - [Two](#two)\n"));

    mdtidy()
        .arg("toc")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));

    mdtidy().args(["toc", "--remove"]).arg(&file).assert().success();
    assert_eq!(read(&file), "# Doc\n\n## One\n\n## Two\n");
}

#[test]
fn test_config_prints_engine_config() {
    mdtidy()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"default\": true"))
        .stdout(predicate::str::contains("\"MD004\""));
}

#[test]
fn test_config_schema() {
    mdtidy()
        .args(["config", "--schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("prettierConfig"))
        .stdout(predicate::str::contains("postProcessingConfig"));
}

#[test]
fn test_settings_file_disables_linting() {
    let dir = TempDir::new().unwrap();
    let settings = write(&dir, "settings.json", r#"{"enableLinting": false}"#);
    let file = write(&dir, "bad.md", "#Bad\n");

    mdtidy()
        .arg("--config")
        .arg(&settings)
        .arg("check")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Linting is disabled"));
}

#[test]
fn test_settings_file_changes_rules() {
    let dir = TempDir::new().unwrap();
    let settings = write(&dir, "settings.toml", "[lintRules]\nheadingIncrement = false\n");
    let file = write(&dir, "skip.md", "# A\n\n### C\n");

    mdtidy()
        .arg("check")
        .arg(&file)
        .arg("--config")
        .arg(&settings)
        .assert()
        .success();
}

#[test]
fn test_invalid_settings_file() {
    let dir = TempDir::new().unwrap();
    let settings = write(&dir, "settings.json", "{ not json");

    mdtidy()
        .arg("--config")
        .arg(&settings)
        .arg("config")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to load settings"));
}

#[test]
fn test_engine_config_override() {
    let dir = TempDir::new().unwrap();
    let engine = write(&dir, ".markdownlint.json", r#"{"default": false, "MD018": true}"#);
    let file = write(&dir, "doc.md", "# A\n\n### C\n");

    mdtidy()
        .arg("--engine-config")
        .arg(&engine)
        .arg("check")
        .arg(&file)
        .assert()
        .success();

    let bad = write(&dir, "bad.md", "#Bad\n");
    mdtidy()
        .arg("--engine-config")
        .arg(&engine)
        .arg("check")
        .arg(&bad)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[MD018]"));
}

#[test]
fn test_completions_list() {
    mdtidy()
        .args(["completions", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bash"));
}
