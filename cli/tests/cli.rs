use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn codepack(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("codepack").unwrap();
    cmd.current_dir(dir).env_remove("CODEPACK_ROOT");
    cmd
}

fn touch(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn sample_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "src/main.rs", "fn main() {}\n");
    touch(dir.path(), "docs/guide.md", "# demo\n");
    touch(dir.path(), "node_modules/left-pad/index.js", "module.exports = 1;\n");
    dir
}

#[test]
fn packs_project_and_creates_ignore_file() {
    let dir = sample_project();
    codepack(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    let ignore = fs::read_to_string(dir.path().join(".cpignore")).unwrap();
    assert!(ignore.lines().any(|l| l == "node_modules"));
    assert!(ignore.lines().any(|l| l == "codebase.md"));

    let output = fs::read_to_string(dir.path().join("codebase.md")).unwrap();
    assert!(output.starts_with("### Project Structure\n"));
    assert!(output.contains("main.rs\n```\nfn main() {}\n```\n\n"));
    assert!(output.contains("guide.md\n```\n# demo\n```"));
    assert!(!output.contains("module.exports"));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let dir = sample_project();
    codepack(dir.path()).assert().success();
    let first = fs::read(dir.path().join("codebase.md")).unwrap();
    codepack(dir.path()).assert().success();
    let second = fs::read(dir.path().join("codebase.md")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn output_flag_and_relative_paths() {
    let dir = sample_project();
    codepack(dir.path())
        .args(["-o", "context.md", "--relative-paths", "--tree", "off"])
        .assert()
        .success();

    assert!(!dir.path().join("codebase.md").exists());
    let output = fs::read_to_string(dir.path().join("context.md")).unwrap();
    assert!(output.starts_with("### docs/guide.md\n"));
    assert!(output.contains("### src/main.rs\n"));
    assert!(!output.contains("### context.md"));
}

#[test]
fn gitignore_negation_reincludes_file() {
    let dir = sample_project();
    touch(dir.path(), ".gitignore", "*.txt\n!keep.txt\n");
    touch(dir.path(), "drop.txt", "dropped\n");
    touch(dir.path(), "keep.txt", "kept\n");

    codepack(dir.path())
        .args(["--relative-paths", "--tree", "off"])
        .assert()
        .success();

    let output = fs::read_to_string(dir.path().join("codebase.md")).unwrap();
    assert!(output.contains("### keep.txt\n```\nkept\n```"));
    assert!(!output.contains("drop.txt"));
}

#[test]
fn dry_run_writes_nothing() {
    let dir = sample_project();
    codepack(dir.path())
        .args(["--dry-run", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"path\": \"src/main.rs\""))
        .stdout(predicate::str::contains("node_modules").not());

    assert!(!dir.path().join("codebase.md").exists());
    assert!(!dir.path().join(".cpignore").exists());
}

#[test]
fn project_root_flag_packs_another_directory() {
    let project = sample_project();
    let elsewhere = TempDir::new().unwrap();
    codepack(elsewhere.path())
        .arg("--project-root")
        .arg(project.path())
        .arg("-q")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(project.path().join("codebase.md").exists());
    assert!(!elsewhere.path().join("codebase.md").exists());
}

#[test]
fn invalid_max_file_size_exits_with_argument_error() {
    let dir = sample_project();
    codepack(dir.path())
        .args(["--max-file-size", "lots"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Invalid max file size"));
    assert!(!dir.path().join("codebase.md").exists());
}

#[test]
fn broken_config_file_exits_with_config_error() {
    let dir = sample_project();
    touch(dir.path(), ".codepack/codepack.toml", "[output\n");
    codepack(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("codepack.toml"));
}

#[test]
fn config_file_settings_apply() {
    let dir = sample_project();
    touch(
        dir.path(),
        ".codepack/codepack.toml",
        "[output]\nfile = \"from-config.md\"\nrelative_paths = true\n\n[tree]\nmode = \"off\"\n",
    );
    codepack(dir.path()).assert().success();

    let output = fs::read_to_string(dir.path().join("from-config.md")).unwrap();
    assert!(output.starts_with("### docs/guide.md\n"));
}
