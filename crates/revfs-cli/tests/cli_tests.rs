//! Black-box tests driving the compiled binary against a fixture repository.

use std::process::Command;

use git2::{Repository, Signature, Time};
use tempfile::TempDir;

fn fixture_repo() -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repo.git");
    let repo = Repository::init_bare(&path).unwrap();

    let readme = repo.blob(b"hello world").unwrap();
    let mut docs = repo.treebuilder(None).unwrap();
    docs.insert("readme.txt", readme, 0o100644).unwrap();
    let docs_id = docs.write().unwrap();

    let mut root = repo.treebuilder(None).unwrap();
    root.insert("docs", docs_id, 0o040000).unwrap();
    let tree_id = root.write().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let sig = Signature::new("Fixture", "fixture@example.com", &Time::new(1_700_000_000, 0))
        .unwrap();
    let commit = repo
        .commit(None, &sig, &sig, "fixture", &tree, &[])
        .unwrap();
    repo.reference("refs/heads/main", commit, true, "fixture")
        .unwrap();
    repo.set_head("refs/heads/main").unwrap();

    let path = path.to_string_lossy().into_owned();
    (dir, path)
}

fn revfs(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_revfs"))
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn cat_prints_file_contents() {
    let (_dir, repo) = fixture_repo();
    let output = revfs(&["-C", &repo, "-r", "main", "cat", "/docs/readme.txt"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"hello world");
}

#[test]
fn ls_lists_the_root() {
    let (_dir, repo) = fixture_repo();
    let output = revfs(&["-C", &repo, "ls", "/"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("docs"));
}

#[test]
fn stat_reports_size_and_mode() {
    let (_dir, repo) = fixture_repo();
    let output = revfs(&["-C", &repo, "stat", "/docs/readme.txt"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("size:     11"));
    assert!(stdout.contains("mode:     100644"));
}

#[test]
fn missing_path_exits_nonzero() {
    let (_dir, repo) = fixture_repo();
    let output = revfs(&["-C", &repo, "cat", "/no/such/file"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("not found"));
}

#[test]
fn config_file_supplies_both_options() {
    let (_dir, repo) = fixture_repo();
    let config_dir = tempfile::tempdir().unwrap();
    let config_path = config_dir.path().join("site.json");
    std::fs::write(
        &config_path,
        format!(r#"{{"repository": {:?}, "revision": "main"}}"#, repo),
    )
    .unwrap();

    let output = revfs(&[
        "--config",
        &config_path.to_string_lossy(),
        "cat",
        "/docs/readme.txt",
    ]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"hello world");
}

#[test]
fn unknown_config_option_is_rejected() {
    let (_dir, repo) = fixture_repo();
    let config_dir = tempfile::tempdir().unwrap();
    let config_path = config_dir.path().join("site.json");
    std::fs::write(
        &config_path,
        format!(r#"{{"repository": {:?}, "branch": "main"}}"#, repo),
    )
    .unwrap();

    let output = revfs(&[
        "--config",
        &config_path.to_string_lossy(),
        "ls",
        "/",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("configuration"));
}

#[test]
fn bad_repository_path_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_string_lossy().into_owned();
    let output = revfs(&["-C", &path, "ls", "/"]);
    assert!(!output.status.success());
}
