// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Whether the git CLI is available; tests that need a real repository
/// skip themselves when it is not.
pub fn git_available() -> bool {
    which::which("git").is_ok()
}

/// Run a git command in `dir`, panicking on failure.
///
/// Identity and signing are pinned so the tests are independent of the
/// host's git configuration.
pub fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=protopack-tests",
            "-c",
            "user.email=tests@protopack.invalid",
            "-c",
            "init.defaultBranch=main",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "tag.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Create a repository with one empty commit.
pub fn init_repo() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    git(dir.path(), &["init"]);
    git(dir.path(), &["commit", "--allow-empty", "-m", "initial"]);
    dir
}

pub fn commit(dir: &Path, message: &str) {
    git(dir, &["commit", "--allow-empty", "-m", message]);
}

pub fn tag(dir: &Path, name: &str) {
    git(dir, &["tag", name]);
}

/// Create a recipe root with the default exported sources.
pub fn recipe_root() -> TempDir {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("CMakeLists.txt"), "project(stub-pack)\n").unwrap();
    std::fs::create_dir_all(root.path().join("src")).unwrap();
    std::fs::write(
        root.path().join("src/messages.proto"),
        "syntax = \"proto3\";\n",
    )
    .unwrap();
    root
}

/// Create a dependency store containing the default grpc pin.
pub fn store_with_default_pin() -> TempDir {
    let store = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(store.path().join("grpc/1.72.0/include")).unwrap();
    std::fs::create_dir_all(store.path().join("grpc/1.72.0/lib")).unwrap();
    store
}
