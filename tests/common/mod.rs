//! Shared test utilities for the E2E tests.
//!
//! Tests build throwaway upstream repositories in temp directories and point
//! a YAML manifest at them through `file://` URLs, so nothing touches the
//! network. Every test should start with
//! `if !git_available() { return; }` so the suite still passes on machines
//! without `git`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//! ```

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use assert_fs::prelude::*;
use assert_fs::TempDir;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{
        commit_count, current_branch, git, git_available, head_commit, remote_url, sync_cmd,
        upstream_of, write_manifest, Upstream,
    };
}

/// Whether a usable `git` binary is on PATH.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run git in `dir` with a fixed identity, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args([
            "-c",
            "user.name=Test User",
            "-c",
            "user.email=test@example.com",
            "-c",
            "init.defaultBranch=main",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .output()
        .expect("failed to spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// `devtree-sync` with the sync environment variables cleared.
pub fn sync_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("devtree-sync");
    cmd.env_remove("DEVTREE_SYNC_PARALLEL")
        .env_remove("DEVTREE_SYNC_JOBS")
        .env_remove("DEVTREE_SYNC_DEPTH")
        .env_remove("DEVTREE_SYNC_MANIFEST")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

/// A local repository standing in for a remote.
pub struct Upstream {
    _dir: TempDir,
    path: PathBuf,
}

impl Upstream {
    /// A repository on `main` with a single commit adding `README.md`.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("upstream");
        std::fs::create_dir_all(&path).unwrap();
        git(&path, &["init", "--quiet"]);
        git(&path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        let upstream = Self { _dir: dir, path };
        upstream.commit("README.md", "initial\n", "Initial commit");
        upstream
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `file://` URL, so `--depth` is honored.
    pub fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }

    /// Write `file` and commit it on the current branch.
    pub fn commit(&self, file: &str, content: &str, message: &str) {
        std::fs::write(self.path.join(file), content).unwrap();
        git(&self.path, &["add", file]);
        git(&self.path, &["commit", "--quiet", "-m", message]);
    }

    /// Create `branch` at HEAD with one extra commit, then return to `main`.
    pub fn branch_with_commit(&self, branch: &str, file: &str, content: &str) {
        git(&self.path, &["checkout", "--quiet", "-b", branch]);
        self.commit(file, content, &format!("Commit on {}", branch));
        git(&self.path, &["checkout", "--quiet", "main"]);
    }
}

/// Write a manifest file in `temp` and return its path.
pub fn write_manifest(temp: &TempDir, entries: &[(String, &str)]) -> PathBuf {
    let mut yaml = String::new();
    for (url, path) in entries {
        yaml.push_str(&format!("- url: \"{}\"\n  path: {}\n", url, path));
    }
    let file = temp.child("manifest.yaml");
    file.write_str(&yaml).unwrap();
    file.path().to_path_buf()
}

pub fn remote_url(checkout: &Path) -> String {
    git(checkout, &["config", "--get", "remote.origin.url"])
}

pub fn head_commit(checkout: &Path) -> String {
    git(checkout, &["rev-parse", "HEAD"])
}

pub fn current_branch(checkout: &Path) -> String {
    git(checkout, &["rev-parse", "--abbrev-ref", "HEAD"])
}

pub fn upstream_of(checkout: &Path) -> String {
    git(checkout, &["rev-parse", "--abbrev-ref", "@{upstream}"])
}

pub fn commit_count(checkout: &Path) -> usize {
    git(checkout, &["rev-list", "--count", "HEAD"]).parse().unwrap()
}
