//! # Version-Control Capability
//!
//! The synchronizer never calls `git` directly. It talks to a
//! [`GitOperations`] implementation, which exposes exactly the primitives a
//! sync needs: reading the remote URL, cloning, fetching, branch inspection
//! and switching, and a fast-forward-only pull.
//!
//! [`DefaultGitOperations`] forwards to the functions in [`crate::git`],
//! which shell out to the system `git`. Tests substitute a mock that records
//! calls and returns canned results, so the synchronizer's decision logic can
//! be exercised without touching a real repository.

use std::path::Path;

use crate::error::Result;
use crate::git::{CloneOptions, PullOutcome};

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// URL of the checkout's `origin` remote, `None` if there is no `origin`.
    fn remote_url(&self, path: &Path) -> Result<Option<String>>;

    /// Clone `url` into `dest`, creating parent directories as needed.
    fn clone_repo(&self, url: &str, dest: &Path, options: &CloneOptions) -> Result<()>;

    /// Fetch all remote refs.
    fn fetch(&self, path: &Path) -> Result<()>;

    /// Whether local branch `name` exists.
    fn branch_exists(&self, path: &Path, name: &str) -> Result<bool>;

    /// Switch to existing local branch `name`.
    fn checkout(&self, path: &Path, name: &str) -> Result<()>;

    /// Create local branch `name` tracking `<remote>/<name>` and switch to it.
    fn create_tracking_branch(&self, path: &Path, name: &str, remote: &str) -> Result<()>;

    /// Fast-forward-only pull of the current branch.
    fn pull_fast_forward(&self, path: &Path) -> Result<PullOutcome>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command.
#[derive(Debug, Default)]
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn remote_url(&self, path: &Path) -> Result<Option<String>> {
        crate::git::remote_url(path)
    }

    fn clone_repo(&self, url: &str, dest: &Path, options: &CloneOptions) -> Result<()> {
        crate::git::clone(url, dest, options)
    }

    fn fetch(&self, path: &Path) -> Result<()> {
        crate::git::fetch_all(path)
    }

    fn branch_exists(&self, path: &Path, name: &str) -> Result<bool> {
        crate::git::branch_exists(path, name)
    }

    fn checkout(&self, path: &Path, name: &str) -> Result<()> {
        crate::git::checkout(path, name)
    }

    fn create_tracking_branch(&self, path: &Path, name: &str, remote: &str) -> Result<()> {
        crate::git::create_tracking_branch(path, name, remote)
    }

    fn pull_fast_forward(&self, path: &Path) -> Result<PullOutcome> {
        crate::git::pull_fast_forward(path)
    }
}

/// Compare a checkout's remote URL against the manifest URL.
///
/// Trailing slashes and a trailing `.git` are ignored, since git accepts
/// both spellings for the same remote.
pub fn urls_match(actual: &str, expected: &str) -> bool {
    fn normalize(url: &str) -> &str {
        let url = url.trim().trim_end_matches('/');
        url.strip_suffix(".git").unwrap_or(url)
    }
    normalize(actual) == normalize(expected)
}
