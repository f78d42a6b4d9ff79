//! # Repository Synchronizer
//!
//! For each manifest entry the synchronizer either clones a fresh checkout or
//! brings an existing one up to date:
//!
//! - **No checkout at the destination**: parent directories are created and
//!   the repository is cloned, honoring the configured depth and branch.
//! - **Existing checkout**: the `origin` URL is compared with the manifest,
//!   all remotes are fetched, the configured branch (if any) is checked out
//!   or created as a tracking branch, and a fast-forward-only pull is run.
//!
//! A remote URL mismatch and a rejected fast-forward are warnings; the run
//! continues. Every other failure aborts the run. In sequential mode nothing
//! after the failing entry is touched. In parallel mode no new entries are
//! started, but entries already in flight finish.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::{self, RunConfig, Schedule};
use crate::error::{Error, Result};
use crate::git::{self, PullOutcome, DEFAULT_REMOTE};
use crate::manifest::{Manifest, ManifestEntry};
use crate::repository::{urls_match, DefaultGitOperations, GitOperations};

/// What happened to a single manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The destination had no checkout and was cloned.
    Cloned,
    /// An existing checkout was fetched and pulled.
    Updated {
        /// The checkout's `origin` did not match the manifest URL.
        url_mismatch: bool,
        /// Whether the fast-forward pull succeeded.
        fast_forwarded: bool,
    },
}

impl SyncOutcome {
    /// Number of tolerated divergences recorded for this entry.
    pub fn warnings(&self) -> usize {
        match self {
            SyncOutcome::Cloned => 0,
            SyncOutcome::Updated {
                url_mismatch,
                fast_forwarded,
            } => usize::from(*url_mismatch) + usize::from(!*fast_forwarded),
        }
    }
}

/// Outcome of one entry, keyed by its manifest path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub path: PathBuf,
    pub outcome: SyncOutcome,
}

/// Per-entry outcomes of a completed run, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub entries: Vec<EntryReport>,
}

impl SyncReport {
    pub fn cloned(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == SyncOutcome::Cloned)
            .count()
    }

    pub fn updated(&self) -> usize {
        self.entries.len() - self.cloned()
    }

    pub fn warnings(&self) -> usize {
        self.entries.iter().map(|e| e.outcome.warnings()).sum()
    }
}

/// Drives a run over a manifest.
pub struct Synchronizer {
    git_ops: Box<dyn GitOperations>,
    config: RunConfig,
}

impl Synchronizer {
    /// A synchronizer backed by the system `git`.
    pub fn new(config: RunConfig) -> Self {
        Self::with_operations(Box::new(DefaultGitOperations), config)
    }

    /// A synchronizer using custom git operations.
    pub fn with_operations(git_ops: Box<dyn GitOperations>, config: RunConfig) -> Self {
        Self { git_ops, config }
    }

    /// Synchronize every entry of `manifest`.
    pub fn run(&self, manifest: &Manifest) -> Result<SyncReport> {
        let entries = match self.config.schedule() {
            Schedule::Sequential => self.run_sequential(manifest)?,
            Schedule::Parallel { .. } => self.run_parallel(manifest)?,
        };
        Ok(SyncReport { entries })
    }

    fn run_sequential(&self, manifest: &Manifest) -> Result<Vec<EntryReport>> {
        manifest
            .entries()
            .iter()
            .map(|entry| self.sync_entry(entry))
            .collect()
    }

    fn run_parallel(&self, manifest: &Manifest) -> Result<Vec<EntryReport>> {
        let workers = self
            .config
            .worker_count(manifest.len(), config::available_processors());
        debug!(
            "syncing {} repositories on {} workers",
            manifest.len(),
            workers
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("sync-worker-{}", i))
            .build()
            .map_err(|e| Error::ThreadPool {
                message: e.to_string(),
            })?;

        pool.install(|| {
            manifest
                .entries()
                .par_iter()
                .map(|entry| self.sync_entry(entry))
                .collect()
        })
    }

    /// Clone or update a single entry.
    pub fn sync_entry(&self, entry: &ManifestEntry) -> Result<EntryReport> {
        let dest = entry.destination(self.config.target_root());
        let outcome = if git::is_checkout(&dest) {
            self.update_entry(entry, &dest)?
        } else {
            self.clone_entry(entry, &dest)?
        };
        Ok(EntryReport {
            path: entry.path.clone(),
            outcome,
        })
    }

    fn clone_entry(&self, entry: &ManifestEntry, dest: &Path) -> Result<SyncOutcome> {
        let options = self.config.clone_options();
        let mut detail = Vec::new();
        if let Some(depth) = options.depth_limit() {
            detail.push(format!("depth {}", depth));
        }
        if let Some(branch) = options.branch_name() {
            detail.push(format!("branch {}", branch));
        }
        if detail.is_empty() {
            info!("cloning {} into {}", entry.url, dest.display());
        } else {
            info!(
                "cloning {} into {} ({})",
                entry.url,
                dest.display(),
                detail.join(", ")
            );
        }

        self.git_ops.clone_repo(&entry.url, dest, &options)?;
        Ok(SyncOutcome::Cloned)
    }

    fn update_entry(&self, entry: &ManifestEntry, dest: &Path) -> Result<SyncOutcome> {
        info!("updating {}", dest.display());

        let url_mismatch = match self.git_ops.remote_url(dest)? {
            Some(actual) if urls_match(&actual, &entry.url) => false,
            Some(actual) => {
                warn!(
                    "{}: remote URL mismatch (expected {}, found {}); updating from the existing remote",
                    dest.display(),
                    entry.url,
                    actual
                );
                true
            }
            None => {
                warn!(
                    "{}: remote URL mismatch (expected {}, found no '{}' remote)",
                    dest.display(),
                    entry.url,
                    DEFAULT_REMOTE
                );
                true
            }
        };

        self.git_ops.fetch(dest)?;

        if let Some(branch) = self.config.branch() {
            if self.git_ops.branch_exists(dest, branch)? {
                debug!("{}: checking out {}", dest.display(), branch);
                self.git_ops.checkout(dest, branch)?;
            } else {
                info!(
                    "{}: creating {} tracking {}/{}",
                    dest.display(),
                    branch,
                    DEFAULT_REMOTE,
                    branch
                );
                self.git_ops
                    .create_tracking_branch(dest, branch, DEFAULT_REMOTE)?;
            }
        }

        let fast_forwarded = match self.git_ops.pull_fast_forward(dest)? {
            PullOutcome::FastForwarded => true,
            PullOutcome::Rejected { reason } => {
                warn!(
                    "{}: fast-forward rejected, leaving local history in place: {}",
                    dest.display(),
                    reason
                );
                false
            }
        };

        Ok(SyncOutcome::Updated {
            url_mismatch,
            fast_forwarded,
        })
    }
}
