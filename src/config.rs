//! Run configuration.
//!
//! A [`RunConfig`] is assembled once from command-line arguments and
//! environment variables and is read-only for the rest of the run.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::git::CloneOptions;

/// How manifest entries are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    /// One entry at a time, in manifest order.
    #[default]
    Sequential,
    /// One task per entry on a bounded worker pool.
    ///
    /// Without an explicit bound the pool is sized to the number of logical
    /// processors.
    Parallel { max_workers: Option<NonZeroUsize> },
}

/// Settings shared by every entry of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    target_root: PathBuf,
    branch: Option<String>,
    depth: Option<u32>,
    schedule: Schedule,
}

impl RunConfig {
    pub fn new(target_root: impl Into<PathBuf>) -> Self {
        Self {
            target_root: target_root.into(),
            branch: None,
            depth: None,
            schedule: Schedule::Sequential,
        }
    }

    /// Check out `branch` in every repository.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Result<Self> {
        let branch = branch.into();
        if branch.trim().is_empty() {
            return Err(Error::Config {
                message: "branch name must not be empty".to_string(),
            });
        }
        if branch.starts_with('-') {
            return Err(Error::Config {
                message: format!("branch name '{}' must not start with '-'", branch),
            });
        }
        self.branch = Some(branch);
        Ok(self)
    }

    /// Limit fresh clones to the `depth` most recent commits.
    pub fn with_depth(mut self, depth: u32) -> Result<Self> {
        if depth == 0 {
            return Err(Error::Config {
                message: "clone depth must be at least 1".to_string(),
            });
        }
        self.depth = Some(depth);
        Ok(self)
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn depth(&self) -> Option<u32> {
        self.depth
    }

    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Clone options derived from the configured depth and branch.
    pub fn clone_options(&self) -> CloneOptions {
        let mut options = CloneOptions::new();
        if let Some(depth) = self.depth {
            options = options.depth(depth);
        }
        if let Some(branch) = &self.branch {
            options = options.branch(branch.clone());
        }
        options
    }

    /// Number of workers for `entries` manifest entries in parallel mode.
    pub fn worker_count(&self, entries: usize, available: usize) -> usize {
        let bound = match self.schedule {
            Schedule::Parallel {
                max_workers: Some(max),
            } => max.get(),
            _ => available,
        };
        bound.min(entries).max(1)
    }
}

/// Logical processor count, falling back to 1 when it cannot be determined.
pub fn available_processors() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
