//! # Device Tree Synchronizer
//!
//! This library clones or fast-forwards the set of git repositories that make
//! up an Android device tree (device, kernel, vendor and hardware
//! repositories) into a local directory. It backs the `devtree-sync`
//! command-line tool.
//!
//! ## Quick Example
//!
//! ```no_run
//! use devtree_sync::config::RunConfig;
//! use devtree_sync::manifest::Manifest;
//! use devtree_sync::sync::Synchronizer;
//!
//! let config = RunConfig::new("/src/lineage").with_depth(1).unwrap();
//! let report = Synchronizer::new(config).run(&Manifest::builtin()).unwrap();
//! println!("{} cloned, {} updated", report.cloned(), report.updated());
//! ```
//!
//! ## Core Concepts
//!
//! - **Manifest (`manifest`)**: the ordered `(url, path)` pairs to sync,
//!   either built in or loaded from YAML.
//! - **Run configuration (`config`)**: target root, branch, clone depth and
//!   scheduling, fixed for the whole run.
//! - **Git layer (`git`, `repository`)**: typed `git` invocations behind the
//!   `GitOperations` trait, so the synchronizer can be tested with a mock.
//! - **Synchronizer (`sync`)**: per entry, clone when there is no checkout,
//!   otherwise check the remote, fetch, switch branch and fast-forward.
//!
//! Remote URL mismatches and rejected fast-forwards are logged as warnings;
//! any other git failure aborts the run.

pub mod config;
pub mod error;
pub mod git;
pub mod manifest;
pub mod output;
pub mod repository;
pub mod sync;
