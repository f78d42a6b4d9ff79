//! # Error Handling
//!
//! This module defines the centralized error type for `devtree-sync`. It uses
//! `thiserror` to build an `Error` enum whose variants carry the context a user
//! needs to act on a failed run: the git command line, the checkout it ran in,
//! and whatever git printed on stderr.
//!
//! Only fatal failures are represented here. The two tolerated divergences
//! (a remote URL that does not match the manifest, and a rejected fast-forward)
//! are reported as warnings by the synchronizer and never become an `Error`.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for devtree-sync operations
#[derive(Error, Debug)]
pub enum Error {
    /// Cloning a manifest entry into its destination failed.
    ///
    /// Includes an optional hint for common causes such as missing
    /// credentials.
    #[error("Git clone error for {url} into {dest}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitClone {
        url: String,
        dest: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// A git command run inside an existing checkout failed.
    #[error("Git command failed in {path}: {command} - {stderr}")]
    GitCommand {
        command: String,
        path: String,
        stderr: String,
    },

    /// The manifest is malformed or contains an invalid entry.
    #[error("Manifest error: {message}")]
    Manifest { message: String },

    /// The run configuration is invalid.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Creating the parent directories of a destination failed.
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The parallel worker pool could not be started.
    #[error("Worker pool error: {message}")]
    ThreadPool { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
