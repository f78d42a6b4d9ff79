//! Thin wrappers around the system `git` command.
//!
//! Every git invocation goes through [`GitCommand`], which owns the working
//! directory and argument list and turns non-zero exits into
//! [`Error::GitCommand`]. Using the system binary means SSH keys, credential
//! helpers and anything else configured in `~/.gitconfig` just work.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::error::{Error, Result};

/// Name of the remote created by `git clone`.
pub const DEFAULT_REMOTE: &str = "origin";

/// Builder for a single `git` invocation.
#[derive(Debug, Clone, Default)]
pub struct GitCommand {
    dir: Option<PathBuf>,
    args: Vec<OsString>,
}

impl GitCommand {
    /// A git command run from the current working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// A git command run inside `dir` (`git -C <dir> ...`).
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            dir: Some(dir.to_path_buf()),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Human-readable command line, used in logs and errors.
    pub fn display(&self) -> String {
        let mut parts = vec!["git".to_string()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    fn location(&self) -> String {
        self.dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| ".".to_string())
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("git");
        if let Some(dir) = &self.dir {
            cmd.arg("-C").arg(dir);
        }
        cmd.args(&self.args)
            // Fail instead of blocking a worker on a credential prompt
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null());
        cmd
    }

    /// Run the command and return its raw output, whatever the exit status.
    ///
    /// Only a failure to spawn `git` at all is an error here.
    pub fn output(&self) -> Result<Output> {
        self.command().output().map_err(|e| Error::GitCommand {
            command: self.display(),
            path: self.location(),
            stderr: e.to_string(),
        })
    }

    /// Run the command, requiring success. Returns trimmed stdout.
    pub fn run(&self) -> Result<String> {
        let output = self.output()?;
        if !output.status.success() {
            return Err(self.failure(&output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn failure(&self, output: &Output) -> Error {
        Error::GitCommand {
            command: self.display(),
            path: self.location(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

/// Typed options for a fresh clone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneOptions {
    depth: Option<u32>,
    branch: Option<String>,
}

impl CloneOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit history to the `depth` most recent commits.
    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Check out `branch` instead of the remote's default branch.
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn depth_limit(&self) -> Option<u32> {
        self.depth
    }

    pub fn branch_name(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// Arguments placed between `git clone` and the URL.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(depth) = self.depth {
            args.push("--depth".to_string());
            args.push(depth.to_string());
            // `--depth` implies `--single-branch`, which would leave later
            // runs unable to track any other branch of the remote
            args.push("--no-single-branch".to_string());
        }
        if let Some(branch) = &self.branch {
            args.push("--branch".to_string());
            args.push(branch.clone());
        }
        args
    }
}

/// Result of a fast-forward-only pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    /// The checkout now matches its upstream (including "already up to date").
    FastForwarded,
    /// Git refused to fast-forward; `reason` is what it printed.
    Rejected { reason: String },
}

/// Whether `path` holds a git checkout (a `.git` directory or gitfile).
pub fn is_checkout(path: &Path) -> bool {
    path.join(".git").exists()
}

/// Clone `url` into `dest`, creating missing parent directories first.
pub fn clone(url: &str, dest: &Path, options: &CloneOptions) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let cmd = GitCommand::new()
        .arg("clone")
        .args(options.to_args())
        .arg("--")
        .arg(url)
        .arg(dest);
    let output = cmd.output().map_err(|e| Error::GitClone {
        url: url.to_string(),
        dest: dest.display().to_string(),
        message: e.to_string(),
        hint: None,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(Error::GitClone {
            url: url.to_string(),
            dest: dest.display().to_string(),
            hint: clone_hint(&stderr, options),
            message: stderr,
        });
    }

    Ok(())
}

fn clone_hint(stderr: &str, options: &CloneOptions) -> Option<String> {
    if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
        || stderr.contains("terminal prompts disabled")
    {
        Some(
            "make sure you have access to the repository (SSH key in ssh-agent, \
             credential helper, or personal access token)"
                .to_string(),
        )
    } else if let Some(branch) = options.branch_name().filter(|_| {
        stderr.contains("Remote branch") && stderr.contains("not found")
    }) {
        Some(format!("branch '{}' does not exist on this remote", branch))
    } else {
        None
    }
}

/// URL of the checkout's `origin` remote, or `None` if it has no `origin`.
pub fn remote_url(path: &Path) -> Result<Option<String>> {
    let cmd = GitCommand::in_dir(path).args(["config", "--get", "remote.origin.url"]);
    let output = cmd.output()?;
    match output.status.code() {
        Some(0) => Ok(Some(
            String::from_utf8_lossy(&output.stdout).trim().to_string(),
        )),
        // `git config --get` exits 1 when the key is unset
        Some(1) => Ok(None),
        _ => Err(cmd.failure(&output)),
    }
}

/// Fetch every remote's refs.
pub fn fetch_all(path: &Path) -> Result<()> {
    GitCommand::in_dir(path).args(["fetch", "--all"]).run()?;
    Ok(())
}

/// Whether a local branch `name` exists in the checkout.
pub fn branch_exists(path: &Path, name: &str) -> Result<bool> {
    let output = GitCommand::in_dir(path)
        .args(["show-ref", "--verify", "--quiet"])
        .arg(format!("refs/heads/{}", name))
        .output()?;
    Ok(output.status.success())
}

/// Switch to an existing local branch.
pub fn checkout(path: &Path, name: &str) -> Result<()> {
    GitCommand::in_dir(path)
        .arg("checkout")
        .arg(name)
        .arg("--")
        .run()?;
    Ok(())
}

/// Create local branch `name` tracking `<remote>/<name>` and switch to it.
pub fn create_tracking_branch(path: &Path, name: &str, remote: &str) -> Result<()> {
    GitCommand::in_dir(path)
        .args(["checkout", "-b", name, "--track"])
        .arg(format!("{}/{}", remote, name))
        .run()?;
    Ok(())
}

/// `git pull --ff-only`. A non-zero exit is reported as a rejection rather
/// than an error so the caller can decide how to treat it.
pub fn pull_fast_forward(path: &Path) -> Result<PullOutcome> {
    let output = GitCommand::in_dir(path).args(["pull", "--ff-only"]).output()?;
    if output.status.success() {
        return Ok(PullOutcome::FastForwarded);
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let reason = stderr
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("fatal:"))
        .or_else(|| stderr.lines().map(str::trim).find(|l| !l.is_empty()))
        .unwrap_or("git pull --ff-only exited unsuccessfully")
        .to_string();
    Ok(PullOutcome::Rejected { reason })
}
