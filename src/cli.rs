//! CLI argument parsing and execution

use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::Parser;
use log::{info, LevelFilter};

use devtree_sync::config::{RunConfig, Schedule};
use devtree_sync::manifest::Manifest;
use devtree_sync::output::{self, OutputConfig};
use devtree_sync::sync::Synchronizer;

/// Clone or fast-forward the repositories of an Android device tree
#[derive(Parser, Debug)]
#[command(name = "devtree-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Root directory of the tree; manifest paths are resolved against it
    #[arg(value_name = "TARGET")]
    target: PathBuf,

    /// Branch to check out in every repository
    #[arg(value_name = "BRANCH")]
    branch: Option<String>,

    /// Sync repositories concurrently, one worker per repository up to the
    /// number of logical processors
    #[arg(long, env = "DEVTREE_SYNC_PARALLEL", value_parser = FalseyValueParser::new())]
    parallel: bool,

    /// Upper bound on parallel workers
    #[arg(long, value_name = "N", env = "DEVTREE_SYNC_JOBS", requires = "parallel")]
    jobs: Option<NonZeroUsize>,

    /// Shallow-clone new repositories with history limited to N commits
    #[arg(long, value_name = "N", env = "DEVTREE_SYNC_DEPTH",
          value_parser = clap::value_parser!(u32).range(1..))]
    depth: Option<u32>,

    /// YAML manifest to use instead of the built-in repository list
    #[arg(long, value_name = "FILE", env = "DEVTREE_SYNC_MANIFEST")]
    manifest: Option<PathBuf>,

    /// Print the manifest and exit without syncing
    #[arg(long)]
    list: bool,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto",
          value_parser = ["always", "never", "auto"])]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info",
          value_parser = ["error", "warn", "info", "debug", "trace"])]
    log_level: String,
}

impl Cli {
    /// Execute the sync described by the parsed arguments
    pub fn execute(self) -> Result<()> {
        let output_config = OutputConfig::from_env_and_flag(&self.color);
        let level: LevelFilter = self
            .log_level
            .parse()
            .with_context(|| format!("invalid log level '{}'", self.log_level))?;
        output::init_logging(&output_config, level).context("failed to initialize logging")?;

        let manifest = self.load_manifest()?;

        if self.list {
            for entry in manifest.entries() {
                println!("{} -> {}", entry.url, entry.path.display());
            }
            return Ok(());
        }

        let config = self.run_config()?;
        let report = Synchronizer::new(config)
            .run(&manifest)
            .context("sync aborted")?;

        info!(
            "synced {} repositories ({} cloned, {} updated, {} warnings)",
            report.entries.len(),
            report.cloned(),
            report.updated(),
            report.warnings()
        );
        Ok(())
    }

    fn load_manifest(&self) -> Result<Manifest> {
        match &self.manifest {
            Some(path) => Manifest::from_file(path)
                .with_context(|| format!("Failed to load manifest from {}", path.display())),
            None => Ok(Manifest::builtin()),
        }
    }

    fn run_config(&self) -> Result<RunConfig> {
        let mut config = RunConfig::new(&self.target);
        if let Some(branch) = &self.branch {
            config = config.with_branch(branch.clone())?;
        }
        if let Some(depth) = self.depth {
            config = config.with_depth(depth)?;
        }
        if self.parallel {
            config = config.with_schedule(Schedule::Parallel {
                max_workers: self.jobs,
            });
        }
        Ok(config)
    }
}
