//! # Output Configuration
//!
//! This module sets up logging for the CLI and decides whether log lines are
//! colored.
//!
//! Log lines are timestamped. Progress (`info` and below) goes to standard
//! output, while warnings and errors go to standard error, so
//! `devtree-sync ... 2>warnings.log` captures only what needs attention.
//! Two `env_logger` loggers, one per stream, sit behind a single `log::Log`
//! implementation that routes each record by level.
//!
//! ## Respecting User Preferences
//!
//! - `--log-level` sets the default filter; `RUST_LOG` overrides it
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;

use env_logger::{Logger, Target, WriteStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether log output should be colored.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stdout is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    /// Detect whether color output is supported based on environment.
    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// The `env_logger` write style matching this configuration.
    pub fn write_style(&self) -> WriteStyle {
        if self.use_color {
            WriteStyle::Always
        } else {
            WriteStyle::Never
        }
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Whether records at `level` belong on standard error.
pub fn is_diagnostic(level: Level) -> bool {
    level <= Level::Warn
}

/// Routes warnings and errors to stderr and everything else to stdout.
struct SplitLogger {
    stdout: Logger,
    stderr: Logger,
}

impl SplitLogger {
    fn new(config: &OutputConfig, level: LevelFilter, filter_env: &str) -> Self {
        Self {
            stdout: build_logger(config, level, filter_env, Target::Stdout),
            stderr: build_logger(config, level, filter_env, Target::Stderr),
        }
    }

    fn route(&self, level: Level) -> &Logger {
        if is_diagnostic(level) {
            &self.stderr
        } else {
            &self.stdout
        }
    }

    fn max_level(&self) -> LevelFilter {
        self.stdout.filter().max(self.stderr.filter())
    }
}

impl Log for SplitLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.route(metadata.level()).enabled(metadata)
    }

    fn log(&self, record: &Record) {
        self.route(record.level()).log(record)
    }

    fn flush(&self) {
        self.stdout.flush();
        self.stderr.flush();
    }
}

fn build_logger(
    config: &OutputConfig,
    level: LevelFilter,
    filter_env: &str,
    target: Target,
) -> Logger {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env(filter_env)
        .write_style(config.write_style())
        .format_timestamp_secs()
        .format_target(false)
        .target(target)
        .build()
}

/// Install the process-wide logger. Call once, before any logging.
pub fn init_logging(config: &OutputConfig, level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = SplitLogger::new(config, level, "RUST_LOG");
    let max_level = logger.max_level();
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max_level);
    Ok(())
}
