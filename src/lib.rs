#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)] // Timestamp offsets are far from i64 limits

//! # pmash - Prerequisite Discovery by Access Time
//!
//! pmash runs an arbitrary command and reports which files beneath a set of
//! watched directories the command *read*, without instrumenting the command.
//!
//! Before the command runs every watched file has its atime pushed one second
//! behind its mtime. Afterwards, a file whose atime moved past that marker while
//! its mtime stayed put was read but not written: it is a prerequisite.
//!
//! ## Architecture
//!
//! - [`probe`]: checks that a watch directory's filesystem updates atime on read
//! - [`snapshot`]: the snapshot store and the pre-run / post-run walkers
//! - [`runner`]: runs the wrapped command through the shell
//! - [`classify`]: the prerequisite decision rule and report lines
//! - [`output`]: the prerequisite sink and stderr messages
//! - [`commands`]: the sequential pipeline tying the stages together
//! - [`config`]: optional TOML configuration
//!
//! ## Example Usage
//!
//! ```no_run
//! use pmash::PmashContext;
//!
//! # fn main() -> anyhow::Result<()> {
//! let ctx = PmashContext::builder("cc -c main.c -o main.o")
//!     .watch_dirs(vec![".".into()])
//!     .build()?;
//!
//! let succeeded = pmash::commands::audit::execute(&ctx)?;
//! # let _ = succeeded;
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Prerequisite classification and report formatting.
pub mod classify;

/// Pipeline implementations.
pub mod commands;

/// Configuration loading and validation.
pub mod config;

/// Output sink and user-facing messages.
pub mod output;

/// Filesystem atime capability probe.
pub mod probe;

/// Wrapped command execution.
pub mod runner;

/// Snapshot store and directory walkers.
pub mod snapshot;

/// Utility functions and helpers.
pub mod utils;

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::PathBuf;

/// Current version of the pmash binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable forcing command echoing when set to any value.
pub const VERBOSITY_ENV: &str = "PMASH_VERBOSITY";

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "PMASH_LOG";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "PMASH_CONFIG_PATH";

/// Watch directory used when neither `-w` nor the config names one.
pub const DEFAULT_WATCH_DIR: &str = ".";

/// Explicit state for one pmash run.
///
/// Everything the pipeline needs is carried here rather than in process-wide
/// globals: the command, the watch roots, the output destination and the
/// verbosity settings.
#[derive(Debug, Clone)]
pub struct PmashContext {
    /// Command string handed to the shell.
    pub command: String,

    /// Watch roots, in the order they are walked.
    pub watch_dirs: Vec<PathBuf>,

    /// File receiving the prerequisite list; stdout when `None`.
    pub outfile: Option<PathBuf>,

    /// Number of `-V` flags given. Non-zero annotates the report.
    pub verbosity: u8,

    /// Echo the invocation and run the command under `set -x`.
    pub trace_command: bool,

    /// Accepted for compatibility. Has no effect on the pipeline.
    pub errexit: bool,

    /// Shell used to interpret [`Self::command`].
    pub shell: PathBuf,

    /// Built-in markers plus configured exclusion patterns.
    pub exclude: utils::ExcludeRules,

    /// Full process invocation, echoed when tracing the command.
    pub invocation: Vec<OsString>,
}

impl PmashContext {
    /// Starts building a context for `command`.
    #[must_use]
    pub fn builder(command: impl Into<String>) -> PmashContextBuilder {
        PmashContextBuilder::new(command.into())
    }

    /// Creates a context from parsed arguments and the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured shell cannot be found on `PATH`.
    pub fn from_cli(cli: &cli::Cli, command: &str, config: &config::Config) -> Result<Self> {
        let mut watch_dirs = utils::paths::split_watch_list(&cli.watch);
        if watch_dirs.is_empty() {
            watch_dirs.clone_from(&config.watch.dirs);
        }

        PmashContextBuilder::new(command.to_string())
            .watch_dirs(watch_dirs)
            .outfile(cli.outfile.clone())
            .verbosity(cli.verbose)
            .trace_command(cli.verbose > 0 || std::env::var_os(VERBOSITY_ENV).is_some())
            .errexit(cli.errexit)
            .shell(config.command.shell.clone())
            .extra_excludes(config.watch.exclude.clone())
            .invocation(std::env::args_os().collect())
            .build()
    }

    /// Whether report lines carry raw timestamps.
    #[must_use]
    pub const fn annotate(&self) -> bool {
        self.verbosity > 0
    }
}

/// Builder for [`PmashContext`].
#[derive(Debug, Clone)]
pub struct PmashContextBuilder {
    /// Command string.
    command: String,
    /// Watch roots; defaults to the current directory when left empty.
    watch_dirs: Vec<PathBuf>,
    /// Output destination.
    outfile: Option<PathBuf>,
    /// `-V` count.
    verbosity: u8,
    /// Command echo switch.
    trace_command: bool,
    /// `-e` flag.
    errexit: bool,
    /// Shell name or path, resolved on build.
    shell: String,
    /// Patterns added after the built-in markers.
    extra_excludes: Vec<String>,
    /// Echoed invocation.
    invocation: Vec<OsString>,
}

impl PmashContextBuilder {
    /// Creates a builder with default settings.
    fn new(command: String) -> Self {
        Self {
            command,
            watch_dirs: Vec::new(),
            outfile: None,
            verbosity: 0,
            trace_command: false,
            errexit: false,
            shell: config::DEFAULT_SHELL.to_string(),
            extra_excludes: Vec::new(),
            invocation: Vec::new(),
        }
    }

    /// Sets the watch roots.
    #[must_use]
    pub fn watch_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.watch_dirs = dirs;
        self
    }

    /// Sets the output file.
    #[must_use]
    pub fn outfile(mut self, outfile: Option<PathBuf>) -> Self {
        self.outfile = outfile;
        self
    }

    /// Sets the verbosity level.
    #[must_use]
    pub fn verbosity(mut self, level: u8) -> Self {
        self.verbosity = level;
        self
    }

    /// Enables or disables command echoing.
    #[must_use]
    pub fn trace_command(mut self, on: bool) -> Self {
        self.trace_command = on;
        self
    }

    /// Records the `-e` flag.
    #[must_use]
    pub fn errexit(mut self, on: bool) -> Self {
        self.errexit = on;
        self
    }

    /// Sets the shell used to run the command.
    #[must_use]
    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Adds exclusion patterns on top of the built-in markers.
    #[must_use]
    pub fn extra_excludes(mut self, patterns: Vec<String>) -> Self {
        self.extra_excludes = patterns;
        self
    }

    /// Sets the invocation echoed in trace mode.
    #[must_use]
    pub fn invocation(mut self, args: Vec<OsString>) -> Self {
        self.invocation = args;
        self
    }

    /// Finishes the context, resolving the shell on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell cannot be found.
    pub fn build(self) -> Result<PmashContext> {
        let shell = which::which(&self.shell)
            .with_context(|| format!("Command interpreter not found: {}", self.shell))?;

        let watch_dirs = if self.watch_dirs.is_empty() {
            vec![PathBuf::from(DEFAULT_WATCH_DIR)]
        } else {
            self.watch_dirs
        };

        Ok(PmashContext {
            command: self.command,
            watch_dirs,
            outfile: self.outfile,
            verbosity: self.verbosity,
            trace_command: self.trace_command,
            errexit: self.errexit,
            shell,
            exclude: utils::ExcludeRules::new(self.extra_excludes),
            invocation: self.invocation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_to_current_dir() -> Result<()> {
        let ctx = PmashContext::builder("true").build()?;

        assert_eq!(ctx.watch_dirs, vec![PathBuf::from(".")]);
        assert!(ctx.outfile.is_none());
        assert!(!ctx.annotate());
        assert!(!ctx.trace_command);
        assert!(ctx.shell.is_absolute());
        Ok(())
    }

    #[test]
    fn test_builder_keeps_builtin_markers() -> Result<()> {
        let ctx = PmashContext::builder("true")
            .extra_excludes(vec!["*.o".to_string()])
            .build()?;

        assert_eq!(ctx.exclude.markers(), ["*.git*", "*.svn*", "*.swp*"]);
        assert_eq!(ctx.exclude.patterns(), ["*.o"]);
        Ok(())
    }

    #[test]
    fn test_builder_rejects_missing_shell() {
        let result = PmashContext::builder("true")
            .shell("definitely-not-a-shell-pmash")
            .build();

        assert!(result.is_err());
    }
}
