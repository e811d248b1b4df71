//! Command-line interface definitions for pmash.
//!
//! The CLI definition is shared between the main binary and the xtask tool
//! that renders the man page.
//!
//! Note: Field-level documentation is provided via clap attributes, so we allow
//! missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{ArgAction, Parser};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for pmash.
///
/// `-V` means verbose here, so clap's automatic version flag is disabled.
#[derive(Parser, Debug)]
#[command(
    name = "pmash",
    version = crate::VERSION,
    disable_version_flag = true,
    about = "Report which watched files a command reads",
    long_about = "Runs a command and lists the files beneath the watched directories \
                  that it read, judged by access-time movement"
)]
pub struct Cli {
    /// Command to invoke
    #[arg(
        short,
        long,
        value_name = "CMD",
        required_unless_present = "completions"
    )]
    pub command: Option<String>,

    /// Exit on first error
    #[arg(short, long)]
    pub errexit: bool,

    /// File path to save prereq list
    #[arg(short, long, value_name = "OUTFILE")]
    pub outfile: Option<PathBuf>,

    /// Bump verbosity mode
    #[arg(short = 'V', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Directories to monitor
    #[arg(short, long, value_name = "DIR[,DIR...]")]
    pub watch: Vec<String>,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL", hide = true)]
    pub completions: Option<Shell>,
}
