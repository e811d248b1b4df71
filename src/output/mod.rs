//! Output for the pmash CLI.
//!
//! The prerequisite list goes to an [`OutputSink`] (stdout or a file).
//! Diagnostics go to stderr through the helpers below and never mix with the
//! list.

mod sink;

use colored::Colorize;

pub use sink::OutputSink;

/// Prints a fatal error as `<prog>: Error: <message>` (always shown).
pub fn error(prog: &str, message: &str) {
    eprintln!("{prog}: {} {message}", "Error:".red().bold());
}

/// Returns the program name from `argv[0]`, without directories.
#[must_use]
pub fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .map(std::path::Path::new)
        .and_then(std::path::Path::file_name)
        .map_or_else(
            || "pmash".to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
}
