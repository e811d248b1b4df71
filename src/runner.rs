//! Wrapped command execution.
//!
//! The command string is handed to the shell untouched so pipes, redirections
//! and other metacharacters behave as typed. Standard streams are inherited;
//! only the exit status is observed.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Instant;
use tracing::{Level, debug, info, span};

/// Prefix that makes the shell trace each command it runs.
pub const TRACE_PREFIX: &str = "set -x; ";

/// Renders an invocation for echoing: `++ ` then every argument, with
/// arguments containing a space wrapped in double quotes.
#[must_use]
pub fn format_invocation(args: &[OsString]) -> String {
    let rendered: Vec<String> = args
        .iter()
        .map(|arg| {
            let arg = arg.to_string_lossy();
            if arg.contains(' ') {
                format!("\"{arg}\"")
            } else {
                arg.into_owned()
            }
        })
        .collect();
    format!("++ {}", rendered.join(" "))
}

/// Returns the command string the shell will run.
#[must_use]
pub fn shell_command(command: &str, trace: bool) -> String {
    if trace {
        format!("{TRACE_PREFIX}{command}")
    } else {
        command.to_string()
    }
}

/// Runs `command` through `shell -c` and waits for it.
///
/// With `trace` set, `invocation` is echoed to `echo` first and the shell
/// traces the command as it runs.
///
/// Returns whether the command exited successfully.
///
/// # Errors
///
/// Returns an error only if the shell cannot be started or waited on. A
/// command that runs and fails is reported as `Ok(false)`.
pub fn run_command(
    shell: &Path,
    command: &str,
    trace: bool,
    invocation: &[OsString],
    echo: &mut dyn Write,
) -> Result<bool> {
    let span = span!(Level::DEBUG, "run_command", shell = %shell.display());
    let _guard = span.enter();

    if trace {
        writeln!(echo, "{}", format_invocation(invocation))?;
        echo.flush()?;
    }

    let script = shell_command(command, trace);
    debug!(command = %script, "Starting command");

    let started = Instant::now();
    let status = Command::new(shell)
        .arg("-c")
        .arg(&script)
        .status()
        .with_context(|| format!("Failed to run {}", shell.display()))?;

    info!(
        %status,
        elapsed = %humantime::format_duration(started.elapsed()),
        "Command finished"
    );

    Ok(status.success())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh() -> std::path::PathBuf {
        which::which("sh").unwrap()
    }

    #[test]
    fn test_format_invocation_quotes_spaced_args() {
        let args: Vec<OsString> = ["pmash", "-c", "cat a > b", "-V"]
            .iter()
            .map(OsString::from)
            .collect();

        assert_eq!(format_invocation(&args), "++ pmash -c \"cat a > b\" -V");
    }

    #[test]
    fn test_shell_command_trace_prefix() {
        assert_eq!(shell_command("make", false), "make");
        assert_eq!(shell_command("make", true), "set -x; make");
    }

    #[test]
    fn test_run_command_reports_status() -> Result<()> {
        let mut echo = Vec::new();

        assert!(run_command(&sh(), "true", false, &[], &mut echo)?);
        assert!(!run_command(&sh(), "exit 3", false, &[], &mut echo)?);
        assert!(echo.is_empty());
        Ok(())
    }

    #[test]
    fn test_run_command_echoes_when_tracing() -> Result<()> {
        let mut echo = Vec::new();
        let invocation = vec![OsString::from("pmash"), OsString::from("a b")];

        run_command(&sh(), "true", true, &invocation, &mut echo)?;

        assert_eq!(String::from_utf8(echo)?, "++ pmash \"a b\"\n");
        Ok(())
    }

    #[test]
    fn test_run_command_honours_shell_syntax() -> Result<()> {
        let temp_dir = tempfile::TempDir::new()?;
        let out = temp_dir.path().join("out.txt");
        let command = format!("echo hi | tr a-z A-Z > '{}'", out.display());

        assert!(run_command(&sh(), &command, false, &[], &mut Vec::new())?);
        assert_eq!(std::fs::read_to_string(out)?, "HI\n");
        Ok(())
    }
}
