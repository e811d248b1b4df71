use crate::PmashContext;
use crate::classify;
use crate::output::OutputSink;
use crate::probe;
use crate::runner;
use crate::snapshot::{SnapshotStore, walker};
use anyhow::Result;
use std::io;
use tracing::{debug, info};

/// Runs the whole pipeline for `ctx`.
///
/// Strictly sequential: open the output, probe every watch root, force atimes
/// behind mtimes, run the command, re-walk every root, classify and flush. A
/// failing command does not stop the post-run walk or the report.
///
/// Returns whether the wrapped command succeeded.
///
/// # Errors
///
/// Returns an error on any setup or filesystem failure (output file, probe,
/// traversal, timestamp write) or if the shell cannot be started.
pub fn execute(ctx: &PmashContext) -> Result<bool> {
    let mut sink = OutputSink::open(ctx.outfile.as_deref())?;

    for dir in &ctx.watch_dirs {
        probe::verify_atime_updates(dir)?;
    }

    let mut store = SnapshotStore::new();
    for dir in &ctx.watch_dirs {
        walker::pre_walk(dir, &ctx.exclude, &mut store)?;
    }
    info!(files = store.pre_len(), "Pre-run snapshot complete");

    if ctx.errexit {
        debug!("--errexit has no effect on the pipeline");
    }

    let succeeded = runner::run_command(
        &ctx.shell,
        &ctx.command,
        ctx.trace_command,
        &ctx.invocation,
        &mut io::stderr(),
    )?;

    for dir in &ctx.watch_dirs {
        walker::post_walk(dir, &ctx.exclude, &mut store)?;
    }

    let summary = classify::write_report(&store, &mut sink, ctx.annotate())?;
    info!(
        examined = summary.examined,
        prerequisites = summary.prerequisites,
        written = summary.written,
        "Classification complete"
    );

    sink.finish()?;
    Ok(succeeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn context(root: &Path, command: String, outfile: PathBuf) -> Result<PmashContext> {
        PmashContext::builder(command)
            .watch_dirs(vec![root.to_path_buf()])
            .outfile(Some(outfile))
            .build()
    }

    #[test]
    fn test_failed_command_still_reports() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let watched = temp_dir.path().join("src");
        fs::create_dir(&watched)?;
        let input = watched.join("input.txt");
        fs::write(&input, "hello")?;
        let outfile = temp_dir.path().join("prereqs.txt");

        let command = format!("cat '{}' > /dev/null; exit 1", input.display());
        let ctx = context(&watched, command, outfile.clone())?;

        let succeeded = execute(&ctx)?;

        assert!(!succeeded);
        assert_eq!(
            fs::read_to_string(&outfile)?,
            format!("{}\n", input.display())
        );
        Ok(())
    }

    #[test]
    fn test_untouched_tree_leaves_no_outfile() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let watched = temp_dir.path().join("src");
        fs::create_dir(&watched)?;
        fs::write(watched.join("unused.txt"), "idle")?;
        let outfile = temp_dir.path().join("prereqs.txt");

        let ctx = context(&watched, "true".to_string(), outfile.clone())?;

        assert!(execute(&ctx)?);
        assert!(!outfile.exists());
        Ok(())
    }

    #[test]
    fn test_missing_watch_dir_aborts_before_command() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let marker = temp_dir.path().join("ran");
        let outfile = temp_dir.path().join("prereqs.txt");
        let command = format!("touch '{}'", marker.display());

        let ctx = context(&temp_dir.path().join("absent"), command, outfile)?;

        assert!(execute(&ctx).is_err());
        assert!(!marker.exists());
        Ok(())
    }
}
