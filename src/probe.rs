//! Filesystem atime capability probe.
//!
//! Mounts with `noatime` (or filesystems that never track access) would make
//! every file look untouched. Before anything is walked, each watch directory
//! gets a scratch file whose atime is set behind its mtime and which is then
//! read back; if the read did not bring atime level with mtime, the run stops.

use anyhow::{Context, Result};
use filetime::FileTime;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{Level, debug, span};

/// Payload written to the scratch file.
const PROBE_PAYLOAD: &[u8] = b"data\n";

/// Verifies that reads under `dir` update access times.
///
/// Creates exactly one scratch file in `dir` and removes it on every path out,
/// including errors.
///
/// # Errors
///
/// Returns an error if `dir` cannot be opened, the scratch file cannot be
/// created, written, read or removed, or atime does not move on read.
pub fn verify_atime_updates(dir: &Path) -> Result<()> {
    let span = span!(Level::DEBUG, "verify_atime_updates", dir = %dir.display());
    let _guard = span.enter();

    File::open(dir).with_context(|| dir.display().to_string())?;

    let mut scratch = tempfile::Builder::new()
        .prefix(&format!("audit.{}.", std::process::id()))
        .suffix(".tmp")
        .tempfile_in(dir)
        .with_context(|| dir.display().to_string())?;
    let scratch_path = scratch.path().to_path_buf();
    let label = || scratch_path.display().to_string();

    scratch.write_all(PROBE_PAYLOAD).with_context(label)?;
    let written = scratch.as_file().metadata().with_context(label)?;
    let mtime = FileTime::from_last_modification_time(&written);
    let behind = FileTime::from_unix_time(mtime.unix_seconds() - 1, 0);
    filetime::set_file_handle_times(scratch.as_file(), Some(behind), None).with_context(label)?;

    let mut buf = Vec::with_capacity(PROBE_PAYLOAD.len());
    File::open(&scratch_path)
        .and_then(|mut f| f.read_to_end(&mut buf))
        .with_context(label)?;

    let after = fs::metadata(&scratch_path).with_context(label)?;
    scratch.close().with_context(label)?;

    let atime = FileTime::from_last_access_time(&after);
    let mtime = FileTime::from_last_modification_time(&after);
    debug!(?atime, ?mtime, "Probe timestamps after read");

    if atime < mtime {
        anyhow::bail!("{}: atimes not updated here", dir.display());
    }

    Ok(())
}
