//! Prerequisite classification.
//!
//! A file is a prerequisite when its mtime did not advance during the run and
//! its atime moved past the forced pre-run marker. The clauses are evaluated
//! in a fixed order and the first match decides.

use crate::snapshot::{PathEntry, SnapshotStore};
use anyhow::Result;
use filetime::FileTime;
use std::io::Write;
use std::os::unix::ffi::OsStrExt;

/// Outcome of classifying one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// mtime advanced: the command wrote the file.
    Written,
    /// atime did not advance past the forced marker: the file was not read.
    Untouched,
    /// Read but not written.
    Prerequisite,
}

impl Verdict {
    /// Whether this verdict lists the file.
    #[must_use]
    pub const fn is_prerequisite(self) -> bool {
        matches!(self, Self::Prerequisite)
    }
}

/// Applies the decision rule to one entry.
///
/// The atime check compares whole seconds first and rejects on equality, so
/// an atime in the same second as the forced marker never counts as a read.
#[must_use]
#[allow(clippy::if_same_then_else)]
pub fn classify(entry: &PathEntry) -> Verdict {
    let (pre, post) = (&entry.pre, &entry.post);

    if post.mtime.unix_seconds() > pre.mtime.unix_seconds() {
        Verdict::Written
    } else if post.mtime.unix_seconds() == pre.mtime.unix_seconds()
        && post.mtime.nanoseconds() > pre.mtime.nanoseconds()
    {
        Verdict::Written
    } else if post.atime.unix_seconds() <= pre.atime.unix_seconds() {
        Verdict::Untouched
    } else if post.atime.unix_seconds() == pre.atime.unix_seconds()
        && post.atime.nanoseconds() <= pre.atime.nanoseconds()
    {
        Verdict::Untouched
    } else {
        Verdict::Prerequisite
    }
}

/// Formats a timestamp as zero-padded `SSSSSSSSSS.NNNNNNNNN`.
#[must_use]
pub fn format_time(t: FileTime) -> String {
    format!("{:010}.{:09}", t.unix_seconds(), t.nanoseconds())
}

/// Formats the four raw timestamps of an entry.
#[must_use]
pub fn format_evidence(entry: &PathEntry) -> String {
    format!(
        "a1={} m1={} a2={} m2={}",
        format_time(entry.pre.atime),
        format_time(entry.pre.mtime),
        format_time(entry.post.atime),
        format_time(entry.post.mtime)
    )
}

/// Width the path is padded to on `##` lines, in bytes.
const PATH_COLUMN: usize = 24;

/// Totals from one report.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    /// Entries examined.
    pub examined: usize,
    /// Entries listed as prerequisites.
    pub prerequisites: usize,
    /// Entries whose mtime advanced.
    pub written: usize,
}

/// Writes the report line for one entry, if any.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_entry(
    out: &mut dyn Write,
    entry: &PathEntry,
    verdict: Verdict,
    annotate: bool,
) -> Result<()> {
    if verdict.is_prerequisite() {
        out.write_all(entry.path.as_os_str().as_bytes())?;
        if annotate {
            write!(out, " # {}", format_evidence(entry))?;
        }
        out.write_all(b"\n")?;
    } else if annotate {
        let path = entry.path.as_os_str().as_bytes();
        out.write_all(b"## ")?;
        out.write_all(path)?;
        for _ in path.len()..PATH_COLUMN {
            out.write_all(b" ")?;
        }
        writeln!(out, ": {}", format_evidence(entry))?;
    }
    Ok(())
}

/// Classifies every merged entry in sorted order and writes the report.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_report(
    store: &SnapshotStore,
    out: &mut dyn Write,
    annotate: bool,
) -> Result<ReportSummary> {
    let mut summary = ReportSummary::default();

    for entry in store.entries() {
        let verdict = classify(entry);
        tracing::trace!(path = %entry.path.display(), ?verdict, "Classified");

        summary.examined += 1;
        match verdict {
            Verdict::Prerequisite => summary.prerequisites += 1,
            Verdict::Written => summary.written += 1,
            Verdict::Untouched => {}
        }
        write_entry(out, entry, verdict, annotate)?;
    }

    Ok(summary)
}
