//! Traversal of watch roots.
//!
//! [`WatchedFiles`] yields every regular file under a root, depth first,
//! without crossing mount points or following symlinks, and skipping any path
//! that matches an exclusion pattern. A matching directory is skipped whole
//! only when the pattern form covers everything below it; otherwise its files
//! are tested one by one. The pre-run and post-run walks are folds over that
//! sequence into a [`SnapshotStore`].

use super::{SnapshotStore, TimePair};
use crate::utils::{ExcludeRules, paths::normalize_relative};
use anyhow::{Context, Result};
use filetime::FileTime;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, span};
use walkdir::WalkDir;

/// A regular file found under a watch root.
#[derive(Debug)]
pub struct WatchedFile {
    /// Path as walked, usable for filesystem calls.
    pub path: PathBuf,
    /// Store key: `path` with a leading `./` stripped.
    pub key: PathBuf,
    /// Metadata read during traversal (not following symlinks).
    pub metadata: Metadata,
}

/// Iterator over the regular files beneath one watch root.
pub struct WatchedFiles<'a> {
    /// Underlying traversal.
    inner: walkdir::IntoIter,
    /// Exclusion rules.
    exclude: &'a ExcludeRules,
    /// Root being walked, stripped before user patterns are tested.
    root: PathBuf,
}

impl<'a> WatchedFiles<'a> {
    /// Starts a traversal of `root`.
    #[must_use]
    pub fn new(root: &Path, exclude: &'a ExcludeRules) -> Self {
        let inner = WalkDir::new(root)
            .follow_links(false)
            .same_file_system(true)
            .into_iter();

        Self {
            inner,
            exclude,
            root: root.to_path_buf(),
        }
    }
}

impl Iterator for WatchedFiles<'_> {
    type Item = Result<WatchedFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(self.root.as_path()).display().to_string();
                    return Some(Err(anyhow::Error::new(e).context(path)));
                }
            };

            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());

            if entry.file_type().is_dir() {
                if self.exclude.prunes(entry.path(), relative) {
                    self.inner.skip_current_dir();
                }
                continue;
            }

            if !entry.file_type().is_file() || self.exclude.excludes(entry.path(), relative) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    let path = entry.path().display().to_string();
                    return Some(Err(anyhow::Error::new(e).context(path)));
                }
            };

            return Some(Ok(WatchedFile {
                key: normalize_relative(entry.path()),
                path: entry.into_path(),
                metadata,
            }));
        }
    }
}

/// Pre-run walk: pushes each file's atime behind its mtime and records both.
///
/// Returns the number of files recorded.
///
/// # Errors
///
/// Returns an error if traversal fails or a timestamp cannot be written.
pub fn pre_walk(root: &Path, exclude: &ExcludeRules, store: &mut SnapshotStore) -> Result<usize> {
    let span = span!(Level::DEBUG, "pre_walk", root = %root.display());
    let _guard = span.enter();

    let mut count = 0;
    for file in WatchedFiles::new(root, exclude) {
        let file = file?;
        let mtime = FileTime::from_last_modification_time(&file.metadata);
        let times = TimePair::forced_behind(mtime);

        filetime::set_file_times(&file.path, times.atime, times.mtime)
            .with_context(|| file.path.display().to_string())?;

        store.record_pre(&file.key, times);
        count += 1;
    }

    debug!(count, "Forced atimes behind mtimes");
    Ok(count)
}

/// Post-run walk: records each file's current atime and mtime and joins them
/// with the pre-run record.
///
/// Returns the number of files recorded.
///
/// # Errors
///
/// Returns an error if traversal fails.
pub fn post_walk(root: &Path, exclude: &ExcludeRules, store: &mut SnapshotStore) -> Result<usize> {
    let span = span!(Level::DEBUG, "post_walk", root = %root.display());
    let _guard = span.enter();

    let mut count = 0;
    let mut created = 0;
    for file in WatchedFiles::new(root, exclude) {
        let file = file?;
        let times = TimePair::new(
            FileTime::from_last_access_time(&file.metadata),
            FileTime::from_last_modification_time(&file.metadata),
        );

        if store.pre_times(&file.key).is_none() {
            created += 1;
        }
        store.record_post(&file.key, times);
        count += 1;
    }

    debug!(count, created, "Collected post-run timestamps");
    Ok(count)
}
