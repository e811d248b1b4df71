//! Snapshot store holding pre-run and post-run timestamps per watched file.
//!
//! The store is filled in two phases. The pre-run walk records the forced
//! atime and original mtime of every file; the post-run walk joins the current
//! atime and mtime against those records. Only paths seen by the post-run walk
//! reach the classifier, in byte-wise sorted order.

/// Lazy traversal of watch roots and the two walks built on it.
pub mod walker;

use filetime::FileTime;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// An (atime, mtime) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePair {
    /// Access time.
    pub atime: FileTime,
    /// Modification time.
    pub mtime: FileTime,
}

impl TimePair {
    /// Creates a pair from explicit times.
    #[must_use]
    pub const fn new(atime: FileTime, mtime: FileTime) -> Self {
        Self { atime, mtime }
    }

    /// Pre-run times for a path the pre-run walk never saw.
    ///
    /// The mtime is below any real mtime, so a file created by the command
    /// always reads as written.
    #[must_use]
    pub fn absent() -> Self {
        Self {
            atime: FileTime::from_unix_time(-2, 0),
            mtime: FileTime::from_unix_time(-1, 0),
        }
    }

    /// Pre-run times for a file whose current mtime is `mtime`: atime is pushed
    /// to the start of the previous second.
    #[must_use]
    pub fn forced_behind(mtime: FileTime) -> Self {
        Self {
            atime: FileTime::from_unix_time(mtime.unix_seconds() - 1, 0),
            mtime,
        }
    }
}

/// Everything recorded about one watched path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// Normalized path (leading `./` stripped).
    pub path: PathBuf,
    /// Forced atime and original mtime from the pre-run walk.
    pub pre: TimePair,
    /// Observed atime and mtime from the post-run walk.
    pub post: TimePair,
}

/// Ordered store of snapshot entries keyed by normalized path.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    /// Pre-run phase, written only by [`Self::record_pre`].
    pre: BTreeMap<OsString, TimePair>,
    /// Merged phase, the classifier's input.
    merged: BTreeMap<OsString, PathEntry>,
}

impl SnapshotStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pre-run snapshot. A repeated path replaces the earlier record.
    pub fn record_pre(&mut self, path: &Path, times: TimePair) {
        if self.pre.insert(path.as_os_str().to_owned(), times).is_some() {
            tracing::debug!(path = %path.display(), "Path seen under more than one watch root");
        }
    }

    /// Records a post-run snapshot, joining it with the pre-run record if any.
    ///
    /// Returns the merged entry. The pre-run phase is only read.
    pub fn record_post(&mut self, path: &Path, times: TimePair) -> &PathEntry {
        let key = path.as_os_str().to_owned();
        let pre = self.pre.get(&key).copied().unwrap_or_else(TimePair::absent);
        let entry = PathEntry {
            path: path.to_path_buf(),
            pre,
            post: times,
        };

        self.merged.insert(key.clone(), entry);
        &self.merged[&key]
    }

    /// Pre-run times recorded for `path`.
    #[must_use]
    pub fn pre_times(&self, path: &Path) -> Option<&TimePair> {
        self.pre.get(path.as_os_str())
    }

    /// Merged entries in sorted path order.
    pub fn entries(&self) -> impl Iterator<Item = &PathEntry> {
        self.merged.values()
    }

    /// Number of paths recorded by the pre-run walk.
    #[must_use]
    pub fn pre_len(&self) -> usize {
        self.pre.len()
    }

    /// Number of merged entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.merged.len()
    }

    /// Whether no merged entries exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ft(secs: i64, nanos: u32) -> FileTime {
        FileTime::from_unix_time(secs, nanos)
    }

    #[test]
    fn test_forced_behind_zeroes_nanoseconds() {
        let pair = TimePair::forced_behind(ft(1_000, 750));
        assert_eq!(pair.atime, ft(999, 0));
        assert_eq!(pair.mtime, ft(1_000, 750));
    }

    #[test]
    fn test_post_joins_pre_record() {
        let mut store = SnapshotStore::new();
        let pre = TimePair::forced_behind(ft(100, 5));
        store.record_pre(Path::new("a.c"), pre);

        let post = TimePair::new(ft(200, 0), ft(100, 5));
        let entry = store.record_post(Path::new("a.c"), post).clone();

        assert_eq!(entry.pre, pre);
        assert_eq!(entry.post, post);
        assert_eq!(store.pre_times(Path::new("a.c")), Some(&pre));
    }

    #[test]
    fn test_post_only_path_gets_absent_pre_times() {
        let mut store = SnapshotStore::new();
        let post = TimePair::new(ft(300, 0), ft(300, 0));

        let entry = store.record_post(Path::new("new.o"), post);

        assert_eq!(entry.pre, TimePair::absent());
        assert_eq!(entry.pre.atime.unix_seconds(), -2);
        assert_eq!(entry.pre.mtime.unix_seconds(), -1);
    }

    #[test]
    fn test_pre_only_path_is_not_classified() {
        let mut store = SnapshotStore::new();
        store.record_pre(Path::new("deleted.txt"), TimePair::forced_behind(ft(10, 0)));

        assert_eq!(store.pre_len(), 1);
        assert!(store.is_empty());
        assert_eq!(store.entries().count(), 0);
    }

    #[test]
    fn test_later_pre_record_wins() {
        let mut store = SnapshotStore::new();
        store.record_pre(Path::new("x"), TimePair::forced_behind(ft(10, 0)));
        store.record_pre(Path::new("x"), TimePair::forced_behind(ft(20, 0)));

        assert_eq!(store.pre_times(Path::new("x")).unwrap().mtime, ft(20, 0));
    }

    #[test]
    fn test_entries_sorted_bytewise() {
        let mut store = SnapshotStore::new();
        let t = TimePair::new(ft(1, 0), ft(1, 0));
        for p in ["b", "a/b", "a.b", "A"] {
            store.record_post(Path::new(p), t);
        }

        let order: Vec<_> = store.entries().map(|e| e.path.clone()).collect();
        assert_eq!(
            order,
            vec![
                PathBuf::from("A"),
                PathBuf::from("a.b"),
                PathBuf::from("a/b"),
                PathBuf::from("b")
            ]
        );
    }
}
