use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Markers that keep version-control metadata and editor swap files out of snapshots.
pub const BUILTIN_EXCLUDES: [&str; 3] = ["*.git*", "*.svn*", "*.swp*"];

/// Returns the built-in exclusion patterns as owned strings.
#[must_use]
pub fn default_exclude_patterns() -> Vec<String> {
    BUILTIN_EXCLUDES.iter().map(ToString::to_string).collect()
}

/// Strips a single leading `./` from a walked path.
///
/// Only the literal prefix is removed; the rest of the path is kept byte for
/// byte so that keys compare the same way the walker produced them.
#[must_use]
pub fn normalize_relative(path: &Path) -> PathBuf {
    let bytes = path.as_os_str().as_bytes();
    match bytes.strip_prefix(b"./") {
        Some(rest) => PathBuf::from(OsStr::from_bytes(rest)),
        None => path.to_path_buf(),
    }
}

/// Splits `-w` values on commas, skipping empty tokens.
#[must_use]
pub fn split_watch_list(values: &[String]) -> Vec<PathBuf> {
    values
        .iter()
        .flat_map(|value| value.split(','))
        .filter(|token| !token.is_empty())
        .map(PathBuf::from)
        .collect()
}
