//! Utility functions and helpers.
//!
//! - [`paths`]: path-key normalization, watch-list splitting, exclusion markers
//! - [`should_ignore`]: pattern matching used to keep VCS and swap files out of snapshots
//! - [`ExcludeRules`]: built-in markers plus user patterns, as applied by the walker

/// Path manipulation and watch-list helpers
pub mod paths;

use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Tests one pattern against a path.
///
/// - `*text*` matches anywhere in the path
/// - `*suffix` matches the end of the path
/// - `prefix*` matches the start of the path
/// - `dir/` matches a whole path component
/// - anything else matches the full path or a whole component
#[must_use]
pub fn pattern_matches(path: &Path, pattern: &str) -> bool {
    let bytes = path.as_os_str().as_bytes();

    if let Some(dir_name) = pattern.strip_suffix('/') {
        path.components().any(|c| c.as_os_str().as_bytes() == dir_name.as_bytes())
    } else if let Some(text) = contains_text(pattern) {
        text.is_empty() || bytes.windows(text.len()).any(|w| w == text.as_bytes())
    } else if let Some(suffix) = pattern.strip_prefix('*') {
        bytes.ends_with(suffix.as_bytes())
    } else if let Some(prefix) = pattern.strip_suffix('*') {
        bytes.starts_with(prefix.as_bytes())
    } else {
        bytes == pattern.as_bytes()
            || path.components().any(|c| c.as_os_str().as_bytes() == pattern.as_bytes())
    }
}

/// The inner text of a `*text*` pattern.
fn contains_text(pattern: &str) -> Option<&str> {
    if pattern.len() >= 2 {
        pattern.strip_prefix('*')?.strip_suffix('*')
    } else {
        None
    }
}

/// Whether a directory matching `pattern` can be skipped whole.
///
/// Only the contains and `dir/` forms guarantee that every path beneath a
/// matching directory matches too.
#[must_use]
pub fn prunes_subtree(pattern: &str) -> bool {
    pattern.ends_with('/') || contains_text(pattern).is_some()
}

/// Determines if a given path should be ignored based on provided patterns.
#[must_use]
pub fn should_ignore(path: &Path, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| pattern_matches(path, pattern))
}

/// Exclusion rules for one run.
///
/// The built-in markers are tested against the path as walked, root
/// included. User patterns are tested against the path below the watch root,
/// so `build*` and `src/gen.h` work the same whatever the root is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludeRules {
    /// Markers tested against the walked path.
    markers: Vec<String>,
    /// Patterns tested against the root-relative path.
    patterns: Vec<String>,
}

impl Default for ExcludeRules {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ExcludeRules {
    /// Built-in markers plus `patterns`.
    #[must_use]
    pub fn new(patterns: Vec<String>) -> Self {
        Self {
            markers: paths::default_exclude_patterns(),
            patterns,
        }
    }

    /// The built-in markers.
    #[must_use]
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// The user patterns.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether a file is excluded. `relative` is `walked` with the watch
    /// root removed; it is empty for the root itself.
    #[must_use]
    pub fn excludes(&self, walked: &Path, relative: &Path) -> bool {
        should_ignore(walked, &self.markers)
            || (!relative.as_os_str().is_empty() && should_ignore(relative, &self.patterns))
    }

    /// Whether a directory and everything below it can be skipped.
    #[must_use]
    pub fn prunes(&self, walked: &Path, relative: &Path) -> bool {
        if should_ignore(walked, &self.markers) {
            return true;
        }
        !relative.as_os_str().is_empty()
            && self
                .patterns
                .iter()
                .any(|p| prunes_subtree(p) && pattern_matches(relative, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_contains_pattern_matches_anywhere() {
        let p = patterns(&["*.git*"]);
        assert!(should_ignore(Path::new("./.git/HEAD"), &p));
        assert!(should_ignore(Path::new("src/.gitignore"), &p));
        assert!(should_ignore(Path::new("a/b.github/c"), &p));
        assert!(!should_ignore(Path::new("src/git.c"), &p));
    }

    #[test]
    fn test_suffix_and_prefix_patterns() {
        let p = patterns(&["*.o", "build*"]);
        assert!(should_ignore(Path::new("src/main.o"), &p));
        assert!(should_ignore(Path::new("build/out"), &p));
        assert!(!should_ignore(Path::new("src/main.c"), &p));
    }

    #[test]
    fn test_directory_pattern_matches_component() {
        let p = patterns(&["target/"]);
        assert!(should_ignore(Path::new("./target/debug/x"), &p));
        assert!(!should_ignore(Path::new("./targets/x"), &p));
    }

    #[test]
    fn test_exact_pattern_matches_component() {
        let p = patterns(&["node_modules"]);
        assert!(should_ignore(Path::new("web/node_modules/x.js"), &p));
        assert!(!should_ignore(Path::new("web/node_modules2/x.js"), &p));
    }

    #[test]
    fn test_only_contains_and_dir_forms_prune() {
        assert!(prunes_subtree("*.git*"));
        assert!(prunes_subtree("target/"));
        assert!(!prunes_subtree("*.o"));
        assert!(!prunes_subtree("build*"));
        assert!(!prunes_subtree("src/gen.h"));
        assert!(!prunes_subtree("*"));
    }

    #[test]
    fn test_rules_match_user_patterns_below_root() {
        let rules = ExcludeRules::new(patterns(&["build*", "src/gen.h"]));

        assert!(rules.excludes(Path::new("./build/gen.h"), Path::new("build/gen.h")));
        assert!(rules.excludes(Path::new("./src/gen.h"), Path::new("src/gen.h")));
        assert!(!rules.excludes(Path::new("./dep.c"), Path::new("dep.c")));
        // the root's own name never feeds user patterns
        assert!(!rules.excludes(Path::new("build/x.c"), Path::new("x.c")));
    }

    #[test]
    fn test_rules_match_markers_with_root() {
        let rules = ExcludeRules::default();

        assert!(rules.excludes(Path::new("repo.git/config"), Path::new("config")));
        assert!(rules.prunes(Path::new("./.svn"), Path::new(".svn")));
        assert!(rules.prunes(Path::new(".git"), Path::new("")));
    }

    #[test]
    fn test_rules_prune_only_for_subtree_forms() {
        let rules = ExcludeRules::new(patterns(&["*.o", "gen/", "build*"]));

        assert!(!rules.prunes(Path::new("./lib.o"), Path::new("lib.o")));
        assert!(!rules.prunes(Path::new("./build"), Path::new("build")));
        assert!(rules.prunes(Path::new("./src/gen"), Path::new("src/gen")));
        assert!(!rules.prunes(Path::new("."), Path::new("")));
    }
}
