//! Optional TOML configuration.
//!
//! ```toml
//! [watch]
//! dirs = ["src", "include"]
//! exclude = ["*.o", "target/"]
//!
//! [command]
//! shell = "bash"
//! ```
//!
//! A missing file is not an error and is never created on demand.

/// TOML parsing and validation.
pub mod parser;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Shell used when the config does not name one.
pub const DEFAULT_SHELL: &str = "sh";

/// Config file location relative to the platform config directory.
pub const DEFAULT_CONFIG_PATH: &str = "pmash/config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Watch directory defaults.
    #[serde(default)]
    pub watch: WatchConfig,

    /// Command interpreter settings.
    #[serde(default)]
    pub command: CommandConfig,
}

/// `[watch]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchConfig {
    /// Roots watched when `-w` is not given.
    #[serde(default = "default_watch_dirs")]
    pub dirs: Vec<PathBuf>,

    /// Exclusion patterns applied on top of the built-in markers, matched
    /// against paths below each watch root.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// `[command]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandConfig {
    /// Interpreter invoked as `<shell> -c <command>`.
    #[serde(default = "default_shell")]
    pub shell: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            dirs: default_watch_dirs(),
            exclude: Vec::new(),
        }
    }
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            shell: default_shell(),
        }
    }
}

impl Config {
    /// Load configuration from a file, falling back to defaults if it is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML
    /// - A value fails validation
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        parser::parse_config_file(path)
    }

    /// Load configuration from the default location.
    ///
    /// `PMASH_CONFIG_PATH` takes precedence over the platform config directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected file exists but cannot be loaded.
    pub fn load_default() -> Result<Self> {
        match default_config_path() {
            Some(path) => Self::load(&path)
                .with_context(|| format!("Failed to load config: {}", path.display())),
            None => Ok(Self::default()),
        }
    }
}

/// Resolves the config file path from the environment or the platform config dir.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(crate::CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(DEFAULT_CONFIG_PATH))
}

// Default functions for serde
fn default_watch_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from(crate::DEFAULT_WATCH_DIR)]
}

fn default_shell() -> String {
    DEFAULT_SHELL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.toml");

        let config = Config::load(&path)?;

        assert_eq!(config, Config::default());
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_load_partial_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[watch]\nexclude = [\"*.o\"]\n")?;

        let config = Config::load(&path)?;

        assert_eq!(config.watch.dirs, vec![PathBuf::from(".")]);
        assert_eq!(config.watch.exclude, vec!["*.o".to_string()]);
        assert_eq!(config.command.shell, "sh");
        Ok(())
    }
}
