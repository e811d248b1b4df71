use anyhow::Result;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Scratch directory used as a watch root.
pub struct WatchTree {
    pub temp_dir: TempDir,
}

impl WatchTree {
    /// Create an empty watch tree
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Get the tree root
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a file relative to the root, creating parent directories
    pub fn write(&self, relative: &str, contents: &str) -> Result<()> {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }
}
