use super::Config;
use anyhow::{Context, Result};
use std::path::Path;

/// Read and validate a TOML config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or fails validation.
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
}

/// Parse and validate config text.
///
/// # Errors
///
/// Returns an error if the text is not valid TOML or fails validation.
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse TOML config")?;

    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    if config.command.shell.trim().is_empty() {
        anyhow::bail!("command.shell must not be empty");
    }

    if config.watch.dirs.iter().any(|d| d.as_os_str().is_empty()) {
        anyhow::bail!("watch.dirs must not contain empty paths");
    }

    if config.watch.exclude.iter().any(String::is_empty) {
        anyhow::bail!("watch.exclude must not contain empty patterns");
    }

    Ok(())
}
