//! Race configuration loading
//!
//! Reads the race settings from a JSON (`config.json`) or TOML file and
//! validates them before any event is processed.

use anyhow::{Context, Result};
use biathlon_engine::RaceConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors specific to locating a configuration file format
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Unsupported config format {0:?}, expected a .json or .toml file")]
    UnsupportedFormat(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

fn detect_format(path: &Path) -> Result<ConfigFormat> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());

    match extension.as_deref() {
        Some("json") | None => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        _ => Err(ConfigFileError::UnsupportedFormat(path.to_path_buf()).into()),
    }
}

/// Parse configuration text in the given format and validate it
fn parse_config(content: &str, format: ConfigFormat) -> Result<RaceConfig> {
    let config: RaceConfig = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };
    config.validate()?;
    Ok(config)
}

/// Load the race configuration from a JSON or TOML file
pub fn load_config(path: &Path) -> Result<RaceConfig> {
    let format = detect_format(path)?;

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config = parse_config(&content, format)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    log::debug!(
        "Race: {} laps of {} m, penalty loop {} m, {} firing line(s)",
        config.laps,
        config.lap_len,
        config.penalty_len,
        config.firing_lines
    );

    Ok(config)
}
