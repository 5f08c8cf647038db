//! Atomic household config file operations.
//!
//! Reads and writes the TOML config with atomic write guarantees
//! (temp file → fsync → rename), keeping a `.backup` copy of the previous
//! version.

use crate::error::{ChoreError, Result};
use std::io::Write;
use std::path::Path;

use super::types::HouseholdConfig;

/// Read and deserialize the household config.
///
/// # Errors
/// Returns [`ChoreError::Config`] if the file cannot be read or parsed.
pub fn read_config(path: &Path) -> Result<HouseholdConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ChoreError::Config(format!(
            "failed to read config file '{}': {e}",
            path.display()
        ))
    })?;
    toml::from_str(&contents).map_err(|e| {
        ChoreError::Config(format!(
            "failed to parse config file '{}': {e}",
            path.display()
        ))
    })
}

/// Read the config, treating a missing file as an empty household.
///
/// # Errors
/// Returns [`ChoreError::Config`] if the file exists but cannot be read or parsed.
pub fn read_config_or_default(path: &Path) -> Result<HouseholdConfig> {
    if !path.exists() {
        return Ok(HouseholdConfig::default());
    }
    read_config(path)
}

/// Write the config atomically.
///
/// # Errors
/// Returns [`ChoreError::Config`] on serialization, write, or rename failure.
pub fn write_config_atomic(path: &Path, config: &HouseholdConfig) -> Result<()> {
    let text = toml::to_string_pretty(config)
        .map_err(|e| ChoreError::Config(format!("failed to serialize config: {e}")))?;
    write_text_atomic(path, &text, "toml.tmp")
}

/// Write `text` to `path` via a temp file with extension `tmp_ext`.
pub(crate) fn write_text_atomic(path: &Path, text: &str, tmp_ext: &str) -> Result<()> {
    let tmp_path = path.with_extension(tmp_ext);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ChoreError::Config(format!(
                "failed to create directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut file = std::fs::File::create(&tmp_path).map_err(|e| {
        ChoreError::Config(format!(
            "failed to create temp file '{}': {e}",
            tmp_path.display()
        ))
    })?;

    file.write_all(text.as_bytes())
        .map_err(|e| ChoreError::Config(format!("failed to write temp file: {e}")))?;

    file.sync_all()
        .map_err(|e| ChoreError::Config(format!("failed to sync temp file: {e}")))?;

    std::fs::rename(&tmp_path, path).map_err(|e| {
        ChoreError::Config(format!(
            "failed to rename '{}' to '{}': {e}",
            tmp_path.display(),
            path.display()
        ))
    })
}

/// Copy the config to `{path}.backup`. A missing source is not an error.
///
/// # Errors
/// Returns [`ChoreError::Config`] if the copy fails.
pub fn backup_config(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let backup_path = path.with_extension("toml.backup");
    std::fs::copy(path, &backup_path).map_err(|e| {
        ChoreError::Config(format!(
            "failed to backup config '{}' to '{}': {e}",
            path.display(),
            backup_path.display()
        ))
    })?;
    Ok(())
}
