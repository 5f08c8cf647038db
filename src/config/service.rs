//! ConfigService: cached household config with validation and persistence.
//!
//! Holds the current [`HouseholdConfig`] behind a lock, validates every
//! update before it is written, and writes atomically with a backup. The
//! coordinator reads through this service; it never caches its own copy.

use crate::error::{ChoreError, Result};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use super::persist::{backup_config, read_config_or_default, write_config_atomic};
use super::types::{HouseholdConfig, MAX_INTERVAL_DAYS};

/// Thread-safe config service with caching, validation, and persistence.
///
/// Cloning is cheap and all clones share the same cache.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    cache: Arc<RwLock<HouseholdConfig>>,
}

impl ConfigService {
    /// Create a service backed by the TOML file at `path`.
    ///
    /// The cache starts empty. Call [`load()`](Self::load) to populate it.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            cache: Arc::new(RwLock::new(HouseholdConfig::default())),
        }
    }

    /// Create an in-memory service with no backing file.
    ///
    /// # Errors
    /// Returns [`ChoreError::Config`] if `config` fails validation.
    pub fn in_memory(config: HouseholdConfig) -> Result<Self> {
        validate_config(&config)?;
        Ok(Self {
            path: None,
            cache: Arc::new(RwLock::new(config)),
        })
    }

    /// Load config from disk (missing file means empty), validate, and cache it.
    ///
    /// # Errors
    /// Returns [`ChoreError::Config`] on read, parse, or validation failure.
    pub fn load(&self) -> Result<HouseholdConfig> {
        let config = match &self.path {
            Some(path) => read_config_or_default(path)?,
            None => self.get()?,
        };
        validate_config(&config)?;

        let mut cache = self
            .cache
            .write()
            .map_err(|_| ChoreError::Config("config cache lock poisoned".into()))?;
        *cache = config.clone();
        Ok(config)
    }

    /// Get a clone of the cached config.
    ///
    /// # Errors
    /// Returns [`ChoreError::Config`] if the cache lock is poisoned.
    pub fn get(&self) -> Result<HouseholdConfig> {
        let cache = self
            .cache
            .read()
            .map_err(|_| ChoreError::Config("config cache lock poisoned".into()))?;
        Ok(cache.clone())
    }

    /// Update the config using a mutation function.
    ///
    /// After mutation the config is validated, the old file is backed up, the
    /// new config is written atomically, and the cache is replaced. A rejected
    /// update leaves both the cache and the file untouched.
    ///
    /// # Errors
    /// Returns [`ChoreError::Config`] on validation, backup, or write failure.
    pub fn update<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut HouseholdConfig) -> Result<T>,
    {
        let mut config = self.get()?;
        let out = f(&mut config)?;
        validate_config(&config)?;

        if let Some(path) = &self.path {
            backup_config(path)?;
            write_config_atomic(path, &config)?;
        }

        let mut cache = self
            .cache
            .write()
            .map_err(|_| ChoreError::Config("config cache lock poisoned".into()))?;
        *cache = config;
        Ok(out)
    }
}

/// Validate a household config.
///
/// Rejects intervals outside `1..=MAX_INTERVAL_DAYS`, empty or duplicate
/// chore ids, and empty names.
///
/// # Errors
/// Returns [`ChoreError::Config`] describing the first problem found.
pub fn validate_config(config: &HouseholdConfig) -> Result<()> {
    let mut seen = HashSet::new();
    for chore in &config.chores {
        if chore.id.trim().is_empty() {
            return Err(ChoreError::Config("chore id cannot be empty".into()));
        }
        if !seen.insert(chore.id.as_str()) {
            return Err(ChoreError::Config(format!(
                "duplicate chore id '{}'",
                chore.id
            )));
        }
        if chore.name.trim().is_empty() {
            return Err(ChoreError::Config(format!(
                "chore '{}' has an empty name",
                chore.id
            )));
        }
        if chore.interval_days == 0 {
            return Err(ChoreError::Config(format!(
                "chore '{}' interval must be at least 1 day",
                chore.id
            )));
        }
        if chore.interval_days > MAX_INTERVAL_DAYS {
            return Err(ChoreError::Config(format!(
                "chore '{}' interval of {} days exceeds the maximum of {MAX_INTERVAL_DAYS}",
                chore.id, chore.interval_days
            )));
        }
    }
    Ok(())
}
