//! Filesystem locations for chorehub.
//!
//! | Purpose | Linux | Override |
//! |---------|-------|----------|
//! | Config (`household.toml`) | `~/.config/chorehub/` | `CHOREHUB_CONFIG_DIR` |
//! | Runtime state (`state.json`) | `~/.local/share/chorehub/` | `CHOREHUB_DATA_DIR` |

use std::ffi::OsString;
use std::path::PathBuf;

const APP_DIR: &str = "chorehub";

/// Household configuration file name.
pub const CONFIG_FILE_NAME: &str = "household.toml";

/// Runtime state file name.
pub const STATE_FILE_NAME: &str = "state.json";

/// Config directory. Override with `CHOREHUB_CONFIG_DIR`.
#[must_use]
pub fn config_dir() -> PathBuf {
    resolve(
        std::env::var_os("CHOREHUB_CONFIG_DIR"),
        dirs::config_dir(),
        "/tmp/chorehub-config",
    )
}

/// Data directory for runtime state. Override with `CHOREHUB_DATA_DIR`.
#[must_use]
pub fn data_dir() -> PathBuf {
    resolve(
        std::env::var_os("CHOREHUB_DATA_DIR"),
        dirs::data_dir(),
        "/tmp/chorehub-data",
    )
}

/// `config_dir()/household.toml`.
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// `data_dir()/state.json`.
#[must_use]
pub fn state_path() -> PathBuf {
    data_dir().join(STATE_FILE_NAME)
}

fn resolve(env_override: Option<OsString>, platform: Option<PathBuf>, fallback: &str) -> PathBuf {
    if let Some(dir) = env_override.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    platform
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(fallback))
}
