//! Household configuration: chores, roster, vacation set and pause flag.
//!
//! Configuration is owned by the household (edited through host commands
//! or by hand in `household.toml`). The scheduling core only reads it.

pub mod persist;
pub mod service;
pub mod types;

pub use service::{ConfigService, validate_config};
pub use types::{
    ChoreConfig, ChoreDraft, ChorePatch, HouseholdConfig, INTERVAL_PRESETS, MAX_INTERVAL_DAYS,
    interval_from_preset,
};
