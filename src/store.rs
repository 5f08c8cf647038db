//! Runtime state storage for chores.
//!
//! Defines the per-chore [`ChoreRuntimeState`], the [`RuntimeStore`] trait
//! (load/save of the whole mapping), a JSON file backend and an in-memory
//! backend for tests and ephemeral hosts.
//!
//! The persisted layout is:
//!
//! ```json
//! {
//!   "version": 1,
//!   "chores": {
//!     "kitchen-floor": {
//!       "last_completed": "2025-01-15T12:00:00Z",
//!       "rotation_index": 3,
//!       "completion_history": [
//!         { "person": "person.alice", "timestamp": "2025-01-15T12:00:00Z" }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! Timestamps without an offset are read as UTC. Files written by older
//! versions used `last_cleaned` and `completed_by_history`; both are
//! accepted on read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::persist::write_text_atomic;
use crate::error::{ChoreError, Result};

/// Current persisted schema version.
pub const STATE_VERSION: u32 = 1;

/// Mapping from chore id to runtime state.
pub type RuntimeMap = BTreeMap<String, ChoreRuntimeState>;

/// One completion: who did it and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub person: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Mutable, persisted state for a single chore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoreRuntimeState {
    /// When the chore was last completed or reset.
    #[serde(alias = "last_cleaned", deserialize_with = "deserialize_timestamp")]
    pub last_completed: DateTime<Utc>,
    /// Round-robin counter. Advanced only by completions.
    #[serde(default)]
    pub rotation_index: u64,
    /// Append-only completion log.
    #[serde(default, alias = "completed_by_history")]
    pub completion_history: Vec<CompletionRecord>,
}

impl ChoreRuntimeState {
    /// Fresh state for a chore first seen at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            last_completed: now,
            rotation_index: 0,
            completion_history: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default = "default_state_version")]
    version: u32,
    #[serde(default)]
    chores: RuntimeMap,
}

fn default_state_version() -> u32 {
    STATE_VERSION
}

/// Accept RFC 3339 timestamps, or naive ISO-8601 timestamps assumed to be UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
}

/// Parse a stored timestamp, normalizing naive values to UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Async storage backend for the runtime mapping.
///
/// `load` on a store that has never been saved returns an empty mapping.
#[async_trait]
pub trait RuntimeStore: Send + Sync {
    /// Load the full mapping.
    async fn load(&self) -> Result<RuntimeMap>;

    /// Overwrite the full mapping.
    async fn save(&self, chores: &RuntimeMap) -> Result<()>;
}

/// JSON file backend with atomic writes (temp file → fsync → rename).
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store at `path`. Nothing is touched until the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the state file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RuntimeStore for JsonFileStore {
    async fn load(&self) -> Result<RuntimeMap> {
        let bytes = match std::fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no chore state yet; starting empty");
                return Ok(RuntimeMap::new());
            }
            Err(e) => {
                return Err(ChoreError::Store(format!(
                    "cannot read state '{}': {e}",
                    self.path.display()
                )));
            }
        };

        let state: PersistedState = serde_json::from_slice(&bytes).map_err(|e| {
            ChoreError::Store(format!("cannot parse state '{}': {e}", self.path.display()))
        })?;
        Ok(state.chores)
    }

    async fn save(&self, chores: &RuntimeMap) -> Result<()> {
        let state = PersistedState {
            version: STATE_VERSION,
            chores: chores.clone(),
        };
        let json = serde_json::to_string_pretty(&state)
            .map_err(|e| ChoreError::Store(format!("cannot serialize state: {e}")))?;
        write_text_atomic(&self.path, &json, "json.tmp")
            .map_err(|e| ChoreError::Store(format!("cannot write state: {e}")))
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    chores: RuntimeMap,
    saves: usize,
    fail_saves: bool,
}

/// In-memory store. Cheaply cloneable; clones share contents.
///
/// Counts saves and can be told to fail them, which makes it the backend
/// of choice for coordinator tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `chores`.
    pub fn with_state(chores: RuntimeMap) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryInner {
                chores,
                ..MemoryInner::default()
            })),
        }
    }

    /// Number of successful saves so far.
    pub async fn save_count(&self) -> usize {
        self.inner.read().await.saves
    }

    /// Make subsequent saves fail (or succeed again).
    pub async fn set_fail_saves(&self, fail: bool) {
        self.inner.write().await.fail_saves = fail;
    }

    /// Snapshot of the last saved mapping.
    pub async fn stored(&self) -> RuntimeMap {
        self.inner.read().await.chores.clone()
    }
}

#[async_trait]
impl RuntimeStore for MemoryStore {
    async fn load(&self) -> Result<RuntimeMap> {
        Ok(self.inner.read().await.chores.clone())
    }

    async fn save(&self, chores: &RuntimeMap) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.fail_saves {
            return Err(ChoreError::Store("memory store configured to fail".into()));
        }
        inner.chores = chores.clone();
        inner.saves += 1;
        Ok(())
    }
}
