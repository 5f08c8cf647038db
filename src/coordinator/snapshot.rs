//! Derived, read-only views produced by a refresh.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::Status;

/// Everything presentation layers need about one chore, as of one refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedChoreSnapshot {
    pub chore_id: String,
    pub name: String,
    pub room: String,
    pub interval_days: u32,
    pub interval_display: String,
    /// 0.0 ..= 100.0, one decimal.
    pub cleanliness: f64,
    pub status: Status,
    /// Material Design icon for `status`.
    pub icon: String,
    pub days_since: f64,
    pub last_completed: DateTime<Utc>,
    /// `None` while the household is globally paused.
    pub next_due: Option<NaiveDate>,
    pub assigned_to: Option<String>,
}

/// Result of one refresh: one entry per configured chore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoreSnapshot {
    pub refreshed_at: Option<DateTime<Utc>>,
    pub chores: BTreeMap<String, DerivedChoreSnapshot>,
}

impl ChoreSnapshot {
    #[must_use]
    pub fn get(&self, chore_id: &str) -> Option<&DerivedChoreSnapshot> {
        self.chores.get(chore_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chores.is_empty()
    }
}

/// Dashboard payload: the snapshot plus the household switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub chores: BTreeMap<String, DerivedChoreSnapshot>,
    pub vacation_persons: Vec<String>,
    pub global_pause: bool,
}
