//! Household configuration types.
//!
//! The TOML layout looks like:
//!
//! ```toml
//! persons = ["person.alice", "person.bob"]
//! vacation_persons = []
//! global_pause = false
//!
//! [[chores]]
//! id = "kitchen-floor"
//! name = "Mop kitchen floor"
//! room = "Kitchen"
//! interval_days = 14
//! assigned_person = "person.alice"
//! ```

use serde::{Deserialize, Serialize};

/// Interval presets offered when creating a chore: key, days, label.
pub const INTERVAL_PRESETS: &[(&str, u32, &str)] = &[
    ("1_week", 7, "1 Week"),
    ("2_weeks", 14, "2 Weeks"),
    ("3_weeks", 21, "3 Weeks"),
    ("4_weeks", 28, "4 Weeks"),
    ("3_months", 90, "3 Months"),
    ("6_months", 180, "6 Months"),
    ("1_year", 365, "1 Year"),
];

/// Longest interval a chore may be configured with (about 100 years).
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Resolve a preset key (e.g. `"2_weeks"`) to its interval in days.
#[must_use]
pub fn interval_from_preset(key: &str) -> Option<u32> {
    INTERVAL_PRESETS
        .iter()
        .find(|(preset, _, _)| *preset == key)
        .map(|(_, days, _)| *days)
}

/// A recurring chore as configured by the household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoreConfig {
    /// Opaque unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional room label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    /// Interval between completions, in whole days.
    pub interval_days: u32,
    /// Pinned person id. `None` or empty means the chore rotates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_person: Option<String>,
}

impl ChoreConfig {
    /// Create a rotating chore with no room.
    pub fn new(id: impl Into<String>, name: impl Into<String>, interval_days: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            room: None,
            interval_days,
            assigned_person: None,
        }
    }

    /// The pinned assignee, treating an empty string as "rotate".
    #[must_use]
    pub fn pinned_assignee(&self) -> Option<&str> {
        self.assigned_person
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Room label, empty when unset.
    #[must_use]
    pub fn room_label(&self) -> &str {
        self.room.as_deref().unwrap_or("")
    }
}

/// Fields for a chore that does not exist yet; the id is generated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoreDraft {
    pub name: String,
    #[serde(default)]
    pub room: Option<String>,
    pub interval_days: u32,
    #[serde(default)]
    pub assigned_person: Option<String>,
}

/// Partial edit of an existing chore. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChorePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub interval_days: Option<u32>,
    #[serde(default)]
    pub assigned_person: Option<String>,
}

impl ChorePatch {
    /// Apply the set fields to `chore`.
    pub fn apply(&self, chore: &mut ChoreConfig) {
        if let Some(name) = &self.name {
            chore.name = name.clone();
        }
        if let Some(room) = &self.room {
            chore.room = Some(room.clone()).filter(|r| !r.is_empty());
        }
        if let Some(days) = self.interval_days {
            chore.interval_days = days;
        }
        if let Some(person) = &self.assigned_person {
            chore.assigned_person = Some(person.clone()).filter(|p| !p.is_empty());
        }
    }
}

/// Whole-household configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseholdConfig {
    /// Static roster of known person ids.
    pub persons: Vec<String>,
    /// Persons currently excluded from assignment.
    pub vacation_persons: Vec<String>,
    /// Suppresses due-date computation for every chore.
    pub global_pause: bool,
    /// Configured chores, in display order. Must stay the last field for TOML output.
    pub chores: Vec<ChoreConfig>,
}

impl HouseholdConfig {
    /// Look up a chore by id.
    #[must_use]
    pub fn chore(&self, chore_id: &str) -> Option<&ChoreConfig> {
        self.chores.iter().find(|c| c.id == chore_id)
    }

    /// Returns `true` when `chore_id` is configured.
    #[must_use]
    pub fn contains_chore(&self, chore_id: &str) -> bool {
        self.chore(chore_id).is_some()
    }

    /// Add or remove `person` from the vacation set. Returns `true` on change.
    pub fn set_vacation(&mut self, person: &str, on_vacation: bool) -> bool {
        let present = self.vacation_persons.iter().any(|p| p == person);
        match (on_vacation, present) {
            (true, false) => {
                self.vacation_persons.push(person.to_owned());
                true
            }
            (false, true) => {
                self.vacation_persons.retain(|p| p != person);
                true
            }
            _ => false,
        }
    }
}
