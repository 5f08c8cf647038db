//! Person roster sources.
//!
//! The host's identity system decides who lives in the household. The
//! coordinator asks a [`PersonRoster`] on every refresh and normalizes the
//! answer with [`normalize_roster`] so rotation order never depends on
//! enumeration order.

use crate::config::HouseholdConfig;

/// Supplies the full list of known person ids.
pub trait PersonRoster: Send + Sync {
    fn persons(&self, config: &HouseholdConfig) -> Vec<String>;
}

/// Roster taken from the `persons` list in the household config.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfiguredRoster;

impl PersonRoster for ConfiguredRoster {
    fn persons(&self, config: &HouseholdConfig) -> Vec<String> {
        config.persons.clone()
    }
}

/// Fixed roster, independent of configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticRoster(pub Vec<String>);

impl PersonRoster for StaticRoster {
    fn persons(&self, _config: &HouseholdConfig) -> Vec<String> {
        self.0.clone()
    }
}

/// Sort lexicographically, drop blanks and duplicates.
#[must_use]
pub fn normalize_roster(mut persons: Vec<String>) -> Vec<String> {
    persons.retain(|p| !p.trim().is_empty());
    persons.sort();
    persons.dedup();
    persons
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_sorts_and_dedups() {
        let raw = vec![
            "person.carol".to_owned(),
            "person.alice".to_owned(),
            String::new(),
            "person.carol".to_owned(),
        ];
        assert_eq!(
            normalize_roster(raw),
            vec!["person.alice".to_owned(), "person.carol".to_owned()]
        );
    }

    #[test]
    fn configured_roster_reads_config() {
        let config = HouseholdConfig {
            persons: vec!["person.bob".to_owned()],
            ..HouseholdConfig::default()
        };
        assert_eq!(ConfiguredRoster.persons(&config), vec!["person.bob".to_owned()]);
        assert!(StaticRoster::default().persons(&config).is_empty());
    }
}
