//! All-day calendar events projected from a [`ChoreSnapshot`].
//!
//! There is one shared calendar with every scheduled chore, and one calendar
//! per person listed by [`calendar_persons`].

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::HouseholdConfig;
use crate::coordinator::ChoreSnapshot;

/// How far ahead [`next_event`] looks.
pub const LOOKAHEAD_DAYS: u64 = 365;

const UNASSIGNED_LABEL: &str = "Rotating";
const PERSON_PREFIX: &str = "person.";

/// One all-day event. `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub chore_id: String,
    pub summary: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub description: String,
}

/// Events for chores due in `[start, end)`, ordered by date then chore id.
///
/// Chores without a next-due date (paused household) produce no event. With
/// `person` set, only chores currently assigned to that person are returned.
#[must_use]
pub fn build_events(
    snapshot: &ChoreSnapshot,
    start: NaiveDate,
    end: NaiveDate,
    person: Option<&str>,
) -> Vec<CalendarEvent> {
    let mut events: Vec<CalendarEvent> = snapshot
        .chores
        .values()
        .filter(|chore| person.is_none_or(|p| chore.assigned_to.as_deref() == Some(p)))
        .filter_map(|chore| {
            let due = chore.next_due?;
            if due < start || due >= end {
                return None;
            }

            let mut lines = Vec::with_capacity(2);
            if !chore.room.is_empty() {
                lines.push(format!("Room: {}", chore.room));
            }
            let assignee = chore
                .assigned_to
                .as_deref()
                .map_or_else(|| UNASSIGNED_LABEL.to_owned(), friendly_person_name);
            lines.push(format!("Assigned: {assignee}"));

            Some(CalendarEvent {
                chore_id: chore.chore_id.clone(),
                summary: chore.name.clone(),
                start: due,
                end: due.checked_add_days(Days::new(1))?,
                description: lines.join("\n"),
            })
        })
        .collect();

    events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.chore_id.cmp(&b.chore_id)));
    events
}

/// The earliest event on or after `today`, looking ahead one year.
#[must_use]
pub fn next_event(
    snapshot: &ChoreSnapshot,
    today: NaiveDate,
    person: Option<&str>,
) -> Option<CalendarEvent> {
    let horizon = today.checked_add_days(Days::new(LOOKAHEAD_DAYS))?;
    build_events(snapshot, today, horizon, person).into_iter().next()
}

/// Persons who get their own calendar: every pinned assignee in the config
/// plus every current effective assignee, sorted and deduplicated.
#[must_use]
pub fn calendar_persons(config: &HouseholdConfig, snapshot: &ChoreSnapshot) -> Vec<String> {
    let pinned = config
        .chores
        .iter()
        .filter_map(|chore| chore.pinned_assignee().map(str::to_owned));
    let assigned = snapshot
        .chores
        .values()
        .filter_map(|chore| chore.assigned_to.clone());
    pinned
        .chain(assigned)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// `person.jane_doe` → `Jane Doe`. Other identifiers pass through unchanged.
#[must_use]
pub fn friendly_person_name(person: &str) -> String {
    let Some(rest) = person.strip_prefix(PERSON_PREFIX) else {
        return person.to_owned();
    };
    rest.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::config::ChoreConfig;
    use crate::coordinator::DerivedChoreSnapshot;
    use crate::scheduler::Status;
    use chrono::{TimeZone, Utc};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn chore(id: &str, due: Option<NaiveDate>, room: &str, who: Option<&str>) -> DerivedChoreSnapshot {
        DerivedChoreSnapshot {
            chore_id: id.to_owned(),
            name: format!("Chore {id}"),
            room: room.to_owned(),
            interval_days: 7,
            interval_display: "every 1 week".to_owned(),
            cleanliness: 80.0,
            status: Status::Great,
            icon: Status::Great.icon().to_owned(),
            days_since: 1.4,
            last_completed: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            next_due: due,
            assigned_to: who.map(str::to_owned),
        }
    }

    fn snapshot() -> ChoreSnapshot {
        let mut snapshot = ChoreSnapshot::default();
        for c in [
            chore("b", Some(date(10)), "Kitchen", Some("person.mary_jane")),
            chore("a", Some(date(10)), "", None),
            chore("c", Some(date(20)), "Hall", Some("person.bob")),
            chore("paused", None, "", Some("person.bob")),
        ] {
            snapshot.chores.insert(c.chore_id.clone(), c);
        }
        snapshot
    }

    #[test]
    fn events_fall_in_half_open_range() {
        let events = build_events(&snapshot(), date(10), date(20), None);
        let ids: Vec<&str> = events.iter().map(|e| e.chore_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(events[0].end, date(11));
    }

    #[test]
    fn description_lists_room_and_assignee() {
        let events = build_events(&snapshot(), date(1), date(31), None);
        assert_eq!(events[0].description, "Assigned: Rotating");
        assert_eq!(events[1].description, "Room: Kitchen\nAssigned: Mary Jane");
        assert_eq!(events[1].summary, "Chore b");
    }

    #[test]
    fn person_filter_keeps_only_their_chores() {
        let events = build_events(&snapshot(), date(1), date(31), Some("person.bob"));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].chore_id, "c");
    }

    #[test]
    fn next_event_is_earliest_upcoming() {
        let next = next_event(&snapshot(), date(11), None).unwrap();
        assert_eq!(next.chore_id, "c");
        assert!(next_event(&snapshot(), date(21), None).is_none());
    }

    #[test]
    fn calendar_persons_merges_pinned_and_assigned() {
        let mut pinned = ChoreConfig::new("x", "X", 7);
        pinned.assigned_person = Some("person.zoe".to_owned());
        let config = HouseholdConfig {
            chores: vec![pinned, ChoreConfig::new("y", "Y", 7)],
            ..HouseholdConfig::default()
        };
        assert_eq!(
            calendar_persons(&config, &snapshot()),
            vec![
                "person.bob".to_owned(),
                "person.mary_jane".to_owned(),
                "person.zoe".to_owned()
            ]
        );
    }

    #[test]
    fn friendly_names() {
        assert_eq!(friendly_person_name("person.jane_doe"), "Jane Doe");
        assert_eq!(friendly_person_name("person.ALEX"), "Alex");
        assert_eq!(friendly_person_name("guest"), "guest");
    }
}
