//! End-to-end coordinator behavior over real files: TOML config, JSON state,
//! restarts, and the persistence contract.

use std::path::Path;
use std::sync::Arc;

use chorehub::clock::FixedClock;
use chorehub::config::{ChoreConfig, ChoreDraft, ConfigService, HouseholdConfig};
use chorehub::coordinator::ChoreCoordinator;
use chorehub::scheduler::Status;
use chorehub::store::{JsonFileStore, RuntimeStore};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

// Monday.
fn monday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).single().expect("valid date")
}

fn write_household(path: &Path) {
    let config = HouseholdConfig {
        persons: vec![
            "person.carol".to_owned(),
            "person.alice".to_owned(),
            "person.bob".to_owned(),
        ],
        chores: vec![
            ChoreConfig::new("kitchen", "Clean kitchen", 7),
            ChoreConfig::new("fridge", "Defrost fridge", 90),
        ],
        ..HouseholdConfig::default()
    };
    let text = toml::to_string_pretty(&config).expect("serialize household");
    std::fs::write(path, text).expect("write household");
}

fn coordinator(dir: &Path, clock: &FixedClock) -> ChoreCoordinator {
    let config = ConfigService::new(dir.join("household.toml"));
    config.load().expect("load household");
    ChoreCoordinator::new(config, Arc::new(JsonFileStore::new(dir.join("state.json"))))
        .with_clock(Arc::new(clock.clone()))
}

#[tokio::test]
async fn rotation_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_household(&dir.path().join("household.toml"));
    let clock = FixedClock::new(monday());

    let mut first = coordinator(dir.path(), &clock);
    first.load_store().await.expect("empty store");
    first.refresh().expect("refresh");

    let mut done_by = Vec::new();
    for _ in 0..4 {
        clock.advance(Duration::days(1));
        done_by.push(first.complete("kitchen").await.expect("complete"));
    }
    let done_by: Vec<&str> = done_by.iter().map(|p| p.as_deref().unwrap_or("-")).collect();
    assert_eq!(
        done_by,
        vec!["person.alice", "person.bob", "person.carol", "person.alice"]
    );
    drop(first);

    let mut second = coordinator(dir.path(), &clock);
    second.load_store().await.expect("load store");
    let snapshot = second.refresh().expect("refresh");

    let state = second.runtime_state("kitchen").expect("kitchen state");
    assert_eq!(state.rotation_index, 4);
    assert_eq!(state.completion_history.len(), 4);
    assert_eq!(state.last_completed, monday() + Duration::days(4));
    assert_eq!(
        snapshot.get("kitchen").and_then(|c| c.assigned_to.as_deref()),
        Some("person.bob")
    );
}

#[tokio::test]
async fn lazy_initialization_is_not_saved_until_a_mutation() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_household(&dir.path().join("household.toml"));
    let clock = FixedClock::new(monday());

    let mut coordinator = coordinator(dir.path(), &clock);
    coordinator.refresh().expect("refresh");
    assert!(!dir.path().join("state.json").exists());

    coordinator.reset("fridge").await.expect("reset");
    let stored = JsonFileStore::new(dir.path().join("state.json"))
        .load()
        .await
        .expect("load");
    assert_eq!(stored.len(), 2, "lazily created kitchen state rides along");
    assert_eq!(stored["fridge"].rotation_index, 0);
}

#[tokio::test]
async fn decay_and_due_over_a_week() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_household(&dir.path().join("household.toml"));
    let clock = FixedClock::new(monday());

    let mut coordinator = coordinator(dir.path(), &clock);
    coordinator.refresh().expect("refresh");

    // Completed Monday, due next Monday: never shifted.
    let kitchen = coordinator.snapshot().get("kitchen").cloned().expect("kitchen");
    assert_eq!(kitchen.next_due, NaiveDate::from_ymd_opt(2025, 3, 10));

    clock.advance(Duration::hours(6 * 24 + 12));
    let snapshot = coordinator.refresh().expect("refresh");
    let kitchen = snapshot.get("kitchen").expect("kitchen");
    assert_eq!(kitchen.cleanliness, 7.1);
    assert_eq!(kitchen.status, Status::Urgent);

    clock.advance(Duration::days(3));
    let snapshot = coordinator.refresh().expect("refresh");
    let kitchen = snapshot.get("kitchen").expect("kitchen");
    assert_eq!(kitchen.cleanliness, 0.0);
    // Overdue dates stay put.
    assert_eq!(kitchen.next_due, NaiveDate::from_ymd_opt(2025, 3, 10));

    // 90 days after Monday 2025-03-03 is Sunday 2025-06-01.
    assert_eq!(
        snapshot.get("fridge").and_then(|c| c.next_due),
        NaiveDate::from_ymd_opt(2025, 6, 1)
    );
}

#[tokio::test]
async fn config_edits_are_written_with_backup() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("household.toml");
    write_household(&config_path);
    let clock = FixedClock::new(monday());

    let mut coordinator = coordinator(dir.path(), &clock);
    let id = coordinator
        .add_chore(ChoreDraft {
            name: "Water plants".to_owned(),
            room: Some("Balcony".to_owned()),
            interval_days: 7,
            assigned_person: Some("person.bob".to_owned()),
        })
        .expect("add chore");
    coordinator
        .set_vacation("person.carol", true)
        .expect("vacation");

    assert!(dir.path().join("household.toml.backup").exists());

    let reloaded = ConfigService::new(config_path);
    let household = reloaded.load().expect("reload");
    assert_eq!(household.chores.len(), 3);
    assert_eq!(household.vacation_persons, vec!["person.carol".to_owned()]);
    let added = household.chore(&id).expect("added chore persisted");
    assert_eq!(added.room.as_deref(), Some("Balcony"));
    assert_eq!(added.assigned_person.as_deref(), Some("person.bob"));
}

#[tokio::test]
async fn legacy_state_file_is_accepted() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_household(&dir.path().join("household.toml"));
    std::fs::write(
        dir.path().join("state.json"),
        r#"{
            "chores": {
                "kitchen": {
                    "last_cleaned": "2025-03-01T09:00:00",
                    "rotation_index": 2,
                    "completed_by_history": []
                },
                "garage": {
                    "last_cleaned": "2024-01-01T00:00:00+00:00",
                    "rotation_index": 0
                }
            }
        }"#,
    )
    .expect("write legacy state");
    let clock = FixedClock::new(monday());

    let mut coordinator = coordinator(dir.path(), &clock);
    coordinator.load_store().await.expect("load legacy state");
    let snapshot = coordinator.refresh().expect("refresh");

    let kitchen = snapshot.get("kitchen").expect("kitchen");
    assert_eq!(kitchen.days_since, 2.0);
    assert_eq!(kitchen.assigned_to.as_deref(), Some("person.carol"));
    assert!(snapshot.get("garage").is_none());

    let removed = coordinator.prune_orphans().await.expect("prune");
    assert_eq!(removed, vec!["garage".to_owned()]);
}

#[tokio::test]
async fn startup_prunes_chores_removed_by_hand() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_household(&dir.path().join("household.toml"));
    let clock = FixedClock::new(monday());

    let mut first = coordinator(dir.path(), &clock);
    first.start().await.expect("start");
    first.complete("fridge").await.expect("complete");
    drop(first);

    // The household drops the fridge chore by editing the TOML directly.
    let config_path = dir.path().join("household.toml");
    let mut household: HouseholdConfig =
        toml::from_str(&std::fs::read_to_string(&config_path).expect("read")).expect("parse");
    household.chores.retain(|c| c.id != "fridge");
    std::fs::write(&config_path, toml::to_string_pretty(&household).expect("serialize"))
        .expect("write");

    let mut second = coordinator(dir.path(), &clock);
    let snapshot = second.start().await.expect("start");
    assert!(snapshot.get("fridge").is_none());
    assert!(second.runtime_state("fridge").is_none());

    let stored = JsonFileStore::new(dir.path().join("state.json"))
        .load()
        .await
        .expect("load");
    assert!(!stored.contains_key("fridge"));
    assert!(stored.contains_key("kitchen"));
}
