//! Host command channel and router bound to a [`CoordinatorHandle`].

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, warn};

use crate::calendar::{build_events, calendar_persons, next_event};
use crate::config::{ChoreDraft, ChorePatch, interval_from_preset};
use crate::coordinator::CoordinatorHandle;
use crate::error::{ChoreError, Result};
use crate::host::contract::{
    CHORES_UPDATED_EVENT, CommandEnvelope, CommandName, EVENT_VERSION, EventEnvelope,
    ResponseEnvelope,
};

struct HostCommandRequest {
    envelope: CommandEnvelope,
    response_tx: oneshot::Sender<ResponseEnvelope>,
}

#[derive(Clone)]
pub struct HostCommandClient {
    request_tx: mpsc::Sender<HostCommandRequest>,
    event_tx: broadcast::Sender<EventEnvelope>,
}

impl HostCommandClient {
    /// Send one command and wait for its response.
    ///
    /// Command failures (unknown chore, bad payload, failed save) come back
    /// as an `ok: false` envelope. `Err` means the envelope was invalid or
    /// the server is gone.
    pub async fn send(&self, envelope: CommandEnvelope) -> Result<ResponseEnvelope> {
        envelope.validate().map_err(|e| {
            ChoreError::Command(format!(
                "invalid host command envelope {}: {}",
                envelope.request_id, e
            ))
        })?;

        let (response_tx, response_rx) = oneshot::channel();
        self.request_tx
            .send(HostCommandRequest {
                envelope,
                response_tx,
            })
            .await
            .map_err(|e| {
                ChoreError::Channel(format!("failed to send host command request: {e}"))
            })?;

        response_rx
            .await
            .map_err(|e| ChoreError::Channel(format!("host command response dropped: {e}")))
    }

    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<EventEnvelope> {
        self.event_tx.subscribe()
    }
}

pub struct HostCommandServer {
    request_rx: mpsc::Receiver<HostCommandRequest>,
    event_tx: broadcast::Sender<EventEnvelope>,
    coordinator: CoordinatorHandle,
}

#[must_use]
pub fn command_channel(
    request_capacity: usize,
    event_capacity: usize,
    coordinator: CoordinatorHandle,
) -> (HostCommandClient, HostCommandServer) {
    let (event_tx, _event_rx) = broadcast::channel(event_capacity.max(1));
    let (request_tx, request_rx) = mpsc::channel(request_capacity.max(1));

    (
        HostCommandClient {
            request_tx,
            event_tx: event_tx.clone(),
        },
        HostCommandServer {
            request_rx,
            event_tx,
            coordinator,
        },
    )
}

impl HostCommandServer {
    /// Serve requests one at a time until every client is dropped.
    pub async fn run(mut self) {
        while let Some(request) = self.request_rx.recv().await {
            let response = self.dispatch(&request.envelope).await;
            let _ = request.response_tx.send(response);
        }
        debug!("host command server stopped; all clients dropped");
    }

    /// Route a command and turn any failure into an error envelope.
    pub async fn dispatch(&self, envelope: &CommandEnvelope) -> ResponseEnvelope {
        match self.route(envelope).await {
            Ok(response) => {
                if envelope.command.is_mutation() {
                    self.emit_event(
                        CHORES_UPDATED_EVENT,
                        serde_json::json!({
                            "request_id": envelope.request_id,
                            "command": envelope.command.as_str(),
                        }),
                    );
                }
                response
            }
            Err(e) => {
                warn!(
                    request_id = %envelope.request_id,
                    command = envelope.command.as_str(),
                    error = %e,
                    "host command failed"
                );
                ResponseEnvelope::error(envelope.request_id.clone(), e.to_string())
            }
        }
    }

    /// Route a command envelope to the appropriate handler.
    pub async fn route(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        match envelope.command {
            CommandName::HostPing => Ok(ResponseEnvelope::ok(
                envelope.request_id.clone(),
                serde_json::json!({"pong": true}),
            )),
            CommandName::HostVersion => Ok(ResponseEnvelope::ok(
                envelope.request_id.clone(),
                serde_json::json!({
                    "contract_version": EVENT_VERSION,
                    "package_version": env!("CARGO_PKG_VERSION"),
                }),
            )),
            CommandName::RuntimeStop => Ok(ResponseEnvelope::ok(
                envelope.request_id.clone(),
                serde_json::json!({"accepted": true}),
            )),
            CommandName::ChoresDashboard => self.handle_dashboard(envelope).await,
            CommandName::ChoresComplete => self.handle_complete(envelope).await,
            CommandName::ChoresReset => self.handle_reset(envelope).await,
            CommandName::ChoresAdd => self.handle_add(envelope).await,
            CommandName::ChoresEdit => self.handle_edit(envelope).await,
            CommandName::ChoresDelete => self.handle_delete(envelope).await,
            CommandName::ChoresPrune => self.handle_prune(envelope).await,
            CommandName::VacationSet => self.handle_vacation_set(envelope).await,
            CommandName::PauseSet => self.handle_pause_set(envelope).await,
            CommandName::CalendarEvents => self.handle_calendar_events(envelope),
            CommandName::CalendarPersons => self.handle_calendar_persons(envelope).await,
            CommandName::CalendarNext => self.handle_calendar_next(envelope),
        }
    }

    async fn handle_dashboard(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let dashboard = self.coordinator.dashboard().await?;
        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            to_payload(&dashboard)?,
        ))
    }

    async fn handle_complete(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let chore_id = parse_non_empty_field(&envelope.payload, "chore_id", "chores.complete")?;
        let assignee = self.coordinator.complete(&chore_id).await?;
        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            serde_json::json!({"chore_id": chore_id, "completed_by": assignee}),
        ))
    }

    async fn handle_reset(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let chore_id = parse_non_empty_field(&envelope.payload, "chore_id", "chores.reset")?;
        self.coordinator.reset(&chore_id).await?;
        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            serde_json::json!({"chore_id": chore_id}),
        ))
    }

    async fn handle_add(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let mut payload = envelope.payload.clone();
        resolve_interval_preset(&mut payload)?;
        let draft: ChoreDraft = serde_json::from_value(payload)
            .map_err(|e| ChoreError::Command(format!("chores.add payload is invalid: {e}")))?;
        let chore_id = self.coordinator.add_chore(draft).await?;
        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            serde_json::json!({"chore_id": chore_id}),
        ))
    }

    async fn handle_edit(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let chore_id = parse_non_empty_field(&envelope.payload, "chore_id", "chores.edit")?;
        let patch: ChorePatch = serde_json::from_value(envelope.payload.clone())
            .map_err(|e| ChoreError::Command(format!("chores.edit payload is invalid: {e}")))?;
        self.coordinator.edit_chore(&chore_id, &patch).await?;
        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            serde_json::json!({"chore_id": chore_id}),
        ))
    }

    async fn handle_delete(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let chore_id = parse_non_empty_field(&envelope.payload, "chore_id", "chores.delete")?;
        self.coordinator.delete_chore(&chore_id).await?;
        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            serde_json::json!({"chore_id": chore_id}),
        ))
    }

    async fn handle_prune(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let removed = self.coordinator.prune_orphans().await?;
        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            serde_json::json!({"removed": removed}),
        ))
    }

    async fn handle_vacation_set(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let person = parse_non_empty_field(&envelope.payload, "person", "vacation.set")?;
        let vacation = parse_bool_field(&envelope.payload, "vacation", "vacation.set")?;
        self.coordinator.set_vacation(&person, vacation).await?;
        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            serde_json::json!({"person": person, "vacation": vacation}),
        ))
    }

    async fn handle_pause_set(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let paused = parse_bool_field(&envelope.payload, "paused", "pause.set")?;
        self.coordinator.set_global_pause(paused).await?;
        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            serde_json::json!({"paused": paused}),
        ))
    }

    fn handle_calendar_events(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let start = parse_date_field(&envelope.payload, "start", "calendar.events")?;
        let end = parse_date_field(&envelope.payload, "end", "calendar.events")?;
        if end < start {
            return Err(ChoreError::Command(format!(
                "calendar.events end {end} is before start {start}"
            )));
        }
        let events = build_events(
            &self.coordinator.snapshot(),
            start,
            end,
            person_filter(&envelope.payload),
        );
        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            serde_json::json!({"events": to_payload(&events)?}),
        ))
    }

    /// The next event on or after `payload.today`, which defaults to the
    /// date of the last refresh.
    fn handle_calendar_next(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let snapshot = self.coordinator.snapshot();
        let today = if envelope.payload.get("today").is_some() {
            parse_date_field(&envelope.payload, "today", "calendar.next")?
        } else {
            snapshot
                .refreshed_at
                .unwrap_or_else(chrono::Utc::now)
                .date_naive()
        };

        let event = next_event(&snapshot, today, person_filter(&envelope.payload));
        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            serde_json::json!({"event": to_payload(&event)?}),
        ))
    }

    async fn handle_calendar_persons(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let config = self.coordinator.config().await?;
        let persons = calendar_persons(&config, &self.coordinator.snapshot());
        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            serde_json::json!({"persons": persons}),
        ))
    }

    fn emit_event(&self, event: &str, payload: serde_json::Value) {
        let envelope =
            EventEnvelope::new(uuid::Uuid::new_v4().to_string(), event.to_owned(), payload);
        let _ = self.event_tx.send(envelope);
    }
}

fn to_payload<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| ChoreError::Command(format!("failed to serialize response payload: {e}")))
}

/// Fill `interval_days` from `interval_preset` (e.g. `"2_weeks"`) when only
/// the preset is given.
fn resolve_interval_preset(payload: &mut serde_json::Value) -> Result<()> {
    if payload.get("interval_days").is_some() {
        return Ok(());
    }
    let Some(key) = payload.get("interval_preset").and_then(serde_json::Value::as_str) else {
        return Ok(());
    };
    let days = interval_from_preset(key)
        .ok_or_else(|| ChoreError::Command(format!("unknown interval preset `{key}`")))?;
    if let Some(map) = payload.as_object_mut() {
        map.insert("interval_days".to_owned(), serde_json::json!(days));
    }
    Ok(())
}

fn parse_non_empty_field(
    payload: &serde_json::Value,
    field: &str,
    command: &str,
) -> Result<String> {
    let Some(raw) = payload.get(field).and_then(serde_json::Value::as_str) else {
        return Err(ChoreError::Command(format!(
            "{command} requires payload.{field}"
        )));
    };
    if raw.trim().is_empty() {
        return Err(ChoreError::Command(format!(
            "{command} requires a non-empty payload.{field}"
        )));
    }
    Ok(raw.to_owned())
}

/// Optional `payload.person`; blank means no filter.
fn person_filter(payload: &serde_json::Value) -> Option<&str> {
    payload
        .get("person")
        .and_then(serde_json::Value::as_str)
        .filter(|p| !p.trim().is_empty())
}

fn parse_bool_field(payload: &serde_json::Value, field: &str, command: &str) -> Result<bool> {
    payload
        .get(field)
        .and_then(serde_json::Value::as_bool)
        .ok_or_else(|| ChoreError::Command(format!("{command} requires boolean payload.{field}")))
}

fn parse_date_field(payload: &serde_json::Value, field: &str, command: &str) -> Result<NaiveDate> {
    let raw = parse_non_empty_field(payload, field, command)?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        ChoreError::Command(format!(
            "{command} payload.{field} `{raw}` is not a YYYY-MM-DD date: {e}"
        ))
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::config::{ChoreConfig, ConfigService, HouseholdConfig};
    use crate::coordinator::ChoreCoordinator;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn make_server() -> (HostCommandClient, HostCommandServer) {
        let config = HouseholdConfig {
            persons: vec!["person.alice".to_owned()],
            chores: vec![ChoreConfig::new("floor", "Mop floor", 7)],
            ..HouseholdConfig::default()
        };
        let coordinator = ChoreCoordinator::new(
            ConfigService::in_memory(config).unwrap(),
            Arc::new(MemoryStore::new()),
        );
        command_channel(8, 8, CoordinatorHandle::new(coordinator))
    }

    fn make_envelope(command: CommandName, payload: serde_json::Value) -> CommandEnvelope {
        CommandEnvelope::new("test-req-1", command, payload)
    }

    #[tokio::test]
    async fn complete_accepted_and_emits_update() {
        let (client, server) = make_server();
        let mut events = client.subscribe_events();
        let resp = server
            .dispatch(&make_envelope(
                CommandName::ChoresComplete,
                serde_json::json!({"chore_id": "floor"}),
            ))
            .await;
        assert!(resp.ok);
        assert_eq!(resp.payload["completed_by"], "person.alice");

        let event = events.try_recv().unwrap();
        assert_eq!(event.event, CHORES_UPDATED_EVENT);
        assert_eq!(event.payload["command"], "chores.complete");
    }

    #[tokio::test]
    async fn unknown_chore_is_reported_without_event() {
        let (client, server) = make_server();
        let mut events = client.subscribe_events();
        let resp = server
            .dispatch(&make_envelope(
                CommandName::ChoresReset,
                serde_json::json!({"chore_id": "ghost"}),
            ))
            .await;
        assert!(!resp.ok);
        assert!(resp.error.unwrap().contains("ghost"));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn chore_ids_are_passed_through_untrimmed() {
        let config = HouseholdConfig {
            chores: vec![ChoreConfig::new(" hall ", "Sweep hall", 7)],
            ..HouseholdConfig::default()
        };
        let coordinator = ChoreCoordinator::new(
            ConfigService::in_memory(config).unwrap(),
            Arc::new(MemoryStore::new()),
        );
        let (_client, server) = command_channel(8, 8, CoordinatorHandle::new(coordinator));

        let resp = server
            .dispatch(&make_envelope(
                CommandName::ChoresComplete,
                serde_json::json!({"chore_id": " hall "}),
            ))
            .await;
        assert!(resp.ok, "{:?}", resp.error);
        assert_eq!(resp.payload["chore_id"], " hall ");

        let resp = server
            .route(&make_envelope(
                CommandName::ChoresReset,
                serde_json::json!({"chore_id": "hall"}),
            ))
            .await;
        assert!(matches!(resp, Err(ChoreError::NotFound(_))));

        let resp = server
            .route(&make_envelope(
                CommandName::ChoresReset,
                serde_json::json!({"chore_id": "   "}),
            ))
            .await;
        assert!(matches!(resp, Err(ChoreError::Command(_))));
    }

    #[tokio::test]
    async fn missing_chore_id_returns_error() {
        let (_client, server) = make_server();
        let resp = server
            .route(&make_envelope(CommandName::ChoresComplete, serde_json::json!({})))
            .await;
        assert!(matches!(resp, Err(ChoreError::Command(_))));
    }

    #[tokio::test]
    async fn pause_requires_boolean() {
        let (_client, server) = make_server();
        let resp = server
            .dispatch(&make_envelope(
                CommandName::PauseSet,
                serde_json::json!({"paused": "yes"}),
            ))
            .await;
        assert!(!resp.ok);
    }

    #[tokio::test]
    async fn calendar_events_rejects_bad_dates() {
        let (_client, server) = make_server();
        let resp = server
            .dispatch(&make_envelope(
                CommandName::CalendarEvents,
                serde_json::json!({"start": "2025-13-01", "end": "2025-12-31"}),
            ))
            .await;
        assert!(!resp.ok);

        let resp = server
            .dispatch(&make_envelope(
                CommandName::CalendarEvents,
                serde_json::json!({"start": "2025-02-01", "end": "2025-01-01"}),
            ))
            .await;
        assert!(!resp.ok);
    }

    #[tokio::test]
    async fn add_accepts_interval_preset() {
        let (_client, server) = make_server();
        let resp = server
            .dispatch(&make_envelope(
                CommandName::ChoresAdd,
                serde_json::json!({"name": "Descale kettle", "interval_preset": "3_months"}),
            ))
            .await;
        assert!(resp.ok);
        let chore_id = resp.payload["chore_id"].as_str().unwrap().to_owned();
        let config = server.coordinator.config().await.unwrap();
        assert_eq!(config.chore(&chore_id).unwrap().interval_days, 90);

        let resp = server
            .dispatch(&make_envelope(
                CommandName::ChoresAdd,
                serde_json::json!({"name": "Odd", "interval_preset": "fortnightly"}),
            ))
            .await;
        assert!(!resp.ok);
    }

    #[tokio::test]
    async fn add_then_edit_round_trip() {
        let (_client, server) = make_server();
        let resp = server
            .dispatch(&make_envelope(
                CommandName::ChoresAdd,
                serde_json::json!({"name": "Dust shelves", "room": "Study", "interval_days": 14}),
            ))
            .await;
        assert!(resp.ok);
        let chore_id = resp.payload["chore_id"].as_str().unwrap().to_owned();

        let resp = server
            .dispatch(&make_envelope(
                CommandName::ChoresEdit,
                serde_json::json!({"chore_id": chore_id, "interval_days": 21}),
            ))
            .await;
        assert!(resp.ok);

        let resp = server
            .dispatch(&make_envelope(CommandName::ChoresDashboard, serde_json::Value::Null))
            .await;
        assert_eq!(resp.payload["chores"][chore_id.as_str()]["interval_days"], 21);
        assert_eq!(
            resp.payload["chores"][chore_id.as_str()]["interval_display"],
            "every 3 weeks"
        );
    }
}
