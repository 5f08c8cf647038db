//! Versioned host command/event envelopes.

use serde::{Deserialize, Serialize};

/// Contract version for host command/event envelopes.
pub const EVENT_VERSION: u32 = 1;

/// Event emitted after every successful mutation.
pub const CHORES_UPDATED_EVENT: &str = "chores.updated";

/// Command set for host integrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandName {
    #[serde(rename = "host.ping")]
    HostPing,
    #[serde(rename = "host.version")]
    HostVersion,
    #[serde(rename = "runtime.stop")]
    RuntimeStop,
    #[serde(rename = "chores.dashboard")]
    ChoresDashboard,
    #[serde(rename = "chores.complete")]
    ChoresComplete,
    #[serde(rename = "chores.reset")]
    ChoresReset,
    #[serde(rename = "chores.add")]
    ChoresAdd,
    #[serde(rename = "chores.edit")]
    ChoresEdit,
    #[serde(rename = "chores.delete")]
    ChoresDelete,
    #[serde(rename = "chores.prune")]
    ChoresPrune,
    #[serde(rename = "vacation.set")]
    VacationSet,
    #[serde(rename = "pause.set")]
    PauseSet,
    #[serde(rename = "calendar.events")]
    CalendarEvents,
    #[serde(rename = "calendar.persons")]
    CalendarPersons,
    #[serde(rename = "calendar.next")]
    CalendarNext,
}

impl CommandName {
    /// Render command name to wire format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HostPing => "host.ping",
            Self::HostVersion => "host.version",
            Self::RuntimeStop => "runtime.stop",
            Self::ChoresDashboard => "chores.dashboard",
            Self::ChoresComplete => "chores.complete",
            Self::ChoresReset => "chores.reset",
            Self::ChoresAdd => "chores.add",
            Self::ChoresEdit => "chores.edit",
            Self::ChoresDelete => "chores.delete",
            Self::ChoresPrune => "chores.prune",
            Self::VacationSet => "vacation.set",
            Self::PauseSet => "pause.set",
            Self::CalendarEvents => "calendar.events",
            Self::CalendarPersons => "calendar.persons",
            Self::CalendarNext => "calendar.next",
        }
    }

    /// Whether a successful run of this command changes household state.
    #[must_use]
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            Self::ChoresComplete
                | Self::ChoresReset
                | Self::ChoresAdd
                | Self::ChoresEdit
                | Self::ChoresDelete
                | Self::ChoresPrune
                | Self::VacationSet
                | Self::PauseSet
        )
    }
}

/// A versioned response envelope from backend host -> frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub v: u32,
    pub request_id: String,
    pub ok: bool,
    pub payload: serde_json::Value,
    pub error: Option<String>,
}

impl ResponseEnvelope {
    /// Build a successful response envelope.
    #[must_use]
    pub fn ok(request_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            ok: true,
            payload,
            error: None,
        }
    }

    /// Build an error response envelope.
    #[must_use]
    pub fn error(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            ok: false,
            payload: serde_json::Value::Null,
            error: Some(message.into()),
        }
    }
}

/// A versioned command envelope from frontend -> backend host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub v: u32,
    pub request_id: String,
    pub command: CommandName,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl CommandEnvelope {
    /// Build a v1 command envelope.
    #[must_use]
    pub fn new(
        request_id: impl Into<String>,
        command: CommandName,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            command,
            payload,
        }
    }

    /// Validate envelope version and required identifiers.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.v != EVENT_VERSION {
            return Err(ContractError::new(
                ContractErrorKind::UnsupportedVersion,
                format!(
                    "unsupported contract version {}; expected {}",
                    self.v, EVENT_VERSION
                ),
            ));
        }
        if self.request_id.trim().is_empty() {
            return Err(ContractError::new(
                ContractErrorKind::InvalidEnvelope,
                "request_id cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

/// A versioned event envelope from backend host -> frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub v: u32,
    pub event_id: String,
    pub event: String,
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    /// Build a v1 event envelope.
    #[must_use]
    pub fn new(
        event_id: impl Into<String>,
        event: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            v: EVENT_VERSION,
            event_id: event_id.into(),
            event: event.into(),
            payload,
        }
    }
}

/// Contract validation error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractErrorKind {
    UnsupportedVersion,
    InvalidEnvelope,
}

/// Contract validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractError {
    pub kind: ContractErrorKind,
    pub message: String,
}

impl ContractError {
    #[must_use]
    pub fn new(kind: ContractErrorKind, message: String) -> Self {
        Self { kind, message }
    }
}

impl std::fmt::Display for ContractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ContractError {}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    const ALL: &[CommandName] = &[
        CommandName::HostPing,
        CommandName::HostVersion,
        CommandName::RuntimeStop,
        CommandName::ChoresDashboard,
        CommandName::ChoresComplete,
        CommandName::ChoresReset,
        CommandName::ChoresAdd,
        CommandName::ChoresEdit,
        CommandName::ChoresDelete,
        CommandName::ChoresPrune,
        CommandName::VacationSet,
        CommandName::PauseSet,
        CommandName::CalendarEvents,
        CommandName::CalendarPersons,
        CommandName::CalendarNext,
    ];

    #[test]
    fn wire_names_agree_with_serde() {
        for command in ALL {
            let json = serde_json::to_value(command).unwrap();
            assert_eq!(json, serde_json::Value::String(command.as_str().to_owned()));
            let back: CommandName = serde_json::from_value(json).unwrap();
            assert_eq!(back, *command);
        }
        assert!(serde_json::from_str::<CommandName>("\"scheduler.list\"").is_err());
    }

    #[test]
    fn only_state_changes_are_mutations() {
        assert!(CommandName::ChoresComplete.is_mutation());
        assert!(CommandName::PauseSet.is_mutation());
        assert!(!CommandName::ChoresDashboard.is_mutation());
        assert!(!CommandName::CalendarEvents.is_mutation());
    }

    #[test]
    fn validate_rejects_wrong_version_and_blank_request_id() {
        let mut envelope = CommandEnvelope::new("req-1", CommandName::HostPing, serde_json::json!({}));
        assert!(envelope.validate().is_ok());

        envelope.v = 2;
        let err = envelope.validate().unwrap_err();
        assert_eq!(err.kind, ContractErrorKind::UnsupportedVersion);

        envelope.v = EVENT_VERSION;
        envelope.request_id = "  ".to_owned();
        let err = envelope.validate().unwrap_err();
        assert_eq!(err.kind, ContractErrorKind::InvalidEnvelope);
    }

    #[test]
    fn payload_defaults_to_null() {
        let envelope: CommandEnvelope =
            serde_json::from_str(r#"{"v":1,"request_id":"r","command":"chores.dashboard"}"#).unwrap();
        assert!(envelope.payload.is_null());
    }
}
