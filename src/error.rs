//! Error types for chorehub.

/// Top-level error type for chore scheduling and persistence.
#[derive(Debug, thiserror::Error)]
pub enum ChoreError {
    /// Configuration rejected at edit or load time (bad interval, duplicate id).
    #[error("config error: {0}")]
    Config(String),

    /// An engine was handed an interval it cannot project: zero days, or
    /// one that runs past the end of the calendar.
    #[error("invalid interval: {0} days")]
    InvalidInterval(u32),

    /// An operation referenced a chore id that is not configured.
    #[error("chore not found: {0}")]
    NotFound(String),

    /// Runtime store load/save failure.
    #[error("store error: {0}")]
    Store(String),

    /// Host command payload or envelope error.
    #[error("command error: {0}")]
    Command(String),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),
}

impl ChoreError {
    /// Returns `true` for lookup failures that leave state untouched.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ChoreError>;
