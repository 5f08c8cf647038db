//! Cleanliness decay and status tiers.
//!
//! Cleanliness starts at 100% when a chore is completed and falls linearly
//! to 0% over the chore's interval. The percentage is then bucketed into a
//! [`Status`] tier for display.

use crate::error::{ChoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lower bound (inclusive) of the [`Status::Great`] tier.
pub const THRESHOLD_GREAT: f64 = 75.0;

/// Lower bound (inclusive) of the [`Status::Fine`] tier.
pub const THRESHOLD_FINE: f64 = 50.0;

/// Lower bound (inclusive) of the [`Status::Dirty`] tier.
pub const THRESHOLD_DIRTY: f64 = 25.0;

/// Display strings for the preset intervals.
const INTERVAL_DISPLAY: &[(u32, &str)] = &[
    (7, "every 1 week"),
    (14, "every 2 weeks"),
    (21, "every 3 weeks"),
    (28, "every 4 weeks"),
    (90, "every 3 months"),
    (180, "every 6 months"),
    (365, "every 1 year"),
];

/// Status tier derived from a cleanliness percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Great,
    Fine,
    Dirty,
    Urgent,
}

impl Status {
    /// Stable label used on the wire and in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Great => "Great",
            Self::Fine => "Fine",
            Self::Dirty => "Dirty",
            Self::Urgent => "Urgent",
        }
    }

    /// Material Design icon name for the tier.
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Great => "mdi:check-circle",
            Self::Fine => "mdi:progress-check",
            Self::Dirty => "mdi:alert-circle",
            Self::Urgent => "mdi:alert-octagon",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cleanliness percentage for a chore last completed at `last_completed`,
/// measured against the current wall clock.
///
/// # Errors
/// Returns [`ChoreError::InvalidInterval`] when `interval_days` is zero.
pub fn calculate_cleanliness(last_completed: DateTime<Utc>, interval_days: u32) -> Result<f64> {
    calculate_cleanliness_at(last_completed, interval_days, Utc::now())
}

/// Cleanliness percentage as of `now`, rounded to one decimal place.
///
/// Linear decay: `100 - elapsed_hours / (interval_days * 24) * 100`,
/// clamped to `[0, 100]`.
///
/// # Errors
/// Returns [`ChoreError::InvalidInterval`] when `interval_days` is zero.
pub fn calculate_cleanliness_at(
    last_completed: DateTime<Utc>,
    interval_days: u32,
    now: DateTime<Utc>,
) -> Result<f64> {
    if interval_days == 0 {
        return Err(ChoreError::InvalidInterval(interval_days));
    }

    let elapsed_hours = elapsed_seconds(last_completed, now) / 3600.0;
    let total_hours = f64::from(interval_days) * 24.0;
    let cleanliness = (100.0 - elapsed_hours / total_hours * 100.0).clamp(0.0, 100.0);
    Ok(round1(cleanliness))
}

/// Days elapsed between `last_completed` and `now`, rounded to one decimal.
#[must_use]
pub fn elapsed_days(last_completed: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    round1(elapsed_seconds(last_completed, now) / 86_400.0)
}

/// Map a cleanliness percentage to its tier. Boundaries belong to the higher tier.
#[must_use]
pub fn get_status(cleanliness: f64) -> Status {
    if cleanliness >= THRESHOLD_GREAT {
        Status::Great
    } else if cleanliness >= THRESHOLD_FINE {
        Status::Fine
    } else if cleanliness >= THRESHOLD_DIRTY {
        Status::Dirty
    } else {
        Status::Urgent
    }
}

/// Human-readable interval, e.g. `"every 2 weeks"` or `"every 10 days"`.
#[must_use]
pub fn interval_display(interval_days: u32) -> String {
    INTERVAL_DISPLAY
        .iter()
        .find(|(days, _)| *days == interval_days)
        .map(|(_, label)| (*label).to_owned())
        .unwrap_or_else(|| format!("every {interval_days} days"))
}

/// Non-negative elapsed seconds; a timestamp in the future counts as zero.
fn elapsed_seconds(last_completed: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = now.signed_duration_since(last_completed).num_milliseconds();
    (millis.max(0) as f64) / 1000.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn just_cleaned_is_full() {
        for interval in [1, 7, 14, 365] {
            assert_eq!(calculate_cleanliness_at(now(), interval, now()).unwrap(), 100.0);
        }
    }

    #[test]
    fn half_elapsed_is_fifty() {
        let last = now() - Duration::days(7);
        assert_eq!(calculate_cleanliness_at(last, 14, now()).unwrap(), 50.0);
    }

    #[test]
    fn fully_elapsed_is_zero() {
        for interval in [1_u32, 7, 14, 90] {
            let last = now() - Duration::days(i64::from(interval));
            assert_eq!(calculate_cleanliness_at(last, interval, now()).unwrap(), 0.0);
        }
    }

    #[test]
    fn over_elapsed_clamps_to_zero() {
        let last = now() - Duration::days(30);
        assert_eq!(calculate_cleanliness_at(last, 14, now()).unwrap(), 0.0);
    }

    #[test]
    fn future_completion_clamps_to_full() {
        let last = now() + Duration::hours(3);
        assert_eq!(calculate_cleanliness_at(last, 7, now()).unwrap(), 100.0);
    }

    #[test]
    fn rounds_to_one_decimal() {
        // 1 hour of a 7-day interval: 100 - 100/168 = 99.404...
        let last = now() - Duration::hours(1);
        assert_eq!(calculate_cleanliness_at(last, 7, now()).unwrap(), 99.4);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = calculate_cleanliness_at(now(), 0, now()).unwrap_err();
        assert!(matches!(err, ChoreError::InvalidInterval(0)));
    }

    #[test]
    fn wall_clock_variant_reads_now() {
        let value = calculate_cleanliness(Utc::now(), 14).unwrap();
        assert!(value > 99.9);
    }

    #[test]
    fn status_boundaries() {
        assert_eq!(get_status(100.0), Status::Great);
        assert_eq!(get_status(75.0), Status::Great);
        assert_eq!(get_status(74.9), Status::Fine);
        assert_eq!(get_status(50.0), Status::Fine);
        assert_eq!(get_status(49.9), Status::Dirty);
        assert_eq!(get_status(25.0), Status::Dirty);
        assert_eq!(get_status(24.9), Status::Urgent);
        assert_eq!(get_status(0.0), Status::Urgent);
    }

    #[test]
    fn status_labels_and_icons() {
        assert_eq!(Status::Great.to_string(), "Great");
        assert_eq!(Status::Urgent.icon(), "mdi:alert-octagon");
        let json = serde_json::to_string(&Status::Dirty).unwrap();
        assert_eq!(json, "\"Dirty\"");
    }

    #[test]
    fn elapsed_days_rounds_and_clamps() {
        assert_eq!(elapsed_days(now() - Duration::hours(36), now()), 1.5);
        assert_eq!(elapsed_days(now() + Duration::days(1), now()), 0.0);
    }

    #[test]
    fn interval_display_presets_and_custom() {
        assert_eq!(interval_display(7), "every 1 week");
        assert_eq!(interval_display(14), "every 2 weeks");
        assert_eq!(interval_display(365), "every 1 year");
        assert_eq!(interval_display(10), "every 10 days");
    }
}
