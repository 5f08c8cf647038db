//! Next-due date projection.
//!
//! The raw due date is the completion date plus the interval. When weekend
//! preference is on, a future Thursday or Friday due date is pulled forward
//! to the following Saturday. Nothing else moves.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};

use crate::error::{ChoreError, Result};

/// Furthest a due date may be shifted toward Saturday.
const MAX_WEEKEND_SHIFT_DAYS: u32 = 2;

/// Next due date for a chore, using today's UTC date as the overdue cut-off.
///
/// # Errors
/// Returns [`ChoreError::InvalidInterval`] when the projected date falls
/// outside the representable calendar.
pub fn calculate_next_due(
    last_completed: DateTime<Utc>,
    interval_days: u32,
    prefer_weekends: bool,
) -> Result<NaiveDate> {
    calculate_next_due_on(
        last_completed,
        interval_days,
        prefer_weekends,
        Utc::now().date_naive(),
    )
}

/// Next due date relative to an explicit `today`.
///
/// Due dates on or before `today` are returned unshifted.
///
/// # Errors
/// Returns [`ChoreError::InvalidInterval`] when the projected date falls
/// outside the representable calendar.
pub fn calculate_next_due_on(
    last_completed: DateTime<Utc>,
    interval_days: u32,
    prefer_weekends: bool,
    today: NaiveDate,
) -> Result<NaiveDate> {
    let raw_due = last_completed
        .date_naive()
        .checked_add_days(Days::new(u64::from(interval_days)))
        .ok_or(ChoreError::InvalidInterval(interval_days))?;

    if !prefer_weekends || raw_due <= today {
        return Ok(raw_due);
    }

    // Monday = 0 ... Sunday = 6; Saturday is 5.
    let weekday = raw_due.weekday().num_days_from_monday();
    if weekday < 5 {
        let days_to_saturday = 5 - weekday;
        if days_to_saturday <= MAX_WEEKEND_SHIFT_DAYS {
            return raw_due
                .checked_add_days(Days::new(u64::from(days_to_saturday)))
                .ok_or(ChoreError::InvalidInterval(interval_days));
        }
    }

    Ok(raw_due)
}
