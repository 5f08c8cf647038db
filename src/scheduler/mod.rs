//! Pure scheduling engines.
//!
//! Decay, due-date projection and assignee resolution. None of these hold
//! state; the [`coordinator`](crate::coordinator) composes them on every
//! refresh.

pub mod assignment;
pub mod decay;
pub mod due;

pub use assignment::get_effective_assignee;
pub use decay::{
    Status, calculate_cleanliness, calculate_cleanliness_at, elapsed_days, get_status,
    interval_display,
};
pub use due::{calculate_next_due, calculate_next_due_on};
