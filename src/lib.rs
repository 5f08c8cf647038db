//! chorehub: household chore tracking.
//!
//! Each chore decays from 100% clean to 0% over its interval. The crate
//! projects when each chore is next due, nudging Thursday/Friday due dates
//! to the weekend, and rotates responsibility across the household while
//! skipping anyone on vacation.
//!
//! # Architecture
//!
//! - **Scheduling engines** (`scheduler`): pure decay, due-date and
//!   assignment functions
//! - **Configuration** (`config`): TOML household config behind a validated,
//!   cached [`ConfigService`]
//! - **Runtime store** (`store`): per-chore completion state, persisted as JSON
//! - **Coordinator** (`coordinator`): owns runtime state, composes the engines
//!   into a snapshot on a fixed cadence and after every mutation
//! - **Calendar** (`calendar`): all-day events projected from the snapshot
//! - **Host bridge** (`host`): versioned JSON commands over stdin/stdout

pub mod calendar;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod host;
pub mod paths;
pub mod roster;
pub mod scheduler;
pub mod store;

pub use config::{ChoreConfig, ConfigService, HouseholdConfig};
pub use coordinator::{ChoreCoordinator, ChoreSnapshot, CoordinatorHandle, DerivedChoreSnapshot};
pub use error::{ChoreError, Result};
pub use scheduler::Status;
pub use store::{ChoreRuntimeState, JsonFileStore, MemoryStore, RuntimeStore};
