//! Shared access to a [`ChoreCoordinator`] and its polling loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{ChoreCoordinator, ChoreSnapshot, Dashboard};
use crate::config::{ChoreDraft, ChorePatch, HouseholdConfig};
use crate::error::Result;
use crate::store::ChoreRuntimeState;

/// How often the polling loop recomputes the snapshot.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Cloneable handle that serializes all access to one coordinator.
///
/// Refreshes and mutations never interleave: each call holds the lock for
/// its whole duration, including the store write.
#[derive(Clone)]
pub struct CoordinatorHandle {
    inner: Arc<Mutex<ChoreCoordinator>>,
    snapshot_rx: watch::Receiver<ChoreSnapshot>,
}

impl CoordinatorHandle {
    pub fn new(coordinator: ChoreCoordinator) -> Self {
        let snapshot_rx = coordinator.subscribe();
        Self {
            inner: Arc::new(Mutex::new(coordinator)),
            snapshot_rx,
        }
    }

    /// Subscribe to published snapshots without taking the lock.
    pub fn subscribe(&self) -> watch::Receiver<ChoreSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> ChoreSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub async fn refresh(&self) -> Result<ChoreSnapshot> {
        self.inner.lock().await.refresh()
    }

    pub async fn dashboard(&self) -> Result<Dashboard> {
        self.inner.lock().await.dashboard()
    }

    pub async fn config(&self) -> Result<HouseholdConfig> {
        self.inner.lock().await.config().get()
    }

    pub async fn runtime_state(&self, chore_id: &str) -> Option<ChoreRuntimeState> {
        self.inner.lock().await.runtime_state(chore_id).cloned()
    }

    pub async fn complete(&self, chore_id: &str) -> Result<Option<String>> {
        self.inner.lock().await.complete(chore_id).await
    }

    pub async fn reset(&self, chore_id: &str) -> Result<()> {
        self.inner.lock().await.reset(chore_id).await
    }

    pub async fn prune_orphans(&self) -> Result<Vec<String>> {
        self.inner.lock().await.prune_orphans().await
    }

    pub async fn set_vacation(&self, person: &str, on_vacation: bool) -> Result<ChoreSnapshot> {
        self.inner.lock().await.set_vacation(person, on_vacation)
    }

    pub async fn set_global_pause(&self, paused: bool) -> Result<ChoreSnapshot> {
        self.inner.lock().await.set_global_pause(paused)
    }

    pub async fn add_chore(&self, draft: ChoreDraft) -> Result<String> {
        self.inner.lock().await.add_chore(draft)
    }

    pub async fn edit_chore(&self, chore_id: &str, patch: &ChorePatch) -> Result<()> {
        self.inner.lock().await.edit_chore(chore_id, patch)
    }

    pub async fn delete_chore(&self, chore_id: &str) -> Result<()> {
        self.inner.lock().await.delete_chore(chore_id).await
    }
}

/// Spawn the periodic refresh loop.
///
/// Runs one refresh per `period` (the first immediately) until `cancel`
/// fires. A failed refresh is logged and retried on the next tick.
pub fn spawn_refresh_loop(
    handle: CoordinatorHandle,
    period: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!(period_secs = period.as_secs(), "chore refresh loop started");
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("chore refresh loop cancelled");
                    break;
                }
                _ = interval.tick() => {
                    match handle.refresh().await {
                        Ok(snapshot) => debug!(chores = snapshot.len(), "periodic refresh"),
                        Err(e) => warn!(error = %e, "periodic refresh failed"),
                    }
                }
            }
        }
    })
}
