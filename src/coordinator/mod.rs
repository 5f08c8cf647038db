//! Schedule coordinator.
//!
//! Owns the per-chore runtime state, reads household configuration through
//! a [`ConfigService`], and recomputes the whole [`ChoreSnapshot`] on every
//! refresh by composing the decay, due-date and assignment engines.
//!
//! [`ChoreCoordinator`] itself takes `&mut self` for every mutation; wrap it
//! in a [`CoordinatorHandle`] to share it between the polling loop and
//! command handlers with serialized access.

pub mod handle;
pub mod snapshot;

pub use handle::{CoordinatorHandle, DEFAULT_REFRESH_INTERVAL, spawn_refresh_loop};
pub use snapshot::{ChoreSnapshot, Dashboard, DerivedChoreSnapshot};

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::{ChoreConfig, ChoreDraft, ChorePatch, ConfigService, HouseholdConfig};
use crate::error::{ChoreError, Result};
use crate::roster::{ConfiguredRoster, PersonRoster, normalize_roster};
use crate::scheduler::{
    calculate_cleanliness_at, calculate_next_due_on, elapsed_days, get_effective_assignee,
    get_status, interval_display,
};
use crate::store::{ChoreRuntimeState, CompletionRecord, RuntimeMap, RuntimeStore};

/// Stateful coordinator for all configured chores.
pub struct ChoreCoordinator {
    config: ConfigService,
    store: Arc<dyn RuntimeStore>,
    roster: Arc<dyn PersonRoster>,
    clock: Arc<dyn Clock>,
    prefer_weekends: bool,
    runtime: RuntimeMap,
    snapshot: ChoreSnapshot,
    snapshot_tx: watch::Sender<ChoreSnapshot>,
}

impl ChoreCoordinator {
    /// Create a coordinator with the configured roster and the system clock.
    ///
    /// Runtime state starts empty; call [`load_store`](Self::load_store)
    /// before the first refresh to pick up persisted state.
    pub fn new(config: ConfigService, store: Arc<dyn RuntimeStore>) -> Self {
        let (snapshot_tx, _rx) = watch::channel(ChoreSnapshot::default());
        Self {
            config,
            store,
            roster: Arc::new(ConfiguredRoster),
            clock: Arc::new(SystemClock),
            prefer_weekends: true,
            runtime: RuntimeMap::new(),
            snapshot: ChoreSnapshot::default(),
            snapshot_tx,
        }
    }

    /// Use a host-provided person roster.
    pub fn with_roster(mut self, roster: Arc<dyn PersonRoster>) -> Self {
        self.roster = roster;
        self
    }

    /// Use a different clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Toggle the Thursday/Friday → Saturday due-date shift (on by default).
    pub fn with_prefer_weekends(mut self, prefer_weekends: bool) -> Self {
        self.prefer_weekends = prefer_weekends;
        self
    }

    /// Replace in-memory runtime state with what the store holds.
    ///
    /// # Errors
    /// Returns [`ChoreError::Store`] if the store cannot be read.
    pub async fn load_store(&mut self) -> Result<()> {
        self.runtime = self.store.load().await?;
        debug!(chores = self.runtime.len(), "loaded chore runtime state");
        Ok(())
    }

    /// Load persisted state, drop entries for chores that are no longer
    /// configured, then publish the first snapshot.
    ///
    /// A failed prune is logged and left for the next mutation's save; the
    /// orphans are already gone from memory.
    ///
    /// # Errors
    /// - [`ChoreError::Store`] if the runtime state cannot be loaded.
    /// - [`ChoreError::Config`] if the configuration cannot be read.
    pub async fn start(&mut self) -> Result<ChoreSnapshot> {
        self.load_store().await?;
        if let Err(e) = self.prune_orphans().await {
            warn!(error = %e, "startup prune could not be saved");
        }
        self.refresh()
    }

    /// The config service this coordinator reads through.
    pub fn config(&self) -> &ConfigService {
        &self.config
    }

    /// Latest snapshot.
    pub fn snapshot(&self) -> &ChoreSnapshot {
        &self.snapshot
    }

    /// Subscribe to snapshots published after every refresh.
    pub fn subscribe(&self) -> watch::Receiver<ChoreSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Runtime state for one chore, if any exists yet.
    pub fn runtime_state(&self, chore_id: &str) -> Option<&ChoreRuntimeState> {
        self.runtime.get(chore_id)
    }

    /// All runtime state, including orphans not yet pruned.
    pub fn runtime(&self) -> &RuntimeMap {
        &self.runtime
    }

    /// Recompute the snapshot for every configured chore and publish it.
    ///
    /// Runtime state is created lazily (in memory only) for chores seen for
    /// the first time. A chore whose computation fails is logged and left out;
    /// it never aborts the rest of the refresh.
    ///
    /// # Errors
    /// Returns [`ChoreError::Config`] if the configuration cannot be read.
    pub fn refresh(&mut self) -> Result<ChoreSnapshot> {
        let config = self.config.get()?;
        let persons = self.persons(&config);
        debug!(
            chores = config.chores.len(),
            persons = persons.len(),
            paused = config.global_pause,
            "refreshing chore snapshot"
        );

        let mut chores = BTreeMap::new();
        for chore in &config.chores {
            match self.derive(chore, &config, &persons) {
                Ok(derived) => {
                    chores.insert(chore.id.clone(), derived);
                }
                Err(e) => warn!(chore_id = %chore.id, error = %e, "skipping chore in refresh"),
            }
        }

        self.snapshot = ChoreSnapshot {
            refreshed_at: Some(self.clock.now()),
            chores,
        };
        self.snapshot_tx.send_replace(self.snapshot.clone());
        Ok(self.snapshot.clone())
    }

    /// Mark a chore completed now and advance its rotation.
    ///
    /// The assignee is resolved before the rotation moves, and recorded in
    /// the history only when one exists. Returns that assignee.
    ///
    /// # Errors
    /// - [`ChoreError::NotFound`] if the chore is not configured (nothing changes).
    /// - [`ChoreError::Store`] if saving fails; the in-memory change is kept
    ///   and the snapshot still reflects it.
    pub async fn complete(&mut self, chore_id: &str) -> Result<Option<String>> {
        let config = self.config.get()?;
        let chore = config
            .chore(chore_id)
            .ok_or_else(|| ChoreError::NotFound(chore_id.to_owned()))?;
        let persons = self.persons(&config);

        let now = self.clock.now();
        let runtime = self.ensure_runtime(chore_id);
        let assignee =
            get_effective_assignee(chore, runtime, &persons, &config.vacation_persons);

        runtime.last_completed = now;
        runtime.rotation_index += 1;
        if let Some(person) = &assignee {
            runtime.completion_history.push(CompletionRecord {
                person: person.clone(),
                timestamp: now,
            });
        }
        info!(
            chore_id,
            assignee = assignee.as_deref().unwrap_or("<none>"),
            rotation_index = runtime.rotation_index,
            "chore completed"
        );

        self.commit().await?;
        Ok(assignee)
    }

    /// Restart a chore's decay without advancing its rotation.
    ///
    /// # Errors
    /// Same as [`complete`](Self::complete).
    pub async fn reset(&mut self, chore_id: &str) -> Result<()> {
        if !self.config.get()?.contains_chore(chore_id) {
            return Err(ChoreError::NotFound(chore_id.to_owned()));
        }

        let now = self.clock.now();
        self.ensure_runtime(chore_id).last_completed = now;
        info!(chore_id, "chore reset");

        self.commit().await
    }

    /// Drop runtime state for chores no longer configured. Saves only when
    /// something was removed. Returns the removed ids.
    ///
    /// # Errors
    /// Returns [`ChoreError::Store`] if the save fails.
    pub async fn prune_orphans(&mut self) -> Result<Vec<String>> {
        let config = self.config.get()?;
        let removed: Vec<String> = self
            .runtime
            .keys()
            .filter(|id| !config.contains_chore(id))
            .cloned()
            .collect();

        if removed.is_empty() {
            return Ok(removed);
        }

        for id in &removed {
            self.runtime.remove(id);
        }
        info!(removed = ?removed, "pruned orphaned chore state");
        self.persist().await?;
        Ok(removed)
    }

    /// Put `person` on (or take them off) vacation, then refresh.
    ///
    /// # Errors
    /// Returns [`ChoreError::Config`] if the config cannot be written.
    pub fn set_vacation(&mut self, person: &str, on_vacation: bool) -> Result<ChoreSnapshot> {
        let changed = self
            .config
            .update(|c| Ok(c.set_vacation(person, on_vacation)))?;
        if changed {
            info!(person, on_vacation, "vacation updated");
        }
        self.refresh()
    }

    /// Set the global pause switch, then refresh.
    ///
    /// # Errors
    /// Returns [`ChoreError::Config`] if the config cannot be written.
    pub fn set_global_pause(&mut self, paused: bool) -> Result<ChoreSnapshot> {
        self.config.update(|c| {
            c.global_pause = paused;
            Ok(())
        })?;
        info!(paused, "global pause updated");
        self.refresh()
    }

    /// Add a chore with a generated id, then refresh. Returns the new id.
    ///
    /// # Errors
    /// Returns [`ChoreError::Config`] if the chore fails validation.
    pub fn add_chore(&mut self, draft: ChoreDraft) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let chore = ChoreConfig {
            id: id.clone(),
            name: draft.name,
            room: draft.room.filter(|r| !r.is_empty()),
            interval_days: draft.interval_days,
            assigned_person: draft.assigned_person.filter(|p| !p.is_empty()),
        };
        self.config.update(|c| {
            c.chores.push(chore);
            Ok(())
        })?;
        info!(chore_id = %id, "chore added");
        self.refresh()?;
        Ok(id)
    }

    /// Edit an existing chore, then refresh.
    ///
    /// # Errors
    /// - [`ChoreError::NotFound`] for an unknown id.
    /// - [`ChoreError::Config`] if the edit fails validation.
    pub fn edit_chore(&mut self, chore_id: &str, patch: &ChorePatch) -> Result<()> {
        self.config.update(|c| {
            let chore = c
                .chores
                .iter_mut()
                .find(|chore| chore.id == chore_id)
                .ok_or_else(|| ChoreError::NotFound(chore_id.to_owned()))?;
            patch.apply(chore);
            Ok(())
        })?;
        info!(chore_id, "chore edited");
        self.refresh()?;
        Ok(())
    }

    /// Delete a chore, prune its runtime state, then refresh.
    ///
    /// # Errors
    /// - [`ChoreError::NotFound`] for an unknown id.
    /// - [`ChoreError::Store`] if pruning cannot save.
    pub async fn delete_chore(&mut self, chore_id: &str) -> Result<()> {
        self.config.update(|c| {
            let before = c.chores.len();
            c.chores.retain(|chore| chore.id != chore_id);
            if c.chores.len() == before {
                return Err(ChoreError::NotFound(chore_id.to_owned()));
            }
            Ok(())
        })?;
        info!(chore_id, "chore deleted");
        let pruned = self.prune_orphans().await;
        self.refresh()?;
        pruned.map(|_| ())
    }

    /// Current snapshot together with the vacation set and pause flag.
    ///
    /// # Errors
    /// Returns [`ChoreError::Config`] if the configuration cannot be read.
    pub fn dashboard(&self) -> Result<Dashboard> {
        let config = self.config.get()?;
        Ok(Dashboard {
            chores: self.snapshot.chores.clone(),
            vacation_persons: config.vacation_persons,
            global_pause: config.global_pause,
        })
    }

    fn persons(&self, config: &HouseholdConfig) -> Vec<String> {
        normalize_roster(self.roster.persons(config))
    }

    fn ensure_runtime(&mut self, chore_id: &str) -> &mut ChoreRuntimeState {
        let now = self.clock.now();
        self.runtime
            .entry(chore_id.to_owned())
            .or_insert_with(|| ChoreRuntimeState::new(now))
    }

    fn derive(
        &mut self,
        chore: &ChoreConfig,
        config: &HouseholdConfig,
        persons: &[String],
    ) -> Result<DerivedChoreSnapshot> {
        let prefer_weekends = self.prefer_weekends;
        let runtime = self.ensure_runtime(&chore.id).clone();
        let now = self.clock.now();

        let cleanliness = calculate_cleanliness_at(runtime.last_completed, chore.interval_days, now)?;
        let status = get_status(cleanliness);
        let next_due = (!config.global_pause)
            .then(|| {
                calculate_next_due_on(
                    runtime.last_completed,
                    chore.interval_days,
                    prefer_weekends,
                    now.date_naive(),
                )
            })
            .transpose()?;

        Ok(DerivedChoreSnapshot {
            chore_id: chore.id.clone(),
            name: chore.name.clone(),
            room: chore.room_label().to_owned(),
            interval_days: chore.interval_days,
            interval_display: interval_display(chore.interval_days),
            cleanliness,
            status,
            icon: status.icon().to_owned(),
            days_since: elapsed_days(runtime.last_completed, now),
            last_completed: runtime.last_completed,
            next_due,
            assigned_to: get_effective_assignee(
                chore,
                &runtime,
                persons,
                &config.vacation_persons,
            ),
        })
    }

    /// Save, then refresh regardless, surfacing the save error afterwards.
    async fn commit(&mut self) -> Result<()> {
        let saved = self.persist().await;
        self.refresh()?;
        saved
    }

    async fn persist(&self) -> Result<()> {
        self.store.save(&self.runtime).await.inspect_err(|e| {
            error!(error = %e, "cannot persist chore state; keeping in-memory changes");
        })
    }
}
