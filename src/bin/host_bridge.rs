//! Headless chorehub host for stdin/stdout JSON communication.
//!
//! Loads the household config and runtime state, keeps the chore snapshot
//! fresh on a 15-minute cadence, and serves host commands as
//! newline-delimited JSON on stdin/stdout.
//!
//! All tracing/diagnostic output goes to stderr so that stdout remains a
//! clean JSON protocol channel.

use std::sync::Arc;

use anyhow::Context;
use chorehub::config::ConfigService;
use chorehub::coordinator::{
    ChoreCoordinator, CoordinatorHandle, DEFAULT_REFRESH_INTERVAL, spawn_refresh_loop,
};
use chorehub::host::run_stdio_bridge;
use chorehub::paths;
use chorehub::store::JsonFileStore;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise tracing to stderr only (stdout is reserved for the JSON
    // protocol).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = paths::config_path();
    let state_path = paths::state_path();
    tracing::info!(
        config = %config_path.display(),
        state = %state_path.display(),
        "chorehub-host starting"
    );

    let config = ConfigService::new(config_path.clone());
    let household = config
        .load()
        .with_context(|| format!("cannot load household config {}", config_path.display()))?;
    tracing::info!(
        chores = household.chores.len(),
        persons = household.persons.len(),
        "household config loaded"
    );

    let mut coordinator = ChoreCoordinator::new(config, Arc::new(JsonFileStore::new(state_path)));
    coordinator
        .start()
        .await
        .context("cannot start chore coordinator")?;

    let handle = CoordinatorHandle::new(coordinator);
    let cancel = CancellationToken::new();
    let refresh_task = spawn_refresh_loop(handle.clone(), DEFAULT_REFRESH_INTERVAL, cancel.clone());

    let bridge_result = run_stdio_bridge(handle).await;

    cancel.cancel();
    let _ = refresh_task.await;

    bridge_result.map_err(|e| {
        tracing::error!(error = %e, "chorehub-host exited with error");
        anyhow::anyhow!("chorehub-host failed: {e}")
    })?;

    tracing::info!("chorehub-host shut down cleanly");
    Ok(())
}
