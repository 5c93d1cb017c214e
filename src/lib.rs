pub mod config;
pub mod country_provider;
pub mod log;
pub mod normalize;
pub mod providers;
pub mod rate_provider;
pub mod report;
pub mod snapshot;
pub mod store;
pub mod ui;

use crate::providers::eclesiar::EclesiarClient;
use crate::snapshot::{RunStats, SnapshotRunner};
use crate::store::disk::FjallSnapshotStore;
use anyhow::{Context, Result};
use tracing::{debug, info};

pub enum AppCommand {
    Run,
}

pub async fn run_command(cmd: AppCommand, config_path: Option<&str>) -> Result<()> {
    match cmd {
        AppCommand::Run => run_once(config_path).await.map(|_| ()),
    }
}

/// Performs one snapshot run to completion and reports its stats.
///
/// Initialization failures (config, credential, store) are fatal; once the
/// run starts, per-currency failures only elevate the skipped count.
pub async fn run_once(config_path: Option<&str>) -> Result<RunStats> {
    info!("Currency snapshot run starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let api_key = config.api.resolve_key()?;
    let client = EclesiarClient::new(&config.api.base_url, &api_key, config.api.auth)?;

    let data_dir = config.store.resolve_data_dir()?;
    let store = FjallSnapshotStore::open(&data_dir, &config.store.collection)
        .with_context(|| format!("Failed to open snapshot store at {}", data_dir.display()))?;

    let runner = SnapshotRunner::new(&client, &client, &store);

    let pb = ui::new_progress_bar(0, true);
    pb.set_message("Snapshotting currencies...");
    let stats = runner.run_once(Some(&pb)).await?;
    pb.finish_and_clear();

    report::report(&stats);
    Ok(stats)
}
