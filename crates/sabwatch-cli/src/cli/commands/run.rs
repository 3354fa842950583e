//! `sabwatch run` – the poll/evaluate/remediate loop.

use anyhow::{Context, Result};
use sabwatch_core::client::SabnzbdClient;
use sabwatch_core::config;
use sabwatch_core::container::CommandController;
use sabwatch_core::scheduler::{SystemClock, Watchdog};
use std::path::Path;

pub fn run_watchdog(config_path: Option<&Path>, max_cycles: Option<u64>) -> Result<()> {
    let cfg = config::load(config_path).context("invalid configuration")?;
    tracing::debug!("loaded config: {:?}", cfg);

    let client = SabnzbdClient::new(&cfg).context("cannot build API client")?;
    tracing::info!("watching {}", client.endpoint());
    let container = CommandController::new(cfg.container_runtime.clone());

    let mut watchdog = Watchdog::new(cfg, client, container, SystemClock);
    let cycles = watchdog.run(max_cycles);
    tracing::info!("watchdog stopped after {} cycle(s)", cycles);
    Ok(())
}
