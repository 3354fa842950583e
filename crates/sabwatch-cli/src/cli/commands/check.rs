//! `sabwatch check` – one snapshot, printed, no actions.

use anyhow::{Context, Result};
use sabwatch_core::client::SabnzbdClient;
use sabwatch_core::config;
use sabwatch_core::evaluator::{deletion_candidate, Evaluator};
use std::path::Path;

pub fn run_check(config_path: Option<&Path>) -> Result<()> {
    let cfg = config::load(config_path).context("invalid configuration")?;
    let client = SabnzbdClient::new(&cfg).context("cannot build API client")?;
    let snapshot = client
        .try_fetch_snapshot()
        .with_context(|| format!("could not read queue from {}", client.endpoint()))?;

    println!("{}", snapshot);
    if snapshot.jobs.is_empty() {
        println!("Queue is empty.");
        return Ok(());
    }

    println!(
        "{:<24} {:<14} {:>10} {:>10}  {}",
        "ID", "STATUS", "SIZE GB", "LEFT GB", "NAME"
    );
    for j in &snapshot.jobs {
        println!(
            "{:<24} {:<14} {:>10.2} {:>10.2}  {}",
            j.id,
            j.status.to_string(),
            j.total_size_gb,
            j.size_left_gb,
            j.name
        );
    }

    let evaluator = Evaluator::from_config(&cfg);
    if evaluator.disk_is_low(snapshot.disk_free_gb) {
        match deletion_candidate(&snapshot.jobs) {
            Some(j) => println!(
                "Disk below {:.2} GB; deletion candidate: {} ({:.2} GB)",
                cfg.disk_free_threshold_gb,
                j.name,
                j.effective_size_gb()
            ),
            None => println!(
                "Disk below {:.2} GB; no deletable job.",
                cfg.disk_free_threshold_gb
            ),
        }
    }
    if evaluator.is_hang(&snapshot) {
        println!("Queue looks hung (active slots, zero speed).");
    }
    Ok(())
}
