//! `sabwatch config` – print the effective configuration.

use anyhow::{Context, Result};
use sabwatch_core::config;
use std::path::Path;

pub fn run_print_config(config_path: Option<&Path>) -> Result<()> {
    let cfg = config::load_unchecked(config_path)?;
    let toml = toml::to_string_pretty(&cfg.redacted()).context("serialize config")?;
    print!("{}", toml);
    cfg.validate().context("configuration is not usable")?;
    Ok(())
}
