//! CLI for the sabwatch watchdog.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_check, run_completions, run_print_config, run_watchdog};

/// Top-level CLI for the sabwatch watchdog.
#[derive(Debug, Parser)]
#[command(name = "sabwatch", version)]
#[command(
    about = "Health-monitoring and self-healing watchdog for a SABnzbd queue",
    long_about = None
)]
pub struct Cli {
    /// Config file (default: ~/.config/sabwatch/config.toml if present).
    #[arg(long, short = 'c', global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the watchdog loop (default when no command is given).
    Run {
        /// Run a single cycle and exit.
        #[arg(long, conflicts_with = "max_cycles")]
        once: bool,
        /// Stop after N cycles instead of running forever.
        #[arg(long, value_name = "N")]
        max_cycles: Option<u64>,
    },

    /// Fetch one queue snapshot and print it without taking any action.
    Check,

    /// Print the effective configuration (API key redacted).
    Config,

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },
}

impl Default for CliCommand {
    fn default() -> Self {
        CliCommand::Run {
            once: false,
            max_cycles: None,
        }
    }
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let config_path = cli.config.as_deref();

        match cli.command.unwrap_or_default() {
            CliCommand::Run { once, max_cycles } => {
                let max_cycles = if once { Some(1) } else { max_cycles };
                run_watchdog(config_path, max_cycles)?;
            }
            CliCommand::Check => run_check(config_path)?,
            CliCommand::Config => run_print_config(config_path)?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
