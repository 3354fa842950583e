//! Tests for check, config and completions.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::{CommandFactory, Parser};

#[test]
fn cli_parse_check() {
    match parse(&["sabwatch", "check"]).command {
        Some(CliCommand::Check) => {}
        _ => panic!("expected Check"),
    }
}

#[test]
fn cli_parse_config_with_short_flag() {
    let cli = parse(&["sabwatch", "-c", "watch.toml", "config"]);
    assert!(matches!(cli.command, Some(CliCommand::Config)));
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("watch.toml")));
}

#[test]
fn cli_parse_completions() {
    match parse(&["sabwatch", "completions", "bash"]).command {
        Some(CliCommand::Completions { shell }) => {
            assert_eq!(shell, clap_complete::Shell::Bash)
        }
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_rejects_unknown_command() {
    assert!(Cli::try_parse_from(["sabwatch", "explode"]).is_err());
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}
