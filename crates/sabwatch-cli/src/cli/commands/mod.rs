//! CLI command handlers, one per file.

mod check;
mod completions;
mod config;
mod run;

pub use check::run_check;
pub use completions::run_completions;
pub use config::run_print_config;
pub use run::run_watchdog;
