pub mod config;
pub mod logging;

pub mod client;
pub mod container;
pub mod evaluator;
pub mod remediator;
pub mod scheduler;
pub mod size;
pub mod snapshot;
pub mod status;

#[cfg(test)]
pub(crate) mod test_support;
