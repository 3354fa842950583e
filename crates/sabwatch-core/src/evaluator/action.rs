//! Remediation actions chosen by the evaluator.

use std::fmt;

/// Why the container is being restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartReason {
    /// Zero throughput while downloads are active.
    Hang,
    /// Deleting a job did not bring free space back above the threshold.
    DiskFull,
}

/// One side effect on the download service or its container.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Resume,
    DeleteJob {
        id: String,
        name: String,
        effective_size_gb: f64,
        /// The job alone exceeds free space plus the configured buffer.
        oversized: bool,
    },
    ResetQueue,
    RestartContainer {
        reason: RestartReason,
    },
}

impl Action {
    pub fn is_restart(&self) -> bool {
        matches!(self, Action::RestartContainer { .. })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Resume => write!(f, "resume queue"),
            Action::DeleteJob {
                name,
                effective_size_gb,
                ..
            } => write!(f, "delete job '{name}' ({effective_size_gb:.2} GB)"),
            Action::ResetQueue => write!(f, "reset queue"),
            Action::RestartContainer { reason } => match reason {
                RestartReason::Hang => write!(f, "restart container (download hang)"),
                RestartReason::DiskFull => write!(f, "restart container (disk still full)"),
            },
        }
    }
}
