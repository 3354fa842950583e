//! Status vocabulary reported by the download service.
//!
//! Both the queue-level status and the per-job status are closed sets with an
//! `Other` fallback, so a renamed or new upstream state is visible in logs
//! instead of silently failing a string comparison.

use std::fmt;

/// Overall queue status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueStatus {
    Downloading,
    Paused,
    Idle,
    /// Synthesized when the queue could not be fetched or parsed.
    Error,
    Other(String),
}

impl QueueStatus {
    pub fn from_api(s: &str) -> Self {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "downloading" => QueueStatus::Downloading,
            "paused" => QueueStatus::Paused,
            "idle" => QueueStatus::Idle,
            "error" => QueueStatus::Error,
            _ => QueueStatus::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            QueueStatus::Downloading => "Downloading",
            QueueStatus::Paused => "Paused",
            QueueStatus::Idle => "Idle",
            QueueStatus::Error => "Error",
            QueueStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single job in the queue or history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Paused,
    Downloading,
    Fetching,
    Grabbing,
    Propagating,
    Checking,
    QuickCheck,
    Verifying,
    Repairing,
    Extracting,
    Moving,
    Renaming,
    Copying,
    DirectUnpack,
    Running,
    Completed,
    Failed,
    Deleted,
    Other(String),
}

impl JobStatus {
    /// Parse an API status string.
    ///
    /// Progress variants carry a colon suffix (`"Extracting: 03/10"`); only the
    /// part before the first colon names the state.
    pub fn from_api(s: &str) -> Self {
        let base = s.split(':').next().unwrap_or_default().trim();
        let key: String = base
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "queued" => JobStatus::Queued,
            "paused" => JobStatus::Paused,
            "downloading" => JobStatus::Downloading,
            "fetching" => JobStatus::Fetching,
            "grabbing" => JobStatus::Grabbing,
            "propagating" => JobStatus::Propagating,
            "checking" => JobStatus::Checking,
            "quickcheck" => JobStatus::QuickCheck,
            "verifying" => JobStatus::Verifying,
            "repairing" => JobStatus::Repairing,
            "extracting" => JobStatus::Extracting,
            "moving" => JobStatus::Moving,
            "renaming" => JobStatus::Renaming,
            "copying" => JobStatus::Copying,
            "directunpack" => JobStatus::DirectUnpack,
            "running" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            "deleted" => JobStatus::Deleted,
            _ => JobStatus::Other(s.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "Queued",
            JobStatus::Paused => "Paused",
            JobStatus::Downloading => "Downloading",
            JobStatus::Fetching => "Fetching",
            JobStatus::Grabbing => "Grabbing",
            JobStatus::Propagating => "Propagating",
            JobStatus::Checking => "Checking",
            JobStatus::QuickCheck => "QuickCheck",
            JobStatus::Verifying => "Verifying",
            JobStatus::Repairing => "Repairing",
            JobStatus::Extracting => "Extracting",
            JobStatus::Moving => "Moving",
            JobStatus::Renaming => "Renaming",
            JobStatus::Copying => "Copying",
            JobStatus::DirectUnpack => "Direct Unpack",
            JobStatus::Running => "Running",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
            JobStatus::Deleted => "Deleted",
            JobStatus::Other(s) => s,
        }
    }

    /// True while the service is busy finishing a downloaded job.
    pub fn is_post_processing(&self) -> bool {
        matches!(
            self,
            JobStatus::Verifying
                | JobStatus::Extracting
                | JobStatus::Moving
                | JobStatus::Renaming
                | JobStatus::Repairing
                | JobStatus::Grabbing
                | JobStatus::Copying
                | JobStatus::DirectUnpack
        )
    }

    /// True for jobs that will never download again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Deleted
        )
    }

    /// Jobs that may be deleted to relieve disk pressure.
    pub fn is_deletable(&self) -> bool {
        !self.is_terminal() && !self.is_post_processing()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
