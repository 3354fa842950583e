//! Snapshot evaluator: turns one poll into counter updates and actions.
//!
//! Three independent checks run every cycle, in order:
//! - unpause: a queue paused without post-processing is resumed after
//!   `max_paused_count` cycles
//! - disk pressure: after `max_disk_full_count` low-space cycles the largest
//!   deletable job is removed; a deletion that does not help escalates to
//!   queue reset plus container restart
//! - hang: `max_zero_count` cycles of zero speed with active slots restart
//!   the container
//!
//! Everything here is pure. Outcomes of executed actions come back through
//! [`Evaluator::after_resume`] and [`Evaluator::after_delete_recheck`].

mod action;
mod state;

use crate::config::{HangPolicy, WatchdogConfig};
use crate::snapshot::{Job, QueueSnapshot};
use crate::status::QueueStatus;

pub use action::{Action, RestartReason};
pub use state::WatchdogState;

use state::bump;

/// Result of evaluating one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub state: WatchdogState,
    /// Actions in execution order.
    pub actions: Vec<Action>,
}

/// Thresholds and policy switches for the decision logic.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    pub max_paused_count: u32,
    pub max_zero_count: u32,
    pub disk_free_threshold_gb: f64,
    pub max_disk_full_count: u32,
    pub size_check_buffer_gb: f64,
    pub restart_on_disk_full_fail_count: u32,
    pub hang_policy: HangPolicy,
    pub require_oversize_for_delete: bool,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::from_config(&WatchdogConfig::default())
    }
}

impl Evaluator {
    pub fn from_config(cfg: &WatchdogConfig) -> Self {
        Self {
            max_paused_count: cfg.max_paused_count,
            max_zero_count: cfg.max_zero_count,
            disk_free_threshold_gb: cfg.disk_free_threshold_gb,
            max_disk_full_count: cfg.max_disk_full_count,
            size_check_buffer_gb: cfg.size_check_buffer_gb,
            restart_on_disk_full_fail_count: cfg.restart_on_disk_full_fail_count,
            hang_policy: cfg.hang_policy,
            require_oversize_for_delete: cfg.require_oversize_for_delete,
        }
    }

    /// Advance the counters for `snapshot` and collect the actions to take.
    pub fn evaluate(&self, state: WatchdogState, snapshot: &QueueSnapshot) -> Evaluation {
        let mut state = state;
        let mut actions = Vec::new();

        self.check_paused(&mut state, snapshot, &mut actions);
        self.check_disk(&mut state, snapshot, &mut actions);
        self.check_hang(&mut state, snapshot, &mut actions);

        Evaluation { state, actions }
    }

    fn check_paused(
        &self,
        state: &mut WatchdogState,
        snapshot: &QueueSnapshot,
        actions: &mut Vec<Action>,
    ) {
        if snapshot.status != QueueStatus::Paused {
            state.paused = 0;
            state.post_processing = 0;
            return;
        }

        if snapshot.post_processing_active {
            state.paused = 0;
            let n = bump(&mut state.post_processing);
            tracing::info!("queue paused for post-processing ({n} cycles), leaving it alone");
            return;
        }

        state.post_processing = 0;
        let n = bump(&mut state.paused);
        tracing::info!("queue is paused ({n}/{})", self.max_paused_count);
        if n >= self.max_paused_count {
            tracing::info!("attempting to resume the queue");
            actions.push(Action::Resume);
        }
    }

    fn check_disk(
        &self,
        state: &mut WatchdogState,
        snapshot: &QueueSnapshot,
        actions: &mut Vec<Action>,
    ) {
        if !self.disk_is_low(snapshot.disk_free_gb) {
            if state.disk_full > 0 || state.disk_full_restart > 0 {
                tracing::info!(
                    "disk space recovered ({:.2} GB free)",
                    snapshot.disk_free_gb
                );
            }
            state.reset_disk();
            return;
        }

        let n = bump(&mut state.disk_full);
        tracing::info!(
            "low disk space: {:.2} GB free, threshold {:.2} GB ({n}/{})",
            snapshot.disk_free_gb,
            self.disk_free_threshold_gb,
            self.max_disk_full_count
        );
        if n < self.max_disk_full_count {
            return;
        }

        let Some(job) = deletion_candidate(&snapshot.jobs) else {
            tracing::warn!("disk is low but no queued job can be deleted");
            return;
        };

        let effective = job.effective_size_gb();
        let room = snapshot.disk_free_gb + self.size_check_buffer_gb;
        let oversized = job.total_size_gb > room;
        if oversized {
            tracing::info!(
                "job '{}' ({:.2} GB) does not fit in {:.2} GB free plus buffer",
                job.name,
                job.total_size_gb,
                snapshot.disk_free_gb
            );
        } else if self.require_oversize_for_delete {
            tracing::info!(
                "largest job '{}' ({:.2} GB) fits in free space, not deleting",
                job.name,
                job.total_size_gb
            );
            return;
        } else {
            tracing::info!(
                "largest job '{}' ({effective:.2} GB) is not solely responsible for low disk, deleting it anyway",
                job.name
            );
        }

        actions.push(Action::DeleteJob {
            id: job.id.clone(),
            name: job.name.clone(),
            effective_size_gb: effective,
            oversized,
        });
    }

    fn check_hang(
        &self,
        state: &mut WatchdogState,
        snapshot: &QueueSnapshot,
        actions: &mut Vec<Action>,
    ) {
        if !self.is_hang(snapshot) {
            state.hang = 0;
            return;
        }

        let n = bump(&mut state.hang);
        tracing::info!("download hang detected ({n}/{})", self.max_zero_count);
        if n >= self.max_zero_count {
            tracing::warn!("download hang persisted, restarting container");
            actions.push(Action::RestartContainer {
                reason: RestartReason::Hang,
            });
            state.reset_all();
        }
    }

    /// True hang: active slots, no throughput, no post-processing, and a
    /// queue status the hang policy accepts.
    pub fn is_hang(&self, snapshot: &QueueSnapshot) -> bool {
        let status_matches = match self.hang_policy {
            HangPolicy::NotPaused => snapshot.status != QueueStatus::Paused,
            HangPolicy::Downloading => snapshot.status == QueueStatus::Downloading,
        };
        snapshot.active_slots > 0
            && snapshot.speed_bytes_per_sec == 0.0
            && !snapshot.post_processing_active
            && status_matches
    }

    pub fn disk_is_low(&self, disk_free_gb: f64) -> bool {
        disk_free_gb < self.disk_free_threshold_gb
    }

    /// Apply the result of a resume attempt. A failed resume keeps the counter
    /// so the next paused cycle tries again.
    pub fn after_resume(&self, state: WatchdogState, ok: bool) -> WatchdogState {
        let mut state = state;
        if ok {
            state.paused = 0;
        }
        state
    }

    /// Apply the free space observed after a successful deletion.
    ///
    /// Returns the escalation actions, if any. Escalation (reset queue, then
    /// restart container) zeroes every counter.
    pub fn after_delete_recheck(
        &self,
        state: WatchdogState,
        disk_free_gb: f64,
    ) -> (WatchdogState, Vec<Action>) {
        let mut state = state;
        if !self.disk_is_low(disk_free_gb) {
            tracing::info!("disk pressure resolved ({disk_free_gb:.2} GB free)");
            state.reset_disk();
            state.paused = 0;
            state.post_processing = 0;
            return (state, Vec::new());
        }

        let n = bump(&mut state.disk_full_restart);
        tracing::warn!(
            "still low on disk after deletion: {disk_free_gb:.2} GB free ({n}/{})",
            self.restart_on_disk_full_fail_count
        );
        if n < self.restart_on_disk_full_fail_count {
            return (state, Vec::new());
        }

        state.reset_all();
        (
            state,
            vec![
                Action::ResetQueue,
                Action::RestartContainer {
                    reason: RestartReason::DiskFull,
                },
            ],
        )
    }
}

/// Largest job that may be deleted, by effective size.
///
/// Terminal and post-processing jobs are skipped. Ties go to the job that
/// comes first in queue order.
pub fn deletion_candidate(jobs: &[Job]) -> Option<&Job> {
    jobs.iter()
        .filter(|j| j.status.is_deletable())
        .fold(None, |best: Option<&Job>, job| match best {
            Some(b) if b.effective_size_gb() >= job.effective_size_gb() => Some(b),
            _ => Some(job),
        })
}
