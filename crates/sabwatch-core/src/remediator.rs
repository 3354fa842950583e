//! Executes evaluator actions against the queue client and container runtime.
//!
//! One attempt per action per cycle; retries come from the evaluator's
//! counters firing again on the next qualifying cycle.

use std::time::Duration;

use crate::client::QueueClient;
use crate::container::ContainerController;
use crate::evaluator::{Action, Evaluation, Evaluator, WatchdogState};
use crate::scheduler::Clock;

/// An executed action and whether it succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub action: Action,
    pub ok: bool,
}

/// Borrowed collaborators for one cycle's remediation.
pub struct Remediator<'a> {
    pub client: &'a dyn QueueClient,
    pub container: &'a dyn ContainerController,
    pub clock: &'a dyn Clock,
    pub container_name: &'a str,
    /// Pause between a successful deletion and the free-space re-check.
    pub recheck_delay: Duration,
}

impl Remediator<'_> {
    /// Run a single action. Container restarts always report success.
    pub fn execute(&self, action: &Action) -> bool {
        tracing::info!("action: {action}");
        let ok = match action {
            Action::Resume => self.client.resume(),
            Action::DeleteJob { id, .. } => self.client.delete_job(id),
            Action::ResetQueue => self.client.reset_queue(),
            Action::RestartContainer { .. } => {
                tracing::warn!("restarting container '{}'", self.container_name);
                self.container.restart(self.container_name);
                true
            }
        };
        if ok {
            tracing::info!("action succeeded: {action}");
        } else {
            tracing::error!("action failed, will retry on a later cycle: {action}");
        }
        ok
    }

    /// Execute an evaluation's actions in order and fold their outcomes back
    /// into the state.
    ///
    /// A successful deletion is followed by a wait, a fresh snapshot and the
    /// free-space re-check, which may escalate to queue reset and restart. The
    /// re-check is skipped when the cycle already restarts the container.
    pub fn remediate(
        &self,
        evaluator: &Evaluator,
        evaluation: Evaluation,
    ) -> (WatchdogState, Vec<ActionOutcome>) {
        let Evaluation { mut state, actions } = evaluation;
        let restart_planned = actions.iter().any(Action::is_restart);
        let mut outcomes = Vec::with_capacity(actions.len());

        for action in actions {
            let ok = self.execute(&action);
            let recheck = match action {
                Action::Resume => {
                    state = evaluator.after_resume(state, ok);
                    false
                }
                Action::DeleteJob { .. } => ok && !restart_planned,
                Action::ResetQueue | Action::RestartContainer { .. } => false,
            };
            outcomes.push(ActionOutcome { action, ok });

            if recheck {
                state = self.recheck_disk(evaluator, state, &mut outcomes);
            }
        }

        (state, outcomes)
    }

    fn recheck_disk(
        &self,
        evaluator: &Evaluator,
        state: WatchdogState,
        outcomes: &mut Vec<ActionOutcome>,
    ) -> WatchdogState {
        tracing::info!(
            "waiting {}s before re-checking free space",
            self.recheck_delay.as_secs()
        );
        self.clock.sleep(self.recheck_delay);
        let snapshot = self.client.fetch_snapshot();
        if snapshot.is_fetch_failure() {
            tracing::warn!("re-check snapshot unavailable, treating disk as still low");
        }

        let (state, escalation) = evaluator.after_delete_recheck(state, snapshot.disk_free_gb);
        for action in escalation {
            let ok = self.execute(&action);
            outcomes.push(ActionOutcome { action, ok });
        }
        state
    }
}
