//! Outer poll loop: fetch, evaluate, remediate, sleep.
//!
//! Strictly sequential. `WatchdogState` is owned here and only changes through
//! the evaluator and the remediator, so nothing needs locking.

use std::time::Duration;

use crate::client::QueueClient;
use crate::config::WatchdogConfig;
use crate::container::ContainerController;
use crate::evaluator::{Evaluator, WatchdogState};
use crate::remediator::{ActionOutcome, Remediator};
use crate::snapshot::QueueSnapshot;

/// Source of the waits between cycles (and before disk re-checks).
pub trait Clock {
    fn sleep(&self, duration: Duration);
}

impl<T: Clock + ?Sized> Clock for &T {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Blocks the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// What happened during one cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub snapshot: QueueSnapshot,
    pub outcomes: Vec<ActionOutcome>,
    /// Counters after the cycle, including action outcomes.
    pub state: WatchdogState,
}

/// The watchdog: owns the counters and drives the collaborators.
pub struct Watchdog<C, K, T> {
    cfg: WatchdogConfig,
    evaluator: Evaluator,
    client: C,
    container: K,
    clock: T,
    state: WatchdogState,
}

impl<C, K, T> Watchdog<C, K, T>
where
    C: QueueClient,
    K: ContainerController,
    T: Clock,
{
    pub fn new(cfg: WatchdogConfig, client: C, container: K, clock: T) -> Self {
        let evaluator = Evaluator::from_config(&cfg);
        Self {
            cfg,
            evaluator,
            client,
            container,
            clock,
            state: WatchdogState::new(),
        }
    }

    pub fn state(&self) -> WatchdogState {
        self.state
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.cfg.check_interval_secs)
    }

    /// Run one poll, evaluate, remediate pass.
    pub fn run_cycle(&mut self) -> CycleReport {
        let snapshot = self.client.fetch_snapshot();
        tracing::info!("{snapshot}");

        let evaluation = self.evaluator.evaluate(self.state, &snapshot);
        let remediator = Remediator {
            client: &self.client,
            container: &self.container,
            clock: &self.clock,
            container_name: &self.cfg.container_name,
            recheck_delay: Duration::from_secs(self.cfg.recheck_delay_secs),
        };
        let (state, outcomes) = remediator.remediate(&self.evaluator, evaluation);
        self.state = state;
        tracing::debug!(?state, "cycle finished");

        CycleReport {
            snapshot,
            outcomes,
            state,
        }
    }

    /// Loop until `max_cycles` cycles ran, or forever when `None`.
    ///
    /// Sleeps `check_interval_secs` between cycles, not after the last one.
    /// Returns the number of cycles run.
    pub fn run(&mut self, max_cycles: Option<u64>) -> u64 {
        tracing::info!(
            container = %self.cfg.container_name,
            interval_secs = self.cfg.check_interval_secs,
            "watchdog started"
        );
        let mut cycles = 0u64;
        loop {
            self.run_cycle();
            cycles += 1;
            if max_cycles.is_some_and(|max| cycles >= max) {
                return cycles;
            }
            self.clock.sleep(self.check_interval());
        }
    }
}
