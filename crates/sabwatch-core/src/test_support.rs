//! Test doubles for the client, container and clock seams.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

use crate::client::QueueClient;
use crate::container::ContainerController;
use crate::scheduler::Clock;
use crate::snapshot::QueueSnapshot;
use crate::status::QueueStatus;

/// Healthy downloading queue with the given free space.
pub(crate) fn snapshot_with_disk(disk_free_gb: f64) -> QueueSnapshot {
    QueueSnapshot {
        speed_bytes_per_sec: 2_000_000.0,
        active_slots: 1,
        status: QueueStatus::Downloading,
        post_processing_active: false,
        disk_free_gb,
        jobs: Vec::new(),
    }
}

/// Scripted queue client. Snapshots are served in order; once the script runs
/// out every fetch fails.
pub(crate) struct FakeClient {
    snapshots: RefCell<VecDeque<QueueSnapshot>>,
    calls: RefCell<Vec<String>>,
    pub resume_ok: Cell<bool>,
    pub delete_ok: Cell<bool>,
    pub reset_ok: Cell<bool>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            snapshots: RefCell::new(VecDeque::new()),
            calls: RefCell::new(Vec::new()),
            resume_ok: Cell::new(true),
            delete_ok: Cell::new(true),
            reset_ok: Cell::new(true),
        }
    }

    pub fn push_snapshot(&self, snapshot: QueueSnapshot) {
        self.snapshots.borrow_mut().push_back(snapshot);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl QueueClient for FakeClient {
    fn fetch_snapshot(&self) -> QueueSnapshot {
        self.record("fetch".to_string());
        self.snapshots
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(QueueSnapshot::fetch_failed)
    }

    fn resume(&self) -> bool {
        self.record("resume".to_string());
        self.resume_ok.get()
    }

    fn delete_job(&self, id: &str) -> bool {
        self.record(format!("delete {id}"));
        self.delete_ok.get()
    }

    fn reset_queue(&self) -> bool {
        self.record("reset".to_string());
        self.reset_ok.get()
    }
}

#[derive(Default)]
pub(crate) struct RecordingContainer {
    restarted: RefCell<Vec<String>>,
}

impl RecordingContainer {
    pub fn restarts(&self) -> Vec<String> {
        self.restarted.borrow().clone()
    }
}

impl ContainerController for RecordingContainer {
    fn restart(&self, container_name: &str) {
        self.restarted.borrow_mut().push(container_name.to_string());
    }
}

#[derive(Default)]
pub(crate) struct RecordingClock {
    slept: RefCell<Vec<Duration>>,
}

impl RecordingClock {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.slept.borrow().clone()
    }
}

impl Clock for RecordingClock {
    fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}
