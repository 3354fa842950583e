//! Point-in-time view of the download queue, produced once per poll.

use std::fmt;

use crate::status::{JobStatus, QueueStatus};

/// One entry of the service queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Service-assigned identifier (unique within a snapshot).
    pub id: String,
    /// Display name, used for logging only.
    pub name: String,
    pub status: JobStatus,
    pub total_size_gb: f64,
    pub size_left_gb: f64,
}

impl Job {
    /// Size this job would still claim on disk.
    ///
    /// A downloading job has already written part of its payload, so only the
    /// remainder counts; everything else is measured by its full size.
    pub fn effective_size_gb(&self) -> f64 {
        if self.status == JobStatus::Downloading {
            self.size_left_gb
        } else {
            self.total_size_gb
        }
    }
}

/// Queue state as seen by one poll.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueSnapshot {
    /// Current throughput; `-1.0` marks a failed fetch.
    pub speed_bytes_per_sec: f64,
    pub active_slots: u32,
    pub status: QueueStatus,
    pub post_processing_active: bool,
    /// Free space on the working volume; `0.0` on a failed fetch.
    pub disk_free_gb: f64,
    /// Queue order as reported by the service.
    pub jobs: Vec<Job>,
}

impl QueueSnapshot {
    /// Sentinel snapshot returned when the queue could not be fetched or parsed.
    pub fn fetch_failed() -> Self {
        Self {
            speed_bytes_per_sec: -1.0,
            active_slots: 0,
            status: QueueStatus::Error,
            post_processing_active: false,
            disk_free_gb: 0.0,
            jobs: Vec::new(),
        }
    }

    pub fn is_fetch_failure(&self) -> bool {
        self.status == QueueStatus::Error
    }
}

/// Summary line: speed, slots, status, post-processing, free disk.
impl fmt::Display for QueueSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "speed: {:.0} B/s | active slots: {} | status: {} | post-processing: {} | disk free: {:.2} GB",
            self.speed_bytes_per_sec,
            self.active_slots,
            self.status,
            if self.post_processing_active { "yes" } else { "no" },
            self.disk_free_gb,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(status: JobStatus, total: f64, left: f64) -> Job {
        Job {
            id: "SABnzbd_nzo_1".to_string(),
            name: "file".to_string(),
            status,
            total_size_gb: total,
            size_left_gb: left,
        }
    }

    #[test]
    fn effective_size_uses_remaining_only_while_downloading() {
        assert_eq!(job(JobStatus::Downloading, 10.0, 4.0).effective_size_gb(), 4.0);
        assert_eq!(job(JobStatus::Queued, 10.0, 10.0).effective_size_gb(), 10.0);
        assert_eq!(job(JobStatus::Paused, 10.0, 4.0).effective_size_gb(), 10.0);
    }

    #[test]
    fn fetch_failed_sentinel() {
        let s = QueueSnapshot::fetch_failed();
        assert_eq!(s.speed_bytes_per_sec, -1.0);
        assert_eq!(s.active_slots, 0);
        assert_eq!(s.status, QueueStatus::Error);
        assert!(!s.post_processing_active);
        assert_eq!(s.disk_free_gb, 0.0);
        assert!(s.jobs.is_empty());
        assert!(s.is_fetch_failure());
    }

    #[test]
    fn summary_line_mentions_every_field() {
        let line = QueueSnapshot::fetch_failed().to_string();
        assert!(line.contains("speed: -1 B/s"));
        assert!(line.contains("active slots: 0"));
        assert!(line.contains("status: Error"));
        assert!(line.contains("post-processing: no"));
        assert!(line.contains("disk free: 0.00 GB"));
    }
}
