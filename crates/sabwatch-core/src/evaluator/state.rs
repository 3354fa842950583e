//! Debounce counters carried from one poll cycle to the next.

/// Consecutive-cycle counters, one per abnormal condition.
///
/// Each cycle moves every counter by at most one step: up by one while its
/// condition holds, back to zero once it does not. A container restart zeroes
/// all of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchdogState {
    /// Cycles with active slots, zero speed and no post-processing.
    pub hang: u32,
    /// Cycles paused without post-processing.
    pub paused: u32,
    /// Cycles paused while post-processing. Diagnostic only.
    pub post_processing: u32,
    /// Cycles below the free-space threshold.
    pub disk_full: u32,
    /// Successful deletions that left free space below the threshold.
    pub disk_full_restart: u32,
}

impl WatchdogState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset_all(&mut self) {
        *self = Self::default();
    }

    /// Clear the counters tied to disk pressure.
    pub fn reset_disk(&mut self) {
        self.disk_full = 0;
        self.disk_full_restart = 0;
    }

    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }
}

pub(super) fn bump(counter: &mut u32) -> u32 {
    *counter = counter.saturating_add(1);
    *counter
}
