//! `WorkerMetrics` (spec.md §3): atomic counters, the only shared-mutable
//! state besides the cancellation token. Readable at any time without
//! locking.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct WorkerMetrics {
    pub io_started: AtomicU64,
    pub io_stopped: AtomicU64,
    pub io_active: AtomicU64,
    pub io_max_active: AtomicU64,
    pub cpu_started: AtomicU64,
    pub cpu_stopped: AtomicU64,
    pub cpu_active: AtomicU64,
    pub cpu_max_active: AtomicU64,
    pub scale_ups: AtomicU64,
    pub files_enqueued: AtomicU64,
    pub files_scanned: AtomicU64,
    pub lines_enqueued: AtomicU64,
    pub lines_processed: AtomicU64,
    pub matches_produced: AtomicU64,
}

impl WorkerMetrics {
    pub fn new() -> WorkerMetrics {
        WorkerMetrics::default()
    }

    pub fn io_worker_started(&self) {
        self.io_started.fetch_add(1, Ordering::Relaxed);
        let active = self.io_active.fetch_add(1, Ordering::Relaxed) + 1;
        self.bump_max(&self.io_max_active, active);
    }

    pub fn io_worker_stopped(&self) {
        self.io_active.fetch_sub(1, Ordering::Relaxed);
        self.io_stopped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cpu_worker_started(&self) {
        self.cpu_started.fetch_add(1, Ordering::Relaxed);
        let active = self.cpu_active.fetch_add(1, Ordering::Relaxed) + 1;
        self.bump_max(&self.cpu_max_active, active);
    }

    pub fn cpu_worker_stopped(&self) {
        self.cpu_active.fetch_sub(1, Ordering::Relaxed);
        self.cpu_stopped.fetch_add(1, Ordering::Relaxed);
    }

    fn bump_max(&self, slot: &AtomicU64, candidate: u64) {
        let mut current = slot.load(Ordering::Relaxed);
        while candidate > current {
            match slot.compare_exchange_weak(
                current,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            io_started: self.io_started.load(Ordering::Relaxed),
            io_stopped: self.io_stopped.load(Ordering::Relaxed),
            cpu_started: self.cpu_started.load(Ordering::Relaxed),
            cpu_stopped: self.cpu_stopped.load(Ordering::Relaxed),
            cpu_max_active: self.cpu_max_active.load(Ordering::Relaxed),
            io_max_active: self.io_max_active.load(Ordering::Relaxed),
            scale_ups: self.scale_ups.load(Ordering::Relaxed),
            files_enqueued: self.files_enqueued.load(Ordering::Relaxed),
            files_scanned: self.files_scanned.load(Ordering::Relaxed),
            lines_enqueued: self.lines_enqueued.load(Ordering::Relaxed),
            lines_processed: self.lines_processed.load(Ordering::Relaxed),
            matches_produced: self.matches_produced.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time read of every counter, taken once the run has finished so
/// `-metrics` can print a stable report.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub io_started: u64,
    pub io_stopped: u64,
    pub cpu_started: u64,
    pub cpu_stopped: u64,
    pub io_max_active: u64,
    pub cpu_max_active: u64,
    pub scale_ups: u64,
    pub files_enqueued: u64,
    pub files_scanned: u64,
    pub lines_enqueued: u64,
    pub lines_processed: u64,
    pub matches_produced: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_active_tracks_the_high_water_mark() {
        let metrics = WorkerMetrics::new();
        metrics.cpu_worker_started();
        metrics.cpu_worker_started();
        metrics.cpu_worker_stopped();
        metrics.cpu_worker_started();
        assert_eq!(metrics.snapshot().cpu_max_active, 2);
    }
}
