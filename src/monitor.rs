//! Goroutine-count sampler stand-in (SPEC_FULL.md §1, §6): spec.md
//! disclaims a real goroutine-count sampler as an external collaborator,
//! but `-monitor-goroutines` still needs *something* to sample in a
//! threads-not-goroutines runtime. This periodically reads
//! `WorkerMetrics`'s live-thread atomics and writes a line to stderr,
//! gated the same way the rest of this crate's ambient diagnostics are
//! gated: an explicit verbosity check, no logging framework (SPEC_FULL.md
//! §6: "writes a line to stderr when `-debug` or `-trace` is set").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::Verbosity;
use crate::metrics::WorkerMetrics;

pub fn spawn(
    metrics: Arc<WorkerMetrics>,
    stop: Arc<AtomicBool>,
    interval: Duration,
    verbosity: Verbosity,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            thread::sleep(interval);
            if stop.load(Ordering::Relaxed) {
                break;
            }
            let snapshot = metrics.snapshot();
            let io_live = snapshot.io_started.saturating_sub(snapshot.io_stopped);
            let cpu_live = snapshot.cpu_started.saturating_sub(snapshot.cpu_stopped);
            log_debug!(
                verbosity,
                "live worker threads: io={io_live} cpu={cpu_live} (scale-ups: {})",
                snapshot.scale_ups
            );
        }
    })
}
