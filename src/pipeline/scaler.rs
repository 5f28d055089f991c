//! CPU scaler (spec.md §4.4): optional periodic tick that grows the CPU
//! worker pool under queue pressure. Only ever grows; workers exit on their
//! own once the line channel closes (spec.md §9 "the scaler only grows,
//! never shrinks").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use super::cpu_worker;
use super::{LineItem, MatchResult};
use crate::config::Verbosity;
use crate::matcher::MatchStrategy;
use crate::metrics::WorkerMetrics;

/// spec.md §4.4 "On a periodic tick (~200 ms)".
const TICK: Duration = Duration::from_millis(200);

#[allow(clippy::too_many_arguments)]
pub fn spawn(
    line_rx: Receiver<LineItem>,
    result_tx: Sender<MatchResult>,
    strategy: Arc<MatchStrategy>,
    metrics: Arc<WorkerMetrics>,
    cancel: Arc<AtomicBool>,
    cpu_handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
    max_workers: usize,
    stop: Arc<AtomicBool>,
    verbosity: Verbosity,
) -> JoinHandle<()> {
    thread::spawn(move || loop {
        if stop.load(Ordering::Relaxed) || cancel.load(Ordering::Relaxed) {
            break;
        }
        thread::sleep(TICK);
        if stop.load(Ordering::Relaxed) || cancel.load(Ordering::Relaxed) {
            break;
        }

        let snapshot = metrics.snapshot();
        let live = snapshot.cpu_started.saturating_sub(snapshot.cpu_stopped);
        let pending = line_rx.len() as u64;

        if pending > 2 * live && (live as usize) < max_workers {
            let handle = cpu_worker::spawn(
                line_rx.clone(),
                result_tx.clone(),
                Arc::clone(&strategy),
                Arc::clone(&metrics),
                Arc::clone(&cancel),
            );
            cpu_handles.lock().unwrap().push(handle);
            let scale_ups = metrics.scale_ups.fetch_add(1, Ordering::Relaxed) + 1;
            log_debug!(
                verbosity,
                "scaling up: pending={pending} live={live} -> {} (scale-ups so far: {scale_ups})",
                live + 1
            );
        }
    })
}
