//! CPU worker (spec.md §4.4): evaluates the match strategy against each
//! `LineItem` and emits a `MatchResult` when it matches. Same
//! timeout-polling receive loop as `io_worker`, for the same cancellation
//! reason.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender};

use super::{LineItem, MatchResult};
use crate::matcher::MatchStrategy;
use crate::metrics::WorkerMetrics;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn spawn(
    line_rx: Receiver<LineItem>,
    result_tx: Sender<MatchResult>,
    strategy: Arc<MatchStrategy>,
    metrics: Arc<WorkerMetrics>,
    cancel: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        metrics.cpu_worker_started();
        loop {
            if cancel.load(Ordering::Relaxed) {
                break;
            }
            let item = match line_rx.recv_timeout(POLL_INTERVAL) {
                Ok(item) => item,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            let ranges = strategy.find_ranges(&item.text);
            metrics.lines_processed.fetch_add(1, Ordering::Relaxed);
            if ranges.is_empty() {
                continue;
            }
            metrics.matches_produced.fetch_add(1, Ordering::Relaxed);

            let result = MatchResult {
                path: item.path,
                line_number: item.line_number,
                text: item.text,
                ranges,
            };
            if send_result(&result_tx, result, &cancel).is_err() {
                break;
            }
        }
        metrics.cpu_worker_stopped();
    })
}

struct Cancelled;

fn send_result(
    tx: &Sender<MatchResult>,
    mut result: MatchResult,
    cancel: &AtomicBool,
) -> Result<(), Cancelled> {
    loop {
        if cancel.load(Ordering::Relaxed) {
            return Err(Cancelled);
        }
        match tx.send_timeout(result, POLL_INTERVAL) {
            Ok(()) => return Ok(()),
            Err(SendTimeoutError::Timeout(returned)) => {
                result = returned;
                continue;
            }
            Err(SendTimeoutError::Disconnected(_)) => return Err(Cancelled),
        }
    }
}
