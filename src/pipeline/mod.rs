//! Worker Pipeline (spec.md §4.4): the coordinator that wires the three
//! bounded channels together, spawns the traversal producer plus both
//! worker groups and the printer, and sequences shutdown deterministically
//! (spec.md §5 "Shutdown is deterministic").

mod cpu_worker;
mod io_worker;
mod scaler;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::bounded;

use crate::config::Config;
use crate::exit_codes::ExitCode;
use crate::matcher::{MatchRange, MatchStrategy};
use crate::metrics::{MetricsSnapshot, WorkerMetrics};
use crate::monitor;
use crate::printer;
use crate::timing::PhaseTimings;
use crate::walk;

/// Produced by an I/O worker per candidate line, consumed by one CPU worker
/// (spec.md §3 `LineItem`). `path` is shared across every line of the same
/// file rather than cloned byte-for-byte.
pub struct LineItem {
    pub path: Arc<PathBuf>,
    pub line_number: usize,
    pub text: Vec<u8>,
}

/// Produced by a CPU worker when `ranges` is non-empty, consumed by the
/// printer (spec.md §3 `Result`).
pub struct MatchResult {
    pub path: Arc<PathBuf>,
    pub line_number: usize,
    pub text: Vec<u8>,
    pub ranges: Vec<MatchRange>,
}

/// What `main` needs after the pipeline finishes: the exit verdict plus
/// everything `-metrics` prints (SPEC_FULL.md §3 `RunSummary`).
pub struct RunSummary {
    pub match_count: u64,
    pub exit_code: ExitCode,
    pub metrics: MetricsSnapshot,
    pub timings: PhaseTimings,
}

/// Coordinates one end-to-end run: traversal -> I/O workers -> CPU workers ->
/// printer, per the sequence in spec.md §4.4. `config` and `strategy` are
/// each built once by `main` and shared by reference (an `Arc`) across every
/// stage, matching spec.md §3's lifetime note for both entities.
pub fn run(config: &Arc<Config>, strategy: &Arc<MatchStrategy>) -> RunSummary {
    let total_start = Instant::now();

    log_debug!(
        config.verbosity,
        "starting run: root={} io_workers={} cpu_workers={} max_workers={} backpressure={} dynamic_workers={}",
        config.root.display(),
        config.io_workers,
        config.cpu_workers,
        config.max_workers,
        config.backpressure,
        config.dynamic_workers
    );

    let metrics = Arc::new(WorkerMetrics::new());
    let cancel = Arc::new(AtomicBool::new(false));

    {
        let cancel = Arc::clone(&cancel);
        // Best-effort: if a handler is already installed (e.g. a test
        // harness that drives several runs in one process) we keep going
        // without a second Ctrl-C hook for this run.
        let _ = ctrlc::set_handler(move || {
            cancel.store(true, Ordering::Relaxed);
        });
    }

    let (path_tx, path_rx) = bounded::<PathBuf>(config.backpressure);
    let (line_tx, line_rx) = bounded::<LineItem>(config.backpressure);
    let (result_tx, result_rx) = bounded::<MatchResult>(config.backpressure);

    let monitor_stop = Arc::new(AtomicBool::new(false));
    let monitor_handle = if config.monitor_goroutines {
        Some(monitor::spawn(
            Arc::clone(&metrics),
            Arc::clone(&monitor_stop),
            config.monitor_interval,
            config.verbosity,
        ))
    } else {
        None
    };

    let walk_start = Instant::now();
    let walk_handle = {
        let config = Arc::clone(config);
        let metrics = Arc::clone(&metrics);
        let cancel = Arc::clone(&cancel);
        thread::spawn(move || walk::run(&config, &metrics, &cancel, path_tx))
    };

    let mut io_handles = Vec::with_capacity(config.io_workers);
    for _ in 0..config.io_workers {
        io_handles.push(io_worker::spawn(
            path_rx.clone(),
            line_tx.clone(),
            Arc::clone(config),
            Arc::clone(&metrics),
            Arc::clone(&cancel),
        ));
    }
    drop(path_rx);
    drop(line_tx);

    let cpu_handles = Arc::new(std::sync::Mutex::new(Vec::with_capacity(config.cpu_workers)));
    for _ in 0..config.cpu_workers {
        let handle = cpu_worker::spawn(
            line_rx.clone(),
            result_tx.clone(),
            Arc::clone(strategy),
            Arc::clone(&metrics),
            Arc::clone(&cancel),
        );
        cpu_handles.lock().unwrap().push(handle);
    }

    let scaler_stop = Arc::new(AtomicBool::new(false));
    let scaler_handle = if config.dynamic_workers {
        Some(scaler::spawn(
            line_rx.clone(),
            result_tx.clone(),
            Arc::clone(strategy),
            Arc::clone(&metrics),
            Arc::clone(&cancel),
            Arc::clone(&cpu_handles),
            config.max_workers,
            Arc::clone(&scaler_stop),
            config.verbosity,
        ))
    } else {
        None
    };
    drop(line_rx);
    drop(result_tx);

    let printer_handle = printer::spawn(result_rx, Arc::clone(config), Arc::clone(&cancel));

    // spec.md §4.4 coordinator sequence, steps 1-4.
    walk_handle.join().expect("traversal thread panicked");
    let walk_elapsed = walk_start.elapsed();

    let scan_start = Instant::now();
    for handle in io_handles {
        handle.join().expect("I/O worker thread panicked");
    }
    scaler_stop.store(true, Ordering::Relaxed);
    if let Some(handle) = scaler_handle {
        handle.join().expect("scaler thread panicked");
    }

    let mut handles = cpu_handles.lock().unwrap();
    for handle in handles.drain(..) {
        handle.join().expect("CPU worker thread panicked");
    }
    drop(handles);
    let scan_elapsed = scan_start.elapsed();

    monitor_stop.store(true, Ordering::Relaxed);
    if let Some(handle) = monitor_handle {
        handle.join().expect("monitor thread panicked");
    }

    let print_start = Instant::now();
    let match_count = printer_handle.join().expect("printer thread panicked");
    let print_elapsed = print_start.elapsed();

    let timings = PhaseTimings {
        walk: walk_elapsed,
        scan: scan_elapsed,
        print: print_elapsed,
        total: total_start.elapsed(),
    };

    log_debug!(
        config.verbosity,
        "run finished: matches={} walk={:?} scan={:?} print={:?} total={:?}",
        match_count,
        timings.walk,
        timings.scan,
        timings.print,
        timings.total
    );

    RunSummary {
        match_count,
        exit_code: ExitCode::from_match_count(match_count),
        metrics: metrics.snapshot(),
        timings,
    }
}
