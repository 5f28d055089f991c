//! I/O worker (spec.md §4.4): reads a file, detects binary content, and
//! splits the rest into `LineItem`s. Grounded on the teacher's
//! `exec::job` receiver-loop-until-closed shape (`rx.recv()` until the
//! channel closes), reworked around a timeout-based recv so cancellation is
//! noticed within a bounded time even while idle (spec.md §8 "Cancellation
//! safety").

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender};

use super::LineItem;
use crate::config::Config;
use crate::metrics::WorkerMetrics;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const BINARY_SNIFF_LEN: usize = 512;

pub fn spawn(
    path_rx: Receiver<PathBuf>,
    line_tx: Sender<LineItem>,
    config: Arc<Config>,
    metrics: Arc<WorkerMetrics>,
    cancel: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        metrics.io_worker_started();
        loop {
            if cancel.load(Ordering::Relaxed) {
                break;
            }
            let path = match path_rx.recv_timeout(POLL_INTERVAL) {
                Ok(path) => path,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            if scan_file(&path, &config, &metrics, &line_tx, &cancel).is_err() {
                metrics.io_worker_stopped();
                return;
            }
        }
        metrics.io_worker_stopped();
    })
}

struct Cancelled;

fn scan_file(
    path: &PathBuf,
    config: &Config,
    metrics: &WorkerMetrics,
    line_tx: &Sender<LineItem>,
    cancel: &AtomicBool,
) -> Result<(), Cancelled> {
    if let Some(max_size) = config.max_size_bytes {
        match path.metadata() {
            Ok(meta) if meta.len() > max_size => return Ok(()),
            Ok(_) => {}
            Err(_) => return Ok(()),
        }
    }

    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            print_error!("could not open {}: {}", path.display(), e);
            return Ok(());
        }
    };

    let mut sniff = [0u8; BINARY_SNIFF_LEN];
    let sniffed = match file.read(&mut sniff) {
        Ok(n) => n,
        Err(e) => {
            print_error!("could not read {}: {}", path.display(), e);
            return Ok(());
        }
    };
    if sniff[..sniffed].contains(&0) {
        log_debug!(config.verbosity, "skipping binary file {}", path.display());
        return Ok(());
    }

    log_trace!(config.verbosity, "scanning {}", path.display());
    let mut reader = BufReader::new(sniff[..sniffed].chain(file));
    let shared_path = Arc::new(path.clone());
    let mut line_number = 0usize;
    let mut buf = Vec::new();

    loop {
        if cancel.load(Ordering::Relaxed) {
            return Err(Cancelled);
        }

        buf.clear();
        let read = match reader.read_until(b'\n', &mut buf) {
            Ok(n) => n,
            Err(e) => {
                print_error!("could not read {}: {}", path.display(), e);
                break;
            }
        };
        if read == 0 {
            break;
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        line_number += 1;

        let item = LineItem {
            path: Arc::clone(&shared_path),
            line_number,
            text: buf.clone(),
        };
        metrics.lines_enqueued.fetch_add(1, Ordering::Relaxed);
        send_line(line_tx, item, cancel)?;
    }

    metrics.files_scanned.fetch_add(1, Ordering::Relaxed);
    Ok(())
}

fn send_line(tx: &Sender<LineItem>, mut item: LineItem, cancel: &AtomicBool) -> Result<(), Cancelled> {
    loop {
        if cancel.load(Ordering::Relaxed) {
            return Err(Cancelled);
        }
        match tx.send_timeout(item, POLL_INTERVAL) {
            Ok(()) => return Ok(()),
            Err(SendTimeoutError::Timeout(returned)) => {
                item = returned;
                continue;
            }
            Err(SendTimeoutError::Disconnected(_)) => return Err(Cancelled),
        }
    }
}
