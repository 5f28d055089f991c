//! Traversal (spec.md §4.3): single producer, recursive DFS under
//! cancellation, publishing file paths into the path channel.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{SendTimeoutError, Sender};

use crate::config::Config;
use crate::ignore::{self, RuleSet};
use crate::metrics::WorkerMetrics;

struct Cancelled;

/// Entry point, run on its own thread by the pipeline coordinator. Owns the
/// sole `Sender<PathBuf>`; when this function returns (normally or on
/// cancellation) that sender drops, closing the path channel — the
/// coordinator never has to close it explicitly (spec.md §4.4 step 1).
pub fn run(config: &Config, metrics: &WorkerMetrics, cancel: &AtomicBool, tx: Sender<PathBuf>) {
    let root = config.root.clone();

    let mut visited = HashSet::new();
    if config.follow_symlinks {
        if let Ok(canon) = root.canonicalize() {
            visited.insert(canon);
        }
    }

    let rules = ignore::parse_dir_rules(&root);
    let ruleset = RuleSet::empty().extended_with(rules);

    let _ = visit(&root, 0, &ruleset, &mut visited, config, metrics, cancel, &tx);
}

fn visit(
    dir: &Path,
    depth: usize,
    ruleset: &RuleSet,
    visited: &mut HashSet<PathBuf>,
    config: &Config,
    metrics: &WorkerMetrics,
    cancel: &AtomicBool,
    tx: &Sender<PathBuf>,
) -> Result<(), Cancelled> {
    if cancel.load(Ordering::Relaxed) {
        return Err(Cancelled);
    }
    if let Some(max_depth) = config.max_depth {
        if depth > max_depth {
            return Ok(());
        }
    }

    log_trace!(config.verbosity, "entering directory {} (depth {depth})", dir.display());

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            print_error!("could not read directory {}: {}", dir.display(), e);
            return Ok(());
        }
    };

    for entry in entries {
        if cancel.load(Ordering::Relaxed) {
            return Err(Cancelled);
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                print_error!("could not read an entry of {}: {}", dir.display(), e);
                continue;
            }
        };

        let full_path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(e) => {
                print_error!("could not stat {}: {}", full_path.display(), e);
                continue;
            }
        };

        let mut is_dir = file_type.is_dir();
        let is_symlink = file_type.is_symlink();

        if is_ignored(&full_path, is_dir, ruleset, config) {
            continue;
        }

        if is_symlink {
            if !config.follow_symlinks {
                continue;
            }
            let target_meta = match fs::metadata(&full_path) {
                Ok(meta) => meta,
                Err(e) => {
                    print_error!("broken symlink {}: {}", full_path.display(), e);
                    continue;
                }
            };
            is_dir = target_meta.is_dir();
            if is_ignored(&full_path, is_dir, ruleset, config) {
                continue;
            }
        }

        if is_dir {
            if is_symlink {
                match full_path.canonicalize() {
                    Ok(canon) => {
                        if !visited.insert(canon) {
                            continue;
                        }
                    }
                    Err(e) => {
                        print_error!("could not canonicalize {}: {}", full_path.display(), e);
                        continue;
                    }
                }
            }

            let local_rules = ignore::parse_dir_rules(&full_path);
            let child_ruleset = ruleset.extended_with(local_rules);
            visit(
                &full_path,
                depth + 1,
                &child_ruleset,
                visited,
                config,
                metrics,
                cancel,
                tx,
            )?;
        } else {
            if !passes_extension_filter(&full_path, config) {
                continue;
            }
            if let Some(max_size) = config.max_size_bytes {
                match fs::metadata(&full_path) {
                    Ok(meta) if meta.len() > max_size => continue,
                    Ok(_) => {}
                    Err(_) => continue,
                }
            }

            metrics.files_enqueued.fetch_add(1, Ordering::Relaxed);
            log_trace!(config.verbosity, "enqueueing {}", full_path.display());
            send_path(tx, full_path, cancel)?;
        }
    }

    Ok(())
}

/// Blocking send that still notices cancellation within a bounded time even
/// while the downstream channel is full (spec.md §4.3 "a blocking send that
/// also honors cancellation").
const SEND_POLL_INTERVAL: Duration = Duration::from_millis(100);

fn send_path(tx: &Sender<PathBuf>, mut path: PathBuf, cancel: &AtomicBool) -> Result<(), Cancelled> {
    loop {
        if cancel.load(Ordering::Relaxed) {
            return Err(Cancelled);
        }
        match tx.send_timeout(path, SEND_POLL_INTERVAL) {
            Ok(()) => return Ok(()),
            Err(SendTimeoutError::Timeout(returned)) => {
                path = returned;
                continue;
            }
            Err(SendTimeoutError::Disconnected(_)) => return Err(Cancelled),
        }
    }
}

/// spec.md §4.2 step 1 (built-in default-ignore) then step 2 (rule-set
/// evaluation). The built-in check only applies to entries found while
/// recursing — the traversal root itself is never passed through here, so
/// it is unconditionally exempt (spec.md §3's "root is always visited"
/// invariant, and the open question noted in DESIGN.md).
fn is_ignored(path: &Path, is_dir: bool, ruleset: &RuleSet, config: &Config) -> bool {
    if is_dir {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if config.default_ignored_dirs.contains(&name.to_ascii_lowercase()) {
                return true;
            }
        }
    }
    ruleset.is_ignored(path, is_dir)
}

fn passes_extension_filter(path: &Path, config: &Config) -> bool {
    if config.allowed_extensions.is_empty() {
        return true;
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => config.allowed_extensions.contains(&ext.to_ascii_lowercase()),
        None => false,
    }
}
