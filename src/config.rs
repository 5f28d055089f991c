//! `Config` (spec.md §3): built once before the pipeline starts, then shared
//! by reference (behind an `Arc`) across every stage. Read-only after
//! construction; mutating it after the pipeline has started is a programmer
//! error.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Output format tag (spec.md §3, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Json,
}

/// Diagnostic verbosity, driven by `-debug`/`-trace` (SPEC_FULL.md §3).
/// Ordered so `log_debug!`/`log_trace!` can gate on `at_least`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Normal,
    Debug,
    Trace,
}

impl Verbosity {
    pub fn at_least(self, floor: Verbosity) -> bool {
        self >= floor
    }
}

pub struct Config {
    pub pattern: String,
    pub root: PathBuf,

    pub ignore_case: bool,
    pub whole_word: bool,
    pub use_regex: bool,
    pub follow_symlinks: bool,
    pub count_only: bool,
    pub quiet: bool,
    pub color: bool,
    pub abs: bool,
    pub show_line_numbers: bool,

    pub workers: usize,
    pub io_workers: usize,
    pub cpu_workers: usize,
    pub max_workers: usize,
    pub backpressure: usize,
    pub dynamic_workers: bool,

    /// `None` means no size limit.
    pub max_size_bytes: Option<u64>,
    /// `None` means unlimited depth.
    pub max_depth: Option<usize>,

    /// Lowercase, dot-stripped. Empty means "no extension filter".
    pub allowed_extensions: HashSet<String>,
    /// Built-in default-ignored names unioned with the user's `-exclude-dir`.
    pub default_ignored_dirs: HashSet<String>,

    pub format: OutputFormat,

    pub verbosity: Verbosity,
    pub metrics: bool,
    pub monitor_goroutines: bool,
    pub monitor_interval: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_ordering_gates_debug_and_trace() {
        assert!(Verbosity::Trace.at_least(Verbosity::Debug));
        assert!(Verbosity::Debug.at_least(Verbosity::Debug));
        assert!(!Verbosity::Normal.at_least(Verbosity::Debug));
        assert!(!Verbosity::Debug.at_least(Verbosity::Trace));
    }
}
