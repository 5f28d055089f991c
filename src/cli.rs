//! `clap::Parser` derive CLI (SPEC_FULL.md §4.7), covering every flag in
//! spec.md §6. `Cli::to_config` mirrors the teacher's `Opts -> Config`
//! conversion: defaulting formulas and cross-field validation happen here,
//! once, before the pipeline ever starts.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use clap::{ArgAction, Parser, ValueEnum};
#[cfg(feature = "completions")]
use clap_complete::Shell;

use crate::config::{Config, OutputFormat, Verbosity};
use crate::file_config::FileConfig;
use crate::ignore::builtin_default_ignored_dirs;

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum FormatArg {
    Plain,
    Json,
}

#[derive(Parser)]
#[command(
    name = "gosearch",
    version,
    about = "A concurrent, ignore-aware recursive text search tool",
    max_term_width = 98,
    args_override_self = true
)]
pub struct Cli {
    /// Case-insensitive search.
    #[arg(short = 'i', long, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    pub ignore_case: Option<bool>,

    /// Show 1-based line numbers in output (default: on).
    #[arg(short = 'n', long, default_value_t = true, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    pub line_numbers: bool,

    /// Match whole words only.
    #[arg(short = 'w', long)]
    pub whole_word: bool,

    /// Treat `<pattern>` as a regular expression instead of a literal substring.
    #[arg(long)]
    pub regex: bool,

    /// Base worker count, used to derive the defaults for the other worker flags.
    #[arg(long, value_name = "n")]
    pub workers: Option<NonZeroUsize>,

    /// I/O worker count (0 or omitted = max(1, workers/2)).
    #[arg(long = "io-workers", value_name = "n")]
    pub io_workers: Option<usize>,

    /// CPU worker count (0 or omitted = max(1, workers)).
    #[arg(long = "cpu-workers", value_name = "n")]
    pub cpu_workers: Option<usize>,

    /// Ceiling the dynamic scaler may grow CPU workers to (0 or omitted = max(cpu_workers, cpu_workers*2)).
    #[arg(long = "max-workers", value_name = "n")]
    pub max_workers: Option<usize>,

    /// Bounded channel capacity (0 or omitted = max(1, workers*8)).
    #[arg(long, value_name = "n")]
    pub backpressure: Option<usize>,

    /// Enable the CPU worker auto-scaler.
    #[arg(long = "dynamic-workers", action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    pub dynamic_workers: Option<bool>,

    /// Skip files larger than this size. Accepts a plain byte count or a
    /// `B`/`KB`/`MB`/`GB` suffix (decimal). 0 or omitted means unlimited.
    #[arg(long = "max-size", value_name = "size", value_parser = parse_max_size)]
    pub max_size: Option<u64>,

    /// Only search files with one of these extensions (comma-separated, dot optional).
    #[arg(short = 'e', long, value_delimiter = ',', value_name = "ext")]
    pub extensions: Vec<String>,

    /// Directory names to prune in addition to the built-in defaults (comma-separated).
    #[arg(long = "exclude-dir", value_delimiter = ',', value_name = "name")]
    pub exclude_dir: Vec<String>,

    /// Maximum recursion depth. -1 (default) means unlimited.
    #[arg(long = "max-depth", alias = "maxdepth", allow_negative_numbers = true, default_value_t = -1, value_name = "n")]
    pub max_depth: i64,

    /// Follow symbolic links.
    #[arg(short = 'L', long = "follow-symlinks", alias = "follow")]
    pub follow_symlinks: bool,

    /// Print only the match count.
    #[arg(long)]
    pub count: bool,

    /// Suppress all stdout; cancel the run on the first match.
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Highlight match ranges with ANSI color.
    #[arg(long)]
    pub color: bool,

    /// Print absolute paths instead of paths as given.
    #[arg(short = 'a', long = "abs")]
    pub abs: bool,

    /// Output format (default: plain).
    #[arg(long, value_enum, value_name = "fmt")]
    pub format: Option<FormatArg>,

    /// Print a metrics/timings report to stderr after the run.
    #[arg(long)]
    pub metrics: bool,

    /// Print debug-level diagnostics to stderr.
    #[arg(long)]
    pub debug: bool,

    /// Print trace-level diagnostics to stderr (implies --debug).
    #[arg(long)]
    pub trace: bool,

    /// Sample and print live worker-thread counts (the threads-not-goroutines
    /// stand-in for a goroutine-count sampler).
    #[arg(long = "monitor-goroutines")]
    pub monitor_goroutines: bool,

    /// Sampling interval for --monitor-goroutines, in milliseconds (>= 10).
    #[arg(long = "monitor-interval-ms", default_value_t = 1000, value_name = "ms")]
    pub monitor_interval_ms: u64,

    /// Accepted for interface compatibility; profile capture is out of scope.
    #[arg(long = "cpuprofile", value_name = "file")]
    pub cpuprofile: Option<PathBuf>,

    /// Accepted for interface compatibility; profile capture is out of scope.
    #[arg(long = "memprofile", value_name = "file")]
    pub memprofile: Option<PathBuf>,

    /// Load defaults from a JSON config file; CLI flags always override it.
    #[arg(long, value_name = "path")]
    pub config: Option<PathBuf>,

    #[cfg(feature = "completions")]
    /// Emit a shell completion script and exit.
    #[arg(long, value_enum, exclusive = true)]
    pub completion: Option<Shell>,

    /// The search pattern: a literal substring, or a regular expression when `--regex` is set.
    #[arg(value_name = "pattern")]
    pub pattern: String,

    /// The root directory to search.
    #[arg(value_name = "path")]
    pub path: PathBuf,
}

impl Cli {
    /// Merges `file_config` (loaded from `-config`, if any) under this CLI's
    /// own flags and applies the worker-count defaulting formulas from
    /// spec.md §6, producing the immutable `Config` the pipeline runs with.
    pub fn to_config(&self, file_config: Option<FileConfig>) -> Result<Config> {
        let file_config = file_config.unwrap_or_default();

        if !self.path.is_dir() {
            bail!(
                "root path '{}' does not exist or is not a directory",
                self.path.display()
            );
        }

        let workers = self
            .workers
            .map(NonZeroUsize::get)
            .or(file_config.workers)
            .unwrap_or_else(default_worker_count);

        let io_workers = nonzero_or(
            self.io_workers.or(file_config.io_workers),
            (workers / 2).max(1),
        );
        let cpu_workers = nonzero_or(self.cpu_workers.or(file_config.cpu_workers), workers.max(1));
        let max_workers = nonzero_or(
            self.max_workers.or(file_config.max_workers),
            cpu_workers.max(cpu_workers * 2),
        );
        if max_workers < cpu_workers {
            bail!("max-workers ({max_workers}) must be >= cpu-workers ({cpu_workers})");
        }
        let backpressure = nonzero_or(
            self.backpressure.or(file_config.backpressure),
            (workers * 8).max(1),
        );

        if self.max_depth < -1 {
            bail!("max-depth must be >= -1");
        }
        let max_depth = if self.max_depth < 0 {
            None
        } else {
            Some(self.max_depth as usize)
        };

        if self.monitor_interval_ms < 10 {
            bail!("monitor-interval-ms must be >= 10");
        }

        let mut allowed_extensions: HashSet<String> = self
            .extensions
            .iter()
            .chain(file_config.extensions.iter().flatten())
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        allowed_extensions.shrink_to_fit();

        let mut default_ignored_dirs: HashSet<String> = builtin_default_ignored_dirs()
            .iter()
            .map(|s| s.to_string())
            .collect();
        for name in self
            .exclude_dir
            .iter()
            .chain(file_config.exclude_dir.iter().flatten())
        {
            if !name.is_empty() {
                default_ignored_dirs.insert(name.to_ascii_lowercase());
            }
        }

        let format = match self
            .format
            .or_else(|| file_config.format.as_deref().and_then(parse_format_name))
        {
            Some(FormatArg::Json) => OutputFormat::Json,
            Some(FormatArg::Plain) | None => OutputFormat::Plain,
        };

        let verbosity = if self.trace {
            Verbosity::Trace
        } else if self.debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        };

        Ok(Config {
            pattern: self.pattern.clone(),
            root: self.path.clone(),
            ignore_case: self.ignore_case.or(file_config.ignore_case).unwrap_or(false),
            whole_word: self.whole_word,
            use_regex: self.regex,
            follow_symlinks: self.follow_symlinks,
            count_only: self.count,
            quiet: self.quiet,
            color: self.color,
            abs: self.abs,
            show_line_numbers: self.line_numbers,
            workers,
            io_workers,
            cpu_workers,
            max_workers,
            backpressure,
            dynamic_workers: self.dynamic_workers.or(file_config.dynamic_workers).unwrap_or(false),
            max_size_bytes: self.max_size.filter(|&n| n > 0),
            max_depth,
            allowed_extensions,
            default_ignored_dirs,
            format,
            verbosity,
            metrics: self.metrics,
            monitor_goroutines: self.monitor_goroutines,
            monitor_interval: Duration::from_millis(self.monitor_interval_ms),
        })
    }
}

fn nonzero_or(value: Option<usize>, default: usize) -> usize {
    match value {
        Some(0) | None => default,
        Some(n) => n,
    }
}

/// Parses a config-file `format` string (spec.md §6 "lowercase-snake keys
/// mirroring flag semantics") the same way `--format` parses its `clap`
/// value, so file-config values not given on the command line still pick
/// the right `FormatArg`. Unrecognized values fall back to `None` (plain).
fn parse_format_name(name: &str) -> Option<FormatArg> {
    match name.to_ascii_lowercase().as_str() {
        "json" => Some(FormatArg::Json),
        "plain" => Some(FormatArg::Plain),
        _ => None,
    }
}

/// Default worker count when `-workers` is not given: the number of
/// available CPUs, same fallback shape as the teacher's `default_num_threads`.
fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

fn parse_max_size(arg: &str) -> std::result::Result<u64, String> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Ok(0);
    }

    let lower = arg.to_ascii_lowercase();
    let (digits, scale) = if let Some(d) = lower.strip_suffix("gb") {
        (d, 1_000_000_000u64)
    } else if let Some(d) = lower.strip_suffix("mb") {
        (d, 1_000_000u64)
    } else if let Some(d) = lower.strip_suffix("kb") {
        (d, 1_000u64)
    } else if let Some(d) = lower.strip_suffix('b') {
        (d, 1u64)
    } else {
        (lower.as_str(), 1u64)
    };

    let count: u64 = digits
        .trim()
        .parse()
        .map_err(|_| format!("invalid size '{arg}': expected a decimal integer with an optional B|KB|MB|GB suffix"))?;

    count
        .checked_mul(scale)
        .ok_or_else(|| anyhow!("size '{arg}' overflows").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_byte_counts() {
        assert_eq!(parse_max_size("512").unwrap(), 512);
        assert_eq!(parse_max_size("").unwrap(), 0);
    }

    #[test]
    fn parses_suffixed_sizes() {
        assert_eq!(parse_max_size("1KB").unwrap(), 1_000);
        assert_eq!(parse_max_size("2mb").unwrap(), 2_000_000);
        assert_eq!(parse_max_size("3GB").unwrap(), 3_000_000_000);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_max_size("abc").is_err());
    }

    #[test]
    fn nonzero_or_treats_zero_as_unset() {
        assert_eq!(nonzero_or(Some(0), 7), 7);
        assert_eq!(nonzero_or(None, 7), 7);
        assert_eq!(nonzero_or(Some(3), 7), 3);
    }

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["gosearch"];
        full.extend_from_slice(args);
        full.push("needle");
        full.push(".");
        Cli::parse_from(full)
    }

    #[test]
    fn file_config_bool_applies_when_cli_flag_absent() {
        let file_config = FileConfig {
            ignore_case: Some(true),
            dynamic_workers: Some(true),
            ..Default::default()
        };
        let config = cli(&[]).to_config(Some(file_config)).unwrap();
        assert!(config.ignore_case);
        assert!(config.dynamic_workers);
    }

    #[test]
    fn explicit_cli_false_overrides_file_config_true() {
        let file_config = FileConfig {
            ignore_case: Some(true),
            dynamic_workers: Some(true),
            ..Default::default()
        };
        let config = cli(&["--ignore-case=false", "--dynamic-workers=false"])
            .to_config(Some(file_config))
            .unwrap();
        assert!(!config.ignore_case);
        assert!(!config.dynamic_workers);
    }

    #[test]
    fn bare_cli_flag_still_means_true() {
        let config = cli(&["-i", "--dynamic-workers"]).to_config(None).unwrap();
        assert!(config.ignore_case);
        assert!(config.dynamic_workers);
    }

    #[test]
    fn file_config_format_applies_when_cli_flag_absent() {
        let file_config = FileConfig {
            format: Some("json".to_string()),
            ..Default::default()
        };
        let config = cli(&[]).to_config(Some(file_config)).unwrap();
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn explicit_cli_format_overrides_file_config() {
        let file_config = FileConfig {
            format: Some("json".to_string()),
            ..Default::default()
        };
        let config = cli(&["--format", "plain"])
            .to_config(Some(file_config))
            .unwrap();
        assert_eq!(config.format, OutputFormat::Plain);
    }
}
