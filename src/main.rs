#[macro_use]
mod error;

mod cli;
mod config;
mod exit_codes;
mod file_config;
mod filesystem;
mod ignore;
mod matcher;
mod metrics;
mod monitor;
mod pipeline;
mod printer;
mod timing;
mod walk;

use std::process;
use std::sync::Arc;

use clap::Parser;
#[cfg(feature = "completions")]
use clap::CommandFactory;

use crate::cli::Cli;
use crate::file_config::FileConfig;
use crate::matcher::MatchStrategy;
use crate::metrics::MetricsSnapshot;
use crate::timing::PhaseTimings;

#[cfg(feature = "use-jemalloc")]
#[global_allocator]
static ALLOC: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    let cli = Cli::parse();

    #[cfg(feature = "completions")]
    if let Some(shell) = cli.completion {
        let mut command = Cli::command();
        let name = command.get_name().to_string();
        clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
        return;
    }

    let file_config = match &cli.config {
        Some(path) => match FileConfig::load(path) {
            Ok(file_config) => Some(file_config),
            Err(e) => print_error_and_exit!("{:#}", e),
        },
        None => None,
    };

    let config = match cli.to_config(file_config) {
        Ok(config) => config,
        Err(e) => print_error_and_exit!("{:#}", e),
    };

    let strategy = match MatchStrategy::compile(&config) {
        Ok(strategy) => strategy,
        Err(e) => print_error_and_exit!("{:#}", e),
    };

    let config = Arc::new(config);
    let strategy = Arc::new(strategy);

    let summary = pipeline::run(&config, &strategy);

    if config.metrics {
        print_metrics_report(&summary.metrics, &summary.timings);
    }

    process::exit(summary.exit_code.into());
}

/// `-metrics`: a small plain-text report, gated the same way `-debug` gates
/// its own output -- an explicit flag check here, not a logging framework
/// (SPEC_FULL.md §4.8).
fn print_metrics_report(metrics: &MetricsSnapshot, timings: &PhaseTimings) {
    eprintln!("--- gosearch metrics ---");
    eprintln!(
        "io workers:  started={} stopped={} max_active={}",
        metrics.io_started, metrics.io_stopped, metrics.io_max_active
    );
    eprintln!(
        "cpu workers: started={} stopped={} max_active={} scale_ups={}",
        metrics.cpu_started, metrics.cpu_stopped, metrics.cpu_max_active, metrics.scale_ups
    );
    eprintln!(
        "files: enqueued={} scanned={}",
        metrics.files_enqueued, metrics.files_scanned
    );
    eprintln!(
        "lines: enqueued={} processed={} matches={}",
        metrics.lines_enqueued, metrics.lines_processed, metrics.matches_produced
    );
    eprintln!(
        "timings: walk={:?} scan={:?} print={:?} total={:?}",
        timings.walk, timings.scan, timings.print, timings.total
    );
}
