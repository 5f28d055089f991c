//! Printer (spec.md §4.5): sole writer to the match stream. Consumes
//! `MatchResult`s, formats and writes them, counts matches, and is the
//! single authority that decides to cancel the run on the first match in
//! quiet mode (spec.md §9 "implementers should ensure the cancel happens
//! once"). Grounded on the teacher's `output.rs` (colorized vs.
//! uncolorized path printing, broken-pipe exit handling).

use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;
use nu_ansi_term::Color;

use crate::config::{Config, OutputFormat};
use crate::exit_codes::ExitCode;
use crate::filesystem;
use crate::matcher::MatchRange;
use crate::pipeline::MatchResult;

/// Spawns the printer thread. Returns a handle whose join value is the
/// final match count — the coordinator treats that as "the printer
/// reported its summary" (spec.md §4.4 step 4).
pub fn spawn(
    result_rx: Receiver<MatchResult>,
    config: Arc<Config>,
    cancel: Arc<AtomicBool>,
) -> JoinHandle<u64> {
    thread::spawn(move || {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let mut match_count = 0u64;
        let mut cancelled_on_first_match = false;

        for result in result_rx.iter() {
            match_count += 1;

            if config.quiet {
                if !cancelled_on_first_match {
                    cancel.store(true, Ordering::Relaxed);
                    cancelled_on_first_match = true;
                }
                continue;
            }

            if config.count_only {
                continue;
            }

            if write_result(&mut out, &config, &result).is_err() {
                // Probably a broken pipe (e.g. piped into `head`). Exit
                // gracefully rather than panicking on a write error.
                process_exit_broken_pipe();
            }
        }

        if config.quiet {
            return match_count;
        }

        if config.count_only {
            let _ = write_count(&mut out, &config, match_count);
        }

        match_count
    })
}

fn write_result(out: &mut impl Write, config: &Config, result: &MatchResult) -> io::Result<()> {
    let path = format_path(&result.path, config);

    match config.format {
        OutputFormat::Plain => {
            let text = highlight(&result.text, &result.ranges, config.color);
            if config.show_line_numbers {
                writeln!(out, "{}:{}: {}", path, result.line_number, text)
            } else {
                writeln!(out, "{}: {}", path, text)
            }
        }
        OutputFormat::Json => {
            let text = String::from_utf8_lossy(&result.text);
            let line = if config.show_line_numbers {
                serde_json::json!({ "path": path, "line": result.line_number, "text": text })
            } else {
                serde_json::json!({ "path": path, "text": text })
            };
            writeln!(out, "{line}")
        }
    }
}

fn write_count(out: &mut impl Write, config: &Config, count: u64) -> io::Result<()> {
    match config.format {
        OutputFormat::Plain => writeln!(out, "{count}"),
        OutputFormat::Json => writeln!(out, "{}", serde_json::json!({ "count": count })),
    }
}

/// spec.md §4.5 "Path formatting": absolute on `-abs` (falling back to the
/// path as received if resolution fails), otherwise the path stripped of
/// any leading `./`.
fn format_path(path: &Path, config: &Config) -> String {
    if config.abs {
        match filesystem::absolute_path(path) {
            Ok(abs) => return abs.to_string_lossy().into_owned(),
            Err(_) => return path.to_string_lossy().into_owned(),
        }
    }
    filesystem::strip_current_dir(path).to_string_lossy().into_owned()
}

/// spec.md §4.5 "Range highlighting". Operates on raw bytes rather than a
/// pre-decoded string so a byte range always slices where it says it does,
/// even if the line is not valid UTF-8 (only the final per-segment decode
/// is lossy).
fn highlight(line: &[u8], ranges: &[MatchRange], color: bool) -> String {
    if !color {
        return String::from_utf8_lossy(line).into_owned();
    }

    let mut out = String::new();
    let mut cursor = 0usize;
    for range in ranges {
        if range.start < cursor || range.end < range.start || range.end > line.len() {
            continue;
        }
        out.push_str(&String::from_utf8_lossy(&line[cursor..range.start]));
        let matched = String::from_utf8_lossy(&line[range.start..range.end]);
        out.push_str(&Color::Red.paint(matched).to_string());
        cursor = range.end;
    }
    out.push_str(&String::from_utf8_lossy(&line[cursor..]));
    out
}

fn process_exit_broken_pipe() -> ! {
    std::process::exit(ExitCode::HasMatches.into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn range(start: usize, end: usize) -> MatchRange {
        MatchRange::new(start, end)
    }

    #[test]
    fn highlight_without_color_is_plain_text() {
        assert_eq!(highlight(b"a needle b", &[range(2, 8)], false), "a needle b");
    }

    #[test]
    fn highlight_with_color_wraps_each_range() {
        let out = highlight(b"a needle b", &[range(2, 8)], true);
        assert!(out.contains("needle"));
        assert!(out.starts_with("a "));
        assert!(out.ends_with(" b"));
        assert_ne!(out, "a needle b");
    }

    #[test]
    fn highlight_skips_retrograde_and_out_of_bounds_ranges() {
        let line = b"abcdef";
        let out = highlight(line, &[range(3, 1), range(0, 100)], true);
        assert_eq!(out, "abcdef");
    }

    #[test]
    fn format_path_strips_current_dir_prefix() {
        let cli = {
            use crate::cli::Cli;
            use clap::Parser;
            Cli::parse_from(["gosearch", "needle", "."])
        };
        let config = cli.to_config(None).unwrap();
        assert_eq!(format_path(&PathBuf::from("./a.txt"), &config), "a.txt");
    }
}
