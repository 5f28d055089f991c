//! Diagnostic macros. `gosearch` has no logging framework; recoverable
//! errors are written straight to stderr, the same way the rest of this
//! corpus does it, just split into three verbosity tiers instead of one.

/// Always-on recoverable-error diagnostic (spec.md §4.6 "log to stderr, continue" rows).
macro_rules! print_error {
    ($($arg:tt)*) => (eprintln!("[gosearch error]: {}", format!($($arg)*)))
}

/// Fatal setup/usage error: print and exit with the usage/fatal exit code.
macro_rules! print_error_and_exit {
    ($($arg:tt)*) => {{
        print_error!($($arg)*);
        ::std::process::exit($crate::exit_codes::ExitCode::FatalError.into());
    }};
}

/// Printed only when `-debug` or `-trace` was passed.
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity.at_least($crate::config::Verbosity::Debug) {
            eprintln!("[gosearch debug]: {}", format!($($arg)*));
        }
    };
}

/// Printed only when `-trace` was passed.
macro_rules! log_trace {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity.at_least($crate::config::Verbosity::Trace) {
            eprintln!("[gosearch trace]: {}", format!($($arg)*));
        }
    };
}
