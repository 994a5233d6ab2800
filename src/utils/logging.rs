//! Logger bootstrap plus per-module logging macros.
//!
//! Modules that log per frame opt in with a module-level flag:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//! use crate::{log_info, log_warn, log_error};
//! ```
//! `log_info!` is additionally gated on the runtime verbose switch, which
//! `init_logging` turns on when `SCREENWELL_DEBUG` is set.

use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn verbose_enabled() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::Relaxed);
}

/// Reads `SCREENWELL_DEBUG` ("1" or "true", case-insensitive).
pub fn debug_from_env() -> bool {
    std::env::var("SCREENWELL_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Install the global `env_logger`. `RUST_LOG` still wins over the default
/// `info` level. Safe to call more than once.
pub fn init_logging() {
    let verbose = debug_from_env();
    set_verbose(verbose);

    let default_level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .try_init();
}

/// Info logging for hot paths; needs both `ENABLE_LOGS` in the calling
/// module and the runtime verbose switch.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS && $crate::utils::logging::verbose_enabled() {
            log::info!($($arg)*);
        }
    };
}

/// Warn logging gated on the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Error logging gated on the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
