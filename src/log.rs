// src/log.rs
//! Logging front door. The `log*!` macros forward to `tracing`; `init` wires a
//! subscriber that writes to stderr and appends to `.store/debug.log`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::consts::{LOG_FILE, STORE_DIR};

#[doc(hidden)]
pub use tracing as __tracing;

/// Install the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    crate::file::ensure_directory(Path::new(STORE_DIR))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(Path::new(STORE_DIR).join(LOG_FILE))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .try_init();
    Ok(())
}

/// Info-level logging
#[macro_export]
macro_rules! logf {
    ($($arg:tt)*) => {
        $crate::log::__tracing::info!($($arg)*)
    };
}

/// Debug-level logging
#[macro_export]
macro_rules! logd {
    ($($arg:tt)*) => {
        $crate::log::__tracing::debug!($($arg)*)
    };
}

/// Warn-level logging
#[macro_export]
macro_rules! logw {
    ($($arg:tt)*) => {
        $crate::log::__tracing::warn!($($arg)*)
    };
}

/// Error-level logging
#[macro_export]
macro_rules! loge {
    ($($arg:tt)*) => {
        $crate::log::__tracing::error!($($arg)*)
    };
}
