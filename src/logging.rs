// Chunk: docs/chunks/cli - Logging setup for the mdview binary
//!
//! Installs the global `tracing` subscriber.
//!
//! Console output always goes to stderr so that stdout stays clean for
//! results and `--json`. Setting `MDVIEW_DEBUG` turns on debug-level output
//! and additionally appends every event to `mdview-debug.log` in the user's
//! cache directory.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable that enables the debug log file.
pub const DEBUG_ENV_VAR: &str = "MDVIEW_DEBUG";

/// File name of the debug log.
pub const DEBUG_LOG_FILE: &str = "mdview-debug.log";

/// Directory the debug log is written to.
pub fn debug_log_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("mdview"))
        .unwrap_or_else(std::env::temp_dir)
}

fn default_directive(debug: bool) -> &'static str {
    if debug {
        "mdview=debug,mdview_index=debug,mdview_watcher=debug"
    } else {
        "mdview=info,mdview_index=info,mdview_watcher=info"
    }
}

/// Installs the subscriber. `RUST_LOG` overrides the default filter.
///
/// The returned guard flushes the debug log file when dropped; keep it
/// alive for the life of the process.
pub fn init() -> Option<WorkerGuard> {
    let debug = std::env::var_os(DEBUG_ENV_VAR).is_some();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = if debug {
        let dir = debug_log_dir();
        match std::fs::create_dir_all(&dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::never(&dir, DEBUG_LOG_FILE);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true);
                (Some(layer), Some(guard))
            }
            Err(err) => {
                eprintln!("warning: cannot create {}: {err}", dir.display());
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    guard
}
