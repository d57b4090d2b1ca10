// crates/lumina-app/src/helpers/log.rs
//
// Logging setup for the `lumina` binary.
//
// A detached run has nobody watching stderr, so every event also goes to a
// temp file that survives the process:
//
//   File: <temp>/lumina.log: append-only, plain text (no ANSI).
//
// Level comes from LUMINA_LOG (EnvFilter syntax, e.g. `debug` or
// `lumina_core=debug,info`), default `info`. Library crates only emit
// `tracing` events; nothing below the binary installs a subscriber.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "LUMINA_LOG";

pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("lumina.log")
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored. A log file that cannot be opened only loses the file copy.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path())
        .ok()
        .map(|f| fmt::layer().with_ansi(false).with_target(false).with_writer(Mutex::new(f)));

    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
}
