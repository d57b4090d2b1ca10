// crates/lumina-core/src/error.rs
//
// Resource-availability errors. Geometric / out-of-range edit parameters are
// never errors; the editing operations clamp them (see timeline.rs).

use std::path::PathBuf;
use thiserror::Error;

/// Failure to learn a media file's duration. Callers substitute a fallback
/// duration rather than blocking the import (see `EditorConfig`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    #[error("cannot open {}: {msg}", path.display())]
    Open { path: PathBuf, msg: String },

    #[error("duration unknown for {}", path.display())]
    UnknownDuration { path: PathBuf },

    #[error("no probe backend available for {}", path.display())]
    NoBackend { path: PathBuf },
}

/// Export / finalize failures. The controller always falls back to the raw
/// capture where one exists and always returns to `Idle`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    #[error("an export is already running")]
    AlreadyRunning,

    #[error("no export is running")]
    NotRunning,

    #[error("no export pipeline attached")]
    Unavailable,

    #[error("capture failed: {0}")]
    Capture(String),

    #[error("transcode to {format} failed: {msg}")]
    Transcode { format: String, msg: String },

    #[error("export sink rejected artifact: {0}")]
    Sink(String),
}

/// Malformed edit-action payloads (from the UI or the AI interpreter).
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("action payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("action batch must be an array or an object with an `actions` array")]
    Shape,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file malformed: {0}")]
    Json(#[from] serde_json::Error),
}
