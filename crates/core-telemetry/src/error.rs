//! Error types for capture-side operations

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for telemetry operations
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors that can occur while persisting or reading trace events
///
/// None of these ever reach an instrumented call site; the emitter
/// swallows them. They surface through the logger API and in tests.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to create or open the trace log
    #[error("Failed to open trace log: {path}")]
    CreateFailed { path: PathBuf },

    /// Failed to append to the trace log
    #[error("Failed to append to trace log: {0}")]
    AppendFailed(String),

    /// Trace log line is invalid or corrupted
    #[error("Invalid trace entry at line {line}: {reason}")]
    InvalidEntry { line: usize, reason: String },

    /// Unknown direction wire value
    #[error("Invalid direction: {0}")]
    InvalidDirection(String),

    /// Bridge session already disposed
    #[error("Bridge session {0} is disposed")]
    SessionDisposed(String),
}

impl TelemetryError {
    /// Create a create failed error
    pub fn create_failed<P: Into<PathBuf>>(path: P) -> Self {
        TelemetryError::CreateFailed { path: path.into() }
    }

    /// Create an append failed error
    pub fn append_failed<S: Into<String>>(message: S) -> Self {
        TelemetryError::AppendFailed(message.into())
    }

    /// Create an invalid entry error
    pub fn invalid_entry(line: usize, reason: &str) -> Self {
        TelemetryError::InvalidEntry {
            line,
            reason: reason.to_string(),
        }
    }

    /// Create an invalid direction error
    pub fn invalid_direction<S: Into<String>>(value: S) -> Self {
        TelemetryError::InvalidDirection(value.into())
    }

    /// Create a session disposed error
    pub fn session_disposed<S: Into<String>>(session_id: S) -> Self {
        TelemetryError::SessionDisposed(session_id.into())
    }
}
