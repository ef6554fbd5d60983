//! Append-only NDJSON trace log
//!
//! One event per line, one `write_all` per line. The file is opened in
//! append mode and every write goes through a single mutex, so concurrent
//! emitters in one process never interleave partial lines.

use crate::error::{Result, TelemetryError};
use crate::event::TelemetryEvent;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Trace log writer
///
/// Cloning shares the underlying file handle.
#[derive(Clone)]
pub struct TelemetryLogger {
    /// Path to the log file
    path: PathBuf,
    writer: Arc<Mutex<File>>,
}

impl std::fmt::Debug for TelemetryLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryLogger")
            .field("path", &self.path)
            .finish()
    }
}

impl TelemetryLogger {
    /// Open or create the log file in append mode
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|_| TelemetryError::create_failed(&path))?;

        Ok(Self {
            path,
            writer: Arc::new(Mutex::new(file)),
        })
    }

    /// Append one event as a complete line
    pub fn append(&self, event: &TelemetryEvent) -> Result<()> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| TelemetryError::append_failed("trace log writer lock poisoned"))?;
        writer.write_all(line.as_bytes())?;
        writer.flush()?;

        Ok(())
    }

    /// Get the path to the log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse trace events from an NDJSON file
///
/// Strict: the first malformed line is an error. The audit analyzer has its
/// own lenient reader; this one is for round-tripping the emitter's output.
pub fn parse_telemetry_log<P: AsRef<Path>>(path: P) -> Result<Vec<TelemetryEvent>> {
    let contents = std::fs::read_to_string(path)?;
    let mut events = Vec::new();

    for (line_num, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let event: TelemetryEvent = serde_json::from_str(line)
            .map_err(|e| TelemetryError::invalid_entry(line_num + 1, &e.to_string()))?;

        events.push(event);
    }

    Ok(events)
}
