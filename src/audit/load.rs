/*!
 * Trace log resolution and lenient line parsing
 */

use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{Result, TraceError};

/// One successfully parsed line
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvent {
    /// 1-based line number in the log file
    pub line: usize,
    pub event: Map<String, Value>,
}

impl ParsedEvent {
    /// Non-empty string field
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.event
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Field value, `null` when absent
    pub fn field(&self, key: &str) -> Value {
        self.event.get(key).cloned().unwrap_or(Value::Null)
    }
}

/// A line that could not be used as an event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseIssue {
    pub line_no: usize,
    pub reason: String,
}

/// Parsed contents of one trace log
#[derive(Debug, Clone)]
pub struct LoadedLog {
    pub path: PathBuf,
    pub events: Vec<ParsedEvent>,
    pub issues: Vec<ParseIssue>,
}

/// Resolve `--log` to a concrete file
///
/// A file is used as-is; a directory resolves to its most recently
/// modified `*.<extension>` file. The result is absolute where the platform
/// can canonicalize it, and the path as given otherwise.
pub fn resolve_log_path(path: &Path, extension: &str) -> Result<PathBuf> {
    let metadata =
        fs::metadata(path).map_err(|_| TraceError::LogPathNotFound(path.to_path_buf()))?;

    if metadata.is_file() {
        return Ok(absolute(path.to_path_buf()));
    }
    if !metadata.is_dir() {
        return Err(TraceError::UnsupportedLogPath(path.to_path_buf()));
    }

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let candidate = entry.path();
        let matches_extension = candidate
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == extension);
        if !matches_extension {
            continue;
        }
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let is_newer = match &newest {
            Some((best, _)) => modified > *best,
            None => true,
        };
        if is_newer {
            newest = Some((modified, candidate));
        }
    }

    newest
        .map(|(_, file)| absolute(file))
        .ok_or_else(|| TraceError::NoLogFiles {
            dir: path.to_path_buf(),
            extension: extension.to_string(),
        })
}

fn absolute(path: PathBuf) -> PathBuf {
    fs::canonicalize(&path).unwrap_or(path)
}

/// Parse a trace log line by line
///
/// Blank lines are skipped. Lines that are not JSON, or are JSON but not an
/// object, become [`ParseIssue`]s; they never abort the load.
pub fn load_events(path: &Path) -> Result<LoadedLog> {
    let bytes = fs::read(path).map_err(|_| TraceError::LogPathNotFound(path.to_path_buf()))?;
    let contents = String::from_utf8_lossy(&bytes);
    Ok(parse_lines(path, &contents))
}

pub(crate) fn parse_lines(path: &Path, contents: &str) -> LoadedLog {
    let mut events = Vec::new();
    let mut issues = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(event)) => events.push(ParsedEvent {
                line: line_no,
                event,
            }),
            Ok(_) => issues.push(ParseIssue {
                line_no,
                reason: "JSON parsed to a non-object value".to_string(),
            }),
            Err(e) => issues.push(ParseIssue {
                line_no,
                reason: e.to_string(),
            }),
        }
    }

    tracing::debug!(
        path = %path.display(),
        events = events.len(),
        issues = issues.len(),
        "loaded trace log"
    );

    LoadedLog {
        path: path.to_path_buf(),
        events,
        issues,
    }
}
