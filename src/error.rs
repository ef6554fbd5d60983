/*!
 * Error types for tracebridge
 */

use std::fmt;
use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, TraceError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

#[derive(Debug)]
pub enum TraceError {
    /// `--log` path does not exist or cannot be read
    LogPathNotFound(PathBuf),

    /// `--log` path is neither a file nor a directory
    UnsupportedLogPath(PathBuf),

    /// Directory contains no trace logs
    NoLogFiles { dir: PathBuf, extension: String },

    /// No line of the log parsed as an event
    NoEvents(PathBuf),

    /// At least one audit check failed
    AuditFailed { failed: usize, total: usize },

    /// I/O error
    Io(io::Error),

    /// JSON serialization error
    Json(serde_json::Error),

    /// Configuration error
    Config(String),
}

impl TraceError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }

    /// True when the error is an audit verdict rather than an operational failure
    pub fn is_verdict(&self) -> bool {
        matches!(self, TraceError::AuditFailed { .. })
    }
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceError::LogPathNotFound(path) => {
                write!(f, "Log path not found: {}", path.display())
            }
            TraceError::UnsupportedLogPath(path) => {
                write!(f, "Unsupported --log path: {}", path.display())
            }
            TraceError::NoLogFiles { dir, extension } => {
                write!(
                    f,
                    "No {} files found in directory: {}",
                    extension.to_uppercase(),
                    dir.display()
                )
            }
            TraceError::NoEvents(path) => {
                write!(f, "No events parsed from {}", path.display())
            }
            TraceError::AuditFailed { failed, total } => {
                write!(f, "{} of {} audit checks failed", failed, total)
            }
            TraceError::Io(err) => write!(f, "I/O error: {}", err),
            TraceError::Json(err) => write!(f, "JSON error: {}", err),
            TraceError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for TraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TraceError::Io(err) => Some(err),
            TraceError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for TraceError {
    fn from(err: io::Error) -> Self {
        TraceError::Io(err)
    }
}

impl From<serde_json::Error> for TraceError {
    fn from(err: serde_json::Error) -> Self {
        TraceError::Json(err)
    }
}

impl From<toml::de::Error> for TraceError {
    fn from(err: toml::de::Error) -> Self {
        TraceError::Config(format!("TOML parse error: {}", err))
    }
}
