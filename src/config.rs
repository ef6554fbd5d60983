/*!
 * Configuration types for tracebridge
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracebridge_core_telemetry::{CaptureConfig, Emitter};

use crate::error::Result;

/// Top-level configuration, loadable from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Diagnostic log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Diagnostic log file (None = stderr)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Shorthand for log_level = debug
    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub audit: AuditConfig,

    /// Capture settings for hosts embedding the emitter
    #[serde(default)]
    pub capture: CaptureConfig,
}

impl TraceConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: TraceConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Capture-side emitter built from `[capture]`
    ///
    /// Lets a host and `tracebridge audit` share one configuration file: the
    /// host records through this emitter, the analyzer reads the same log
    /// with `[audit]`.
    pub fn emitter(&self) -> Emitter {
        Emitter::new(self.capture.clone())
    }
}

/// Audit analyzer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Schema version every event must carry
    #[serde(default = "default_schema_version")]
    pub expected_schema_version: String,

    /// Evidence rows kept per matched signal
    #[serde(default = "default_evidence_limit")]
    pub evidence_limit: usize,

    /// Detail rows kept per schema-contract finding
    #[serde(default = "default_detail_limit")]
    pub detail_limit: usize,

    /// Extension of trace logs when `--log` names a directory
    #[serde(default = "default_log_extension")]
    pub log_extension: String,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

fn default_evidence_limit() -> usize {
    5
}

fn default_detail_limit() -> usize {
    10
}

fn default_log_extension() -> String {
    "ndjson".to_string()
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            expected_schema_version: default_schema_version(),
            evidence_limit: default_evidence_limit(),
            detail_limit: default_detail_limit(),
            log_extension: default_log_extension(),
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    #[default]
    Warn,

    /// Info, warnings, and errors
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
