//! Capture configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::merge::MergePolicy;
use crate::preview::DEFAULT_MAX_PREVIEW_CHARS;

pub const ENV_TRACE: &str = "TRACEBRIDGE_TRACE";
pub const ENV_LOG_FILE: &str = "TRACEBRIDGE_LOG_FILE";
pub const ENV_MAX_PAYLOAD_CHARS: &str = "TRACEBRIDGE_MAX_PAYLOAD_CHARS";
pub const ENV_APP_FLAVOR: &str = "TRACEBRIDGE_APP_FLAVOR";
pub const ENV_BUILD_FLAVOR: &str = "BUILD_FLAVOR";
pub const ENV_RUN_ID: &str = "TRACEBRIDGE_RUN_ID";

/// How and where bridge operations are captured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Persist events at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Trace log path (None = `logs/trace-<runId>.ndjson`)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Preview budget in characters
    #[serde(default = "default_max_preview_chars")]
    pub max_preview_chars: usize,

    /// Build flavor stamped on every event
    #[serde(default = "default_app_flavor")]
    pub app_flavor: String,

    /// Fixed run id (None = random per emitter)
    #[serde(default)]
    pub run_id: Option<String>,

    /// Fixed session id (None = random per emitter)
    #[serde(default)]
    pub session_id: Option<String>,

    #[serde(default)]
    pub merge_policy: MergePolicy,
}

fn default_true() -> bool {
    true
}

fn default_max_preview_chars() -> usize {
    DEFAULT_MAX_PREVIEW_CHARS
}

fn default_app_flavor() -> String {
    "dev".to_string()
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_file: None,
            max_preview_chars: default_max_preview_chars(),
            app_flavor: default_app_flavor(),
            run_id: None,
            session_id: None,
            merge_policy: MergePolicy::default(),
        }
    }
}

impl CaptureConfig {
    /// Build a configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup
    ///
    /// Unset, empty and unparseable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(flag) = var(ENV_TRACE) {
            config.enabled = flag.trim() != "0";
        }
        if let Some(path) = var(ENV_LOG_FILE) {
            config.log_file = Some(PathBuf::from(path));
        }
        if let Some(raw) = var(ENV_MAX_PAYLOAD_CHARS) {
            match raw.trim().parse::<usize>() {
                Ok(chars) => config.max_preview_chars = chars,
                Err(_) => tracing::debug!(value = %raw, "ignoring invalid {}", ENV_MAX_PAYLOAD_CHARS),
            }
        }
        if let Some(flavor) = var(ENV_APP_FLAVOR).or_else(|| var(ENV_BUILD_FLAVOR)) {
            config.app_flavor = flavor;
        }
        config.run_id = var(ENV_RUN_ID);

        config
    }

    /// Trace log path for a run
    pub fn resolve_log_file(&self, run_id: &str) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("logs").join(format!("trace-{run_id}.ndjson")))
    }
}
