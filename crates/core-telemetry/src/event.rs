//! Trace event record and direction vocabulary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TelemetryError};

/// Schema version written into every event
pub const SCHEMA_VERSION: &str = "1.0";

/// Wire keys of a serialized [`TelemetryEvent`], in serialization order
pub const EVENT_KEYS: &[&str] = &[
    "schemaVersion",
    "runId",
    "sessionId",
    "pid",
    "appFlavor",
    "ts",
    "direction",
    "channel",
    "method",
    "type",
    "threadId",
    "turnId",
    "requestId",
    "status",
    "rawPreview",
];

/// Which leg of which operation an event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Request into an invoke-style handler
    #[serde(rename = "handle.in")]
    HandleIn,
    /// Reply returned by an invoke-style handler
    #[serde(rename = "handle.out")]
    HandleOut,
    /// Invoke-style handler failed
    #[serde(rename = "handle.error")]
    HandleError,
    /// Fire-and-forget message into a listener
    #[serde(rename = "on.in")]
    OnIn,
    /// Synchronous reply from a fire-and-forget listener
    #[serde(rename = "on.out")]
    OnOut,
    /// Fire-and-forget listener failed
    #[serde(rename = "on.error")]
    OnError,
    /// Host pushed a message to a view
    #[serde(rename = "push.out")]
    PushOut,
    /// Console message emitted by a view
    #[serde(rename = "console")]
    Console,
    /// Process or window lifecycle
    #[serde(rename = "lifecycle")]
    Lifecycle,
    /// Uncaught exception or unhandled rejection
    #[serde(rename = "process.error")]
    ProcessError,
}

impl Direction {
    pub const ALL: &'static [Direction] = &[
        Direction::HandleIn,
        Direction::HandleOut,
        Direction::HandleError,
        Direction::OnIn,
        Direction::OnOut,
        Direction::OnError,
        Direction::PushOut,
        Direction::Console,
        Direction::Lifecycle,
        Direction::ProcessError,
    ];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::HandleIn => "handle.in",
            Direction::HandleOut => "handle.out",
            Direction::HandleError => "handle.error",
            Direction::OnIn => "on.in",
            Direction::OnOut => "on.out",
            Direction::OnError => "on.error",
            Direction::PushOut => "push.out",
            Direction::Console => "console",
            Direction::Lifecycle => "lifecycle",
            Direction::ProcessError => "process.error",
        }
    }

    /// Synchronous reply leg of a request/response exchange
    pub fn is_reply_leg(&self) -> bool {
        matches!(self, Direction::HandleOut | Direction::OnOut)
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Direction::HandleError | Direction::OnError | Direction::ProcessError
        )
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self> {
        Direction::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| TelemetryError::invalid_direction(s))
    }
}

/// One captured bridge operation
///
/// Every field is always serialized; absent values are written as `null`
/// so readers can tell "not present in this operation" from "not recorded".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    pub schema_version: String,
    pub run_id: String,
    pub session_id: String,
    pub pid: u32,
    pub app_flavor: String,

    /// Timestamp (UTC)
    pub ts: DateTime<Utc>,

    pub direction: Direction,
    pub channel: Option<String>,
    pub method: Option<String>,

    /// Envelope type (`mcp-request`, `worker-response`, ...)
    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub thread_id: Option<String>,
    pub turn_id: Option<String>,
    pub request_id: Option<String>,
    pub status: Option<String>,

    /// Redacted, truncated JSON rendering of the payload
    pub raw_preview: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TelemetryEvent {
        TelemetryEvent {
            schema_version: SCHEMA_VERSION.to_string(),
            run_id: "run-1".into(),
            session_id: "session-1".into(),
            pid: 4242,
            app_flavor: "dev".into(),
            ts: Utc::now(),
            direction: Direction::HandleIn,
            channel: Some("bridge:message-from-view".into()),
            method: Some("thread/start".into()),
            kind: None,
            thread_id: None,
            turn_id: None,
            request_id: Some("1".into()),
            status: None,
            raw_preview: "[]".into(),
        }
    }

    #[test]
    fn test_direction_serialization() {
        let json = serde_json::to_string(&Direction::HandleOut).unwrap();
        assert_eq!(json, "\"handle.out\"");
        let parsed: Direction = serde_json::from_str("\"process.error\"").unwrap();
        assert_eq!(parsed, Direction::ProcessError);
    }

    #[test]
    fn test_direction_from_str_matches_serde() {
        for direction in Direction::ALL {
            let json = serde_json::to_string(direction).unwrap();
            assert_eq!(json.trim_matches('"'), direction.as_str());
            assert_eq!(Direction::from_str(direction.as_str()).unwrap(), *direction);
        }
        assert!(Direction::from_str("ipc.sideways").is_err());
    }

    #[test]
    fn test_reply_legs() {
        assert!(Direction::HandleOut.is_reply_leg());
        assert!(Direction::OnOut.is_reply_leg());
        assert!(!Direction::PushOut.is_reply_leg());
        assert!(!Direction::HandleIn.is_reply_leg());
    }

    #[test]
    fn test_every_key_serialized_even_when_null() {
        let value = serde_json::to_value(sample()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), EVENT_KEYS.len());
        for key in EVENT_KEYS {
            assert!(object.contains_key(*key), "missing key {key}");
        }
        assert!(object["type"].is_null());
        assert_eq!(object["direction"], "handle.in");
    }

    #[test]
    fn test_event_round_trip() {
        let event = sample();
        let line = serde_json::to_string(&event).unwrap();
        let parsed: TelemetryEvent = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, event);
    }
}
