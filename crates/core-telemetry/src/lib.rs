//! Capture-side event emission for bridge tracing
//!
//! Every traced bridge operation (handler calls, fire-and-forget messages,
//! pushes to the view, console output, lifecycle and process failures)
//! becomes one [`TelemetryEvent`] appended to an NDJSON trace log.
//!
//! Capture never interferes with the host: redaction and serialization
//! failures degrade to placeholders, and log write failures are dropped.
//!
//! ```no_run
//! use serde_json::json;
//! use tracebridge_core_redact::Payload;
//! use tracebridge_core_telemetry::{CaptureConfig, Emitter};
//!
//! let emitter = Emitter::new(CaptureConfig::from_env());
//! let args = [Payload::from(json!({"id": 1, "method": "thread/start"}))];
//! emitter.handle_in("bridge:message-from-view", &args);
//! emitter.handle_out("bridge:message-from-view", &args, &Payload::from(json!({"ok": true})));
//! ```

pub mod config;
pub mod emitter;
pub mod error;
pub mod event;
pub mod logger;
pub mod merge;
pub mod preview;
pub mod session;

pub use config::CaptureConfig;
pub use emitter::{ConsoleMessage, Emitter, Operation, ProcessErrorKind};
pub use error::{Result, TelemetryError};
pub use event::{Direction, TelemetryEvent, EVENT_KEYS, SCHEMA_VERSION};
pub use logger::{parse_telemetry_log, TelemetryLogger};
pub use merge::MergePolicy;
pub use preview::{render_preview, TRUNCATION_MARKER};
pub use session::{worker_channel, BridgeSession, SubscriptionId, WorkerCallback};
