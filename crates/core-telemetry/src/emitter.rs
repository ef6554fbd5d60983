//! Event emission for traced bridge operations
//!
//! The [`Emitter`] is the single capture entrypoint. Every traced operation
//! becomes exactly one [`TelemetryEvent`]: signals are extracted from the
//! unredacted payload, the preview is rendered from the redacted one, and
//! the finished event is appended to the trace log. Nothing in here ever
//! returns an error to the instrumented call site.

use chrono::Utc;
use serde_json::Value;
use std::path::Path;
use tracebridge_core_redact::Payload;
use tracebridge_core_signal::{extract, flatten_envelopes, Signals};
use uuid::Uuid;

use crate::config::CaptureConfig;
use crate::error::Result;
use crate::event::{Direction, TelemetryEvent, SCHEMA_VERSION};
use crate::logger::TelemetryLogger;
use crate::preview::render_preview;

/// Kind of process-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessErrorKind {
    UncaughtException,
    UnhandledRejection,
}

impl ProcessErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessErrorKind::UncaughtException => "uncaughtException",
            ProcessErrorKind::UnhandledRejection => "unhandledRejection",
        }
    }
}

/// Console message emitted by a view
#[derive(Debug, Clone, Copy)]
pub struct ConsoleMessage<'a> {
    pub level: &'a str,
    pub message: &'a str,
    pub source: Option<&'a str>,
    pub line: Option<u32>,
}

/// One traced operation, borrowed from the call site
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    HandleIn {
        channel: &'a str,
        args: &'a [Payload],
    },
    HandleOut {
        channel: &'a str,
        args: &'a [Payload],
        result: &'a Payload,
    },
    HandleError {
        channel: &'a str,
        args: &'a [Payload],
        error: &'a Payload,
    },
    OnIn {
        channel: &'a str,
        args: &'a [Payload],
    },
    OnOut {
        channel: &'a str,
        args: &'a [Payload],
        reply: &'a Payload,
    },
    OnError {
        channel: &'a str,
        args: &'a [Payload],
        error: &'a Payload,
    },
    PushOut {
        channel: &'a str,
        args: &'a [Payload],
    },
    Console(ConsoleMessage<'a>),
    Lifecycle {
        stage: &'a str,
        detail: &'a Payload,
    },
    ProcessError {
        kind: ProcessErrorKind,
        error: &'a Payload,
    },
}

impl Operation<'_> {
    pub fn direction(&self) -> Direction {
        match self {
            Operation::HandleIn { .. } => Direction::HandleIn,
            Operation::HandleOut { .. } => Direction::HandleOut,
            Operation::HandleError { .. } => Direction::HandleError,
            Operation::OnIn { .. } => Direction::OnIn,
            Operation::OnOut { .. } => Direction::OnOut,
            Operation::OnError { .. } => Direction::OnError,
            Operation::PushOut { .. } => Direction::PushOut,
            Operation::Console(_) => Direction::Console,
            Operation::Lifecycle { .. } => Direction::Lifecycle,
            Operation::ProcessError { .. } => Direction::ProcessError,
        }
    }
}

/// Capture-side event emitter
///
/// Cheap to clone; clones share the run identity and the trace log handle.
#[derive(Debug, Clone)]
pub struct Emitter {
    config: CaptureConfig,
    run_id: String,
    session_id: String,
    pid: u32,
    logger: Option<TelemetryLogger>,
}

impl Emitter {
    /// Create an emitter, degrading to capture-only if the log cannot be opened
    pub fn new(config: CaptureConfig) -> Self {
        let mut emitter = Self::detached(config);
        if emitter.config.enabled {
            let path = emitter.config.resolve_log_file(&emitter.run_id);
            match TelemetryLogger::new(&path) {
                Ok(logger) => emitter.logger = Some(logger),
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "trace log unavailable; events will not be persisted"
                ),
            }
        }
        emitter
    }

    /// Create an emitter, failing if the enabled trace log cannot be opened
    pub fn open(config: CaptureConfig) -> Result<Self> {
        let mut emitter = Self::detached(config);
        if emitter.config.enabled {
            let path = emitter.config.resolve_log_file(&emitter.run_id);
            emitter.logger = Some(TelemetryLogger::new(path)?);
        }
        Ok(emitter)
    }

    /// Create an emitter from the process environment
    pub fn from_env() -> Self {
        Self::new(CaptureConfig::from_env())
    }

    fn detached(config: CaptureConfig) -> Self {
        let run_id = config
            .run_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let session_id = config
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            config,
            run_id,
            session_id,
            pid: std::process::id(),
            logger: None,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Path of the trace log, if events are being persisted
    pub fn log_path(&self) -> Option<&Path> {
        self.logger.as_ref().map(TelemetryLogger::path)
    }

    /// Build, persist and return the event for one operation
    pub fn record(&self, op: Operation<'_>) -> TelemetryEvent {
        let direction = op.direction();
        let budget = self.config.max_preview_chars;
        let policy = self.config.merge_policy;

        let (channel, mut signals, raw_preview) = match op {
            Operation::HandleIn { channel, args }
            | Operation::OnIn { channel, args }
            | Operation::PushOut { channel, args } => (
                Some(channel.to_string()),
                args_signals(args),
                render_preview(&Payload::List(args.to_vec()), budget),
            ),
            Operation::HandleOut {
                channel,
                args,
                result: outcome,
            }
            | Operation::OnOut {
                channel,
                args,
                reply: outcome,
            }
            | Operation::HandleError {
                channel,
                args,
                error: outcome,
            }
            | Operation::OnError {
                channel,
                args,
                error: outcome,
            } => (
                Some(channel.to_string()),
                policy.merge(args_signals(args), outcome_signals(outcome)),
                render_preview(outcome, budget),
            ),
            Operation::Console(message) => {
                let mut payload = Payload::map()
                    .with_entry("level", message.level)
                    .with_entry("message", message.message);
                if let Some(source) = message.source {
                    payload = payload.with_entry("source", source);
                }
                if let Some(line) = message.line {
                    payload = payload.with_entry("line", u64::from(line));
                }
                let signals = Signals {
                    kind: Some(format!("console.{}", message.level)),
                    ..Default::default()
                };
                (None, signals, render_preview(&payload, budget))
            }
            Operation::Lifecycle { stage, detail } => {
                let signals = Signals {
                    kind: Some(stage.to_string()),
                    ..Default::default()
                };
                (None, signals, render_preview(detail, budget))
            }
            Operation::ProcessError { kind, error } => {
                let signals = Signals {
                    kind: Some(kind.as_str().to_string()),
                    ..Default::default()
                };
                (None, signals, render_preview(error, budget))
            }
        };

        if direction.is_error() {
            signals.status = Some("error".to_string());
        } else if direction.is_reply_leg() && signals.status.is_none() {
            signals.status = Some("ok".to_string());
        }

        let event = TelemetryEvent {
            schema_version: SCHEMA_VERSION.to_string(),
            run_id: self.run_id.clone(),
            session_id: self.session_id.clone(),
            pid: self.pid,
            app_flavor: self.config.app_flavor.clone(),
            ts: Utc::now(),
            direction,
            channel,
            method: signals.method,
            kind: signals.kind,
            thread_id: signals.thread_id,
            turn_id: signals.turn_id,
            request_id: signals.request_id,
            status: signals.status,
            raw_preview,
        };

        self.persist(&event);
        event
    }

    fn persist(&self, event: &TelemetryEvent) {
        let Some(logger) = &self.logger else {
            return;
        };
        if let Err(e) = logger.append(event) {
            tracing::debug!(error = %e, direction = %event.direction, "dropped trace event");
        }
    }

    pub fn handle_in(&self, channel: &str, args: &[Payload]) -> TelemetryEvent {
        self.record(Operation::HandleIn { channel, args })
    }

    pub fn handle_out(&self, channel: &str, args: &[Payload], result: &Payload) -> TelemetryEvent {
        self.record(Operation::HandleOut {
            channel,
            args,
            result,
        })
    }

    pub fn handle_error(&self, channel: &str, args: &[Payload], error: &Payload) -> TelemetryEvent {
        self.record(Operation::HandleError {
            channel,
            args,
            error,
        })
    }

    pub fn on_in(&self, channel: &str, args: &[Payload]) -> TelemetryEvent {
        self.record(Operation::OnIn { channel, args })
    }

    pub fn on_out(&self, channel: &str, args: &[Payload], reply: &Payload) -> TelemetryEvent {
        self.record(Operation::OnOut {
            channel,
            args,
            reply,
        })
    }

    pub fn on_error(&self, channel: &str, args: &[Payload], error: &Payload) -> TelemetryEvent {
        self.record(Operation::OnError {
            channel,
            args,
            error,
        })
    }

    pub fn push_out(&self, channel: &str, args: &[Payload]) -> TelemetryEvent {
        self.record(Operation::PushOut { channel, args })
    }

    pub fn console(&self, message: ConsoleMessage<'_>) -> TelemetryEvent {
        self.record(Operation::Console(message))
    }

    pub fn lifecycle(&self, stage: &str, detail: &Payload) -> TelemetryEvent {
        self.record(Operation::Lifecycle { stage, detail })
    }

    pub fn process_error(&self, kind: ProcessErrorKind, error: &Payload) -> TelemetryEvent {
        self.record(Operation::ProcessError { kind, error })
    }
}

fn args_signals(args: &[Payload]) -> Signals {
    let values: Vec<Value> = args.iter().map(Payload::to_json).collect();
    extract(flatten_envelopes(&values))
}

fn outcome_signals(outcome: &Payload) -> Signals {
    let value = [outcome.to_json()];
    extract(flatten_envelopes(&value))
}
