/*!
 * tracebridge - capture, redact and audit desktop bridge traffic
 *
 * The capture side lives in the workspace crates:
 * - `tracebridge-core-redact` masks secrets in arbitrary payloads
 * - `tracebridge-core-signal` pulls protocol correlation fields out of envelopes
 * - `tracebridge-core-telemetry` writes one NDJSON event per bridge operation
 *
 * This crate is the offline side: it reads a persisted trace log and
 * audits it against the event contract and the expected protocol
 * lifecycles, or catalogs the payload shapes it contains.
 */

pub mod audit;
pub mod cli_style;
pub mod config;
pub mod error;
pub mod logging;
pub mod shapes;

// Re-export commonly used types
pub use audit::{analyze, AuditCheck, AuditReport, CheckStatus};
pub use config::{AuditConfig, LogLevel, TraceConfig};
pub use error::{Result, TraceError};
pub use shapes::{catalog, Flow, FlowTimeline, ShapeCatalog};

pub use tracebridge_core_redact as redact;
pub use tracebridge_core_signal as signal;
pub use tracebridge_core_telemetry as telemetry;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
