//! Secret redaction for captured bridge payloads
//!
//! Every payload that reaches the trace log passes through this crate first.
//! Redaction is total: it never fails, never panics on foreign shapes, and
//! always produces a JSON value with the shape of its input.
//!
//! # Rules
//!
//! - **Key rules**: values under sensitive keys (`authorization`, `cookie`,
//!   `x-api-key`, anything matching `token|secret|api[-_]?key|password`) are
//!   masked. Cookies keep their names, authorization values keep their scheme.
//! - **Content rules**: every string is scanned for bearer tokens,
//!   JWT-shaped triples, vendor key prefixes and inline `key: value` text.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tracebridge_core_redact::redact_value;
//!
//! let headers = json!({
//!     "Authorization": "Bearer abc.def.ghi",
//!     "Cookie": "sid=abc123; theme=dark",
//! });
//! let clean = redact_value(&headers);
//! assert_eq!(clean["Authorization"], "Bearer <redacted>");
//! assert_eq!(clean["Cookie"], "sid=<redacted>; theme=<redacted>");
//! ```

pub mod engine;
pub mod payload;
pub mod rules;

pub use engine::{redact, redact_string, redact_value};
pub use payload::{Payload, SharedPayload};
pub use rules::{
    redact_authorization_value, redact_cookie_value, strategy_for_key, MaskStrategy,
    RedactionRule, CONTENT_RULES,
};

/// Mask substituted for secret material
pub const REDACTED: &str = "<redacted>";

/// Marker substituted for a reference back into the current path
pub const CIRCULAR: &str = "[Circular]";

/// Placeholder for values with no printable form
pub const UNPRINTABLE: &str = "<unprintable>";
