//! Canonical signal extraction from heterogeneous bridge envelopes
//!
//! Bridge payloads come in many shapes: bare JSON-RPC requests, typed
//! wrappers around nested request/notification/response frames, worker
//! envelopes, batches of any of these. This crate reduces a payload to a
//! small fixed set of [`Signals`] (method, type, thread/turn/request ids,
//! status) without ever failing on a shape it does not recognise.
//!
//! ```
//! use serde_json::json;
//! use tracebridge_core_signal::extract;
//!
//! let payload = json!({
//!     "type": "mcp-request",
//!     "request": {"id": 7, "method": "thread/start", "params": {"threadId": "t-1"}}
//! });
//! let signals = extract([&payload]);
//! assert_eq!(signals.kind.as_deref(), Some("mcp-request"));
//! assert_eq!(signals.method.as_deref(), Some("thread/start"));
//! assert_eq!(signals.request_id.as_deref(), Some("7"));
//! assert_eq!(signals.thread_id.as_deref(), Some("t-1"));
//! ```

pub mod shapes;
pub mod signals;

use serde_json::Value;

pub use shapes::{ShapeMatcher, SHAPE_MATCHERS};
pub use signals::Signals;

/// Extract signals from the payload elements of one traced operation
///
/// Elements are matched left to right; within an element the matchers run in
/// [`SHAPE_MATCHERS`] order. The first non-null value found for a field wins.
/// Non-object elements are skipped.
pub fn extract<'a, I>(payloads: I) -> Signals
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut signals = Signals::default();
    for payload in payloads {
        let Some(obj) = payload.as_object() else {
            continue;
        };
        for matcher in SHAPE_MATCHERS {
            signals.fill_from((matcher.apply)(obj));
        }
        if signals.is_complete() {
            break;
        }
    }
    signals
}

/// Flatten the argument list of a traced call by one level
///
/// A single array argument is treated as a batch of envelopes; otherwise
/// the arguments themselves are the elements.
pub fn flatten_envelopes(args: &[Value]) -> Vec<&Value> {
    match args {
        [Value::Array(items)] => items.iter().collect(),
        _ => args.iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_element_wins() {
        let batch = [
            json!({"method": "thread/start", "id": 1}),
            json!({"method": "thread/resume", "id": 2, "threadId": "t-2"}),
        ];
        let signals = extract(&batch);
        assert_eq!(signals.method.as_deref(), Some("thread/start"));
        assert_eq!(signals.request_id.as_deref(), Some("1"));
        // Unresolved after the first element, so the second fills it
        assert_eq!(signals.thread_id.as_deref(), Some("t-2"));
    }

    #[test]
    fn test_outer_fields_beat_inner_frames() {
        let payload = json!({
            "method": "outer",
            "requestId": "outer-id",
            "request": {"method": "inner", "id": "inner-id"}
        });
        let signals = extract([&payload]);
        assert_eq!(signals.method.as_deref(), Some("outer"));
        assert_eq!(signals.request_id.as_deref(), Some("outer-id"));
    }

    #[test]
    fn test_notification_params() {
        let payload = json!({
            "type": "mcp-notification",
            "notification": {
                "method": "item/agentMessage/delta",
                "params": {"threadId": "t-1", "turnId": "u-1", "delta": "hi"}
            }
        });
        let signals = extract([&payload]);
        assert_eq!(signals.kind.as_deref(), Some("mcp-notification"));
        assert_eq!(signals.method.as_deref(), Some("item/agentMessage/delta"));
        assert_eq!(signals.thread_id.as_deref(), Some("t-1"));
        assert_eq!(signals.turn_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn test_worker_envelope() {
        let payload = json!({
            "type": "worker-request",
            "workerId": "git",
            "request": {"id": "w-1", "method": "status-summary"}
        });
        let signals = extract([&payload]);
        assert_eq!(signals.kind.as_deref(), Some("worker-request"));
        assert_eq!(signals.method.as_deref(), Some("status-summary"));
        assert_eq!(signals.request_id.as_deref(), Some("w-1"));
    }

    #[test]
    fn test_malformed_inputs() {
        let inputs = [json!(null), json!(42), json!("text"), json!([1, 2]), json!({})];
        assert!(extract(&inputs).is_empty());
    }

    #[test]
    fn test_flatten_single_array_argument() {
        let args = [json!([{"method": "a"}, {"method": "b"}])];
        let flat = flatten_envelopes(&args);
        assert_eq!(flat.len(), 2);
        assert_eq!(extract(flat).method.as_deref(), Some("a"));
    }

    #[test]
    fn test_flatten_multiple_arguments() {
        let args = [json!("channel-name"), json!([{"method": "nested"}])];
        let flat = flatten_envelopes(&args);
        assert_eq!(flat.len(), 2);
        // Only one level is flattened; the nested batch is not an object
        assert!(extract(flat).is_empty());
    }
}
