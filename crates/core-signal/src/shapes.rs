//! Envelope shape matchers
//!
//! Each matcher is a pure function that inspects one family of envelope
//! shapes. [`SHAPE_MATCHERS`] fixes their priority: direct top-level fields,
//! then nested request/notification/response frames, then parameter bags.

use serde_json::{Map, Value};

use crate::signals::Signals;

type Object = Map<String, Value>;

/// A named, pure envelope matcher
#[derive(Clone, Copy)]
pub struct ShapeMatcher {
    pub name: &'static str,
    pub apply: fn(&Object) -> Signals,
}

impl std::fmt::Debug for ShapeMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeMatcher").field("name", &self.name).finish()
    }
}

/// Matchers in priority order
pub const SHAPE_MATCHERS: &[ShapeMatcher] = &[
    ShapeMatcher {
        name: "top-level",
        apply: top_level,
    },
    ShapeMatcher {
        name: "nested-envelope",
        apply: nested_envelope,
    },
    ShapeMatcher {
        name: "param-bag",
        apply: param_bag,
    },
];

/// Sub-objects that carry a nested protocol frame
const ENVELOPE_KEYS: &[&str] = &["request", "notification", "response", "message"];

/// Fields read straight off the payload object
pub fn top_level(obj: &Object) -> Signals {
    Signals {
        method: string_field(obj, "method"),
        kind: string_field(obj, "type"),
        thread_id: id_field(obj, "threadId"),
        turn_id: id_field(obj, "turnId"),
        request_id: id_field(obj, "requestId").or_else(|| id_field(obj, "id")),
        status: status_of(obj),
    }
}

/// Fields read from a nested request/notification/response frame
pub fn nested_envelope(obj: &Object) -> Signals {
    let mut signals = Signals::default();
    for key in ENVELOPE_KEYS {
        let Some(frame) = object_field(obj, key) else {
            continue;
        };
        let status = status_of(frame).or_else(|| {
            (*key == "response" && frame.contains_key("result")).then(|| "ok".to_string())
        });
        signals.fill_from(Signals {
            method: string_field(frame, "method"),
            kind: None,
            thread_id: id_field(frame, "threadId"),
            turn_id: id_field(frame, "turnId"),
            request_id: id_field(frame, "id"),
            status,
        });
    }
    signals
}

/// Correlation ids from a `params` bag, at top level or inside a frame
pub fn param_bag(obj: &Object) -> Signals {
    let mut signals = Signals::default();
    let bags = std::iter::once(object_field(obj, "params")).chain(
        ["request", "notification"]
            .iter()
            .map(|key| object_field(obj, key).and_then(|frame| object_field(frame, "params"))),
    );
    for bag in bags.flatten() {
        signals.fill_from(Signals {
            thread_id: id_field(bag, "threadId").or_else(|| nested_id(bag, "thread")),
            turn_id: id_field(bag, "turnId").or_else(|| nested_id(bag, "turn")),
            request_id: id_field(bag, "requestId"),
            ..Default::default()
        });
    }
    signals
}

fn object_field<'a>(obj: &'a Object, key: &str) -> Option<&'a Object> {
    obj.get(key).and_then(Value::as_object)
}

fn string_field(obj: &Object, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Correlation ids may be strings or numbers on the wire
fn id_field(obj: &Object, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn nested_id(obj: &Object, key: &str) -> Option<String> {
    object_field(obj, key).and_then(|inner| id_field(inner, "id"))
}

fn status_of(obj: &Object) -> Option<String> {
    string_field(obj, "status").or_else(|| match obj.get("error") {
        Some(Value::Null) | None => None,
        Some(_) => Some("error".to_string()),
    })
}
