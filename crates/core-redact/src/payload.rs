//! Host-side value model for captured payloads
//!
//! Bridge payloads arrive as whatever the host handed to the channel. Most
//! of them are plain JSON, but a host can also pass raw byte buffers, values
//! with no JSON form, and object graphs that share (or cycle back to) nodes.
//! [`Payload`] models all of these so the redaction engine can walk them
//! without ever recursing forever.

use serde_json::{Map, Number, Value};
use std::sync::{Arc, RwLock};

/// A captured value
#[derive(Debug, Clone)]
pub enum Payload {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Raw binary buffer, rendered as lossy UTF-8 text
    Bytes(Vec<u8>),
    List(Vec<Payload>),
    /// Insertion-ordered mapping
    Map(Vec<(String, Payload)>),
    /// Node that may be referenced from several places, including itself
    Shared(SharedPayload),
    /// Host value without a JSON form (functions, symbols, handles)
    ///
    /// Carries the host's textual rendering when one exists.
    Opaque(Option<String>),
}

/// Reference-counted payload node
///
/// Cloning a `SharedPayload` clones the handle, not the value; two clones
/// are the same node for cycle detection purposes.
#[derive(Debug, Clone)]
pub struct SharedPayload(Arc<RwLock<Payload>>);

impl SharedPayload {
    pub fn new(value: Payload) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Replace the node's value, returning the previous one
    ///
    /// Returns `None` if the lock is poisoned.
    pub fn replace(&self, value: Payload) -> Option<Payload> {
        let mut guard = self.0.write().ok()?;
        Some(std::mem::replace(&mut *guard, value))
    }

    /// Push an entry onto a map node; no-op for other node kinds
    pub fn insert(&self, key: impl Into<String>, value: Payload) {
        if let Ok(mut guard) = self.0.write() {
            if let Payload::Map(entries) = &mut *guard {
                entries.push((key.into(), value));
            }
        }
    }

    /// Identity of the node, stable for its lifetime
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    /// Run `f` against the node's current value
    ///
    /// Returns `None` if the lock is poisoned.
    pub fn with<R>(&self, f: impl FnOnce(&Payload) -> R) -> Option<R> {
        self.0.read().ok().map(|guard| f(&guard))
    }
}

impl Payload {
    /// Build an empty map node
    pub fn map() -> Self {
        Payload::Map(Vec::new())
    }

    /// Add an entry to a map payload (builder style)
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<Payload>) -> Self {
        if let Payload::Map(entries) = &mut self {
            entries.push((key.into(), value.into()));
        }
        self
    }

    /// Wrap a value in a shared node
    pub fn shared(value: Payload) -> (Self, SharedPayload) {
        let node = SharedPayload::new(value);
        (Payload::Shared(node.clone()), node)
    }

    /// Unredacted JSON projection of the payload
    ///
    /// Cycles are cut with the same marker the redaction engine uses, so the
    /// projection is always finite. Used for signal extraction, which needs
    /// the original envelope shape rather than a masked one.
    pub fn to_json(&self) -> Value {
        let mut path = Vec::new();
        project(self, &mut path)
    }
}

fn project(payload: &Payload, path: &mut Vec<usize>) -> Value {
    match payload {
        Payload::Null => Value::Null,
        Payload::Bool(b) => Value::Bool(*b),
        Payload::Number(n) => Value::Number(n.clone()),
        Payload::String(s) => Value::String(s.clone()),
        Payload::Bytes(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        Payload::List(items) => Value::Array(items.iter().map(|item| project(item, path)).collect()),
        Payload::Map(entries) => {
            let mut map = Map::new();
            for (key, value) in entries {
                map.insert(key.clone(), project(value, path));
            }
            Value::Object(map)
        }
        Payload::Shared(node) => {
            let id = node.identity();
            if path.contains(&id) {
                return Value::String(crate::CIRCULAR.to_string());
            }
            path.push(id);
            let value = node
                .with(|inner| project(inner, path))
                .unwrap_or_else(|| Value::String(crate::UNPRINTABLE.to_string()));
            path.pop();
            value
        }
        Payload::Opaque(Some(text)) => Value::String(text.clone()),
        Payload::Opaque(None) => Value::String(crate::UNPRINTABLE.to_string()),
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Payload::Null,
            Value::Bool(b) => Payload::Bool(b),
            Value::Number(n) => Payload::Number(n),
            Value::String(s) => Payload::String(s),
            Value::Array(items) => Payload::List(items.into_iter().map(Payload::from).collect()),
            Value::Object(map) => {
                Payload::Map(map.into_iter().map(|(k, v)| (k, Payload::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for Payload {
    fn from(value: &Value) -> Self {
        Payload::from(value.clone())
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::String(value.to_string())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::String(value)
    }
}

impl From<bool> for Payload {
    fn from(value: bool) -> Self {
        Payload::Bool(value)
    }
}

impl From<i64> for Payload {
    fn from(value: i64) -> Self {
        Payload::Number(value.into())
    }
}

impl From<u64> for Payload {
    fn from(value: u64) -> Self {
        Payload::Number(value.into())
    }
}

impl From<f64> for Payload {
    /// Non-finite floats have no JSON form and become opaque
    fn from(value: f64) -> Self {
        match Number::from_f64(value) {
            Some(n) => Payload::Number(n),
            None => Payload::Opaque(None),
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(value: Vec<u8>) -> Self {
        Payload::Bytes(value)
    }
}
