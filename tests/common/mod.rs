//! Shared fixtures for integration tests

#![allow(dead_code)]

use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// A complete, well-formed trace event
pub fn base_event(index: usize) -> Map<String, Value> {
    let event = json!({
        "schemaVersion": "1.0",
        "runId": "verify-run-1",
        "sessionId": "verify-session-1",
        "pid": 4242,
        "appFlavor": "dev",
        "ts": format!("2026-01-01T00:00:{:02}.000Z", index),
        "direction": "handle.in",
        "channel": "bridge:message-from-view",
        "method": null,
        "type": null,
        "threadId": "thread-1",
        "turnId": "turn-1",
        "requestId": "req-1",
        "status": "ok",
        "rawPreview": "{\"ok\":true}"
    });
    match event {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn event(index: usize, overrides: Value) -> Map<String, Value> {
    let mut event = base_event(index);
    if let Value::Object(fields) = overrides {
        for (key, value) in fields {
            event.insert(key, value);
        }
    }
    event
}

/// Seventeen events covering every lifecycle check
pub fn passing_events() -> Vec<Map<String, Value>> {
    let thread_methods = [
        "thread/start",
        "thread/resume",
        "thread/list",
        "thread/read",
        "thread/archive",
        "thread/unarchive",
    ];
    let turn_methods = [
        "turn/start",
        "turn/interrupt",
        "turn/completed",
        "item/agentMessage/delta",
    ];

    let mut events = Vec::new();
    for (i, method) in thread_methods.iter().enumerate() {
        events.push(event(
            events.len(),
            json!({"method": method, "requestId": format!("t{}", i + 1)}),
        ));
    }
    for (i, method) in turn_methods.iter().enumerate() {
        events.push(event(
            events.len(),
            json!({"method": method, "requestId": format!("u{}", i + 1), "turnId": "turn-2"}),
        ));
    }
    events.push(event(
        events.len(),
        json!({"method": "item/commandExecution/requestApproval", "requestId": "a1"}),
    ));
    events.push(event(
        events.len(),
        json!({"method": "item/fileChange/requestApproval", "requestId": "a2"}),
    ));
    events.push(event(
        events.len(),
        json!({
            "direction": "handle.out",
            "method": "item/commandExecution/requestApproval",
            "requestId": "a1",
            "type": "mcp-response",
            "rawPreview": "{\"method\":\"execCommandApproval\",\"approved\":true}"
        }),
    ));
    events.push(event(
        events.len(),
        json!({"method": "getAuthStatus", "requestId": "m1"}),
    ));
    events.push(event(
        events.len(),
        json!({"method": "mcpServerStatus/list", "requestId": "m2"}),
    ));
    events.push(event(
        events.len(),
        json!({
            "requestId": "m3",
            "status": "error",
            "rawPreview": "{\"error\":\"401 Unauthorized\"}"
        }),
    ));
    events.push(event(
        events.len(),
        json!({
            "requestId": "m4",
            "rawPreview": "{\"content\":[{\"text\":\"authMode:bearer\"}]}"
        }),
    ));
    events
}

pub fn to_ndjson(events: &[Map<String, Value>]) -> String {
    events
        .iter()
        .map(|event| serde_json::to_string(event).unwrap() + "\n")
        .collect()
}

pub fn write_log(path: &Path, events: &[Map<String, Value>]) -> PathBuf {
    fs::write(path, to_ndjson(events)).unwrap();
    path.to_path_buf()
}
