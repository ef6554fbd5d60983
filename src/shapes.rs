/*!
 * Runtime shape catalog
 *
 * Groups the events of a trace log by `direction|channel|method|type` and
 * records, per group, how often it occurred and the structural shape of its
 * payload preview. Useful for discovering which envelope shapes a host
 * actually produces.
 *
 * Flow timelines are the other view: the events of one feature area (login,
 * thread and turn, automations, git) in log order, selected by method prefix.
 */

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracebridge_core_telemetry::TRUNCATION_MARKER;

use crate::audit::{load_events, resolve_log_path, LoadedLog, ParsedEvent};
use crate::config::AuditConfig;
use crate::error::{Result, TraceError};

/// Nesting depth past which shapes are cut off
pub const MAX_SHAPE_DEPTH: usize = 3;

/// Parsed previews kept per group
pub const MAX_EXAMPLES: usize = 2;

/// Events kept per flow timeline
pub const MAX_FLOW_STEPS: usize = 200;

const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeEntry {
    pub key: String,
    pub count: usize,
    pub raw_preview_shape: Option<Value>,
    pub examples: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeCatalog {
    pub extracted_at: DateTime<Utc>,
    pub source: PathBuf,
    pub event_count: usize,
    /// Distinct non-empty channels, sorted
    pub channels: Vec<String>,
    /// Groups in order of first appearance
    pub schema_entries: Vec<ShapeEntry>,
}

/// Resolve and catalog a trace log
pub fn catalog(log: &Path, config: &AuditConfig) -> Result<ShapeCatalog> {
    let path = resolve_log_path(log, &config.log_extension)?;
    let loaded = load_events(&path)?;
    catalog_loaded(&loaded)
}

pub fn catalog_loaded(loaded: &LoadedLog) -> Result<ShapeCatalog> {
    if loaded.events.is_empty() {
        return Err(TraceError::NoEvents(loaded.path.clone()));
    }

    let mut entries: Vec<ShapeEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut channels = BTreeSet::new();

    for event in &loaded.events {
        if let Some(channel) = event.str_field("channel") {
            channels.insert(channel.to_string());
        }

        let key = group_key(event);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            entries.push(ShapeEntry {
                key,
                count: 0,
                raw_preview_shape: None,
                examples: Vec::new(),
            });
            entries.len() - 1
        });

        let entry = &mut entries[slot];
        entry.count += 1;
        if let Some(parsed) = event.str_field("rawPreview").and_then(parse_preview) {
            if entry.raw_preview_shape.is_none() {
                entry.raw_preview_shape = Some(collect_shape(&parsed, 0));
            }
            if entry.examples.len() < MAX_EXAMPLES {
                entry.examples.push(parsed);
            }
        }
    }

    tracing::debug!(groups = entries.len(), "cataloged runtime shapes");

    Ok(ShapeCatalog {
        extracted_at: Utc::now(),
        source: loaded.path.clone(),
        event_count: loaded.events.len(),
        channels: channels.into_iter().collect(),
        schema_entries: entries,
    })
}

/// `direction|channel|method|type`, with `unknown` for absent fields
pub fn group_key(event: &ParsedEvent) -> String {
    ["direction", "channel", "method", "type"]
        .iter()
        .map(|field| event.str_field(field).unwrap_or(UNKNOWN))
        .collect::<Vec<_>>()
        .join("|")
}

/// Parse a preview that holds a JSON object or array
///
/// A trailing truncation marker is stripped first; a preview cut mid-value
/// still fails to parse and yields `None`.
pub fn parse_preview(preview: &str) -> Option<Value> {
    let trimmed = preview.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }
    let candidate = trimmed.strip_suffix(TRUNCATION_MARKER).unwrap_or(trimmed);
    serde_json::from_str(candidate).ok()
}

/// Structural shape of a JSON value
///
/// Scalars become their type name, arrays are summarised by their first
/// element, and anything nested deeper than [`MAX_SHAPE_DEPTH`] becomes
/// `"truncated"`.
pub fn collect_shape(value: &Value, depth: usize) -> Value {
    if depth > MAX_SHAPE_DEPTH {
        return Value::from("truncated");
    }
    match value {
        Value::Null => Value::from("null"),
        Value::Bool(_) => Value::from("boolean"),
        Value::Number(_) => Value::from("number"),
        Value::String(_) => Value::from("string"),
        Value::Array(items) => match items.first() {
            None => Value::Array(vec![Value::from("empty")]),
            Some(first) => Value::Array(vec![collect_shape(first, depth + 1)]),
        },
        Value::Object(map) => {
            let shape: Map<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), collect_shape(v, depth + 1)))
                .collect();
            Value::Object(shape)
        }
    }
}

/// Feature areas with a method-prefix timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flow {
    Login,
    ThreadTurn,
    Automations,
    Git,
}

impl Flow {
    /// Method prefixes that place an event in this flow
    pub fn method_prefixes(&self) -> &'static [&'static str] {
        match self {
            Flow::Login => &["getAuthStatus", "mcpServerStatus/list", "auth/"],
            Flow::ThreadTurn => &["thread/", "turn/", "item/agentMessage/delta"],
            Flow::Automations => &["automation"],
            Flow::Git => &["git-", "git/", "current-branch", "status-summary", "branch-"],
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Flow::Login => "Login Flow",
            Flow::ThreadTurn => "Thread + Turn Flow",
            Flow::Automations => "Automation Flow",
            Flow::Git => "Git Flow",
        }
    }

    pub fn matches(&self, method: &str) -> bool {
        self.method_prefixes()
            .iter()
            .any(|prefix| method.starts_with(prefix))
    }
}

/// One event of a flow timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowStep {
    pub line: usize,
    pub ts: Option<String>,
    pub direction: Option<String>,
    pub channel: Option<String>,
    pub method: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowTimeline {
    pub flow: Flow,
    pub title: String,
    pub source: PathBuf,
    /// Matching events before the step limit was applied
    pub total_matches: usize,
    pub steps: Vec<FlowStep>,
}

/// Resolve a trace log and extract one flow timeline
pub fn flow(log: &Path, flow: Flow, config: &AuditConfig) -> Result<FlowTimeline> {
    let path = resolve_log_path(log, &config.log_extension)?;
    let loaded = load_events(&path)?;
    if loaded.events.is_empty() {
        return Err(TraceError::NoEvents(loaded.path));
    }
    Ok(flow_timeline(&loaded, flow))
}

/// Events whose method falls in `flow`, in log order, capped at [`MAX_FLOW_STEPS`]
pub fn flow_timeline(loaded: &LoadedLog, flow: Flow) -> FlowTimeline {
    let owned = |event: &ParsedEvent, key: &str| event.str_field(key).map(str::to_string);

    let matching: Vec<_> = loaded
        .events
        .iter()
        .filter_map(|event| {
            let method = event.str_field("method")?;
            flow.matches(method).then(|| (event, method))
        })
        .collect();

    let total_matches = matching.len();
    let steps = matching
        .into_iter()
        .take(MAX_FLOW_STEPS)
        .map(|(event, method)| FlowStep {
            line: event.line,
            ts: owned(event, "ts"),
            direction: owned(event, "direction"),
            channel: owned(event, "channel"),
            method: method.to_string(),
            kind: owned(event, "type"),
            status: owned(event, "status"),
        })
        .collect();

    FlowTimeline {
        flow,
        title: flow.title().to_string(),
        source: loaded.path.clone(),
        total_matches,
        steps,
    }
}
