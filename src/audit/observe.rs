/*!
 * Signal token collection
 *
 * Every parsed event contributes tokens (`method:thread/start`,
 * `type:mcp-response`, `token:mcp-auth-authorized`, ...) to one set. Checks
 * are then plain set-membership questions over that set.
 */

use std::collections::{HashMap, HashSet};

use super::load::ParsedEvent;
use super::report::EvidenceRow;
use super::{APPROVAL_REQUEST_METHODS, KNOWN_METHODS};

pub const TOKEN_APPROVAL_RESPONSE: &str = "response:approval";
pub const TOKEN_AUTH_AUTHORIZED: &str = "token:mcp-auth-authorized";
pub const TOKEN_AUTH_UNAUTHORIZED: &str = "token:mcp-auth-unauthorized";

const UNAUTHORIZED_MARKERS: &[&str] = &["unauthorized", " 401"];
const AUTHORIZED_MARKERS: &[&str] = &["authmode:header", "authmode:bearer", "authorized"];
const APPROVAL_RESPONSE_MARKERS: &[&str] = &[
    "execcommandapproval",
    "applypatchapproval",
    "approvalresponse",
];

/// Reply legs of a request/response exchange
///
/// Hosts may namespace directions (`ipcMain.handle.out`), so these match as
/// dot-separated suffixes.
const REPLY_DIRECTIONS: &[&str] = &["handle.out", "on.out"];

#[derive(Debug, Default)]
pub struct Observations {
    tokens: HashSet<String>,
    evidence: HashMap<String, Vec<EvidenceRow>>,
    evidence_limit: usize,
}

impl Observations {
    /// Collect tokens from every event, keeping up to `evidence_limit`
    /// evidence rows per token
    pub fn collect(events: &[ParsedEvent], evidence_limit: usize) -> Self {
        let mut observations = Self {
            evidence_limit,
            ..Default::default()
        };
        for event in events {
            for token in event_tokens(event) {
                observations.observe(token, event);
            }
        }
        observations
    }

    fn observe(&mut self, token: String, event: &ParsedEvent) {
        let rows = self.evidence.entry(token.clone()).or_default();
        let already_recorded = rows.last().is_some_and(|row| row.line == event.line);
        if rows.len() < self.evidence_limit && !already_recorded {
            rows.push(EvidenceRow {
                line: event.line,
                ts: event.field("ts"),
                method: event.field("method"),
                kind: event.field("type"),
                status: event.field("status"),
            });
        }
        self.tokens.insert(token);
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn evidence(&self, token: &str) -> &[EvidenceRow] {
        self.evidence.get(token).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// All tokens one event contributes, in a stable order
pub fn event_tokens(event: &ParsedEvent) -> Vec<String> {
    let mut tokens = Vec::new();

    for (field, prefix) in [("method", "method"), ("type", "type"), ("channel", "channel")] {
        if let Some(value) = event.str_field(field) {
            tokens.push(format!("{prefix}:{value}"));
        }
    }

    let Some(preview) = event.str_field("rawPreview") else {
        return tokens;
    };
    let lower = preview.to_lowercase();

    if is_approval_response(event, &lower) {
        tokens.push(TOKEN_APPROVAL_RESPONSE.to_string());
    }
    if UNAUTHORIZED_MARKERS.iter().any(|m| lower.contains(m)) {
        tokens.push(TOKEN_AUTH_UNAUTHORIZED.to_string());
    }
    if AUTHORIZED_MARKERS.iter().any(|m| lower.contains(m)) {
        tokens.push(TOKEN_AUTH_AUTHORIZED.to_string());
    }
    for method in KNOWN_METHODS {
        if preview.contains(method) {
            tokens.push(format!("method:{method}"));
        }
    }

    tokens
}

/// An approval decision flowing back to the requester
///
/// Either the reply leg of an approval-request method, or an `mcp-response`
/// envelope whose preview names an approval payload.
pub fn is_approval_response(event: &ParsedEvent, preview_lower: &str) -> bool {
    let method = event.str_field("method").unwrap_or_default();
    let direction = event.str_field("direction").unwrap_or_default();
    if APPROVAL_REQUEST_METHODS.contains(&method) && is_reply_direction(direction) {
        return true;
    }

    let kind = event
        .str_field("type")
        .map(str::to_lowercase)
        .unwrap_or_default();
    kind == "mcp-response"
        && APPROVAL_RESPONSE_MARKERS
            .iter()
            .any(|m| preview_lower.contains(m))
}

/// `handle.out`, `on.out`, or either behind a namespace prefix
pub fn is_reply_direction(direction: &str) -> bool {
    REPLY_DIRECTIONS.iter().any(|leg| {
        direction
            .strip_suffix(leg)
            .is_some_and(|prefix| prefix.is_empty() || prefix.ends_with('.'))
    })
}
