//! Canonical signal fields

use serde::{Deserialize, Serialize};

/// Canonical fields pulled out of a bridge payload
///
/// Every field is independently nullable; a payload that matches no known
/// envelope shape yields [`Signals::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signals {
    pub method: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub thread_id: Option<String>,
    pub turn_id: Option<String>,
    pub request_id: Option<String>,
    pub status: Option<String>,
}

impl Signals {
    /// Fill every unresolved field from `other`
    ///
    /// Resolved fields are never overwritten, so folding a sequence of
    /// candidates through `fill_from` gives first-match-wins semantics.
    pub fn fill_from(&mut self, other: Signals) {
        fill(&mut self.method, other.method);
        fill(&mut self.kind, other.kind);
        fill(&mut self.thread_id, other.thread_id);
        fill(&mut self.turn_id, other.turn_id);
        fill(&mut self.request_id, other.request_id);
        fill(&mut self.status, other.status);
    }

    /// True once every field has been resolved
    pub fn is_complete(&self) -> bool {
        self.method.is_some()
            && self.kind.is_some()
            && self.thread_id.is_some()
            && self.turn_id.is_some()
            && self.request_id.is_some()
            && self.status.is_some()
    }

    /// True when no field has been resolved
    pub fn is_empty(&self) -> bool {
        self == &Signals::default()
    }
}

fn fill(slot: &mut Option<String>, candidate: Option<String>) {
    if slot.is_none() {
        *slot = candidate;
    }
}
