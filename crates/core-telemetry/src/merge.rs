//! Inbound/outbound signal merging

use serde::{Deserialize, Serialize};
use tracebridge_core_signal::Signals;

/// Which leg of an exchange wins when both yield a value for a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// Reply fields win, request fields fill the gaps
    #[default]
    PreferOutbound,
    /// Request fields win, reply fields fill the gaps
    PreferInbound,
}

impl MergePolicy {
    pub fn merge(self, inbound: Signals, outbound: Signals) -> Signals {
        let (mut primary, fallback) = match self {
            MergePolicy::PreferOutbound => (outbound, inbound),
            MergePolicy::PreferInbound => (inbound, outbound),
        };
        primary.fill_from(fallback);
        primary
    }
}
