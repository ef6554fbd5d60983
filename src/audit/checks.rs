/*!
 * Audit check evaluation
 */

use super::load::{ParseIssue, ParsedEvent};
use super::observe::{
    Observations, TOKEN_APPROVAL_RESPONSE, TOKEN_AUTH_AUTHORIZED, TOKEN_AUTH_UNAUTHORIZED,
};
use super::report::{AuditCheck, ContractDetail, Evidence};
use super::REQUIRED_KEYS;
use crate::config::AuditConfig;

pub const SCHEMA_CONTRACT_ID: &str = "schema-contract";
pub const REQUIRED_KEYS_SIGNAL: &str = "contract:required-keys";
pub const PARSE_ERRORS_SIGNAL: &str = "parse-errors";

/// A check that passes when every required token was observed
#[derive(Debug, Clone, Copy)]
pub struct CheckDefinition {
    pub id: &'static str,
    pub required: &'static [&'static str],
}

/// Protocol lifecycle checks, in report order after `schema-contract`
pub const LIFECYCLE_CHECKS: &[CheckDefinition] = &[
    CheckDefinition {
        id: "thread-lifecycle",
        required: &[
            "method:thread/start",
            "method:thread/resume",
            "method:thread/list",
            "method:thread/read",
            "method:thread/archive",
            "method:thread/unarchive",
        ],
    },
    CheckDefinition {
        id: "turn-lifecycle",
        required: &[
            "method:turn/start",
            "method:turn/interrupt",
            "method:turn/completed",
            "method:item/agentMessage/delta",
        ],
    },
    CheckDefinition {
        id: "approval-lifecycle",
        required: &[
            "method:item/commandExecution/requestApproval",
            "method:item/fileChange/requestApproval",
            TOKEN_APPROVAL_RESPONSE,
        ],
    },
    CheckDefinition {
        id: "mcp-auth-status",
        required: &[
            "method:getAuthStatus",
            "method:mcpServerStatus/list",
            TOKEN_AUTH_AUTHORIZED,
            TOKEN_AUTH_UNAUTHORIZED,
        ],
    },
];

pub fn evaluate_signal_check(
    definition: &CheckDefinition,
    observations: &Observations,
) -> AuditCheck {
    let (matched, missing): (Vec<&str>, Vec<&str>) = definition
        .required
        .iter()
        .copied()
        .partition(|signal| observations.contains(signal));

    let evidence = matched
        .iter()
        .map(|signal| Evidence::Lines {
            signal: signal.to_string(),
            lines: observations.evidence(signal).to_vec(),
        })
        .collect();

    AuditCheck::new(
        definition.id,
        to_strings(definition.required),
        to_strings(&matched),
        to_strings(&missing),
        evidence,
    )
}

/// Every event carries the expected schema version and every required key
pub fn evaluate_schema_contract(
    events: &[ParsedEvent],
    issues: &[ParseIssue],
    config: &AuditConfig,
) -> AuditCheck {
    let version_signal = format!("schemaVersion:{}", config.expected_schema_version);
    let mut version_mismatches = Vec::new();
    let mut missing_key_rows = Vec::new();

    for event in events {
        let found = event.field("schemaVersion");
        if found.as_str() != Some(config.expected_schema_version.as_str()) {
            version_mismatches.push(ContractDetail::VersionMismatch {
                line: event.line,
                found,
            });
        }

        let missing_keys: Vec<String> = REQUIRED_KEYS
            .iter()
            .filter(|key| !event.event.contains_key(**key))
            .map(|key| key.to_string())
            .collect();
        if !missing_keys.is_empty() {
            missing_key_rows.push(ContractDetail::MissingKeys {
                line: event.line,
                missing_keys,
            });
        }
    }

    let required = vec![version_signal.clone(), REQUIRED_KEYS_SIGNAL.to_string()];
    let mut matched = Vec::new();
    let mut missing = Vec::new();
    for (signal, violated) in [
        (&version_signal, !version_mismatches.is_empty()),
        (&required[1], !missing_key_rows.is_empty()),
    ] {
        if violated {
            missing.push(signal.clone());
        } else {
            matched.push(signal.clone());
        }
    }

    let limit = config.detail_limit;
    let parse_details = issues
        .iter()
        .take(limit)
        .cloned()
        .map(ContractDetail::ParseError)
        .collect();
    version_mismatches.truncate(limit);
    missing_key_rows.truncate(limit);

    let evidence = vec![
        Evidence::Details {
            signal: version_signal,
            details: version_mismatches,
        },
        Evidence::Details {
            signal: REQUIRED_KEYS_SIGNAL.to_string(),
            details: missing_key_rows,
        },
        Evidence::Details {
            signal: PARSE_ERRORS_SIGNAL.to_string(),
            details: parse_details,
        },
    ];

    AuditCheck::new(SCHEMA_CONTRACT_ID, required, matched, missing, evidence)
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
