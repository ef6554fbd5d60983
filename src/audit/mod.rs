/*!
 * Offline audit of a persisted trace log
 *
 * The analyzer reads only the NDJSON file. It shares no code with the
 * capture side; the key list and schema version below are its own copy of
 * the wire contract.
 *
 * # Example
 *
 * ```no_run
 * use std::path::Path;
 * use tracebridge::audit::analyze;
 * use tracebridge::config::AuditConfig;
 *
 * let report = analyze(Path::new("logs"), &AuditConfig::default()).unwrap();
 * for check in report.checks() {
 *     println!("{} {}", check.status(), check.id());
 * }
 * ```
 */

pub mod checks;
pub mod load;
pub mod observe;
pub mod report;

use serde_json::Value;
use std::path::Path;

use crate::config::AuditConfig;
use crate::error::{Result, TraceError};

pub use checks::{
    evaluate_schema_contract, evaluate_signal_check, CheckDefinition, LIFECYCLE_CHECKS,
};
pub use load::{load_events, resolve_log_path, LoadedLog, ParseIssue, ParsedEvent};
pub use observe::Observations;
pub use report::{
    AuditCheck, AuditReport, AuditSummary, CheckStatus, ContractDetail, Evidence, EvidenceRow,
};

/// Schema version of the audit report itself
pub const AUDIT_SCHEMA_VERSION: &str = "1.0";

/// Keys every trace event must carry
pub const REQUIRED_KEYS: &[&str] = &[
    "schemaVersion",
    "runId",
    "sessionId",
    "pid",
    "appFlavor",
    "ts",
    "direction",
    "channel",
    "method",
    "type",
    "threadId",
    "turnId",
    "requestId",
    "status",
    "rawPreview",
];

/// Protocol methods recognised inside raw previews
pub const KNOWN_METHODS: &[&str] = &[
    "thread/start",
    "thread/resume",
    "thread/list",
    "thread/read",
    "thread/archive",
    "thread/unarchive",
    "turn/start",
    "turn/interrupt",
    "turn/completed",
    "item/agentMessage/delta",
    "item/commandExecution/requestApproval",
    "item/fileChange/requestApproval",
    "getAuthStatus",
    "mcpServerStatus/list",
];

pub const APPROVAL_REQUEST_METHODS: &[&str] = &[
    "item/commandExecution/requestApproval",
    "item/fileChange/requestApproval",
];

/// Resolve, load and audit a trace log
pub fn analyze(log: &Path, config: &AuditConfig) -> Result<AuditReport> {
    let path = resolve_log_path(log, &config.log_extension)?;
    let loaded = load_events(&path)?;
    analyze_loaded(loaded, config)
}

/// Audit an already-loaded log
pub fn analyze_loaded(loaded: LoadedLog, config: &AuditConfig) -> Result<AuditReport> {
    if loaded.events.is_empty() {
        return Err(TraceError::NoEvents(loaded.path));
    }

    let observations = Observations::collect(&loaded.events, config.evidence_limit);
    tracing::debug!(tokens = observations.len(), "collected audit signals");

    let mut checks = Vec::with_capacity(LIFECYCLE_CHECKS.len() + 1);
    checks.push(evaluate_schema_contract(&loaded.events, &loaded.issues, config));
    checks.extend(
        LIFECYCLE_CHECKS
            .iter()
            .map(|definition| evaluate_signal_check(definition, &observations)),
    );

    for check in &checks {
        tracing::info!(check = check.id(), status = %check.status(), "audit check evaluated");
    }

    let run_id = loaded.events.first().and_then(|first| match first.event.get("runId") {
        Some(Value::String(id)) => Some(id.clone()),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    });

    Ok(AuditReport::new(
        AUDIT_SCHEMA_VERSION,
        run_id,
        loaded.path,
        checks,
        loaded.events.len(),
        loaded.issues.len(),
    ))
}
