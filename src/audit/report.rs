/*!
 * Audit report model
 *
 * A report is built once by [`super::analyze`] and is read-only afterwards;
 * every field is exposed through accessors only.
 */

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

use super::load::ParseIssue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
}

impl CheckStatus {
    pub fn from_missing(missing: &[String]) -> Self {
        if missing.is_empty() {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, CheckStatus::Pass)
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Pass => write!(f, "PASS"),
            CheckStatus::Fail => write!(f, "FAIL"),
        }
    }
}

/// One event line supporting a matched signal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceRow {
    pub line: usize,
    pub ts: Value,
    pub method: Value,
    #[serde(rename = "type")]
    pub kind: Value,
    pub status: Value,
}

/// A schema-contract finding
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContractDetail {
    /// Event carries the wrong (or no) schema version
    VersionMismatch { line: usize, found: Value },

    /// Event lacks required keys
    #[serde(rename_all = "camelCase")]
    MissingKeys {
        line: usize,
        missing_keys: Vec<String>,
    },

    /// Line could not be parsed as an event
    ParseError(ParseIssue),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Evidence {
    /// Lines that produced a matched signal
    Lines {
        signal: String,
        lines: Vec<EvidenceRow>,
    },
    /// Findings behind a schema-contract signal
    Details {
        signal: String,
        details: Vec<ContractDetail>,
    },
}

impl Evidence {
    pub fn signal(&self) -> &str {
        match self {
            Evidence::Lines { signal, .. } | Evidence::Details { signal, .. } => signal,
        }
    }
}

/// Result of one audit check
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditCheck {
    id: String,
    status: CheckStatus,
    required_signals: Vec<String>,
    matched_signals: Vec<String>,
    missing_signals: Vec<String>,
    evidence: Vec<Evidence>,
}

impl AuditCheck {
    /// Build a check; status is derived from `missing_signals`
    pub fn new(
        id: impl Into<String>,
        required_signals: Vec<String>,
        matched_signals: Vec<String>,
        missing_signals: Vec<String>,
        evidence: Vec<Evidence>,
    ) -> Self {
        Self {
            id: id.into(),
            status: CheckStatus::from_missing(&missing_signals),
            required_signals,
            matched_signals,
            missing_signals,
            evidence,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> CheckStatus {
        self.status
    }

    pub fn required_signals(&self) -> &[String] {
        &self.required_signals
    }

    pub fn matched_signals(&self) -> &[String] {
        &self.matched_signals
    }

    pub fn missing_signals(&self) -> &[String] {
        &self.missing_signals
    }

    pub fn evidence(&self) -> &[Evidence] {
        &self.evidence
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub total_checks: usize,
    pub passed: usize,
    pub failed: usize,
    pub status: CheckStatus,
    pub event_count: usize,
    pub parse_errors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    schema_version: String,
    run_id: Option<String>,
    log_path: PathBuf,
    summary: AuditSummary,
    checks: Vec<AuditCheck>,
}

impl AuditReport {
    pub fn new(
        schema_version: impl Into<String>,
        run_id: Option<String>,
        log_path: PathBuf,
        checks: Vec<AuditCheck>,
        event_count: usize,
        parse_errors: usize,
    ) -> Self {
        let passed = checks.iter().filter(|c| c.status.is_pass()).count();
        let failed = checks.len() - passed;
        let summary = AuditSummary {
            total_checks: checks.len(),
            passed,
            failed,
            status: if failed == 0 {
                CheckStatus::Pass
            } else {
                CheckStatus::Fail
            },
            event_count,
            parse_errors,
        };

        Self {
            schema_version: schema_version.into(),
            run_id,
            log_path,
            summary,
            checks,
        }
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn summary(&self) -> &AuditSummary {
        &self.summary
    }

    pub fn checks(&self) -> &[AuditCheck] {
        &self.checks
    }

    pub fn check(&self, id: &str) -> Option<&AuditCheck> {
        self.checks.iter().find(|c| c.id == id)
    }

    pub fn passed(&self) -> bool {
        self.summary.status.is_pass()
    }

    /// Pretty-printed JSON rendering
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(id: &str, missing: &[&str]) -> AuditCheck {
        AuditCheck::new(
            id,
            vec!["a".into(), "b".into()],
            vec![],
            missing.iter().map(|s| s.to_string()).collect(),
            vec![],
        )
    }

    #[test]
    fn test_status_follows_missing() {
        assert_eq!(check("x", &[]).status(), CheckStatus::Pass);
        assert_eq!(check("x", &["a"]).status(), CheckStatus::Fail);
    }

    #[test]
    fn test_summary_counts() {
        let report = AuditReport::new(
            "1.0",
            Some("run-1".into()),
            PathBuf::from("trace.ndjson"),
            vec![check("one", &[]), check("two", &["b"]), check("three", &[])],
            17,
            2,
        );
        let summary = report.summary();
        assert_eq!(summary.total_checks, 3);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.status, CheckStatus::Fail);
        assert!(!report.passed());
        assert_eq!(report.check("two").unwrap().missing_signals(), ["b"]);
    }

    #[test]
    fn test_json_shape() {
        let evidence = vec![
            Evidence::Lines {
                signal: "method:thread/start".into(),
                lines: vec![EvidenceRow {
                    line: 1,
                    ts: json!("2026-01-01T00:00:00Z"),
                    method: json!("thread/start"),
                    kind: Value::Null,
                    status: json!("ok"),
                }],
            },
            Evidence::Details {
                signal: "parse-errors".into(),
                details: vec![
                    ContractDetail::MissingKeys {
                        line: 2,
                        missing_keys: vec!["ts".into()],
                    },
                    ContractDetail::ParseError(ParseIssue {
                        line_no: 3,
                        reason: "bad".into(),
                    }),
                ],
            },
        ];
        let report = AuditReport::new(
            "1.0",
            None,
            PathBuf::from("trace.ndjson"),
            vec![AuditCheck::new("c", vec![], vec![], vec![], evidence)],
            1,
            1,
        );

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["schemaVersion"], "1.0");
        assert!(value["runId"].is_null());
        assert_eq!(value["logPath"], "trace.ndjson");
        assert_eq!(value["summary"]["totalChecks"], 1);
        assert_eq!(value["summary"]["status"], "pass");
        assert_eq!(value["summary"]["eventCount"], 1);
        assert_eq!(value["summary"]["parseErrors"], 1);

        let check = &value["checks"][0];
        assert_eq!(check["status"], "pass");
        assert_eq!(check["requiredSignals"], json!([]));
        assert_eq!(check["evidence"][0]["lines"][0]["type"], Value::Null);
        assert_eq!(check["evidence"][0]["lines"][0]["status"], "ok");
        assert_eq!(check["evidence"][1]["details"][0]["missingKeys"], json!(["ts"]));
        assert_eq!(check["evidence"][1]["details"][1]["lineNo"], 3);
    }
}
