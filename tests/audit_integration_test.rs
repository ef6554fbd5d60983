//! Audit analyzer integration tests over on-disk trace logs

mod common;

use serde_json::json;
use std::fs;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use tracebridge::audit::{analyze, CheckStatus, Evidence};
use tracebridge::config::AuditConfig;
use tracebridge::error::TraceError;

use common::{passing_events, write_log};

#[test]
fn test_complete_log_passes_every_check() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir.path().join("trace.ndjson"), &passing_events());

    let report = analyze(&log, &AuditConfig::default()).unwrap();

    assert!(report.passed());
    assert_eq!(report.run_id(), Some("verify-run-1"));
    assert_eq!(report.log_path(), fs::canonicalize(&log).unwrap());

    let summary = report.summary();
    assert_eq!(summary.total_checks, 5);
    assert_eq!(summary.passed, 5);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.event_count, 17);
    assert_eq!(summary.parse_errors, 0);

    for check in report.checks() {
        assert_eq!(check.status(), CheckStatus::Pass, "{}", check.id());
        assert!(check.missing_signals().is_empty());
        assert_eq!(check.matched_signals(), check.required_signals());
    }
}

#[test]
fn test_schema_version_mismatch_fails_contract() {
    let dir = TempDir::new().unwrap();
    let mut events = passing_events();
    events[0].insert("schemaVersion".into(), json!("0.9"));
    let log = write_log(&dir.path().join("trace.ndjson"), &events);

    let report = analyze(&log, &AuditConfig::default()).unwrap();

    assert!(!report.passed());
    let contract = report.check("schema-contract").unwrap();
    assert_eq!(contract.status(), CheckStatus::Fail);
    assert_eq!(contract.missing_signals(), ["schemaVersion:1.0"]);
    assert_eq!(report.summary().failed, 1);
}

#[test]
fn test_missing_thread_method_fails_thread_lifecycle() {
    let dir = TempDir::new().unwrap();
    let events: Vec<_> = passing_events()
        .into_iter()
        .filter(|event| event["method"] != json!("thread/archive"))
        .collect();
    let log = write_log(&dir.path().join("trace.ndjson"), &events);

    let report = analyze(&log, &AuditConfig::default()).unwrap();
    let thread = report.check("thread-lifecycle").unwrap();

    assert_eq!(thread.status(), CheckStatus::Fail);
    assert_eq!(thread.missing_signals(), ["method:thread/archive"]);
    assert_eq!(
        report.check("turn-lifecycle").unwrap().status(),
        CheckStatus::Pass
    );
}

#[test]
fn test_approval_requires_response_leg() {
    let dir = TempDir::new().unwrap();
    let events: Vec<_> = passing_events()
        .into_iter()
        .filter(|event| event["direction"] != json!("handle.out"))
        .collect();
    let log = write_log(&dir.path().join("trace.ndjson"), &events);

    let report = analyze(&log, &AuditConfig::default()).unwrap();
    let approval = report.check("approval-lifecycle").unwrap();

    assert_eq!(approval.status(), CheckStatus::Fail);
    assert_eq!(approval.missing_signals(), ["response:approval"]);
}

#[test]
fn test_approval_response_from_mcp_envelope() {
    let dir = TempDir::new().unwrap();
    let mut events = passing_events();
    // Turn the reply leg into a plain mcp-response carrying the approval
    events[12].insert("direction".into(), json!("push.out"));
    events[12].insert("method".into(), json!(null));
    events[12].insert(
        "rawPreview".into(),
        json!("{\"method\":\"applyPatchApproval\",\"decision\":\"approved\"}"),
    );
    let log = write_log(&dir.path().join("trace.ndjson"), &events);

    let report = analyze(&log, &AuditConfig::default()).unwrap();
    assert_eq!(
        report.check("approval-lifecycle").unwrap().status(),
        CheckStatus::Pass
    );
}

#[test]
fn test_mcp_auth_needs_both_outcomes() {
    let dir = TempDir::new().unwrap();
    let events: Vec<_> = passing_events()
        .into_iter()
        .filter(|event| event["requestId"] != json!("m4"))
        .collect();
    let log = write_log(&dir.path().join("trace.ndjson"), &events);

    let report = analyze(&log, &AuditConfig::default()).unwrap();
    let auth = report.check("mcp-auth-status").unwrap();

    // "401 Unauthorized" also reads as "authorized"
    assert_eq!(auth.status(), CheckStatus::Pass);

    let events: Vec<_> = passing_events()
        .into_iter()
        .filter(|event| event["requestId"] != json!("m3"))
        .collect();
    let log = write_log(&dir.path().join("trace.ndjson"), &events);
    let report = analyze(&log, &AuditConfig::default()).unwrap();
    let auth = report.check("mcp-auth-status").unwrap();
    assert_eq!(auth.missing_signals(), ["token:mcp-auth-unauthorized"]);
}

#[test]
fn test_parse_errors_are_counted_not_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trace.ndjson");
    let mut contents = common::to_ndjson(&passing_events());
    contents.push_str("{not json\n\n[1,2]\n");
    fs::write(&path, contents).unwrap();

    let report = analyze(&path, &AuditConfig::default()).unwrap();

    assert!(report.passed());
    assert_eq!(report.summary().event_count, 17);
    assert_eq!(report.summary().parse_errors, 2);

    let contract = report.check("schema-contract").unwrap();
    let parse_evidence = contract
        .evidence()
        .iter()
        .find(|e| e.signal() == "parse-errors")
        .unwrap();
    match parse_evidence {
        Evidence::Details { details, .. } => assert_eq!(details.len(), 2),
        other => panic!("unexpected evidence {other:?}"),
    }
}

#[test]
fn test_evidence_points_at_log_lines() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir.path().join("trace.ndjson"), &passing_events());

    let report = analyze(&log, &AuditConfig::default()).unwrap();
    let thread = report.check("thread-lifecycle").unwrap();
    let first = &thread.evidence()[0];
    assert_eq!(first.signal(), "method:thread/start");
    match first {
        Evidence::Lines { lines, .. } => {
            assert_eq!(lines[0].line, 1);
            assert_eq!(lines[0].method, json!("thread/start"));
        }
        other => panic!("unexpected evidence {other:?}"),
    }
}

#[test]
fn test_directory_resolves_to_newest_log() {
    let dir = TempDir::new().unwrap();
    let mut stale = passing_events();
    stale[0].insert("schemaVersion".into(), json!("0.9"));
    let old = write_log(&dir.path().join("trace-old.ndjson"), &stale);
    let new = write_log(&dir.path().join("trace-new.ndjson"), &passing_events());
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let an_hour_ago = SystemTime::now() - Duration::from_secs(3600);
    fs::File::options()
        .write(true)
        .open(&old)
        .unwrap()
        .set_modified(an_hour_ago)
        .unwrap();

    let report = analyze(dir.path(), &AuditConfig::default()).unwrap();
    assert_eq!(report.log_path(), fs::canonicalize(&new).unwrap());
    assert!(report.passed());
}

#[test]
fn test_fatal_inputs() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("absent.ndjson");
    assert!(matches!(
        analyze(&missing, &AuditConfig::default()),
        Err(TraceError::LogPathNotFound(_))
    ));

    assert!(matches!(
        analyze(dir.path(), &AuditConfig::default()),
        Err(TraceError::NoLogFiles { .. })
    ));

    let empty = dir.path().join("empty.ndjson");
    fs::write(&empty, "\n\n").unwrap();
    let err = analyze(&empty, &AuditConfig::default()).unwrap_err();
    assert!(err.to_string().starts_with("No events parsed from"));
}

#[test]
fn test_json_report_layout() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir.path().join("trace.ndjson"), &passing_events());
    let report = analyze(&log, &AuditConfig::default()).unwrap();

    let value: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
    assert_eq!(value["schemaVersion"], "1.0");
    assert_eq!(value["runId"], "verify-run-1");
    assert_eq!(value["summary"]["totalChecks"], 5);
    assert_eq!(value["summary"]["status"], "pass");
    assert_eq!(value["checks"][0]["id"], "schema-contract");
    for key in ["requiredSignals", "matchedSignals", "missingSignals", "evidence"] {
        assert!(value["checks"][1].get(key).is_some(), "missing {key}");
    }
}

#[test]
fn test_namespaced_host_directions_pass() {
    let dir = TempDir::new().unwrap();
    let mut events = passing_events();
    for event in &mut events {
        let direction = event["direction"].as_str().unwrap().to_string();
        event.insert("direction".into(), json!(format!("ipcMain.{direction}")));
    }
    // Only the reply-leg rule can produce the approval response
    events[12].insert("type".into(), json!(null));
    let log = write_log(&dir.path().join("trace.ndjson"), &events);

    let report = analyze(&log, &AuditConfig::default()).unwrap();
    let approval = report.check("approval-lifecycle").unwrap();
    assert_eq!(approval.status(), CheckStatus::Pass);
    assert!(report.passed());
}
