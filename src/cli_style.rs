/*!
 * tracebridge CLI style system
 *
 * Rendering for audit reports, shape catalogs and flow timelines. Colors come from
 * `console`, which drops them automatically when stdout is not a terminal.
 */

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use console::{style, StyledObject};
use std::fmt::Write as _;

use crate::audit::{AuditReport, CheckStatus};
use crate::shapes::{FlowTimeline, ShapeCatalog};

// ============================================================================
// THEME COLORS
// ============================================================================

pub struct Theme;

impl Theme {
    pub fn success<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).green()
    }

    pub fn warning<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).yellow()
    }

    pub fn error<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).red()
    }

    /// Header style (bold cyan)
    pub fn header<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan().bold()
    }
}

// ============================================================================
// AUDIT REPORT
// ============================================================================

fn status_tag(status: CheckStatus) -> String {
    let tag = format!("[{}]", status);
    match status {
        CheckStatus::Pass => Theme::success(tag).to_string(),
        CheckStatus::Fail => Theme::error(tag).bold().to_string(),
    }
}

fn join_or_none(signals: &[String]) -> String {
    if signals.is_empty() {
        "(none)".to_string()
    } else {
        signals.join(", ")
    }
}

/// Human-readable audit report
pub fn render_audit_report(report: &AuditReport) -> String {
    let summary = report.summary();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}",
        Theme::header(format!("Audit report for {}", report.log_path().display()))
    );
    let _ = writeln!(out, "Run ID: {}", report.run_id().unwrap_or("unknown"));
    let _ = writeln!(
        out,
        "Checks: {}/{} passed ({} failed)",
        summary.passed, summary.total_checks, summary.failed
    );
    let _ = writeln!(out, "Events parsed: {}", summary.event_count);
    if summary.parse_errors > 0 {
        let _ = writeln!(
            out,
            "{}",
            Theme::warning(format!("Parse errors: {}", summary.parse_errors))
        );
    }
    out.push('\n');

    for check in report.checks() {
        let _ = writeln!(out, "{} {}", status_tag(check.status()), check.id());
        let _ = writeln!(out, "  required: {}", check.required_signals().join(", "));
        let _ = writeln!(out, "  matched: {}", join_or_none(check.matched_signals()));
        if !check.missing_signals().is_empty() {
            let _ = writeln!(
                out,
                "  missing: {}",
                Theme::error(check.missing_signals().join(", "))
            );
        }
        out.push('\n');
    }

    out
}

// ============================================================================
// TABLES
// ============================================================================

/// Create a styled data table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).fg(Color::Cyan).add_attribute(Attribute::Bold)
}

/// One row per shape group
pub fn shape_table(catalog: &ShapeCatalog) -> Table {
    let mut table = create_table();
    table.set_header(vec![
        header_cell("Direction"),
        header_cell("Channel"),
        header_cell("Method"),
        header_cell("Type"),
        header_cell("Count"),
        header_cell("Preview shape"),
    ]);

    for entry in &catalog.schema_entries {
        let mut parts = entry.key.splitn(4, '|');
        let mut next = || parts.next().unwrap_or("unknown").to_string();
        let (direction, channel, method, kind) = (next(), next(), next(), next());
        let shape = entry
            .raw_preview_shape
            .as_ref()
            .map(|shape| shape.to_string())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(direction),
            Cell::new(channel),
            Cell::new(method),
            Cell::new(kind),
            Cell::new(entry.count).fg(Color::White).add_attribute(Attribute::Bold),
            Cell::new(shape),
        ]);
    }

    table
}

/// Human-readable shape catalog
pub fn render_shape_catalog(catalog: &ShapeCatalog) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        Theme::header(format!("Runtime shapes for {}", catalog.source.display()))
    );
    let _ = writeln!(out, "Events: {}", catalog.event_count);
    let _ = writeln!(out, "Groups: {}", catalog.schema_entries.len());
    let _ = writeln!(
        out,
        "Channels: {}",
        if catalog.channels.is_empty() {
            "(none)".to_string()
        } else {
            catalog.channels.join(", ")
        }
    );
    out.push('\n');
    let _ = writeln!(out, "{}", shape_table(catalog));
    out
}

/// One row per flow step, in log order
pub fn flow_table(timeline: &FlowTimeline) -> Table {
    let mut table = create_table();
    table.set_header(vec![
        header_cell("Line"),
        header_cell("Timestamp"),
        header_cell("Direction"),
        header_cell("Channel"),
        header_cell("Method"),
        header_cell("Type"),
        header_cell("Status"),
    ]);

    let or_dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    for step in &timeline.steps {
        let status = match step.status.as_deref() {
            Some("error") => Cell::new("error").fg(Color::Red),
            Some(other) => Cell::new(other),
            None => Cell::new("-"),
        };
        table.add_row(vec![
            Cell::new(step.line),
            Cell::new(or_dash(&step.ts)),
            Cell::new(or_dash(&step.direction)),
            Cell::new(or_dash(&step.channel)),
            Cell::new(&step.method),
            Cell::new(or_dash(&step.kind)),
            status,
        ]);
    }

    table
}

/// Human-readable flow timeline
pub fn render_flow_timeline(timeline: &FlowTimeline) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        Theme::header(format!("{} in {}", timeline.title, timeline.source.display()))
    );
    let shown = timeline.steps.len();
    if shown < timeline.total_matches {
        let _ = writeln!(
            out,
            "{}",
            Theme::warning(format!(
                "Events: {} (first {} shown)",
                timeline.total_matches, shown
            ))
        );
    } else {
        let _ = writeln!(out, "Events: {}", shown);
    }

    if shown > 0 {
        out.push('\n');
        let _ = writeln!(out, "{}", flow_table(timeline));
    }
    out
}

/// Print a styled error message to stderr
pub fn print_error(message: &str) {
    eprintln!("{} {}", Theme::error("Error:").bold(), message);
}

pub fn print_warning(message: &str) {
    eprintln!("{}", Theme::warning(message));
}
