//! Report rendering for the terminal.

use anyhow::Result;
use deconflict_core::{DetectionReport, DetectionStatus};
use std::fmt::Write;

/// Exit code for a run that found conflicts.
pub const EXIT_CONFLICT: i32 = 2;

pub fn render_text(report: &DetectionReport) -> String {
    let mut out = String::new();
    let status = match report.status {
        DetectionStatus::Clear => "clear",
        DetectionStatus::Conflict => "conflict detected",
    };
    let _ = writeln!(out, "Verification Status: {}", status);

    if report.conflicts.is_empty() {
        let _ = writeln!(out, "No conflicts detected.");
        return out;
    }

    let pairs = report.conflicting_pairs();
    let _ = writeln!(
        out,
        "{} conflict(s) across {} drone pair(s):",
        report.conflicts.len(),
        pairs.len()
    );
    for (a, b) in &pairs {
        let count = report
            .conflicts
            .iter()
            .filter(|c| c.involves(a) && c.involves(b))
            .count();
        let _ = writeln!(out, "  {} <-> {}: {} point(s)", a, b, count);
    }
    let _ = writeln!(out, "Conflict Details:");
    for conflict in &report.conflicts {
        let _ = writeln!(out, "  - {}", conflict);
    }
    out
}

pub fn render_json(report: &DetectionReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn exit_code(report: &DetectionReport) -> i32 {
    if report.is_clear() {
        0
    } else {
        EXIT_CONFLICT
    }
}
