//! Contract validation for rendered money-dashboard output.
//!
//! The pinned gist preview shows exactly five dense lines; explanations
//! follow after one blank line. Any output — deterministic or
//! model-rewritten — must satisfy the same contract before it is
//! published.

use crate::width::visual_width;

/// Maximum visual width of a dashboard line.
pub const MAX_LINE_WIDTH: usize = 43;

/// Number of dashboard lines before the blank separator.
pub const DASHBOARD_LINES: usize = 5;

/// Accepted leading markers per dashboard line (1-indexed).
const LINE_MARKERS: [&[&str]; DASHBOARD_LINES] = [
    &["🟢", "🟡", "🔴"],
    &["💸"],
    &["📋"],
    &["⚖"],
    &["💡"],
];

/// Validate dashboard output against the width/line-count/marker contract.
///
/// Returns a list of human-readable violations; an empty list means the
/// output is valid. Each error names the specific violation so it can be
/// fed back to the reformatting model verbatim.
pub fn validate(output: &str) -> Vec<String> {
    let mut errors = Vec::new();
    let lines: Vec<&str> = output.split('\n').collect();

    // Dashboard lines are everything before the first blank line.
    let mut dashboard = Vec::new();
    let mut blank_idx = None;
    for (i, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            blank_idx = Some(i);
            break;
        }
        dashboard.push(*line);
    }

    if dashboard.len() != DASHBOARD_LINES {
        errors.push(format!(
            "Expected {} dashboard lines, got {}",
            DASHBOARD_LINES,
            dashboard.len()
        ));
    }

    for (i, line) in dashboard.iter().enumerate() {
        let w = visual_width(line);
        if w > MAX_LINE_WIDTH {
            errors.push(format!(
                "Line {} is {} chars wide (max {}): '{}'",
                i + 1,
                w,
                MAX_LINE_WIDTH,
                line
            ));
        }
    }

    for (idx, markers) in LINE_MARKERS.iter().enumerate() {
        if let Some(line) = dashboard.get(idx) {
            if !markers.iter().any(|m| line.starts_with(m)) {
                errors.push(format!(
                    "Line {} must start with one of {:?}",
                    idx + 1,
                    markers
                ));
            }
        }
    }

    if blank_idx.is_none() {
        errors.push("Missing blank line between dashboard and explanations".to_string());
    }

    errors
}
