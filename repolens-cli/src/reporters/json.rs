//! JSON reporter
//!
//! Outputs the full analysis report as pretty-printed JSON. Useful for
//! machine consumption, piping to jq, or the report viewer.

use crate::models::Report;
use anyhow::Result;

/// Render the report as JSON
pub fn render(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render the report as compact JSON (single line)
pub fn render_compact(report: &Report) -> Result<String> {
    Ok(serde_json::to_string(report)?)
}
