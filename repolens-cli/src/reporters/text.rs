//! Console text reporter.

use crate::models::{Report, Severity};
use anyhow::Result;
use console::style;
use std::fmt::Write;

const MAX_LISTED_ISSUES: usize = 20;

/// Render a human-readable summary of the report.
pub fn render(report: &Report) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "{}", style(&report.root_path).bold())?;
    writeln!(out, "{}", report.narrative.overview)?;
    writeln!(out)?;

    if !report.narrative.key_facts.is_empty() {
        writeln!(out, "{}", style("Key facts").cyan().bold())?;
        for fact in &report.narrative.key_facts {
            writeln!(out, "  • {fact}")?;
        }
        writeln!(out)?;
    }

    if !report.narrative.hotspots.is_empty() {
        writeln!(out, "{}", style("Hotspots").cyan().bold())?;
        for hotspot in &report.narrative.hotspots {
            writeln!(out, "  • {hotspot}")?;
        }
        writeln!(out)?;
    }

    if !report.narrative.clones.is_empty() {
        writeln!(out, "{}", style("Clones").cyan().bold())?;
        for line in &report.narrative.clones {
            writeln!(out, "  • {line}")?;
        }
        writeln!(out)?;
    }

    if !report.issues.is_empty() {
        let mut sorted: Vec<_> = report.issues.iter().collect();
        sorted.sort_by(|a, b| a.severity.cmp(&b.severity).then_with(|| a.path.cmp(&b.path)));

        writeln!(
            out,
            "{} ({} total)",
            style("Issues").cyan().bold(),
            sorted.len()
        )?;
        for issue in sorted.iter().take(MAX_LISTED_ISSUES) {
            let tag = match issue.severity {
                Severity::Error => style("error").red().bold(),
                Severity::Warning => style("warning").yellow(),
                Severity::Info => style("info").dim(),
            };
            writeln!(out, "  [{tag}] {}: {}", issue.path, issue.message)?;
        }
        if sorted.len() > MAX_LISTED_ISSUES {
            writeln!(out, "  … and {} more", sorted.len() - MAX_LISTED_ISSUES)?;
        }
        writeln!(out)?;
    }

    if !report.narrative.actions.is_empty() {
        writeln!(out, "{}", style("Suggested actions").cyan().bold())?;
        for action in &report.narrative.actions {
            writeln!(out, "  → {action}")?;
        }
    }

    Ok(out)
}
