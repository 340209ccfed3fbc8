//! Narrative synthesis.
//!
//! Turns the assembled report data into prose: an overview line, key
//! facts, hotspots, recommended actions and formatted clone pairs.
//! Every list tolerates missing data and may come out empty.

use crate::models::{
    CloneDetail, CloneEntry, DependencyGraph, DependencyInsights, Issue, MetricsReport, Narrative,
    NarrativeMetrics, Severity, StructureGraph, Summary, Symbol,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;

const TOP_HOTSPOTS: usize = 3;
const MAX_CLONE_LINES: usize = 20;
const COMPLEXITY_HOTSPOT: f64 = 35.0;
const LONG_FILE_LINES: usize = 400;
const HEAVY_FILE_BYTES: u64 = 200 * 1024;

fn kb(bytes: u64) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

fn overview(summary: &Summary) -> String {
    if summary.totals.files == 0 {
        return "No notable architectural facts detected.".to_string();
    }
    let mut text = format!(
        "Analyzed {} files across {} directories in {} ms.",
        summary.totals.files, summary.totals.directories, summary.totals.walk_duration_ms
    );
    if let Some(dominant) = summary.languages.first() {
        text.push_str(&format!(
            " Dominant language: {} ({}% of files).",
            dominant.language,
            percent(dominant.files, summary.totals.files)
        ));
    }
    if summary.totals.truncated {
        text.push_str(" Traversal stopped early at the configured entry limit.");
    }
    text
}

fn key_facts(
    summary: &Summary,
    structure: &StructureGraph,
    insights: &DependencyInsights,
    issues: &[Issue],
) -> Vec<String> {
    let mut facts = Vec::new();

    if !summary.languages.is_empty() {
        let mix: Vec<String> = summary
            .languages
            .iter()
            .take(3)
            .map(|l| {
                format!(
                    "{} {}% ({} files)",
                    l.language,
                    percent(l.files, summary.totals.files),
                    l.files
                )
            })
            .collect();
        facts.push(format!("Language mix: {}", mix.join(", ")));
    }

    if summary.totals.files > 0 {
        facts.push(format!(
            "Structure: {} packages, {} files, {} symbols, {} edges",
            structure.totals.packages,
            structure.totals.files,
            structure.totals.symbols,
            structure.totals.edges
        ));
    }

    if !summary.largest_files.is_empty() {
        let largest: Vec<String> = summary
            .largest_files
            .iter()
            .take(3)
            .map(|f| format!("{} ({})", f.path, kb(f.size)))
            .collect();
        facts.push(format!("Largest files: {}", largest.join(", ")));
    }

    if !issues.is_empty() {
        let errors = issues.iter().filter(|i| i.severity == Severity::Error).count();
        let warnings = issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count();
        let infos = issues.iter().filter(|i| i.severity == Severity::Info).count();
        facts.push(format!(
            "Issues: {errors} errors, {warnings} warnings, {infos} info"
        ));
    }

    if !insights.external_packages.is_empty() {
        let top: Vec<String> = insights
            .external_packages
            .iter()
            .take(3)
            .map(|p| format!("{} ({})", p.name, p.count))
            .collect();
        facts.push(format!("Top external packages: {}", top.join(", ")));
    }

    facts
}

fn hotspots(
    metrics: &MetricsReport,
    insights: &DependencyInsights,
    dependencies: &DependencyGraph,
) -> Vec<String> {
    let mut spots = Vec::new();

    let mut complex: Vec<(&String, f64)> = metrics
        .files
        .iter()
        .filter_map(|(path, m)| {
            m.complexity_score
                .filter(|&s| s >= COMPLEXITY_HOTSPOT)
                .map(|s| (path, s))
        })
        .collect();
    complex.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    for (path, score) in complex.into_iter().take(TOP_HOTSPOTS) {
        spots.push(format!("High complexity: {path} (score {score})"));
    }

    let mut long: Vec<(&String, usize)> = metrics
        .files
        .iter()
        .filter_map(|(path, m)| {
            m.line_count
                .filter(|&n| n >= LONG_FILE_LINES)
                .map(|n| (path, n))
        })
        .collect();
    long.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    for (path, lines) in long.into_iter().take(TOP_HOTSPOTS) {
        spots.push(format!("Long file: {path} ({lines} lines)"));
    }

    let mut heavy: Vec<(&String, u64)> = metrics
        .files
        .iter()
        .filter(|(_, m)| m.size >= HEAVY_FILE_BYTES)
        .map(|(path, m)| (path, m.size))
        .collect();
    heavy.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    for (path, size) in heavy.into_iter().take(TOP_HOTSPOTS) {
        spots.push(format!("Heavy file: {path} ({})", kb(size)));
    }

    for entry in insights.fan_out.iter().take(TOP_HOTSPOTS) {
        spots.push(format!(
            "Fan-out hub: {} imports {} local modules",
            entry.path, entry.count
        ));
    }
    for entry in insights.fan_in.iter().take(TOP_HOTSPOTS) {
        spots.push(format!(
            "Fan-in hub: {} imported by {} local modules",
            entry.path, entry.count
        ));
    }

    if !dependencies.unresolved.is_empty() {
        spots.push(format!("{} unresolved imports", dependencies.unresolved.len()));
    }

    let todo_total: usize = metrics.files.values().map(|m| m.todo_count).sum();
    if todo_total > 0 {
        spots.push(format!("{todo_total} TODO/FIXME markers"));
    }

    spots
}

fn actions(
    metrics: &MetricsReport,
    dependencies: &DependencyGraph,
    clone_pairs: usize,
) -> Vec<String> {
    let mut actions = Vec::new();

    let worst_complexity = metrics
        .files
        .iter()
        .filter_map(|(path, m)| m.complexity_score.map(|s| (path, s)))
        .filter(|(_, s)| *s >= COMPLEXITY_HOTSPOT)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    if let Some((path, score)) = worst_complexity {
        actions.push(format!(
            "Refactor {path} to bring its complexity score ({score}) down."
        ));
    }

    let longest = metrics
        .files
        .iter()
        .filter_map(|(path, m)| m.line_count.map(|n| (path, n)))
        .filter(|(_, n)| *n >= LONG_FILE_LINES)
        .max_by_key(|(_, n)| *n);
    if let Some((path, lines)) = longest {
        actions.push(format!("Split {path} ({lines} lines) into smaller modules."));
    }

    if clone_pairs > 0 {
        actions.push(format!(
            "Consolidate {clone_pairs} near-duplicate function pairs."
        ));
    }

    if !dependencies.unresolved.is_empty() {
        actions.push(format!(
            "Fix {} unresolved imports.",
            dependencies.unresolved.len()
        ));
    }

    let todo_total: usize = metrics.files.values().map(|m| m.todo_count).sum();
    if todo_total > 0 {
        actions.push(format!("Triage {todo_total} TODO/FIXME markers."));
    }

    actions
}

fn clone_lines(
    clones: &BTreeMap<String, Vec<CloneEntry>>,
    symbols: &[Symbol],
) -> (Vec<String>, Vec<CloneDetail>, usize) {
    let by_id: FxHashMap<&str, &Symbol> = symbols.iter().map(|s| (s.id.as_str(), s)).collect();
    let mut seen_pairs: FxHashSet<(String, String)> = FxHashSet::default();
    let mut lines = Vec::new();
    let mut details = Vec::new();

    for (source_id, entries) in clones {
        for entry in entries {
            let key = if source_id < &entry.target_id {
                (source_id.clone(), entry.target_id.clone())
            } else {
                (entry.target_id.clone(), source_id.clone())
            };
            if !seen_pairs.insert(key) {
                continue;
            }

            let source = by_id.get(source_id.as_str());
            let target = by_id.get(entry.target_id.as_str());
            let source_name = source.map_or("?", |s| s.name.as_str());
            let source_path = source.map_or("?", |s| s.path.as_str());
            let target_name = target.map_or("?", |s| s.name.as_str());
            let pct = (entry.similarity * 100.0).round() as u32;

            if lines.len() < MAX_CLONE_LINES {
                lines.push(format!(
                    "{source_name} — {source_path} → {target_name} — {} ({pct}% similar) [{}-{}]",
                    entry.file_path, entry.start_line, entry.end_line
                ));
            }

            let (source_start, source_end) = source
                .map(|s| (s.start_line, s.end_line))
                .unwrap_or((0, 0));
            let (target_start, target_end) = target
                .map(|s| (s.start_line, s.end_line))
                .unwrap_or((entry.start_line, entry.end_line));
            details.push(CloneDetail {
                source_name: source_name.to_string(),
                source_path: source_path.to_string(),
                source_start_line: source_start,
                source_end_line: source_end,
                target_name: target_name.to_string(),
                target_path: entry.file_path.clone(),
                target_start_line: target_start,
                target_end_line: target_end,
                similarity: entry.similarity,
            });
        }
    }

    let pair_count = seen_pairs.len();
    (lines, details, pair_count)
}

fn digest(metrics: &MetricsReport) -> NarrativeMetrics {
    NarrativeMetrics {
        analyzed_files: metrics.files.values().filter(|m| !m.skipped).count(),
        skipped_files: metrics.files.values().filter(|m| m.skipped).count(),
        total_lines: metrics.files.values().filter_map(|m| m.line_count).sum(),
        todo_count: metrics.files.values().map(|m| m.todo_count).sum(),
    }
}

/// Produce the narrative section of the report.
pub fn synthesize(
    summary: &Summary,
    dependencies: &DependencyGraph,
    insights: &DependencyInsights,
    structure: &StructureGraph,
    clones: &BTreeMap<String, Vec<CloneEntry>>,
    metrics: &MetricsReport,
    issues: &[Issue],
) -> Narrative {
    let (clone_lines, clones_details, pair_count) = clone_lines(clones, &structure.symbols);
    Narrative {
        overview: overview(summary),
        key_facts: key_facts(summary, structure, insights, issues),
        hotspots: hotspots(metrics, insights, dependencies),
        actions: actions(metrics, dependencies, pair_count),
        clones: clone_lines,
        clones_details,
        metrics: digest(metrics),
    }
}
