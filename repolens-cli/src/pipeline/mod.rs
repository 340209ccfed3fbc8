//! Analysis pipeline.
//!
//! Orchestrates the full run:
//! 1. Walk the tree (bounded)
//! 2. Fold the file tree
//! 3. Per-file metrics
//! 4. Dependency extraction and resolution
//! 5. Structure graph with the AST pass
//! 6. Clone detection and smell detection
//! 7. Narrative synthesis
//!
//! Only an invalid root is fatal; every other failure degrades into a
//! warning or an issue and the report is still produced.

use crate::clones;
use crate::config::AnalyzeConfig;
use crate::deps;
use crate::detectors;
use crate::graph;
use crate::insights;
use crate::metrics;
use crate::models::{
    Issue, IssueCategory, LanguageStat, LargestFile, LongestFile, MetricsReport, Report, Severity,
    Summary, Totals, WalkResult, WarningType,
};
use crate::narrative;
use crate::tree;
use crate::walker;
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

/// Fatal errors: the analysis root itself is unusable.
#[derive(Debug, Error)]
pub enum RootError {
    #[error("path not found: {0}")]
    NotFound(PathBuf),
    #[error("not a directory: {0}")]
    NotDirectory(PathBuf),
}

fn walk_issues(walk: &WalkResult) -> Vec<Issue> {
    walk.warnings
        .iter()
        .map(|w| {
            let (issue_type, message) = match w.warning_type {
                WarningType::StatError => (
                    "stat-error",
                    format!("Could not stat {}: {}", w.path, w.error.as_deref().unwrap_or("")),
                ),
                WarningType::ReadError => (
                    "read-error",
                    format!("Could not list {}: {}", w.path, w.error.as_deref().unwrap_or("")),
                ),
                WarningType::LimitReached => (
                    "limit-reached",
                    format!("Traversal stopped at {} (entry limit reached)", w.path),
                ),
            };
            Issue {
                category: IssueCategory::Filesystem,
                severity: Severity::Warning,
                path: w.path.clone(),
                message,
                issue_type: Some(issue_type.to_string()),
                symbol_id: None,
                line: None,
            }
        })
        .collect()
}

fn build_summary(walk: &WalkResult, metrics: &MetricsReport, walk_duration_ms: u64) -> Summary {
    // Language aggregation over files with a recognized language.
    let mut by_language: BTreeMap<&str, LanguageStat> = BTreeMap::new();
    for file_metrics in metrics.files.values() {
        let Some(language) = file_metrics.language.as_deref() else {
            continue;
        };
        let stat = by_language.entry(language).or_insert_with(|| LanguageStat {
            language: language.to_string(),
            files: 0,
            lines: 0,
            bytes: 0,
        });
        stat.files += 1;
        stat.lines += file_metrics.line_count.unwrap_or(0);
        stat.bytes += file_metrics.size;
    }
    let mut languages: Vec<LanguageStat> = by_language.into_values().collect();
    languages.sort_by(|a, b| b.files.cmp(&a.files).then_with(|| a.language.cmp(&b.language)));

    let mut largest: Vec<LargestFile> = walk
        .files
        .iter()
        .map(|f| LargestFile {
            path: f.path.clone(),
            size: f.size,
            language: metrics
                .files
                .get(&f.path)
                .and_then(|m| m.language.clone()),
        })
        .collect();
    largest.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
    largest.truncate(5);

    let mut longest: Vec<LongestFile> = metrics
        .files
        .iter()
        .filter_map(|(path, m)| {
            m.line_count.map(|line_count| LongestFile {
                path: path.clone(),
                line_count,
            })
        })
        .collect();
    longest.sort_by(|a, b| b.line_count.cmp(&a.line_count).then_with(|| a.path.cmp(&b.path)));
    longest.truncate(5);

    Summary {
        totals: Totals {
            directories: walk.directories.len(),
            files: walk.files.len(),
            truncated: walk.truncated,
            walk_duration_ms,
        },
        languages,
        largest_files: largest,
        longest_files: longest,
        warnings_count: walk.warnings.len(),
    }
}

/// Analyze a project root and produce the full report.
pub fn analyze(root: &Path, cfg: &AnalyzeConfig) -> Result<Report> {
    let metadata = std::fs::metadata(root)
        .map_err(|_| RootError::NotFound(root.to_path_buf()))?;
    if !metadata.is_dir() {
        return Err(RootError::NotDirectory(root.to_path_buf()).into());
    }
    let root_path = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

    let walk_started = Instant::now();
    let walk = walker::walk(root, cfg);
    let walk_duration_ms = walk_started.elapsed().as_millis() as u64;
    info!(
        "Walked {} files, {} directories in {}ms (truncated: {})",
        walk.files.len(),
        walk.directories.len(),
        walk_duration_ms,
        walk.truncated
    );
    let mut issues = walk_issues(&walk);

    let file_tree = tree::build_tree(&walk.files, &walk.directories);

    let stage = Instant::now();
    let metrics_outcome = metrics::compute_metrics(root, &walk.files, cfg);
    debug!("Metrics stage took {}ms", stage.elapsed().as_millis());
    issues.extend(metrics_outcome.issues);
    let metrics_report = MetricsReport {
        files: metrics_outcome.files,
    };

    let stage = Instant::now();
    let (dependencies, dep_issues) = deps::build_dependency_graph(root, &walk.files, cfg);
    debug!("Dependency stage took {}ms", stage.elapsed().as_millis());
    issues.extend(dep_issues);

    let dependency_insights = insights::derive_insights(&dependencies);

    let stage = Instant::now();
    let mut structure_graph = graph::build_structure_graph(root, &walk.files, &dependencies, cfg);
    debug!("Structure stage took {}ms", stage.elapsed().as_millis());

    let stage = Instant::now();
    let clones = clones::detect_clones(&structure_graph.symbols, cfg);
    debug!("Clone stage took {}ms", stage.elapsed().as_millis());

    issues.extend(detectors::run_smell_detectors(&structure_graph.symbols));

    let summary = build_summary(&walk, &metrics_report, walk_duration_ms);
    let narrative = narrative::synthesize(
        &summary,
        &dependencies,
        &dependency_insights,
        &structure_graph,
        &clones,
        &metrics_report,
        &issues,
    );

    // Symbol text only feeds smells and clones; drop it before emission.
    for symbol in &mut structure_graph.symbols {
        symbol.text.clear();
    }

    Ok(Report {
        root_path: root_path.to_string_lossy().into_owned(),
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        summary,
        file_tree,
        dependencies,
        dependency_insights,
        structure_graph,
        clones,
        metrics: metrics_report,
        issues,
        narrative,
    })
}
