//! Per-file quality metrics.
//!
//! Reads each walked file (skipping oversize ones), counts lines,
//! decision points and TODO markers, and derives a complexity score.
//! Files are processed in parallel and merged back in walk order.

use crate::config::AnalyzeConfig;
use crate::models::{FileMetrics, FileRecord, Issue, IssueCategory, Severity};
use crate::parsers::language_for_extension;
use rayon::prelude::*;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use tracing::info;

const LARGE_FILE_LINES: usize = 300;
const HIGH_COMPLEXITY_SCORE: f64 = 35.0;

fn decision_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:if|else if|for|while|case|catch|throw|function|class|=>|switch)\b")
            .expect("valid decision-point regex")
    })
}

fn todo_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:TODO|FIXME|HACK|XXX)\b").expect("valid todo regex"))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Line count with `split(/\r?\n/)` semantics: an empty file has one
/// line and a trailing newline contributes a final empty line.
fn count_lines(content: &str) -> usize {
    content.bytes().filter(|&b| b == b'\n').count() + 1
}

pub struct MetricsOutcome {
    pub files: BTreeMap<String, FileMetrics>,
    pub issues: Vec<Issue>,
}

fn metric_issue(severity: Severity, path: &str, issue_type: &str, message: String) -> Issue {
    Issue {
        category: IssueCategory::Metric,
        severity,
        path: path.to_string(),
        message,
        issue_type: Some(issue_type.to_string()),
        symbol_id: None,
        line: None,
    }
}

fn analyze_file(root: &Path, file: &FileRecord, cfg: &AnalyzeConfig) -> (FileMetrics, Vec<Issue>) {
    let language = language_for_extension(&file.ext).map(String::from);
    let mut issues = Vec::new();

    if file.size > cfg.metrics_max_file_size {
        issues.push(metric_issue(
            Severity::Info,
            &file.path,
            "file-too-large",
            format!(
                "Skipped metrics for {} ({} KB exceeds the {} KB limit)",
                file.path,
                file.size / 1024,
                cfg.metrics_max_file_size / 1024
            ),
        ));
        return (
            FileMetrics {
                language,
                size: file.size,
                line_count: None,
                complexity_score: None,
                todo_count: 0,
                skipped: true,
            },
            issues,
        );
    }

    let content = match std::fs::read_to_string(root.join(&file.path)) {
        Ok(content) => content,
        Err(e) => {
            issues.push(metric_issue(
                Severity::Warning,
                &file.path,
                "file-read-error",
                format!("Could not read {}: {}", file.path, e),
            ));
            return (
                FileMetrics {
                    language,
                    size: file.size,
                    line_count: None,
                    complexity_score: None,
                    todo_count: 0,
                    skipped: true,
                },
                issues,
            );
        }
    };

    let line_count = count_lines(&content);
    let decision_points = decision_re().find_iter(&content).count();
    let todo_count = todo_re().find_iter(&content).count();
    let complexity_score = if line_count > 0 {
        Some(round2(decision_points as f64 / line_count as f64 * 100.0))
    } else {
        None
    };

    if line_count > LARGE_FILE_LINES {
        issues.push(metric_issue(
            Severity::Warning,
            &file.path,
            "large-file",
            format!("{} has {} lines (threshold: {})", file.path, line_count, LARGE_FILE_LINES),
        ));
    }
    if let Some(score) = complexity_score {
        if score > HIGH_COMPLEXITY_SCORE {
            issues.push(metric_issue(
                Severity::Warning,
                &file.path,
                "high-complexity",
                format!("{} has a complexity score of {:.2}", file.path, score),
            ));
        }
    }
    if todo_count > 0 {
        issues.push(metric_issue(
            Severity::Info,
            &file.path,
            "todo-comments",
            format!("{} contains {} TODO/FIXME markers", file.path, todo_count),
        ));
    }

    (
        FileMetrics {
            language,
            size: file.size,
            line_count: Some(line_count),
            complexity_score,
            todo_count,
            skipped: false,
        },
        issues,
    )
}

/// Compute metrics for every walked file.
pub fn compute_metrics(root: &Path, files: &[FileRecord], cfg: &AnalyzeConfig) -> MetricsOutcome {
    let per_file: Vec<(String, FileMetrics, Vec<Issue>)> = files
        .par_iter()
        .map(|file| {
            let (metrics, issues) = analyze_file(root, file, cfg);
            (file.path.clone(), metrics, issues)
        })
        .collect();

    let mut outcome = MetricsOutcome {
        files: BTreeMap::new(),
        issues: Vec::new(),
    };
    for (path, metrics, issues) in per_file {
        outcome.files.insert(path, metrics);
        outcome.issues.extend(issues);
    }

    info!(
        "Computed metrics for {} files ({} issues)",
        outcome.files.len(),
        outcome.issues.len()
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, size: u64) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            name: path.rsplit('/').next().unwrap().to_string(),
            ext: path.rsplit('.').next().unwrap_or("").to_string(),
            size,
            mtime: 0,
            depth: 1,
            is_symbolic_link: false,
        }
    }

    #[test]
    fn test_count_lines_split_semantics() {
        assert_eq!(count_lines(""), 1);
        assert_eq!(count_lines("one"), 1);
        assert_eq!(count_lines("one\ntwo"), 2);
        assert_eq!(count_lines("one\ntwo\n"), 3);
        assert_eq!(count_lines("one\r\ntwo"), 2);
    }

    #[test]
    fn test_decision_points_and_todos() {
        let dir = tempfile::tempdir().unwrap();
        let content = "if (a) { while (b) { } } // TODO: simplify\nclass X {}\n";
        std::fs::write(dir.path().join("a.js"), content).unwrap();

        let file = record("a.js", content.len() as u64);
        let outcome = compute_metrics(dir.path(), &[file], &AnalyzeConfig::default());
        let metrics = outcome.files.get("a.js").unwrap();
        assert_eq!(metrics.line_count, Some(3));
        assert_eq!(metrics.todo_count, 1);
        assert!(metrics.complexity_score.unwrap() > 0.0);
        assert!(outcome
            .issues
            .iter()
            .any(|i| i.issue_type.as_deref() == Some("todo-comments")));
    }

    #[test]
    fn test_oversize_file_is_skipped_with_info_issue() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("big.js"), "x").unwrap();

        let mut cfg = AnalyzeConfig::default();
        cfg.metrics_max_file_size = 0;
        let outcome = compute_metrics(dir.path(), &[record("big.js", 1)], &cfg);

        let metrics = outcome.files.get("big.js").unwrap();
        assert!(metrics.skipped);
        assert_eq!(metrics.line_count, None);
        assert!(outcome
            .issues
            .iter()
            .any(|i| i.issue_type.as_deref() == Some("file-too-large")
                && i.severity == Severity::Info));
    }

    #[test]
    fn test_exact_limit_is_processed() {
        let dir = tempfile::tempdir().unwrap();
        let content = "abcd";
        std::fs::write(dir.path().join("edge.js"), content).unwrap();

        let mut cfg = AnalyzeConfig::default();
        cfg.metrics_max_file_size = content.len() as u64;
        let outcome = compute_metrics(dir.path(), &[record("edge.js", content.len() as u64)], &cfg);
        assert!(!outcome.files.get("edge.js").unwrap().skipped);
    }

    #[test]
    fn test_missing_file_reports_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = compute_metrics(dir.path(), &[record("gone.js", 10)], &AnalyzeConfig::default());
        assert!(outcome
            .issues
            .iter()
            .any(|i| i.issue_type.as_deref() == Some("file-read-error")
                && i.severity == Severity::Warning));
    }

    #[test]
    fn test_large_file_issue() {
        let dir = tempfile::tempdir().unwrap();
        let content = "let x = 1;\n".repeat(301);
        std::fs::write(dir.path().join("long.js"), &content).unwrap();

        let outcome = compute_metrics(
            dir.path(),
            &[record("long.js", content.len() as u64)],
            &AnalyzeConfig::default(),
        );
        assert!(outcome
            .issues
            .iter()
            .any(|i| i.issue_type.as_deref() == Some("large-file")
                && i.severity == Severity::Warning));
    }
}
