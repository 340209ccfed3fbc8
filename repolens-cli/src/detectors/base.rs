//! Base detector trait and types.

use crate::models::{Issue, IssueCategory, Severity, Symbol};
use anyhow::Result;

/// Read-only view of the analysis the smell detectors inspect.
pub struct AnalysisContext<'a> {
    pub symbols: &'a [Symbol],
}

/// Result from running a single detector.
#[derive(Debug, Clone)]
pub struct DetectorResult {
    pub detector_name: String,
    pub issues: Vec<Issue>,
    pub duration_ms: u64,
    pub success: bool,
    pub error: Option<String>,
}

impl DetectorResult {
    pub fn success(detector_name: String, issues: Vec<Issue>, duration_ms: u64) -> Self {
        Self {
            detector_name,
            issues,
            duration_ms,
            success: true,
            error: None,
        }
    }

    pub fn failure(detector_name: String, error: String, duration_ms: u64) -> Self {
        Self {
            detector_name,
            issues: Vec::new(),
            duration_ms,
            success: false,
            error: Some(error),
        }
    }
}

/// Trait for all code smell detectors.
pub trait Detector: Send + Sync {
    /// Unique identifier, also used as the issue `type`.
    fn name(&self) -> &'static str;

    /// Human-readable description of what this detector finds.
    fn description(&self) -> &'static str;

    /// Run detection over the analysis context.
    fn detect(&self, ctx: &AnalysisContext) -> Result<Vec<Issue>>;
}

/// Build a smell issue anchored to a symbol.
pub fn smell_issue(
    detector: &str,
    severity: Severity,
    symbol: &Symbol,
    message: String,
) -> Issue {
    Issue {
        category: IssueCategory::Smell,
        severity,
        path: symbol.path.clone(),
        message,
        issue_type: Some(detector.to_string()),
        symbol_id: Some(symbol.id.clone()),
        line: Some(symbol.start_line),
    }
}
