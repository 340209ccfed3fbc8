//! Long function detector.

use crate::detectors::base::{smell_issue, AnalysisContext, Detector};
use crate::models::{Issue, Severity, SymbolKind};
use anyhow::Result;

const WARN_LINES: usize = 50;
const ERROR_LINES: usize = 100;

pub struct LongFunctionDetector;

impl Detector for LongFunctionDetector {
    fn name(&self) -> &'static str {
        "long-function"
    }

    fn description(&self) -> &'static str {
        "Detects functions over 50 lines"
    }

    fn detect(&self, ctx: &AnalysisContext) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();
        for symbol in ctx.symbols {
            // File-scope fallback symbols are the only unit for non-JS
            // sources, so they pass through the same thresholds.
            if !symbol.kind.is_function_like() && symbol.kind != SymbolKind::File {
                continue;
            }
            let lines = symbol.line_count();
            if lines < WARN_LINES {
                continue;
            }
            let severity = if lines >= ERROR_LINES {
                Severity::Error
            } else {
                Severity::Warning
            };
            issues.push(smell_issue(
                self.name(),
                severity,
                symbol,
                format!(
                    "Long function: {} ({} lines, threshold {})",
                    symbol.name, lines, WARN_LINES
                ),
            ));
        }
        Ok(issues)
    }
}
