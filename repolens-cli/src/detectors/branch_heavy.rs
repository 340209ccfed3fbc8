//! Branch-heavy function detector.

use crate::detectors::base::{smell_issue, AnalysisContext, Detector};
use crate::models::{Issue, Severity, SymbolKind};
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;

const WARN_BRANCHES: usize = 15;
const ERROR_BRANCHES: usize = 25;

fn branch_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:if|else if|for|while|switch|case|catch)\b|&&|\|\|")
            .expect("valid branch regex")
    })
}

pub struct BranchHeavyDetector;

impl Detector for BranchHeavyDetector {
    fn name(&self) -> &'static str {
        "branch-heavy"
    }

    fn description(&self) -> &'static str {
        "Detects functions with excessive branching"
    }

    fn detect(&self, ctx: &AnalysisContext) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();
        for symbol in ctx.symbols {
            if !symbol.kind.is_function_like() && symbol.kind != SymbolKind::File {
                continue;
            }
            let branches = branch_re().find_iter(&symbol.text).count();
            if branches < WARN_BRANCHES {
                continue;
            }
            let severity = if branches >= ERROR_BRANCHES {
                Severity::Error
            } else {
                Severity::Warning
            };
            issues.push(smell_issue(
                self.name(),
                severity,
                symbol,
                format!(
                    "Branch-heavy: {} has {} branch points",
                    symbol.name, branches
                ),
            ));
        }
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Symbol;

    fn symbol(text: String) -> Symbol {
        Symbol {
            id: "function:a.js#f".into(),
            file_id: "file:a.js".into(),
            name: "f".into(),
            kind: SymbolKind::Function,
            path: "a.js".into(),
            language: Some("JavaScript".into()),
            start_line: 1,
            end_line: 10,
            text,
        }
    }

    #[test]
    fn test_branch_counting_includes_operators() {
        let text = "if (a && b || c) { while (d) {} }";
        assert_eq!(branch_re().find_iter(text).count(), 4);
    }

    #[test]
    fn test_thresholds() {
        let detector = BranchHeavyDetector;

        let calm = [symbol("if (a) { return 1; }".to_string())];
        assert!(detector
            .detect(&AnalysisContext { symbols: &calm })
            .unwrap()
            .is_empty());

        let warn = [symbol("if (x) {}\n".repeat(15))];
        let issues = detector.detect(&AnalysisContext { symbols: &warn }).unwrap();
        assert_eq!(issues[0].severity, Severity::Warning);

        let error = [symbol("if (x) {}\n".repeat(30))];
        let issues = detector.detect(&AnalysisContext { symbols: &error }).unwrap();
        assert_eq!(issues[0].severity, Severity::Error);
    }
}
