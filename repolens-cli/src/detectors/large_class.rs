//! Large class detector.

use crate::detectors::base::{smell_issue, AnalysisContext, Detector};
use crate::models::{Issue, Severity, SymbolKind};
use anyhow::Result;

const WARN_LINES: usize = 100;
const ERROR_LINES: usize = 200;

pub struct LargeClassDetector;

impl Detector for LargeClassDetector {
    fn name(&self) -> &'static str {
        "large-class"
    }

    fn description(&self) -> &'static str {
        "Detects classes over 100 lines"
    }

    fn detect(&self, ctx: &AnalysisContext) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();
        for symbol in ctx.symbols {
            if symbol.kind != SymbolKind::Class {
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
                format!("Large class: {} ({} lines)", symbol.name, lines),
            ));
        }
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Symbol;

    fn class(lines: usize) -> Symbol {
        Symbol {
            id: "class:a.ts#Store".into(),
            file_id: "file:a.ts".into(),
            name: "Store".into(),
            kind: SymbolKind::Class,
            path: "a.ts".into(),
            language: Some("TypeScript".into()),
            start_line: 1,
            end_line: lines,
            text: String::new(),
        }
    }

    #[test]
    fn test_thresholds() {
        let detector = LargeClassDetector;

        let small = [class(99)];
        assert!(detector
            .detect(&AnalysisContext { symbols: &small })
            .unwrap()
            .is_empty());

        let warn = [class(100)];
        let issues = detector.detect(&AnalysisContext { symbols: &warn }).unwrap();
        assert_eq!(issues[0].severity, Severity::Warning);

        let error = [class(250)];
        let issues = detector.detect(&AnalysisContext { symbols: &error }).unwrap();
        assert_eq!(issues[0].severity, Severity::Error);
    }
}
