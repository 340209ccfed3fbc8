//! Code smell detectors.
//!
//! Each detector inspects symbol texts and spans against a fixed
//! threshold pair (base severity, elevated severity). Detectors run in
//! parallel and their issues are merged back in registration order; a
//! failing detector is logged and never aborts the run.

pub mod base;

mod branch_heavy;
mod large_class;
mod long_function;
mod many_methods;
mod many_parameters;

pub use base::{AnalysisContext, Detector, DetectorResult};

use crate::models::{Issue, Symbol};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, warn};

fn registry() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(long_function::LongFunctionDetector),
        Box::new(many_parameters::ManyParametersDetector),
        Box::new(branch_heavy::BranchHeavyDetector),
        Box::new(large_class::LargeClassDetector),
        Box::new(many_methods::ManyMethodsDetector),
    ]
}

/// Run every smell detector over the extracted symbols.
pub fn run_smell_detectors(symbols: &[Symbol]) -> Vec<Issue> {
    let ctx = AnalysisContext { symbols };
    let detectors = registry();

    let results: Vec<DetectorResult> = detectors
        .par_iter()
        .map(|detector| {
            let started = Instant::now();
            let duration_ms = |s: Instant| s.elapsed().as_millis() as u64;
            match detector.detect(&ctx) {
                Ok(issues) => {
                    DetectorResult::success(detector.name().to_string(), issues, duration_ms(started))
                }
                Err(e) => {
                    DetectorResult::failure(detector.name().to_string(), e.to_string(), duration_ms(started))
                }
            }
        })
        .collect();

    let mut issues = Vec::new();
    for result in results {
        if result.success {
            info!(
                "{} found {} issues in {}ms",
                result.detector_name,
                result.issues.len(),
                result.duration_ms
            );
            issues.extend(result.issues);
        } else {
            warn!(
                "{} failed: {}",
                result.detector_name,
                result.error.unwrap_or_default()
            );
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Severity, SymbolKind};

    fn long_branchy_function() -> Symbol {
        let mut text = "function messy(a, b) {\n".to_string();
        for i in 0..40 {
            text.push_str(&format!("  if (a > {i}) {{ b += {i}; }}\n"));
        }
        for _ in 0..80 {
            text.push_str("  b += 1;\n");
        }
        text.push('}');
        let lines = text.lines().count();
        Symbol {
            id: "function:util.js#messy".into(),
            file_id: "file:util.js".into(),
            name: "messy".into(),
            kind: SymbolKind::Function,
            path: "util.js".into(),
            language: Some("JavaScript".into()),
            start_line: 1,
            end_line: lines,
            text,
        }
    }

    #[test]
    fn test_long_branchy_function_trips_both_detectors() {
        let symbols = vec![long_branchy_function()];
        let issues = run_smell_detectors(&symbols);

        let long = issues
            .iter()
            .find(|i| i.issue_type.as_deref() == Some("long-function"))
            .unwrap();
        assert_eq!(long.severity, Severity::Error);

        let branchy = issues
            .iter()
            .find(|i| i.issue_type.as_deref() == Some("branch-heavy"))
            .unwrap();
        assert_eq!(branchy.severity, Severity::Error);
    }

    #[test]
    fn test_issues_preserve_registration_order() {
        let symbols = vec![long_branchy_function()];
        let issues = run_smell_detectors(&symbols);
        let types: Vec<&str> = issues
            .iter()
            .filter_map(|i| i.issue_type.as_deref())
            .collect();
        let long_pos = types.iter().position(|t| *t == "long-function").unwrap();
        let branch_pos = types.iter().position(|t| *t == "branch-heavy").unwrap();
        assert!(long_pos < branch_pos);
    }

    #[test]
    fn test_no_symbols_no_issues() {
        assert!(run_smell_detectors(&[]).is_empty());
    }
}
