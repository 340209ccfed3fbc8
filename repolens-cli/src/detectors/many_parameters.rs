//! Long parameter list detector.

use crate::detectors::base::{smell_issue, AnalysisContext, Detector};
use crate::models::{Issue, Severity};
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;

const INFO_PARAMS: usize = 5;
const WARN_PARAMS: usize = 8;

fn params_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^)]*)\)").expect("valid parameter list regex"))
}

/// Count parameters in the signature preceding the function body.
fn count_parameters(text: &str) -> usize {
    let header_end = match (text.find('{'), text.find("=>")) {
        (Some(brace), Some(arrow)) => brace.min(arrow),
        (Some(brace), None) => brace,
        (None, Some(arrow)) => arrow,
        (None, None) => text.len(),
    };
    let header = &text[..header_end];
    let Some(caps) = params_re().captures(header) else {
        return 0;
    };
    caps[1]
        .split(',')
        .filter(|p| !p.trim().is_empty())
        .count()
}

pub struct ManyParametersDetector;

impl Detector for ManyParametersDetector {
    fn name(&self) -> &'static str {
        "many-parameters"
    }

    fn description(&self) -> &'static str {
        "Detects functions with long parameter lists"
    }

    fn detect(&self, ctx: &AnalysisContext) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();
        for symbol in ctx.symbols {
            if !symbol.kind.is_function_like() {
                continue;
            }
            let count = count_parameters(&symbol.text);
            if count < INFO_PARAMS {
                continue;
            }
            let severity = if count >= WARN_PARAMS {
                Severity::Warning
            } else {
                Severity::Info
            };
            issues.push(smell_issue(
                self.name(),
                severity,
                symbol,
                format!(
                    "Many parameters: {} takes {} parameters",
                    symbol.name, count
                ),
            ));
        }
        Ok(issues)
    }
}
