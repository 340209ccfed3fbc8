//! Import extraction and resolution.
//!
//! Specifiers are pulled out of JS/TS, Python and Go sources with
//! per-language regexes. Relative specifiers are resolved against the
//! walked file set by probing the exact path, a list of extensions and
//! `index.*` files; everything else is external.

use crate::config::AnalyzeConfig;
use crate::models::{
    DependencyEdge, DependencyGraph, DependencyKind, FileRecord, Issue, IssueCategory, Severity,
    UnresolvedImport,
};
use regex::Regex;
use rustc_hash::FxHashSet;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Probe extensions for relative specifiers, in order.
const RESOLVE_EXTENSIONS: [&str; 7] = ["js", "jsx", "ts", "tsx", "mjs", "cjs", "json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DepLanguage {
    JsFamily,
    Python,
    Go,
}

fn dependency_language(ext: &str) -> Option<DepLanguage> {
    match ext {
        "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" => Some(DepLanguage::JsFamily),
        "py" | "pyi" => Some(DepLanguage::Python),
        "go" => Some(DepLanguage::Go),
        _ => None,
    }
}

fn js_static_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\bimport\s+(?:[^'";]*?\s+from\s+)?['"]([^'"]+)['"]"#)
            .expect("valid static import regex")
    })
}

fn js_dynamic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\bimport\(\s*['"]([^'"]+)['"]\s*\)"#).expect("valid dynamic import regex")
    })
}

fn js_require_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\brequire\(\s*['"]([^'"]+)['"]\s*\)"#).expect("valid require regex")
    })
}

fn py_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*import\s+([A-Za-z_][A-Za-z0-9_.]*)").expect("valid python import regex")
    })
}

fn py_from_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*from\s+([A-Za-z_][A-Za-z0-9_.]*)\s+import\b")
            .expect("valid python from-import regex")
    })
}

fn go_single_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^\s*import\s+"([^"]+)""#).expect("valid go import regex")
    })
}

fn go_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)import\s*\(([^)]*)\)").expect("valid go block regex"))
}

fn go_quoted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]+)""#).expect("valid quoted string regex"))
}

/// Extract import specifiers from file content, in match order.
fn extract_specifiers(content: &str, language: DepLanguage) -> Vec<String> {
    let mut specifiers = Vec::new();
    match language {
        DepLanguage::JsFamily => {
            for re in [js_static_re(), js_dynamic_re(), js_require_re()] {
                for cap in re.captures_iter(content) {
                    specifiers.push(cap[1].to_string());
                }
            }
        }
        DepLanguage::Python => {
            for re in [py_import_re(), py_from_re()] {
                for cap in re.captures_iter(content) {
                    specifiers.push(cap[1].to_string());
                }
            }
        }
        DepLanguage::Go => {
            for cap in go_single_re().captures_iter(content) {
                specifiers.push(cap[1].to_string());
            }
            // Quoted lines inside parenthesized blocks; commented-out
            // entries are intentionally not filtered.
            for block in go_block_re().captures_iter(content) {
                for cap in go_quoted_re().captures_iter(&block[1]) {
                    specifiers.push(cap[1].to_string());
                }
            }
        }
    }
    specifiers
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with('.') || specifier.starts_with('/')
}

/// Join a specifier against the importing file's directory, folding
/// `.` and `..` segments. A leading `/` is treated like `./`.
fn join_relative(source_path: &str, specifier: &str) -> String {
    let mut segments: Vec<&str> = match source_path.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for part in specifier.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Resolve a relative specifier against the file set: exact path first,
/// then each extension, then `index.*` files.
fn resolve_relative(
    source_path: &str,
    specifier: &str,
    file_set: &FxHashSet<&str>,
) -> Option<String> {
    let base = join_relative(source_path, specifier);
    if base.is_empty() {
        return None;
    }
    if file_set.contains(base.as_str()) {
        return Some(base);
    }
    for ext in RESOLVE_EXTENSIONS {
        let candidate = format!("{base}.{ext}");
        if file_set.contains(candidate.as_str()) {
            return Some(candidate);
        }
    }
    for ext in RESOLVE_EXTENSIONS {
        let candidate = format!("{base}/index.{ext}");
        if file_set.contains(candidate.as_str()) {
            return Some(candidate);
        }
    }
    None
}

/// Build the dependency graph over the walked files.
pub fn build_dependency_graph(
    root: &Path,
    files: &[FileRecord],
    cfg: &AnalyzeConfig,
) -> (DependencyGraph, Vec<Issue>) {
    let file_set: FxHashSet<&str> = files.iter().map(|f| f.path.as_str()).collect();
    let mut graph = DependencyGraph::default();
    let mut issues = Vec::new();
    let mut seen_edges: FxHashSet<(String, String)> = FxHashSet::default();

    for file in files {
        let Some(language) = dependency_language(&file.ext) else {
            continue;
        };
        graph.nodes.push(file.path.clone());

        if file.size > cfg.deps_max_file_size {
            graph.unresolved.push(UnresolvedImport {
                source: file.path.clone(),
                specifier: None,
                reason: format!(
                    "File too large for import scanning ({} KB)",
                    file.size / 1024
                ),
            });
            issues.push(Issue {
                category: IssueCategory::Dependency,
                severity: Severity::Info,
                path: file.path.clone(),
                message: format!("Skipped import scan for {} (file too large)", file.path),
                issue_type: Some("file-too-large".to_string()),
                symbol_id: None,
                line: None,
            });
            continue;
        }

        let content = match std::fs::read_to_string(root.join(&file.path)) {
            Ok(content) => content,
            Err(e) => {
                graph.unresolved.push(UnresolvedImport {
                    source: file.path.clone(),
                    specifier: None,
                    reason: format!("Read error: {e}"),
                });
                issues.push(Issue {
                    category: IssueCategory::Dependency,
                    severity: Severity::Warning,
                    path: file.path.clone(),
                    message: format!("Could not read {} for import scanning: {e}", file.path),
                    issue_type: Some("file-read-error".to_string()),
                    symbol_id: None,
                    line: None,
                });
                continue;
            }
        };

        for specifier in extract_specifiers(&content, language) {
            if !seen_edges.insert((file.path.clone(), specifier.clone())) {
                continue;
            }

            if is_relative(&specifier) {
                match resolve_relative(&file.path, &specifier, &file_set) {
                    Some(target) => graph.edges.push(DependencyEdge {
                        source: file.path.clone(),
                        target,
                        specifier,
                        kind: DependencyKind::Local,
                    }),
                    None => {
                        debug!("Unresolved relative import {specifier} in {}", file.path);
                        issues.push(Issue {
                            category: IssueCategory::Dependency,
                            severity: Severity::Info,
                            path: file.path.clone(),
                            message: format!(
                                "Unresolved relative import '{specifier}' in {}",
                                file.path
                            ),
                            issue_type: Some("unresolved-import".to_string()),
                            symbol_id: None,
                            line: None,
                        });
                        graph.unresolved.push(UnresolvedImport {
                            source: file.path.clone(),
                            specifier: Some(specifier),
                            reason: "Relative import did not match any scanned file".to_string(),
                        });
                    }
                }
            } else {
                graph.edges.push(DependencyEdge {
                    source: file.path.clone(),
                    target: specifier.clone(),
                    specifier,
                    kind: DependencyKind::External,
                });
            }
        }
    }

    info!(
        "Dependency graph: {} nodes, {} edges, {} unresolved",
        graph.nodes.len(),
        graph.edges.len(),
        graph.unresolved.len()
    );
    (graph, issues)
}
