//! Core data models for repolens
//!
//! Everything the pipeline produces is represented here: walk records,
//! per-file metrics, symbols, structure graph nodes and edges, clone
//! entries, issues, and the final report shape consumed by the
//! presentation layer. Field names serialize as camelCase because that
//! is the wire format the report viewer expects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Severity levels for issues, ordered most severe first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    #[default]
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Issue categories across the pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Metric,
    Filesystem,
    Dependency,
    Smell,
}

/// A single quality or operational finding attached to a path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub category: IssueCategory,
    pub severity: Severity,
    pub path: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
    pub issue_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

/// A regular file or symlink recorded by the walker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Forward-slash path relative to the analyzed root.
    pub path: String,
    pub name: String,
    /// Lowercased extension without the leading dot; empty if none.
    pub ext: String,
    pub size: u64,
    /// Milliseconds since the Unix epoch.
    pub mtime: u64,
    pub depth: usize,
    pub is_symbolic_link: bool,
}

/// A directory recorded by the walker. The root itself has path `"."`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirRecord {
    pub path: String,
    pub name: String,
    pub depth: usize,
    pub mtime: u64,
}

/// Non-fatal traversal problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningType {
    StatError,
    ReadError,
    LimitReached,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkWarning {
    #[serde(rename = "type")]
    pub warning_type: WarningType,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of the bounded traversal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkResult {
    pub files: Vec<FileRecord>,
    pub directories: Vec<DirRecord>,
    pub warnings: Vec<WalkWarning>,
    pub truncated: bool,
}

/// Per-file quality metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetrics {
    pub language: Option<String>,
    pub size: u64,
    pub line_count: Option<usize>,
    pub complexity_score: Option<f64>,
    pub todo_count: usize,
    pub skipped: bool,
}

/// Symbol kinds extracted by the AST pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Component,
    Class,
    Value,
    File,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Component => "component",
            SymbolKind::Class => "class",
            SymbolKind::Value => "value",
            SymbolKind::File => "file",
        }
    }

    /// Function-like symbols are the unit of clone detection.
    pub fn is_function_like(&self) -> bool {
        matches!(self, SymbolKind::Function | SymbolKind::Component)
    }
}

/// A source symbol. `text` feeds the smell and clone passes and is
/// dropped from the serialized report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    pub id: String,
    pub file_id: String,
    pub name: String,
    pub kind: SymbolKind,
    pub path: String,
    pub language: Option<String>,
    pub start_line: usize,
    pub end_line: usize,
    #[serde(skip)]
    pub text: String,
}

impl Symbol {
    /// Stable structured id: `{kind}:{filePath}#{name}`.
    pub fn make_id(kind: SymbolKind, path: &str, name: &str) -> String {
        format!("{}:{}#{}", kind.as_str(), path, name)
    }

    pub fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

/// Structure graph node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Package,
    File,
    Symbol,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureNode {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    Contains,
    Defines,
    Import,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

/// Per-file import descriptor collected by the AST pass.
/// A default import contributes the name `"default"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDescriptor {
    pub specifier: String,
    pub names: std::collections::BTreeSet<String>,
    pub has_namespace: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureTotals {
    pub packages: usize,
    pub files: usize,
    pub symbols: usize,
    pub edges: usize,
}

/// The cross-file structure graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureGraph {
    pub nodes: Vec<StructureNode>,
    pub edges: Vec<StructureEdge>,
    pub symbols: Vec<Symbol>,
    pub totals: StructureTotals,
    /// Distinct-caller counts per callee symbol id.
    pub incoming_calls: BTreeMap<String, usize>,
    /// Exported identifiers per file path.
    pub exports: BTreeMap<String, Vec<String>>,
    /// `"{file}#{export}"` to count of distinct importer files.
    pub export_usage: BTreeMap<String, usize>,
}

/// Import resolution kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Local,
    External,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEdge {
    pub source: String,
    pub target: String,
    pub specifier: String,
    pub kind: DependencyKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedImport {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifier: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGraph {
    pub nodes: Vec<String>,
    pub edges: Vec<DependencyEdge>,
    pub unresolved: Vec<UnresolvedImport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanEntry {
    pub path: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalPackage {
    pub name: String,
    pub count: usize,
}

/// Top import hubs and external packages, five entries each.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyInsights {
    pub fan_out: Vec<FanEntry>,
    pub fan_in: Vec<FanEntry>,
    pub external_packages: Vec<ExternalPackage>,
}

/// A directed clone entry stored under the source symbol's id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneEntry {
    pub target_id: String,
    pub file_path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub similarity: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub directories: usize,
    pub files: usize,
    pub truncated: bool,
    pub walk_duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageStat {
    pub language: String,
    pub files: usize,
    pub lines: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LargestFile {
    pub path: String,
    pub size: u64,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongestFile {
    pub path: String,
    pub line_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub totals: Totals,
    pub languages: Vec<LanguageStat>,
    pub largest_files: Vec<LargestFile>,
    pub longest_files: Vec<LongestFile>,
    pub warnings_count: usize,
}

/// Hierarchical view of the walked tree. Children are sorted
/// directories-first, then by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTreeNode {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub node_type: TreeNodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileTreeNode>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeNodeType {
    Directory,
    File,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub files: BTreeMap<String, FileMetrics>,
}

/// Structured mirror of one narrative clone line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneDetail {
    pub source_name: String,
    pub source_path: String,
    pub source_start_line: usize,
    pub source_end_line: usize,
    pub target_name: String,
    pub target_path: String,
    pub target_start_line: usize,
    pub target_end_line: usize,
    pub similarity: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeMetrics {
    pub analyzed_files: usize,
    pub skipped_files: usize,
    pub total_lines: usize,
    pub todo_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Narrative {
    pub overview: String,
    pub key_facts: Vec<String>,
    pub hotspots: Vec<String>,
    pub actions: Vec<String>,
    pub clones: Vec<String>,
    pub clones_details: Vec<CloneDetail>,
    pub metrics: NarrativeMetrics,
}

/// The complete analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub root_path: String,
    /// ISO-8601 UTC timestamp of report generation.
    pub generated_at: String,
    pub summary: Summary,
    pub file_tree: FileTreeNode,
    pub dependencies: DependencyGraph,
    pub dependency_insights: DependencyInsights,
    pub structure_graph: StructureGraph,
    pub clones: BTreeMap<String, Vec<CloneEntry>>,
    pub metrics: MetricsReport,
    pub issues: Vec<Issue>,
    pub narrative: Narrative,
}
