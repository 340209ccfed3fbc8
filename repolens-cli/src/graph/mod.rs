//! Cross-file structure graph.
//!
//! Builds package, file and symbol nodes with `contains`, `defines` and
//! `import` edges, runs the AST pass to populate symbols, intra-file
//! call counts and export/import descriptors, and computes export-usage
//! counts from the resolved dependency edges.

pub mod exports;

use crate::config::AnalyzeConfig;
use crate::models::{
    DependencyGraph, DependencyKind, EdgeType, FileRecord, ImportDescriptor, NodeKind,
    StructureEdge, StructureGraph, StructureNode, StructureTotals,
};
use crate::parsers::{self, ParsedFile};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::info;

/// Top-level directory segment that qualifies as a package.
fn package_of(path: &str) -> Option<&str> {
    let (first, _) = path.split_once('/')?;
    if first.is_empty() || first == "." || first.starts_with('.') {
        return None;
    }
    Some(first)
}

/// Build the structure graph over walked files and resolved
/// dependencies.
pub fn build_structure_graph(
    root: &Path,
    files: &[FileRecord],
    dependencies: &DependencyGraph,
    cfg: &AnalyzeConfig,
) -> StructureGraph {
    let mut graph = StructureGraph::default();

    // Package nodes, in first-seen order.
    let mut seen_packages: FxHashSet<&str> = FxHashSet::default();
    for file in files {
        if let Some(package) = package_of(&file.path) {
            if seen_packages.insert(package) {
                graph.nodes.push(StructureNode {
                    id: format!("package:{package}"),
                    kind: NodeKind::Package,
                    name: package.to_string(),
                    path: Some(package.to_string()),
                });
            }
        }
    }

    // File nodes and contains edges.
    for file in files {
        graph.nodes.push(StructureNode {
            id: format!("file:{}", file.path),
            kind: NodeKind::File,
            name: file.name.clone(),
            path: Some(file.path.clone()),
        });
        if let Some(package) = package_of(&file.path) {
            graph.edges.push(StructureEdge {
                source: format!("package:{package}"),
                target: format!("file:{}", file.path),
                edge_type: EdgeType::Contains,
            });
        }
    }

    // AST pass, parallel per file, merged in walk order.
    let parsed: Vec<ParsedFile> = files
        .par_iter()
        .map(|file| parsers::parse_file(root, file, cfg))
        .collect();

    let mut exports_by_file: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut imports_by_file: BTreeMap<String, Vec<ImportDescriptor>> = BTreeMap::new();
    for (file, parsed) in files.iter().zip(&parsed) {
        if !parsed.exports.is_empty() {
            exports_by_file.insert(file.path.clone(), parsed.exports.clone());
        }
        if !parsed.imports.is_empty() {
            imports_by_file.insert(file.path.clone(), parsed.imports.clone());
        }
    }

    for parsed in &parsed {
        for symbol in &parsed.symbols {
            graph.nodes.push(StructureNode {
                id: symbol.id.clone(),
                kind: NodeKind::Symbol,
                name: symbol.name.clone(),
                path: Some(symbol.path.clone()),
            });
            graph.edges.push(StructureEdge {
                source: symbol.file_id.clone(),
                target: symbol.id.clone(),
                edge_type: EdgeType::Defines,
            });
        }
        // Call pairs arrive de-duplicated by caller, so each one is a
        // distinct caller of its callee.
        for (_caller, callee) in &parsed.calls {
            *graph.incoming_calls.entry(callee.clone()).or_insert(0) += 1;
        }
    }

    // Import edges from locally resolved dependency edges.
    let file_ids: FxHashSet<String> = files
        .iter()
        .map(|f| format!("file:{}", f.path))
        .collect();
    for edge in &dependencies.edges {
        if edge.kind != DependencyKind::Local {
            continue;
        }
        let source = format!("file:{}", edge.source);
        let target = format!("file:{}", edge.target);
        if file_ids.contains(&source) && file_ids.contains(&target) {
            graph.edges.push(StructureEdge {
                source,
                target,
                edge_type: EdgeType::Import,
            });
        }
    }

    graph.exports = exports_by_file
        .iter()
        .map(|(path, names)| (path.clone(), names.iter().cloned().collect()))
        .collect();
    graph.export_usage =
        exports::compute_export_usage(dependencies, &imports_by_file, &exports_by_file);

    graph.symbols = parsed.into_iter().flat_map(|p| p.symbols).collect();
    graph.totals = StructureTotals {
        packages: seen_packages.len(),
        files: files.len(),
        symbols: graph.symbols.len(),
        edges: graph.edges.len(),
    };

    info!(
        "Structure graph: {} nodes, {} edges, {} symbols",
        graph.nodes.len(),
        graph.edges.len(),
        graph.symbols.len()
    );
    graph
}
