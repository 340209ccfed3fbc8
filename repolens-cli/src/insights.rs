//! Dependency insights: import hubs and external packages.
//!
//! Local import edges are folded into a directed graph; fan-out and
//! fan-in are node degrees over that graph. External specifiers are
//! collapsed to their package root and counted.

use crate::models::{
    DependencyGraph, DependencyKind, DependencyInsights, ExternalPackage, FanEntry,
};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rustc_hash::FxHashMap;
use tracing::debug;

const TOP_ENTRIES: usize = 5;

/// Collapse an external specifier to its package root:
/// `@scope/pkg/deep` keeps two segments, `lodash/fp` keeps one,
/// `pkg.sub` (Python) keeps the first dotted segment.
fn package_root(specifier: &str) -> String {
    if let Some(rest) = specifier.strip_prefix('@') {
        let mut parts = rest.splitn(3, '/');
        match (parts.next(), parts.next()) {
            (Some(scope), Some(name)) => return format!("@{scope}/{name}"),
            _ => return specifier.to_string(),
        }
    }
    let slash_root = specifier.split('/').next().unwrap_or(specifier);
    slash_root.split('.').next().unwrap_or(slash_root).to_string()
}

fn top_entries(counts: FxHashMap<&str, usize>) -> Vec<FanEntry> {
    let mut entries: Vec<FanEntry> = counts
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(path, count)| FanEntry {
            path: path.to_string(),
            count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.path.cmp(&b.path)));
    entries.truncate(TOP_ENTRIES);
    entries
}

/// Derive fan-out, fan-in and external package counts from the
/// dependency graph.
pub fn derive_insights(dependencies: &DependencyGraph) -> DependencyInsights {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut indices: FxHashMap<&str, NodeIndex> = FxHashMap::default();

    let mut external_counts: FxHashMap<String, usize> = FxHashMap::default();
    for edge in &dependencies.edges {
        match edge.kind {
            DependencyKind::Local => {
                let source = *indices
                    .entry(edge.source.as_str())
                    .or_insert_with(|| graph.add_node(edge.source.as_str()));
                let target = *indices
                    .entry(edge.target.as_str())
                    .or_insert_with(|| graph.add_node(edge.target.as_str()));
                graph.add_edge(source, target, ());
            }
            DependencyKind::External => {
                *external_counts.entry(package_root(&edge.specifier)).or_insert(0) += 1;
            }
        }
    }

    let mut fan_out: FxHashMap<&str, usize> = FxHashMap::default();
    let mut fan_in: FxHashMap<&str, usize> = FxHashMap::default();
    for (&path, &idx) in &indices {
        fan_out.insert(path, graph.neighbors_directed(idx, Direction::Outgoing).count());
        fan_in.insert(path, graph.neighbors_directed(idx, Direction::Incoming).count());
    }

    let mut external_packages: Vec<ExternalPackage> = external_counts
        .into_iter()
        .map(|(name, count)| ExternalPackage { name, count })
        .collect();
    external_packages.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    external_packages.truncate(TOP_ENTRIES);

    debug!(
        "Dependency insights over {} local nodes, {} external packages",
        indices.len(),
        external_packages.len()
    );

    DependencyInsights {
        fan_out: top_entries(fan_out),
        fan_in: top_entries(fan_in),
        external_packages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DependencyEdge;

    fn local(source: &str, target: &str) -> DependencyEdge {
        DependencyEdge {
            source: source.to_string(),
            target: target.to_string(),
            specifier: format!("./{target}"),
            kind: DependencyKind::Local,
        }
    }

    fn external(source: &str, specifier: &str) -> DependencyEdge {
        DependencyEdge {
            source: source.to_string(),
            target: specifier.to_string(),
            specifier: specifier.to_string(),
            kind: DependencyKind::External,
        }
    }

    fn deps(edges: Vec<DependencyEdge>) -> DependencyGraph {
        DependencyGraph {
            nodes: Vec::new(),
            edges,
            unresolved: Vec::new(),
        }
    }

    #[test]
    fn test_package_root() {
        assert_eq!(package_root("lodash"), "lodash");
        assert_eq!(package_root("lodash/fp"), "lodash");
        assert_eq!(package_root("@scope/pkg/deep"), "@scope/pkg");
        assert_eq!(package_root("pkg.sub"), "pkg");
        assert_eq!(package_root("net/http"), "net");
    }

    #[test]
    fn test_fan_out_and_fan_in() {
        let insights = derive_insights(&deps(vec![
            local("hub.ts", "a.ts"),
            local("hub.ts", "b.ts"),
            local("hub.ts", "c.ts"),
            local("x.ts", "a.ts"),
        ]));

        assert_eq!(insights.fan_out[0].path, "hub.ts");
        assert_eq!(insights.fan_out[0].count, 3);
        assert_eq!(insights.fan_in[0].path, "a.ts");
        assert_eq!(insights.fan_in[0].count, 2);
    }

    #[test]
    fn test_external_packages_ranked() {
        let insights = derive_insights(&deps(vec![
            external("a.ts", "react"),
            external("b.ts", "react"),
            external("c.ts", "react/jsx-runtime"),
            external("a.ts", "lodash"),
        ]));

        assert_eq!(insights.external_packages[0].name, "react");
        assert_eq!(insights.external_packages[0].count, 3);
        assert_eq!(insights.external_packages[1].name, "lodash");
    }

    #[test]
    fn test_empty_graph_is_empty() {
        let insights = derive_insights(&deps(vec![]));
        assert!(insights.fan_out.is_empty());
        assert!(insights.fan_in.is_empty());
        assert!(insights.external_packages.is_empty());
    }
}
