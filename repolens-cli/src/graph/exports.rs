//! Export-usage accounting.
//!
//! Counts, for every exported name, how many distinct files import it
//! through a locally resolved specifier. Namespace imports credit every
//! export of the target module.

use crate::models::{DependencyGraph, DependencyKind, ImportDescriptor};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeMap, BTreeSet};

/// Compute `"{file}#{export}" -> distinct importer count`.
///
/// Every exported name appears in the result, so unused exports are
/// visible as explicit zeros.
pub fn compute_export_usage(
    dependencies: &DependencyGraph,
    imports_by_file: &BTreeMap<String, Vec<ImportDescriptor>>,
    exports_by_file: &BTreeMap<String, BTreeSet<String>>,
) -> BTreeMap<String, usize> {
    // (source file, specifier) -> resolved target file.
    let mut resolution: FxHashMap<(&str, &str), &str> = FxHashMap::default();
    for edge in &dependencies.edges {
        if edge.kind == DependencyKind::Local {
            resolution.insert(
                (edge.source.as_str(), edge.specifier.as_str()),
                edge.target.as_str(),
            );
        }
    }

    let mut importers: FxHashMap<String, FxHashSet<&str>> = FxHashMap::default();
    for (file, exports) in exports_by_file {
        for name in exports {
            importers.insert(format!("{file}#{name}"), FxHashSet::default());
        }
    }

    for (importer, descriptors) in imports_by_file {
        for descriptor in descriptors {
            let Some(&target) =
                resolution.get(&(importer.as_str(), descriptor.specifier.as_str()))
            else {
                continue;
            };
            if target == importer.as_str() {
                continue;
            }
            let Some(export_set) = exports_by_file.get(target) else {
                continue;
            };
            if descriptor.has_namespace {
                for name in export_set {
                    if let Some(set) = importers.get_mut(&format!("{target}#{name}")) {
                        set.insert(importer.as_str());
                    }
                }
            } else {
                for name in &descriptor.names {
                    if export_set.contains(name) {
                        if let Some(set) = importers.get_mut(&format!("{target}#{name}")) {
                            set.insert(importer.as_str());
                        }
                    }
                }
            }
        }
    }

    importers
        .into_iter()
        .map(|(key, set)| (key, set.len()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DependencyEdge, UnresolvedImport};

    fn local_edge(source: &str, specifier: &str, target: &str) -> DependencyEdge {
        DependencyEdge {
            source: source.to_string(),
            target: target.to_string(),
            specifier: specifier.to_string(),
            kind: DependencyKind::Local,
        }
    }

    fn deps(edges: Vec<DependencyEdge>) -> DependencyGraph {
        DependencyGraph {
            nodes: Vec::new(),
            edges,
            unresolved: Vec::<UnresolvedImport>::new(),
        }
    }

    fn descriptor(specifier: &str, names: &[&str], namespace: bool) -> ImportDescriptor {
        ImportDescriptor {
            specifier: specifier.to_string(),
            names: names.iter().map(|s| s.to_string()).collect(),
            has_namespace: namespace,
        }
    }

    fn exports(file: &str, names: &[&str]) -> (String, BTreeSet<String>) {
        (
            file.to_string(),
            names.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_named_import_credits_one_importer() {
        let deps = deps(vec![local_edge("b.js", "./a.js", "a.js")]);
        let imports: BTreeMap<String, Vec<ImportDescriptor>> =
            [("b.js".to_string(), vec![descriptor("./a.js", &["foo"], false)])].into();
        let exported: BTreeMap<_, _> = [exports("a.js", &["foo", "bar"])].into();

        let usage = compute_export_usage(&deps, &imports, &exported);
        assert_eq!(usage.get("a.js#foo"), Some(&1));
        assert_eq!(usage.get("a.js#bar"), Some(&0));
    }

    #[test]
    fn test_namespace_import_credits_all_exports() {
        let deps = deps(vec![local_edge("b.js", "./a", "a.js")]);
        let imports: BTreeMap<String, Vec<ImportDescriptor>> =
            [("b.js".to_string(), vec![descriptor("./a", &[], true)])].into();
        let exported: BTreeMap<_, _> = [exports("a.js", &["foo", "bar", "baz"])].into();

        let usage = compute_export_usage(&deps, &imports, &exported);
        assert_eq!(usage.get("a.js#foo"), Some(&1));
        assert_eq!(usage.get("a.js#bar"), Some(&1));
        assert_eq!(usage.get("a.js#baz"), Some(&1));
    }

    #[test]
    fn test_repeated_imports_from_one_file_count_once() {
        let deps = deps(vec![
            local_edge("b.js", "./a.js", "a.js"),
            local_edge("b.js", "./a", "a.js"),
        ]);
        let imports: BTreeMap<String, Vec<ImportDescriptor>> = [(
            "b.js".to_string(),
            vec![
                descriptor("./a.js", &["foo"], false),
                descriptor("./a", &["foo"], false),
            ],
        )]
        .into();
        let exported: BTreeMap<_, _> = [exports("a.js", &["foo"])].into();

        let usage = compute_export_usage(&deps, &imports, &exported);
        assert_eq!(usage.get("a.js#foo"), Some(&1));
    }

    #[test]
    fn test_two_importers_count_twice() {
        let deps = deps(vec![
            local_edge("b.js", "./a.js", "a.js"),
            local_edge("c.js", "./a.js", "a.js"),
        ]);
        let imports: BTreeMap<String, Vec<ImportDescriptor>> = [
            ("b.js".to_string(), vec![descriptor("./a.js", &["foo"], false)]),
            ("c.js".to_string(), vec![descriptor("./a.js", &["foo"], false)]),
        ]
        .into();
        let exported: BTreeMap<_, _> = [exports("a.js", &["foo"])].into();

        let usage = compute_export_usage(&deps, &imports, &exported);
        assert_eq!(usage.get("a.js#foo"), Some(&2));
    }

    #[test]
    fn test_import_of_unexported_name_is_not_credited() {
        let deps = deps(vec![local_edge("b.js", "./a.js", "a.js")]);
        let imports: BTreeMap<String, Vec<ImportDescriptor>> = [(
            "b.js".to_string(),
            vec![descriptor("./a.js", &["nope"], false)],
        )]
        .into();
        let exported: BTreeMap<_, _> = [exports("a.js", &["foo"])].into();

        let usage = compute_export_usage(&deps, &imports, &exported);
        assert_eq!(usage.get("a.js#foo"), Some(&0));
        assert!(!usage.contains_key("a.js#nope"));
    }
}
