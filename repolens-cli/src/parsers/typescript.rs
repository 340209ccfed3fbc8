//! TypeScript/JavaScript symbol extraction using tree-sitter.
//!
//! Only program-level declarations become symbols: named classes and
//! functions, variable declarators whose initializer is a function or
//! arrow expression, and `export default` functions. The same walk
//! collects intra-file call pairs between top-level function-likes and
//! the per-file export/import descriptors.

use crate::config::AnalyzeConfig;
use crate::models::{ImportDescriptor, Symbol, SymbolKind};
use crate::parsers::{truncate_text, ParsedFile};
use anyhow::{Context, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use tree_sitter::{Language, Node, Parser};

fn pick_language(ext: &str) -> Language {
    match ext {
        "ts" => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        "tsx" => tree_sitter_typescript::LANGUAGE_TSX.into(),
        _ => tree_sitter_javascript::LANGUAGE.into(),
    }
}

fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn string_value(node: Node, source: &[u8]) -> String {
    node_text(node, source)
        .trim_matches(|c| c == '\'' || c == '"' || c == '`')
        .to_string()
}

fn is_function_value(kind: &str) -> bool {
    matches!(kind, "arrow_function" | "function_expression" | "function")
}

fn is_function_declaration(kind: &str) -> bool {
    matches!(
        kind,
        "function_declaration" | "generator_function_declaration"
    )
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Byte span of a collected top-level function-like, for call
/// attribution.
struct TopLevelRange {
    start: usize,
    end: usize,
    id: String,
}

struct Extractor<'a> {
    source: &'a str,
    bytes: &'a [u8],
    path: &'a str,
    language: &'a str,
    cfg: &'a AnalyzeConfig,
    symbols: Vec<Symbol>,
    by_id: FxHashMap<String, usize>,
    ranges: Vec<TopLevelRange>,
    exports: BTreeSet<String>,
    imports: Vec<ImportDescriptor>,
}

impl<'a> Extractor<'a> {
    fn add_symbol(&mut self, kind: SymbolKind, name: &str, span: Node) {
        if name.is_empty() {
            return;
        }
        let kind = if kind == SymbolKind::Function && starts_uppercase(name) {
            SymbolKind::Component
        } else {
            kind
        };
        let start = span.start_byte().min(self.source.len());
        let end = span.end_byte().min(self.source.len());
        let text =
            truncate_text(&self.source[start..end], self.cfg.symbol_text_max_bytes).to_string();
        let symbol = Symbol {
            id: Symbol::make_id(kind, self.path, name),
            file_id: format!("file:{}", self.path),
            name: name.to_string(),
            kind,
            path: self.path.to_string(),
            language: Some(self.language.to_string()),
            start_line: span.start_position().row + 1,
            end_line: span.end_position().row + 1,
            text,
        };

        if kind.is_function_like() {
            self.ranges.push(TopLevelRange {
                start,
                end,
                id: symbol.id.clone(),
            });
        }

        // Duplicate ids keep the entry with the longer text.
        match self.by_id.get(&symbol.id) {
            Some(&idx) => {
                if symbol.text.len() > self.symbols[idx].text.len() {
                    self.symbols[idx] = symbol;
                }
            }
            None => {
                self.by_id.insert(symbol.id.clone(), self.symbols.len());
                self.symbols.push(symbol);
            }
        }
    }

    fn handle_declaration(&mut self, decl: Node, exported: bool, is_default: bool) {
        let kind = decl.kind();
        if is_function_declaration(kind) || is_function_value(kind) {
            let name = decl
                .child_by_field_name("name")
                .map(|n| node_text(n, self.bytes).to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| {
                    if is_default {
                        "default".to_string()
                    } else {
                        String::new()
                    }
                });
            if name.is_empty() {
                return;
            }
            if exported {
                self.exports
                    .insert(if is_default { "default".into() } else { name.clone() });
            }
            self.add_symbol(SymbolKind::Function, &name, decl);
            return;
        }

        match kind {
            "class_declaration" => {
                let name = decl
                    .child_by_field_name("name")
                    .map(|n| node_text(n, self.bytes).to_string())
                    .unwrap_or_default();
                if exported {
                    self.exports
                        .insert(if is_default { "default".into() } else { name.clone() });
                }
                if !name.is_empty() {
                    self.add_symbol(SymbolKind::Class, &name, decl);
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = decl.walk();
                for declarator in decl.named_children(&mut cursor) {
                    if declarator.kind() != "variable_declarator" {
                        continue;
                    }
                    let Some(name_node) = declarator.child_by_field_name("name") else {
                        continue;
                    };
                    if name_node.kind() != "identifier" {
                        continue;
                    }
                    let name = node_text(name_node, self.bytes).to_string();
                    if exported && !name.is_empty() {
                        self.exports.insert(name.clone());
                    }
                    if let Some(value) = declarator.child_by_field_name("value") {
                        if is_function_value(value.kind()) {
                            self.add_symbol(SymbolKind::Function, &name, decl);
                        }
                    }
                }
            }
            "interface_declaration" | "type_alias_declaration" | "enum_declaration" => {
                if exported {
                    if let Some(name_node) = decl.child_by_field_name("name") {
                        self.exports
                            .insert(node_text(name_node, self.bytes).to_string());
                    }
                }
            }
            _ => {
                if exported && is_default {
                    self.exports.insert("default".to_string());
                }
            }
        }
    }

    fn handle_export(&mut self, node: Node) {
        // Re-exports from another module are not attributed to this file.
        if node.child_by_field_name("source").is_some() {
            return;
        }

        let mut cursor = node.walk();
        let is_default = node.children(&mut cursor).any(|c| c.kind() == "default");

        if let Some(decl) = node.child_by_field_name("declaration") {
            self.handle_declaration(decl, true, is_default);
            return;
        }

        let mut handled = false;
        let mut cursor = node.walk();
        let named: Vec<Node> = node.named_children(&mut cursor).collect();
        for child in named {
            match child.kind() {
                "export_clause" => {
                    let mut inner = child.walk();
                    for spec in child.named_children(&mut inner) {
                        if spec.kind() != "export_specifier" {
                            continue;
                        }
                        let exported = spec
                            .child_by_field_name("alias")
                            .or_else(|| spec.child_by_field_name("name"));
                        if let Some(name_node) = exported {
                            let name = node_text(name_node, self.bytes).to_string();
                            if !name.is_empty() {
                                self.exports.insert(name);
                            }
                        }
                    }
                    handled = true;
                }
                kind if is_function_value(kind) || is_function_declaration(kind) => {
                    if is_default {
                        self.handle_declaration(child, true, true);
                        handled = true;
                    }
                }
                _ => {}
            }
        }
        if is_default && !handled {
            self.exports.insert("default".to_string());
        }
    }

    fn handle_import(&mut self, node: Node) {
        let Some(source_node) = node.child_by_field_name("source") else {
            return;
        };
        let mut descriptor = ImportDescriptor {
            specifier: string_value(source_node, self.bytes),
            names: BTreeSet::new(),
            has_namespace: false,
        };

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() != "import_clause" {
                continue;
            }
            let mut clause_cursor = child.walk();
            for part in child.named_children(&mut clause_cursor) {
                match part.kind() {
                    "identifier" => {
                        descriptor.names.insert("default".to_string());
                    }
                    "namespace_import" => {
                        descriptor.has_namespace = true;
                    }
                    "named_imports" => {
                        let mut spec_cursor = part.walk();
                        for spec in part.named_children(&mut spec_cursor) {
                            if spec.kind() != "import_specifier" {
                                continue;
                            }
                            if let Some(name_node) = spec.child_by_field_name("name") {
                                let name = node_text(name_node, self.bytes).to_string();
                                if !name.is_empty() {
                                    descriptor.names.insert(name);
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        self.imports.push(descriptor);
    }

    /// Record identifier call sites between top-level function-likes.
    fn collect_calls(&self, root: Node) -> Vec<(String, String)> {
        let name_to_id: FxHashMap<&str, &str> = self
            .symbols
            .iter()
            .filter(|s| s.kind.is_function_like())
            .map(|s| (s.name.as_str(), s.id.as_str()))
            .collect();
        if name_to_id.is_empty() {
            return Vec::new();
        }

        let mut calls = Vec::new();
        let mut seen: FxHashSet<(String, String)> = FxHashSet::default();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.kind() == "call_expression" {
                if let Some(func) = node.child_by_field_name("function") {
                    if func.kind() == "identifier" {
                        let callee_name = node_text(func, self.bytes);
                        if let Some(&callee_id) = name_to_id.get(callee_name) {
                            let call_start = node.start_byte();
                            let caller = self
                                .ranges
                                .iter()
                                .find(|r| r.start <= call_start && call_start < r.end);
                            if let Some(caller) = caller {
                                if caller.id != callee_id {
                                    let pair = (caller.id.clone(), callee_id.to_string());
                                    if seen.insert(pair.clone()) {
                                        calls.push(pair);
                                    }
                                }
                            }
                        }
                    }
                }
            }
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                stack.push(child);
            }
        }
        calls
    }
}

/// Parse JS/TS source and extract program-level symbols, intra-file
/// calls, and export/import descriptors.
pub fn parse_source(
    source: &str,
    path: &str,
    ext: &str,
    language_name: &str,
    cfg: &AnalyzeConfig,
) -> Result<ParsedFile> {
    let language = pick_language(ext);
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .context("Failed to set JS/TS language")?;
    let tree = parser
        .parse(source, None)
        .context("Failed to parse source")?;
    let root = tree.root_node();

    let mut extractor = Extractor {
        source,
        bytes: source.as_bytes(),
        path,
        language: language_name,
        cfg,
        symbols: Vec::new(),
        by_id: FxHashMap::default(),
        ranges: Vec::new(),
        exports: BTreeSet::new(),
        imports: Vec::new(),
    };

    let mut cursor = root.walk();
    let top_level: Vec<Node> = root.named_children(&mut cursor).collect();
    for node in top_level {
        match node.kind() {
            kind if is_function_declaration(kind) => {
                extractor.handle_declaration(node, false, false)
            }
            "class_declaration" | "lexical_declaration" | "variable_declaration" => {
                extractor.handle_declaration(node, false, false)
            }
            "export_statement" => extractor.handle_export(node),
            "import_statement" => extractor.handle_import(node),
            _ => {}
        }
    }

    let calls = extractor.collect_calls(root);
    Ok(ParsedFile {
        symbols: extractor.symbols,
        calls,
        exports: extractor.exports,
        imports: extractor.imports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str, ext: &str) -> ParsedFile {
        let language = if ext.starts_with("ts") {
            "TypeScript"
        } else {
            "JavaScript"
        };
        parse_source(source, "src/mod.ts", ext, language, &AnalyzeConfig::default()).unwrap()
    }

    #[test]
    fn test_extracts_top_level_declarations() {
        let source = r#"
export function loadData(a, b) { return a + b; }
function helper() { return 1; }
const format = (x) => x.trim();
class Store { get() { return 1; } }
"#;
        let parsed = parse(source, "ts");
        let ids: Vec<&str> = parsed.symbols.iter().map(|s| s.id.as_str()).collect();
        assert!(ids.contains(&"function:src/mod.ts#loadData"));
        assert!(ids.contains(&"function:src/mod.ts#helper"));
        assert!(ids.contains(&"function:src/mod.ts#format"));
        assert!(ids.contains(&"class:src/mod.ts#Store"));
    }

    #[test]
    fn test_uppercase_function_becomes_component() {
        let source = "function Widget() { return null; }\nconst Panel = () => null;\nclass Big {}\n";
        let parsed = parse(source, "jsx");
        let widget = parsed.symbols.iter().find(|s| s.name == "Widget").unwrap();
        assert_eq!(widget.kind, SymbolKind::Component);
        let panel = parsed.symbols.iter().find(|s| s.name == "Panel").unwrap();
        assert_eq!(panel.kind, SymbolKind::Component);
        // Classes keep their kind regardless of capitalization.
        let big = parsed.symbols.iter().find(|s| s.name == "Big").unwrap();
        assert_eq!(big.kind, SymbolKind::Class);
    }

    #[test]
    fn test_nested_functions_are_not_extracted() {
        let source = "function outer() {\n  function inner() {}\n  return inner;\n}\n";
        let parsed = parse(source, "js");
        assert_eq!(parsed.symbols.len(), 1);
        assert_eq!(parsed.symbols[0].name, "outer");
    }

    #[test]
    fn test_default_export_function() {
        let parsed = parse("export default function () { return 1; }\n", "js");
        assert_eq!(parsed.symbols.len(), 1);
        assert_eq!(parsed.symbols[0].name, "default");
        assert_eq!(parsed.symbols[0].kind, SymbolKind::Function);
        assert!(parsed.exports.contains("default"));
    }

    #[test]
    fn test_named_default_export_keeps_name() {
        let parsed = parse("export default function main() { return 1; }\n", "js");
        assert_eq!(parsed.symbols[0].name, "main");
        assert!(parsed.exports.contains("default"));
    }

    #[test]
    fn test_export_set_collects_names() {
        let source = r#"
export const limit = 10;
export function run() {}
const hidden = 1;
export { hidden as visible };
export { other } from './other';
"#;
        let parsed = parse(source, "ts");
        assert!(parsed.exports.contains("limit"));
        assert!(parsed.exports.contains("run"));
        assert!(parsed.exports.contains("visible"));
        // Re-exports are not attributed to this file.
        assert!(!parsed.exports.contains("other"));
    }

    #[test]
    fn test_import_descriptors() {
        let source = r#"
import def from './a';
import { one, two as alias } from './b';
import * as ns from './c';
import './side-effect';
"#;
        let parsed = parse(source, "js");
        assert_eq!(parsed.imports.len(), 4);

        let a = &parsed.imports[0];
        assert_eq!(a.specifier, "./a");
        assert!(a.names.contains("default"));

        let b = &parsed.imports[1];
        assert!(b.names.contains("one"));
        // The imported (original) name is recorded, not the alias.
        assert!(b.names.contains("two"));
        assert!(!b.names.contains("alias"));

        let c = &parsed.imports[2];
        assert!(c.has_namespace);

        let side = &parsed.imports[3];
        assert!(side.names.is_empty());
        assert!(!side.has_namespace);
    }

    #[test]
    fn test_intra_file_calls() {
        let source = r#"
function target() { return 1; }
function caller() { return target() + target(); }
function unrelated() { return 2; }
"#;
        let parsed = parse(source, "js");
        assert_eq!(
            parsed.calls,
            vec![(
                "function:src/mod.ts#caller".to_string(),
                "function:src/mod.ts#target".to_string()
            )]
        );
    }

    #[test]
    fn test_self_calls_are_ignored() {
        let parsed = parse("function rec() { return rec(); }\n", "js");
        assert!(parsed.calls.is_empty());
    }

    #[test]
    fn test_duplicate_ids_keep_longer_text() {
        let source = "function f() { return 1; }\nfunction f() { return 1 + 2 + 3 + 4; }\n";
        let parsed = parse(source, "js");
        assert_eq!(parsed.symbols.len(), 1);
        assert!(parsed.symbols[0].text.contains("1 + 2 + 3 + 4"));
    }

    #[test]
    fn test_line_spans_are_one_based() {
        let source = "\nfunction f() {\n  return 1;\n}\n";
        let parsed = parse(source, "js");
        assert_eq!(parsed.symbols[0].start_line, 2);
        assert_eq!(parsed.symbols[0].end_line, 4);
    }

    #[test]
    fn test_tsx_component() {
        let source = "export function App() { return <div>hi</div>; }\n";
        let parsed = parse(source, "tsx");
        assert_eq!(parsed.symbols[0].kind, SymbolKind::Component);
        assert!(parsed.exports.contains("App"));
    }
}
