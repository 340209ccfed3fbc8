//! Source parsing and symbol extraction.
//!
//! The JS/TypeScript family gets a real tree-sitter AST pass. Every
//! other recognized source language (and any file the parser fails on)
//! receives a single file-scope fallback symbol so downstream passes
//! still have a unit to work with.

pub mod typescript;

use crate::config::AnalyzeConfig;
use crate::models::{FileRecord, ImportDescriptor, Symbol, SymbolKind};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Everything the AST pass produces for one file.
#[derive(Debug, Default)]
pub struct ParsedFile {
    pub symbols: Vec<Symbol>,
    /// `(caller symbol id, callee symbol id)` pairs, de-duplicated.
    pub calls: Vec<(String, String)>,
    pub exports: BTreeSet<String>,
    pub imports: Vec<ImportDescriptor>,
}

/// Extensions handled by the tree-sitter JS/TS pass.
pub fn is_js_family(ext: &str) -> bool {
    matches!(ext, "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx")
}

/// Map a lowercased extension to a display language.
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "js" | "jsx" | "mjs" | "cjs" => Some("JavaScript"),
        "ts" | "tsx" => Some("TypeScript"),
        "py" | "pyi" => Some("Python"),
        "go" => Some("Go"),
        "rs" => Some("Rust"),
        "java" => Some("Java"),
        "kt" | "kts" => Some("Kotlin"),
        "swift" => Some("Swift"),
        "c" | "h" => Some("C"),
        "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Some("C++"),
        "cs" => Some("C#"),
        "rb" => Some("Ruby"),
        "php" => Some("PHP"),
        "scala" => Some("Scala"),
        "sh" | "bash" | "zsh" => Some("Shell"),
        "vue" => Some("Vue"),
        "svelte" => Some("Svelte"),
        "html" | "htm" => Some("HTML"),
        "css" => Some("CSS"),
        "scss" | "sass" | "less" => Some("SCSS"),
        "json" => Some("JSON"),
        "yml" | "yaml" => Some("YAML"),
        "toml" => Some("TOML"),
        "xml" => Some("XML"),
        "md" | "markdown" => Some("Markdown"),
        "sql" => Some("SQL"),
        _ => None,
    }
}

/// Languages that get a file-scope fallback symbol when no AST pass
/// applies. Markup and data formats are excluded.
fn is_source_language(language: &str) -> bool {
    !matches!(
        language,
        "HTML" | "CSS" | "SCSS" | "JSON" | "YAML" | "TOML" | "XML" | "Markdown"
    )
}

/// Truncate to at most `max` bytes on a char boundary.
pub fn truncate_text(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn fallback_symbol(file: &FileRecord, content: &str, cfg: &AnalyzeConfig) -> Symbol {
    let line_count = content.bytes().filter(|&b| b == b'\n').count() + 1;
    Symbol {
        id: format!("file:{}#__file__", file.path),
        file_id: format!("file:{}", file.path),
        name: "__file__".to_string(),
        kind: SymbolKind::File,
        path: file.path.clone(),
        language: language_for_extension(&file.ext).map(String::from),
        start_line: 1,
        end_line: line_count,
        text: truncate_text(content, cfg.symbol_text_max_bytes).to_string(),
    }
}

/// Parse one file into symbols, calls and export/import descriptors.
///
/// Files above the AST byte cap yield nothing at all; non-JS source
/// files and AST failures yield the fallback file-scope symbol.
pub fn parse_file(root: &Path, file: &FileRecord, cfg: &AnalyzeConfig) -> ParsedFile {
    if file.size > cfg.ast_max_file_bytes {
        debug!("Skipping AST pass for oversize file {}", file.path);
        return ParsedFile::default();
    }

    let language = match language_for_extension(&file.ext) {
        Some(language) => language,
        None => return ParsedFile::default(),
    };

    let content = match std::fs::read_to_string(root.join(&file.path)) {
        Ok(content) => content,
        Err(e) => {
            debug!("Could not read {} for symbol extraction: {}", file.path, e);
            return ParsedFile::default();
        }
    };

    if is_js_family(&file.ext) {
        match typescript::parse_source(&content, &file.path, &file.ext, language, cfg) {
            Ok(parsed) => return parsed,
            Err(e) => {
                debug!("AST parse failed for {} ({}), using fallback", file.path, e);
                return ParsedFile {
                    symbols: vec![fallback_symbol(file, &content, cfg)],
                    ..ParsedFile::default()
                };
            }
        }
    }

    if is_source_language(language) {
        return ParsedFile {
            symbols: vec![fallback_symbol(file, &content, cfg)],
            ..ParsedFile::default()
        };
    }

    ParsedFile::default()
}
