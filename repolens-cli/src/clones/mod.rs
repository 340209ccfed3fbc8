//! Near-duplicate function detection.
//!
//! Function-like symbols are tokenized, shingled and winnowed by the
//! kernels in `repolens-fast`. Pairs that share fingerprint hashes get
//! their matches extended and merged into segments; pairs that share
//! nothing fall back to the Dice coefficient alone. Qualifying pairs are
//! reported in both directions with equal similarity.

use crate::config::AnalyzeConfig;
use crate::models::{CloneEntry, Symbol};
use rayon::prelude::*;
use repolens_fast::fingerprint::{fingerprint_index, kgram_hashes, winnow, Fingerprint};
use repolens_fast::similarity::{
    covered_tokens, dice_coefficient, extend_match, merge_segments, token_counts, Segment,
};
use repolens_fast::tokenize::{line_at, line_offsets, strip_comments, tokenize, Token};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::info;

/// Minimum tokens for a symbol to participate.
const MIN_TOKENS: usize = 5;

struct PreparedSymbol {
    id: String,
    path: String,
    start_line: usize,
    end_line: usize,
    language: Option<String>,
    tokens: Vec<Token>,
    counts: FxHashMap<String, u32>,
    fingerprints: Vec<Fingerprint>,
    fp_index: FxHashMap<u64, Vec<usize>>,
    line_offsets: Vec<usize>,
}

/// Normalize a language for pair compatibility. The whole JS/TS family
/// compares as one group.
fn normalize_language(language: Option<&str>) -> Option<String> {
    let language = language?;
    let lower = language.to_ascii_lowercase();
    match lower.as_str() {
        "javascript" | "typescript" | "js" | "ts" | "jsx" | "tsx" => {
            Some("js-family".to_string())
        }
        _ => Some(lower),
    }
}

fn languages_compatible(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        // Unknown languages are permissive.
        _ => true,
    }
}

fn prepare(symbol: &Symbol, cfg: &AnalyzeConfig) -> Option<PreparedSymbol> {
    let stripped = strip_comments(&symbol.text);
    let tokens = tokenize(&stripped);
    if tokens.len() < MIN_TOKENS {
        return None;
    }
    let hashes = kgram_hashes(&tokens, cfg.shingle_size);
    let fingerprints = winnow(&hashes, cfg.window_size);
    let fp_index = fingerprint_index(&fingerprints);
    let counts = token_counts(&tokens);
    let line_offsets = line_offsets(&symbol.text);

    Some(PreparedSymbol {
        id: symbol.id.clone(),
        path: symbol.path.clone(),
        start_line: symbol.start_line,
        end_line: symbol.end_line,
        language: normalize_language(symbol.language.as_deref()),
        tokens,
        counts,
        fingerprints,
        fp_index,
        line_offsets,
    })
}

/// Map merged token segments back to absolute line numbers. Falls back
/// to the symbol's own span when no segments exist (Dice-only match).
fn segment_lines(symbol: &PreparedSymbol, segments: &[Segment]) -> (usize, usize) {
    let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
        return (symbol.start_line, symbol.end_line);
    };
    let start_token = &symbol.tokens[first.start];
    let end_token = &symbol.tokens[last.end];
    let start_line =
        symbol.start_line + line_at(&symbol.line_offsets, start_token.offset);
    let end_line = symbol.start_line
        + line_at(
            &symbol.line_offsets,
            end_token.offset + end_token.len.saturating_sub(1),
        );
    (start_line, end_line)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

struct PairMatch {
    a: usize,
    b: usize,
    similarity: f64,
    a_lines: (usize, usize),
    b_lines: (usize, usize),
}

fn compare_pair(
    a: &PreparedSymbol,
    b: &PreparedSymbol,
    cfg: &AnalyzeConfig,
) -> Option<(f64, (usize, usize), (usize, usize))> {
    let dice = dice_coefficient(&a.counts, a.tokens.len(), &b.counts, b.tokens.len());

    // Seed matches from shared fingerprint hashes, in the emission
    // order of A's fingerprints.
    let mut a_segments: Vec<Segment> = Vec::new();
    let mut b_segments: Vec<Segment> = Vec::new();
    let mut seen_hashes: rustc_hash::FxHashSet<u64> = rustc_hash::FxHashSet::default();
    let mut matches = 0usize;
    'outer: for fp in &a.fingerprints {
        if !seen_hashes.insert(fp.hash) {
            continue;
        }
        let Some(b_indices) = b.fp_index.get(&fp.hash) else {
            continue;
        };
        let a_indices = &a.fp_index[&fp.hash];
        for &ia in a_indices {
            for &ib in b_indices {
                if matches >= cfg.max_matches_per_pair {
                    break 'outer;
                }
                matches += 1;
                let seed = extend_match(&a.tokens, &b.tokens, ia, ib, cfg.shingle_size);
                a_segments.push(seed.a);
                b_segments.push(seed.b);
            }
        }
    }

    let mut similarity = dice;
    let mut a_lines = (a.start_line, a.end_line);
    let mut b_lines = (b.start_line, b.end_line);

    if !a_segments.is_empty() {
        let merged_a = merge_segments(a_segments);
        let merged_b = merge_segments(b_segments);
        let overlap = covered_tokens(&merged_a).min(covered_tokens(&merged_b));
        let denominator = a.tokens.len().max(b.tokens.len());
        let segment_similarity = overlap as f64 / denominator as f64;
        if segment_similarity > similarity {
            similarity = segment_similarity;
        }
        a_lines = segment_lines(a, &merged_a);
        b_lines = segment_lines(b, &merged_b);
    }

    if similarity >= cfg.clone_threshold {
        Some((round2(similarity), a_lines, b_lines))
    } else {
        None
    }
}

/// Detect near-duplicate function-like symbols.
///
/// Returns directed clone entries keyed by source symbol id; every
/// qualifying pair appears under both symbols with equal similarity.
pub fn detect_clones(symbols: &[Symbol], cfg: &AnalyzeConfig) -> BTreeMap<String, Vec<CloneEntry>> {
    let prepared: Vec<PreparedSymbol> = symbols
        .par_iter()
        .filter(|s| s.kind.is_function_like())
        .filter_map(|s| prepare(s, cfg))
        .collect();

    // Enumerate candidate pairs in input order, bounded by max_pairs.
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    'pairs: for i in 0..prepared.len() {
        for j in i + 1..prepared.len() {
            if pairs.len() >= cfg.max_pairs {
                break 'pairs;
            }
            if languages_compatible(&prepared[i].language, &prepared[j].language) {
                pairs.push((i, j));
            }
        }
    }

    let matches: Vec<PairMatch> = pairs
        .par_iter()
        .filter_map(|&(i, j)| {
            compare_pair(&prepared[i], &prepared[j], cfg).map(|(similarity, a_lines, b_lines)| {
                PairMatch {
                    a: i,
                    b: j,
                    similarity,
                    a_lines,
                    b_lines,
                }
            })
        })
        .collect();

    let mut clones: BTreeMap<String, Vec<CloneEntry>> = BTreeMap::new();
    for m in &matches {
        let a = &prepared[m.a];
        let b = &prepared[m.b];
        clones.entry(a.id.clone()).or_default().push(CloneEntry {
            target_id: b.id.clone(),
            file_path: b.path.clone(),
            start_line: m.b_lines.0,
            end_line: m.b_lines.1,
            similarity: m.similarity,
        });
        clones.entry(b.id.clone()).or_default().push(CloneEntry {
            target_id: a.id.clone(),
            file_path: a.path.clone(),
            start_line: m.a_lines.0,
            end_line: m.a_lines.1,
            similarity: m.similarity,
        });
    }

    info!(
        "Clone detection: {} prepared symbols, {} pairs compared, {} matches",
        prepared.len(),
        pairs.len(),
        matches.len()
    );
    clones
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SymbolKind;

    fn function_symbol(path: &str, name: &str, start_line: usize, text: &str) -> Symbol {
        let line_count = text.lines().count().max(1);
        Symbol {
            id: Symbol::make_id(SymbolKind::Function, path, name),
            file_id: format!("file:{path}"),
            name: name.to_string(),
            kind: SymbolKind::Function,
            path: path.to_string(),
            language: Some("JavaScript".to_string()),
            start_line,
            end_line: start_line + line_count - 1,
            text: text.to_string(),
        }
    }

    fn long_function_text(name: &str) -> String {
        let mut body = format!("function {name}(items, options) {{\n");
        for i in 0..30 {
            body.push_str(&format!(
                "  const value{i} = items[{i}] * options.scale + {i};\n"
            ));
        }
        body.push_str("  return items.length;\n}\n");
        body
    }

    #[test]
    fn test_identical_functions_are_mutual_clones() {
        let a = function_symbol("a.js", "first", 1, &long_function_text("first"));
        let b = function_symbol("b.js", "second", 1, &long_function_text("second"));
        let clones = detect_clones(&[a.clone(), b.clone()], &AnalyzeConfig::default());

        let from_a = clones.get(&a.id).expect("entries under first symbol");
        let from_b = clones.get(&b.id).expect("entries under second symbol");
        assert_eq!(from_a.len(), 1);
        assert_eq!(from_b.len(), 1);
        assert_eq!(from_a[0].target_id, b.id);
        assert_eq!(from_b[0].target_id, a.id);
        assert!(from_a[0].similarity >= 0.55);
        assert_eq!(from_a[0].similarity, from_b[0].similarity);
    }

    #[test]
    fn test_unrelated_functions_do_not_match() {
        let a = function_symbol(
            "a.js",
            "parse",
            1,
            "function parse(input) { return input.split(',').map(Number); }",
        );
        let b = function_symbol(
            "b.js",
            "render",
            1,
            "function render(widget) { widget.canvas.drawCircle(radius, color); }",
        );
        let clones = detect_clones(&[a, b], &AnalyzeConfig::default());
        assert!(clones.is_empty());
    }

    #[test]
    fn test_five_token_boundary() {
        // Exactly five tokens participates; four does not.
        let five = function_symbol("a.js", "five", 1, "alpha beta gamma delta epsilon");
        let five_too = function_symbol("b.js", "fivetoo", 1, "alpha beta gamma delta epsilon");
        let clones = detect_clones(&[five, five_too], &AnalyzeConfig::default());
        assert_eq!(clones.len(), 2);

        let four = function_symbol("a.js", "four", 1, "alpha beta gamma delta");
        let four_too = function_symbol("b.js", "fourtoo", 1, "alpha beta gamma delta");
        let clones = detect_clones(&[four, four_too], &AnalyzeConfig::default());
        assert!(clones.is_empty());
    }

    #[test]
    fn test_non_function_symbols_are_excluded() {
        let text = long_function_text("same");
        let mut a = function_symbol("a.js", "same", 1, &text);
        a.kind = SymbolKind::Class;
        a.id = Symbol::make_id(SymbolKind::Class, "a.js", "same");
        let mut b = function_symbol("b.js", "same", 1, &text);
        b.kind = SymbolKind::File;
        b.id = Symbol::make_id(SymbolKind::File, "b.js", "__file__");
        let clones = detect_clones(&[a, b], &AnalyzeConfig::default());
        assert!(clones.is_empty());
    }

    #[test]
    fn test_language_mismatch_is_not_compared() {
        let text = long_function_text("same");
        let a = function_symbol("a.js", "same", 1, &text);
        let mut b = function_symbol("b.py", "same", 1, &text);
        b.language = Some("Python".to_string());
        let clones = detect_clones(&[a, b], &AnalyzeConfig::default());
        assert!(clones.is_empty());
    }

    #[test]
    fn test_js_and_ts_compare_as_one_family() {
        let text = long_function_text("shared");
        let a = function_symbol("a.js", "shared", 1, &text);
        let mut b = function_symbol("b.ts", "shared", 1, &text);
        b.language = Some("TypeScript".to_string());
        let clones = detect_clones(&[a, b], &AnalyzeConfig::default());
        assert_eq!(clones.len(), 2);
    }

    #[test]
    fn test_comments_do_not_defeat_matching() {
        let plain = long_function_text("one");
        let commented = plain.replace(
            "  return items.length;\n",
            "  // tail note\n  return items.length;\n",
        );
        let a = function_symbol("a.js", "one", 1, &plain);
        let b = function_symbol("b.js", "two", 1, &commented);
        let clones = detect_clones(&[a, b], &AnalyzeConfig::default());
        assert_eq!(clones.len(), 2);
    }

    #[test]
    fn test_similarity_is_rounded_to_two_decimals() {
        let a = function_symbol("a.js", "one", 1, &long_function_text("one"));
        let b = function_symbol("b.js", "two", 1, &long_function_text("two"));
        let clones = detect_clones(&[a.clone(), b], &AnalyzeConfig::default());
        let entry = &clones.get(&a.id).unwrap()[0];
        let scaled = entry.similarity * 100.0;
        assert!((scaled - scaled.round()).abs() < 1e-9);
    }

    #[test]
    fn test_target_line_ranges_reflect_target_position() {
        let a = function_symbol("a.js", "one", 1, &long_function_text("one"));
        // Same body but the symbol starts further down its file.
        let b = function_symbol("b.js", "two", 41, &long_function_text("two"));
        let clones = detect_clones(&[a.clone(), b.clone()], &AnalyzeConfig::default());

        let entry_under_a = &clones.get(&a.id).unwrap()[0];
        assert!(entry_under_a.start_line >= 41);
        assert!(entry_under_a.end_line <= b.end_line);

        let entry_under_b = &clones.get(&b.id).unwrap()[0];
        assert!(entry_under_b.start_line >= 1);
        assert!(entry_under_b.end_line <= a.end_line);
    }
}
