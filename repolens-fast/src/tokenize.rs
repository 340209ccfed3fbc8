//! Comment stripping and tokenization.
//!
//! Tokens keep their byte offset and length in the original text so that
//! match segments can be mapped back to line numbers. Comment stripping
//! is length-preserving (newlines survive, every other comment byte
//! becomes a space), which keeps those offsets valid.

use regex::Regex;
use std::sync::OnceLock;

/// Hard cap on tokens extracted from a single symbol.
pub const MAX_TOKENS: usize = 5000;

/// A single token: lowercased word plus its position in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub offset: usize,
    pub len: usize,
}

fn block_comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid block comment regex"))
}

fn line_comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"//[^\n]*").expect("valid line comment regex"))
}

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z0-9_]+").expect("valid word regex"))
}

/// Replace comment bytes with spaces while preserving line layout.
///
/// Both `/* ... */` and `// ...` spans are blanked; newlines inside block
/// comments are kept so line numbers downstream stay correct. The result
/// always has the same byte length as the input.
pub fn strip_comments(source: &str) -> String {
    let mut bytes = source.as_bytes().to_vec();
    for re in [block_comment_re(), line_comment_re()] {
        // Matches are located on the current buffer so nested line
        // comments inside already-blanked blocks are not re-matched.
        let current = String::from_utf8_lossy(&bytes).into_owned();
        for m in re.find_iter(&current) {
            for i in m.start()..m.end() {
                if bytes[i] != b'\n' {
                    bytes[i] = b' ';
                }
            }
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Tokenize comment-stripped text into lowercased word tokens.
///
/// A lone `_` is dropped; everything else matching `[A-Za-z0-9_]+` is
/// kept. Output is capped at [`MAX_TOKENS`].
pub fn tokenize(stripped: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for m in word_re().find_iter(stripped) {
        if m.as_str() == "_" {
            continue;
        }
        tokens.push(Token {
            text: m.as_str().to_ascii_lowercase(),
            offset: m.start(),
            len: m.end() - m.start(),
        });
        if tokens.len() >= MAX_TOKENS {
            break;
        }
    }
    tokens
}

/// Byte offsets of the start of every line in `text`.
pub fn line_offsets(text: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            offsets.push(i + 1);
        }
    }
    offsets
}

/// Zero-based line index containing the given byte offset.
pub fn line_at(offsets: &[usize], byte: usize) -> usize {
    match offsets.binary_search(&byte) {
        Ok(line) => line,
        Err(insert) => insert.saturating_sub(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_preserves_length_and_newlines() {
        let src = "let a = 1; /* two\nlines */ let b = 2; // tail\nlet c = 3;";
        let out = strip_comments(src);
        assert_eq!(out.len(), src.len());
        assert_eq!(
            out.matches('\n').count(),
            src.matches('\n').count()
        );
        assert!(!out.contains("tail"));
        assert!(!out.contains("lines"));
        assert!(out.contains("let c = 3;"));
    }

    #[test]
    fn test_tokenize_lowercases_and_records_offsets() {
        let tokens = tokenize("Foo bar_Baz 42");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "foo");
        assert_eq!(tokens[0].offset, 0);
        assert_eq!(tokens[1].text, "bar_baz");
        assert_eq!(tokens[1].offset, 4);
        assert_eq!(tokens[2].text, "42");
        assert_eq!(tokens[2].len, 2);
    }

    #[test]
    fn test_tokenize_drops_lone_underscore() {
        let tokens = tokenize("a _ b __ c");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "__", "c"]);
    }

    #[test]
    fn test_tokenize_caps_token_count() {
        let big = "x ".repeat(MAX_TOKENS + 100);
        assert_eq!(tokenize(&big).len(), MAX_TOKENS);
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let src = "function add(a, b) { return a + b; }";
        assert_eq!(tokenize(src), tokenize(src));
    }

    #[test]
    fn test_line_lookup() {
        let text = "ab\ncd\nef";
        let offsets = line_offsets(text);
        assert_eq!(offsets, vec![0, 3, 6]);
        assert_eq!(line_at(&offsets, 0), 0);
        assert_eq!(line_at(&offsets, 2), 0);
        assert_eq!(line_at(&offsets, 3), 1);
        assert_eq!(line_at(&offsets, 7), 2);
    }
}
