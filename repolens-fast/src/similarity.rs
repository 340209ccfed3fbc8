//! Similarity scoring: Dice coefficient and greedy match extension.
//!
//! Fingerprint collisions only seed a match; the real overlap is found by
//! extending each seed left and right while tokens stay equal, then
//! merging the resulting segments per side.

use crate::tokenize::Token;
use rustc_hash::FxHashMap;

/// An inclusive token-index range on one side of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

/// A seed match extended over both token streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSeed {
    pub a: Segment,
    pub b: Segment,
}

/// Multiset counts of token texts.
pub fn token_counts(tokens: &[Token]) -> FxHashMap<String, u32> {
    let mut counts: FxHashMap<String, u32> = FxHashMap::default();
    for t in tokens {
        *counts.entry(t.text.clone()).or_insert(0) += 1;
    }
    counts
}

/// Dice coefficient over token multisets:
/// `2 * sum(min(countA, countB)) / (|A| + |B|)`.
pub fn dice_coefficient(
    a_counts: &FxHashMap<String, u32>,
    a_len: usize,
    b_counts: &FxHashMap<String, u32>,
    b_len: usize,
) -> f64 {
    if a_len == 0 || b_len == 0 {
        return 0.0;
    }
    let mut shared: u64 = 0;
    for (text, &ca) in a_counts {
        if let Some(&cb) = b_counts.get(text) {
            shared += u64::from(ca.min(cb));
        }
    }
    (2.0 * shared as f64) / ((a_len + b_len) as f64)
}

/// Extend a k-gram collision at `(ia, ib)` greedily in both directions
/// while tokens are equal.
pub fn extend_match(a: &[Token], b: &[Token], ia: usize, ib: usize, k: usize) -> MatchSeed {
    let mut a_start = ia;
    let mut b_start = ib;
    let mut a_end = (ia + k - 1).min(a.len() - 1);
    let mut b_end = (ib + k - 1).min(b.len() - 1);

    while a_start > 0 && b_start > 0 && a[a_start - 1].text == b[b_start - 1].text {
        a_start -= 1;
        b_start -= 1;
    }
    while a_end + 1 < a.len() && b_end + 1 < b.len() && a[a_end + 1].text == b[b_end + 1].text {
        a_end += 1;
        b_end += 1;
    }

    MatchSeed {
        a: Segment { start: a_start, end: a_end },
        b: Segment { start: b_start, end: b_end },
    }
}

/// Merge overlapping or adjacent segments; output is sorted by start.
pub fn merge_segments(mut segments: Vec<Segment>) -> Vec<Segment> {
    if segments.is_empty() {
        return segments;
    }
    segments.sort_by_key(|s| (s.start, s.end));
    let mut merged = vec![segments[0]];
    for seg in segments.into_iter().skip(1) {
        let last = merged.last_mut().expect("merged is non-empty");
        if seg.start <= last.end + 1 {
            last.end = last.end.max(seg.end);
        } else {
            merged.push(seg);
        }
    }
    merged
}

/// Total token count covered by a set of merged segments.
pub fn covered_tokens(segments: &[Segment]) -> usize {
    segments.iter().map(Segment::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::tokenize;

    #[test]
    fn test_dice_identical() {
        let tokens = tokenize("a b c a");
        let counts = token_counts(&tokens);
        let d = dice_coefficient(&counts, tokens.len(), &counts, tokens.len());
        assert!((d - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_dice_disjoint() {
        let a = tokenize("a b c");
        let b = tokenize("x y z");
        let d = dice_coefficient(&token_counts(&a), a.len(), &token_counts(&b), b.len());
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_dice_partial() {
        let a = tokenize("a a b");
        let b = tokenize("a c c");
        // shared = min(2,1) for "a" = 1; 2*1 / (3+3) = 1/3
        let d = dice_coefficient(&token_counts(&a), a.len(), &token_counts(&b), b.len());
        assert!((d - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_extend_match_grows_both_directions() {
        let a = tokenize("p q r s t u");
        let b = tokenize("x q r s t y");
        // Seed at the "r s t" k-gram (a index 2, b index 2).
        let seed = extend_match(&a, &b, 2, 2, 3);
        assert_eq!(seed.a, Segment { start: 1, end: 4 });
        assert_eq!(seed.b, Segment { start: 1, end: 4 });
    }

    #[test]
    fn test_extend_match_stops_at_bounds() {
        let a = tokenize("q r s");
        let b = tokenize("q r s");
        let seed = extend_match(&a, &b, 0, 0, 3);
        assert_eq!(seed.a, Segment { start: 0, end: 2 });
        assert_eq!(seed.b, Segment { start: 0, end: 2 });
    }

    #[test]
    fn test_merge_overlapping_and_adjacent() {
        let merged = merge_segments(vec![
            Segment { start: 5, end: 9 },
            Segment { start: 0, end: 3 },
            Segment { start: 4, end: 6 },
            Segment { start: 20, end: 22 },
        ]);
        assert_eq!(
            merged,
            vec![Segment { start: 0, end: 9 }, Segment { start: 20, end: 22 }]
        );
        assert_eq!(covered_tokens(&merged), 13);
    }
}
