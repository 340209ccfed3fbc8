//! k-gram hashing and winnowing (Moss/Aiken fingerprint selection).
//!
//! Every window of `k` consecutive tokens is folded into a single hash;
//! winnowing then selects the minimum hash of each sliding window of
//! those hashes, breaking ties toward the latest index and suppressing
//! adjacent duplicates. The tie-break direction is load-bearing: it is
//! what makes two independent runs pick identical fingerprints.

use crate::tokenize::Token;
use rustc_hash::FxHashMap;

/// Prime modulus for the rolling hash.
pub const HASH_MODULUS: u64 = 1_000_003;
/// Per-character multiplier.
const CHAR_MULTIPLIER: u64 = 31;
/// Mix applied between tokens inside a window.
const SEPARATOR_MIX: u64 = 131;

/// Maximum fingerprint indices retained per hash value.
pub const MAX_INDICES_PER_HASH: usize = 64;

/// Hash of one k-gram together with its starting token index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KgramHash {
    pub hash: u64,
    pub index: usize,
}

/// A winnowed (hash, index) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    pub hash: u64,
    pub index: usize,
}

fn hash_window(window: &[Token]) -> u64 {
    let mut h: u64 = 0;
    for (i, token) in window.iter().enumerate() {
        if i > 0 {
            h = (h * SEPARATOR_MIX) % HASH_MODULUS;
        }
        for byte in token.text.bytes() {
            h = (h * CHAR_MULTIPLIER + u64::from(byte)) % HASH_MODULUS;
        }
    }
    h
}

/// Hash every contiguous window of `k` tokens.
pub fn kgram_hashes(tokens: &[Token], k: usize) -> Vec<KgramHash> {
    if k == 0 || tokens.len() < k {
        return Vec::new();
    }
    (0..=tokens.len() - k)
        .map(|i| KgramHash {
            hash: hash_window(&tokens[i..i + k]),
            index: i,
        })
        .collect()
}

/// Select fingerprints with a sliding window of size `w`.
///
/// Within each window the minimum hash wins, ties going to the latest
/// index; the same selection is not emitted twice in a row. Streams no
/// longer than `w` contribute their single global minimum.
pub fn winnow(hashes: &[KgramHash], w: usize) -> Vec<Fingerprint> {
    if hashes.is_empty() {
        return Vec::new();
    }
    if w == 0 || hashes.len() <= w {
        let mut best = hashes[0];
        for h in &hashes[1..] {
            if h.hash <= best.hash {
                best = *h;
            }
        }
        return vec![Fingerprint {
            hash: best.hash,
            index: best.index,
        }];
    }

    let mut selected: Vec<Fingerprint> = Vec::new();
    let mut last_index: Option<usize> = None;
    for start in 0..=hashes.len() - w {
        let mut best = hashes[start];
        for h in &hashes[start + 1..start + w] {
            // `<=` implements the latest-index tie-break.
            if h.hash <= best.hash {
                best = *h;
            }
        }
        if last_index != Some(best.index) {
            selected.push(Fingerprint {
                hash: best.hash,
                index: best.index,
            });
            last_index = Some(best.index);
        }
    }
    selected
}

/// Index fingerprints by hash, keeping at most
/// [`MAX_INDICES_PER_HASH`] token indices per hash value.
pub fn fingerprint_index(fingerprints: &[Fingerprint]) -> FxHashMap<u64, Vec<usize>> {
    let mut index: FxHashMap<u64, Vec<usize>> = FxHashMap::default();
    for fp in fingerprints {
        let entry = index.entry(fp.hash).or_default();
        if entry.len() < MAX_INDICES_PER_HASH {
            entry.push(fp.index);
        }
    }
    index
}
