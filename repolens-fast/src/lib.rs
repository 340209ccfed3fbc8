//! Pure computational kernels for the repolens clone detector.
//!
//! Everything in this crate is a deterministic function of its inputs:
//! comment stripping, tokenization, k-gram hashing, winnowing and
//! similarity scoring carry no I/O and no shared state, so callers are
//! free to fan out over symbol pairs and merge results in a stable order.

pub mod fingerprint;
pub mod similarity;
pub mod tokenize;

pub use fingerprint::{kgram_hashes, winnow, Fingerprint, KgramHash};
pub use similarity::{dice_coefficient, extend_match, merge_segments, MatchSeed, Segment};
pub use tokenize::{line_at, line_offsets, strip_comments, tokenize, Token};
