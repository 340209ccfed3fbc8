//! Analysis configuration and limits.

use std::collections::BTreeSet;

pub const KIB: u64 = 1024;

/// Recognized options for a single analysis run, with their defaults.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// Traversal cap on `files + directories`.
    pub max_entries: usize,
    /// Metrics pass skips files larger than this.
    pub metrics_max_file_size: u64,
    /// Dependency extraction skips files larger than this.
    pub deps_max_file_size: u64,
    /// AST/symbol pass skips files larger than this.
    pub ast_max_file_bytes: u64,
    /// Per-symbol snippet text cap.
    pub symbol_text_max_bytes: usize,
    /// Minimum similarity for a clone pair to be reported.
    pub clone_threshold: f64,
    /// Tokens per k-gram.
    pub shingle_size: usize,
    /// Winnowing window.
    pub window_size: usize,
    /// Cap on pairwise clone comparisons.
    pub max_pairs: usize,
    /// Cap on extended matches per symbol pair.
    pub max_matches_per_pair: usize,
    /// Directory names skipped by the walker.
    pub ignored_dirs: BTreeSet<String>,
    /// File names skipped by the walker.
    pub ignored_files: BTreeSet<String>,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        let ignored_dirs = [
            ".git",
            ".hg",
            ".svn",
            "node_modules",
            "vendor",
            "dist",
            "build",
            ".cache",
            ".next",
            ".nuxt",
            ".idea",
            ".vscode",
            "coverage",
            "__pycache__",
            "ios/Pods",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let ignored_files = [".DS_Store", "Thumbs.db"]
            .into_iter()
            .map(String::from)
            .collect();

        Self {
            max_entries: 2000,
            metrics_max_file_size: 512 * KIB,
            deps_max_file_size: 256 * KIB,
            ast_max_file_bytes: 256 * KIB,
            symbol_text_max_bytes: 128 * KIB as usize,
            clone_threshold: 0.55,
            shingle_size: 3,
            window_size: 4,
            max_pairs: 250_000,
            max_matches_per_pair: 200,
            ignored_dirs,
            ignored_files,
        }
    }
}

impl AnalyzeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_clone_threshold(mut self, threshold: f64) -> Self {
        self.clone_threshold = threshold;
        self
    }

    /// Whether a directory entry should be skipped. Entries match by
    /// bare name; compound entries like `ios/Pods` match a directory
    /// whose parent has the given name.
    pub fn is_ignored_dir(&self, name: &str, parent_name: Option<&str>) -> bool {
        if self.ignored_dirs.contains(name) {
            return true;
        }
        if let Some(parent) = parent_name {
            return self.ignored_dirs.contains(&format!("{parent}/{name}"));
        }
        false
    }

    pub fn is_ignored_file(&self, name: &str) -> bool {
        self.ignored_files.contains(name)
    }
}
