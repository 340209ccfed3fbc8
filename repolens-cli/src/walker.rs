//! Bounded filesystem traversal.
//!
//! Depth-first walk with an explicit stack. Ignored directory/file names
//! are skipped, per-entry stat and readdir failures become warnings, and
//! the walk stops with `truncated = true` once `files + directories`
//! reaches the configured cap.

use crate::config::AnalyzeConfig;
use crate::models::{DirRecord, FileRecord, WalkResult, WalkWarning, WarningType};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::debug;

struct PendingDir {
    abs: PathBuf,
    rel: String,
    name: String,
    depth: usize,
}

fn mtime_ms(metadata: &Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn child_rel(parent_rel: &str, name: &str) -> String {
    if parent_rel == "." {
        name.to_string()
    } else {
        format!("{parent_rel}/{name}")
    }
}

fn lowercased_ext(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => String::new(),
    }
}

/// Walk `root`, producing files, directories, warnings and a truncation
/// flag. Entries are visited in name order within each directory.
pub fn walk(root: &Path, cfg: &AnalyzeConfig) -> WalkResult {
    let mut result = WalkResult::default();
    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".".to_string());

    let mut stack = vec![PendingDir {
        abs: root.to_path_buf(),
        rel: ".".to_string(),
        name: root_name,
        depth: 0,
    }];

    while let Some(dir) = stack.pop() {
        if result.files.len() + result.directories.len() >= cfg.max_entries {
            result.warnings.push(WalkWarning {
                warning_type: WarningType::LimitReached,
                path: dir.rel,
                error: None,
            });
            result.truncated = true;
            return result;
        }

        let dir_mtime = match std::fs::symlink_metadata(&dir.abs) {
            Ok(md) => mtime_ms(&md),
            Err(e) => {
                result.warnings.push(WalkWarning {
                    warning_type: WarningType::StatError,
                    path: dir.rel,
                    error: Some(e.to_string()),
                });
                continue;
            }
        };

        result.directories.push(DirRecord {
            path: dir.rel.clone(),
            name: dir.name.clone(),
            depth: dir.depth,
            mtime: dir_mtime,
        });

        let entries = match std::fs::read_dir(&dir.abs) {
            Ok(iter) => {
                let mut entries: Vec<_> = iter.filter_map(|e| e.ok()).collect();
                entries.sort_by_key(|e| e.file_name());
                entries
            }
            Err(e) => {
                result.warnings.push(WalkWarning {
                    warning_type: WarningType::ReadError,
                    path: dir.rel.clone(),
                    error: Some(e.to_string()),
                });
                continue;
            }
        };

        let mut subdirs: Vec<PendingDir> = Vec::new();
        for entry in entries {
            let name = entry.file_name().to_string_lossy().into_owned();
            let rel = child_rel(&dir.rel, &name);

            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(e) => {
                    result.warnings.push(WalkWarning {
                        warning_type: WarningType::StatError,
                        path: rel,
                        error: Some(e.to_string()),
                    });
                    continue;
                }
            };

            if file_type.is_dir() {
                if cfg.is_ignored_dir(&name, Some(&dir.name)) {
                    debug!("Skipping ignored directory {rel}");
                    continue;
                }
                subdirs.push(PendingDir {
                    abs: entry.path(),
                    rel,
                    name,
                    depth: dir.depth + 1,
                });
                continue;
            }

            if cfg.is_ignored_file(&name) {
                continue;
            }

            if result.files.len() + result.directories.len() >= cfg.max_entries {
                result.warnings.push(WalkWarning {
                    warning_type: WarningType::LimitReached,
                    path: rel,
                    error: None,
                });
                result.truncated = true;
                return result;
            }

            let metadata = match std::fs::symlink_metadata(entry.path()) {
                Ok(md) => md,
                Err(e) => {
                    result.warnings.push(WalkWarning {
                        warning_type: WarningType::StatError,
                        path: rel,
                        error: Some(e.to_string()),
                    });
                    continue;
                }
            };

            result.files.push(FileRecord {
                ext: lowercased_ext(&name),
                path: rel,
                name,
                size: metadata.len(),
                mtime: mtime_ms(&metadata),
                depth: dir.depth + 1,
                is_symbolic_link: file_type.is_symlink(),
            });
        }

        // Reverse so the stack pops subdirectories in name order.
        for sub in subdirs.into_iter().rev() {
            stack.push(sub);
        }
    }

    result
}
