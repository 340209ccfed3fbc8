//! Byte-bounded source snippet reads for the presentation layer.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

const MIN_SNIPPET_BYTES: u64 = 1024;
const MAX_SNIPPET_BYTES: u64 = 512 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub path: String,
    pub size: u64,
    pub content: String,
    pub truncated: bool,
}

/// Read the first `max_bytes` (clamped to 1 KiB..512 KiB) of a file
/// inside `root`. Paths escaping the root are rejected.
pub fn read_snippet(root: &Path, rel_path: &str, max_bytes: u64) -> Result<Snippet> {
    let max_bytes = max_bytes.clamp(MIN_SNIPPET_BYTES, MAX_SNIPPET_BYTES);

    let root = std::fs::canonicalize(root)
        .with_context(|| format!("Invalid root {}", root.display()))?;
    let target = std::fs::canonicalize(root.join(rel_path))
        .with_context(|| format!("No such file: {rel_path}"))?;
    if !target.starts_with(&root) {
        bail!("Permission denied: {rel_path} escapes the analyzed root");
    }

    let metadata = std::fs::metadata(&target)?;
    let size = metadata.len();
    let to_read = size.min(max_bytes);

    let mut buffer = Vec::with_capacity(to_read as usize);
    std::fs::File::open(&target)?
        .take(to_read)
        .read_to_end(&mut buffer)?;

    Ok(Snippet {
        path: rel_path.to_string(),
        size,
        content: String::from_utf8_lossy(&buffer).into_owned(),
        truncated: size > max_bytes,
    })
}
