//! `repolens snippet` handler.

use crate::snippet::read_snippet;
use anyhow::Result;
use std::path::Path;

pub fn run(root: &Path, file: &str, max_bytes: u64) -> Result<()> {
    let snippet = read_snippet(root, file, max_bytes)?;
    println!("{}", serde_json::to_string_pretty(&snippet)?);
    Ok(())
}
