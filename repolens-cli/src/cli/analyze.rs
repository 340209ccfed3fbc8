//! `repolens analyze` handler.

use crate::config::AnalyzeConfig;
use crate::pipeline;
use crate::reporters;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

pub fn run(
    path: &Path,
    format: &str,
    output: Option<&Path>,
    max_entries: Option<usize>,
    clone_threshold: Option<f64>,
) -> Result<()> {
    let mut cfg = AnalyzeConfig::default();
    if let Some(max_entries) = max_entries {
        cfg = cfg.with_max_entries(max_entries);
    }
    if let Some(threshold) = clone_threshold {
        cfg = cfg.with_clone_threshold(threshold);
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("valid spinner template"),
    );
    spinner.set_message(format!("Analyzing {}", path.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let report = pipeline::analyze(path, &cfg);
    spinner.finish_and_clear();
    let report = report?;

    let rendered = match format {
        "json" => reporters::json::render(&report)?,
        _ => reporters::text::render(&report)?,
    };

    match output {
        Some(output) => {
            std::fs::write(output, &rendered)?;
            eprintln!("Report written to {}", output.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
