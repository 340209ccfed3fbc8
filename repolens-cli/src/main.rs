//! repolens - project structure, quality and clone analysis CLI
//!
//! A fast, local-first tool that walks a project tree and produces a
//! structured report of its files, architecture, quality metrics and
//! near-duplicate functions.

use anyhow::Result;
use clap::Parser;
use repolens_cli::cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Parse CLI args and run
    let cli = cli::Cli::parse();
    cli::run(cli)
}
