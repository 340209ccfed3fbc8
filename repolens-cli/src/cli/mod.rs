//! CLI command definitions and handlers

mod analyze;
mod snippet;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// repolens - project structure, quality and clone analysis
///
/// 100% local. No data leaves your machine.
#[derive(Parser, Debug)]
#[command(name = "repolens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a project and emit the report
    Analyze {
        /// Path to the project root
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Traversal entry cap
        #[arg(long)]
        max_entries: Option<usize>,

        /// Minimum similarity for clone reporting (0.0 - 1.0)
        #[arg(long)]
        clone_threshold: Option<f64>,
    },

    /// Print a byte-bounded slice of one file
    Snippet {
        /// File path relative to the project root
        file: String,

        /// Path to the project root
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Maximum bytes to return (clamped to 1 KiB..512 KiB)
        #[arg(long, default_value = "65536")]
        max_bytes: u64,
    },

    /// Show version info
    Version,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Analyze {
            path,
            format,
            output,
            max_entries,
            clone_threshold,
        }) => analyze::run(
            &path,
            &format,
            output.as_deref(),
            max_entries,
            clone_threshold,
        ),

        Some(Commands::Snippet {
            file,
            root,
            max_bytes,
        }) => snippet::run(&root, &file, max_bytes),

        Some(Commands::Version) => {
            println!("repolens {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }

        None => analyze::run(&PathBuf::from("."), "text", None, None, None),
    }
}
