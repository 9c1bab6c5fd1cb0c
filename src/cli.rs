//! Command-line interface for pyfacts.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::files;
use crate::report::Report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Python source statistics extractor.
///
/// Pyfacts parses Python sources, classifies the recognized constructs into
/// typed entities with usage records, and reports per-file statistics:
/// category counts, a per-line kind view, and notices for everything the
/// recognizer does not cover.
#[derive(Parser)]
#[command(name = "pyfacts")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a file or directory tree of Python sources.
    Scan(ScanArgs),
}

#[derive(clap::Args)]
pub struct ScanArgs {
    /// File or directory to analyze.
    pub path: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Analyze files one after another instead of across the thread pool.
    #[arg(long)]
    pub sequential: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

pub fn run_scan(args: &ScanArgs) -> Result<i32> {
    let found = files::collect_python_files(&args.path)?;
    info!(path = %args.path.display(), files = found.len(), "starting scan");

    let analyses = if args.sequential {
        files::analyze_files(&found)?
    } else {
        files::analyze_files_parallel(&found)?
    };

    let report = Report::new(&analyses);
    match args.format {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Pretty => report.write_pretty(&mut io::stdout().lock())?,
    }
    Ok(EXIT_SUCCESS)
}
