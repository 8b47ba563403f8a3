//! Command-line interface module for dirsort.
//!
//! This module handles:
//! - Argument parsing
//! - Merging the configuration file with command-line overrides
//! - Running the sort and printing the closing statistics

use crate::config::{ConfigError, FailurePolicy, SortConfig, SortOptions, TransferMode};
use crate::output::OutputFormatter;
use crate::sorter::{SortReport, sort_directory_with_progress};
use clap::Parser;
use std::path::PathBuf;

/// Copy every file under a directory into per-extension folders next to it.
#[derive(Debug, Parser)]
#[command(name = "dirsort", version, about)]
pub struct Cli {
    /// Directory to sort.
    pub path: PathBuf,

    /// Copy files (default) or move them out of the source tree.
    #[arg(long, value_enum)]
    pub mode: Option<TransferMode>,

    /// Stop at the first failure (default) or keep going.
    #[arg(long, value_enum)]
    pub on_error: Option<FailurePolicy>,

    /// Configuration file to use instead of the default lookup.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show debug diagnostics on stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolves the effective options: built-in defaults, then the config
    /// file, then command-line flags.
    pub fn options(&self) -> Result<SortOptions, ConfigError> {
        let mut options = SortConfig::load(self.config.as_deref())?.sort;
        if let Some(mode) = self.mode {
            options.transfer = mode;
        }
        if let Some(on_error) = self.on_error {
            options.on_error = on_error;
        }
        Ok(options)
    }
}

/// Runs a sort as requested on the command line.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use dirsort::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["dirsort", "/path/to/directory", "--mode", "copy"]);
/// match run_cli(&cli) {
///     Ok(report) => println!("{} files sorted", report.move_result.transferred()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<SortReport, ConfigError> {
    let options = cli.options()?;

    let report = sort_directory_with_progress(&cli.path, &options, OutputFormatter::create_spinner());

    if report.setup_error.is_none() {
        OutputFormatter::bucket_table(&report.move_result);
        if let Some(summary) = &report.summary_path {
            OutputFormatter::plain(&format!("Summary: {}", summary.display()));
        }
    }

    Ok(report)
}
