//! Console output for the sorting run.
//!
//! Phase messages, errors and the closing statistics table all go through
//! here so their styling stays consistent.

use crate::classifier::{FileStatus, MoveResult};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::time::Duration;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::success("Finished the summary...");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    ///
    /// Goes to standard output: a failed run still reports on the same
    /// stream as its progress.
    pub fn error(message: &str) {
        println!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a spinner that counts files as they are classified.
    ///
    /// The total is unknown up front since the tree is walked only once.
    pub fn create_spinner() -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {pos} files {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Prints file counts per bucket, followed by skipped and failed totals.
    pub fn bucket_table(result: &MoveResult) {
        Self::header("SORTED");

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for outcome in &result.outcomes {
            if outcome.status == FileStatus::Transferred {
                *counts.entry(outcome.bucket.as_str()).or_insert(0) += 1;
            }
        }

        let width = counts
            .keys()
            .map(|name| name.chars().count())
            .max()
            .unwrap_or(0)
            .max(6); // At least "Bucket" width

        println!("{:<width$} | {}", "Bucket".bold(), "Files".bold(), width = width);
        println!("{}", "-".repeat(width + 10));
        for (bucket, count) in &counts {
            println!(
                "{:<width$} | {} {}",
                bucket,
                count.to_string().green(),
                file_word(*count),
                width = width
            );
        }
        println!("{}", "-".repeat(width + 10));

        let transferred = result.transferred();
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            transferred.to_string().green().bold(),
            file_word(transferred),
            width = width
        );

        let skipped = result.skipped();
        if skipped > 0 {
            Self::warning(&format!(
                "{} {} already present, left untouched",
                skipped,
                file_word(skipped)
            ));
        }
        let failed = result.failed();
        if failed > 0 {
            Self::warning(&format!("{} {} could not be sorted", failed, file_word(failed)));
        }
        for (path, reason) in &result.unreadable_dirs {
            Self::warning(&format!("Skipped {}: {}", path.display(), reason));
        }
    }
}

fn file_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
