//! Sorting run orchestration.
//!
//! A run resolves the source directory, creates the sibling
//! `(<name>) sorted_folder`, runs the classification pass, then the summary
//! pass, and always ends by printing `Finished`.

use crate::classifier::{Classifier, MoveResult};
use crate::config::SortOptions;
use crate::error::{SortError, SortResult};
use crate::output::OutputFormatter;
use crate::summary::Summarizer;
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Everything a caller can learn about a finished run.
#[derive(Debug)]
pub struct SortReport {
    /// The source directory, canonicalised when it could be resolved.
    pub source: PathBuf,
    /// The sorted directory, if it could be created.
    pub destination: Option<PathBuf>,
    pub move_result: MoveResult,
    /// The written report file.
    pub summary_path: Option<PathBuf>,
    /// Failure before classification started (bad source, sorted dir not creatable).
    pub setup_error: Option<SortError>,
    pub summary_error: Option<SortError>,
}

impl SortReport {
    fn failed_setup(source: PathBuf, err: SortError) -> Self {
        Self {
            source,
            destination: None,
            move_result: MoveResult::default(),
            summary_path: None,
            setup_error: Some(err),
            summary_error: None,
        }
    }

    /// Returns true if every file was placed and the summary was written.
    pub fn is_complete_success(&self) -> bool {
        self.setup_error.is_none()
            && self.summary_error.is_none()
            && self.move_result.is_complete_success()
    }
}

/// Sorts `path` with default options: copy, abort on first failure.
///
/// # Examples
///
/// ```no_run
/// use dirsort::sorter::sort_directory;
/// use std::path::Path;
///
/// let report = sort_directory(Path::new("/home/user/Downloads"));
/// if let Some(dest) = &report.destination {
///     println!("Sorted into {}", dest.display());
/// }
/// ```
pub fn sort_directory(path: &Path) -> SortReport {
    sort_directory_with_options(path, &SortOptions::default())
}

/// Sorts `path` with the given options.
pub fn sort_directory_with_options(path: &Path, options: &SortOptions) -> SortReport {
    sort_directory_with_progress(path, options, ProgressBar::hidden())
}

/// Sorts `path`, ticking `progress` once per file classified.
///
/// Never panics on I/O problems. Failures are printed, recorded in the
/// returned report, and the run still ends with `Finished`.
pub fn sort_directory_with_progress(
    path: &Path,
    options: &SortOptions,
    progress: ProgressBar,
) -> SortReport {
    let report = run(path, options, progress.clone());
    progress.finish_and_clear();
    OutputFormatter::plain("Finished");
    report
}

fn run(path: &Path, options: &SortOptions, progress: ProgressBar) -> SortReport {
    OutputFormatter::info("Get the directory to sort...");
    let source = match resolve_source(path) {
        Ok(source) => source,
        Err(err) => {
            OutputFormatter::error(&err.to_string());
            return SortReport::failed_setup(path.to_path_buf(), err);
        }
    };

    OutputFormatter::info("Create the sorted directory...");
    let destination = match create_destination(&source) {
        Ok(destination) => destination,
        Err(err) => {
            OutputFormatter::error(&err.to_string());
            return SortReport::failed_setup(source, err);
        }
    };
    info!(source = %source.display(), destination = %destination.display(), "sorting");

    OutputFormatter::info("Creating the directories by extension name, and move the files...");
    let move_result = Classifier::new(&destination, options)
        .with_progress(progress.clone())
        .classify(&source);
    progress.finish_and_clear();

    match &move_result.aborted {
        Some(err) => OutputFormatter::error(&err.to_string()),
        None => OutputFormatter::success("Finished creating directories and moving files..."),
    }

    OutputFormatter::info("Creating the summary...");
    let summarizer = Summarizer::new(move_result.column_width());
    let (summary_path, summary_error) = match summarizer.write_summary_file(&destination) {
        Ok(summary_path) => {
            OutputFormatter::success("Finished the summary...");
            (Some(summary_path), None)
        }
        Err(err) => {
            error!(error = ?err, "summary generation failed");
            OutputFormatter::error(&err.to_string());
            (None, Some(err))
        }
    };

    SortReport {
        source,
        destination: Some(destination),
        move_result,
        summary_path,
        setup_error: None,
        summary_error,
    }
}

/// Returns the sorted directory for `source`: `<parent>/(<name>) sorted_folder`.
///
/// # Examples
///
/// ```
/// use dirsort::sorter::destination_root_for;
/// use std::path::Path;
///
/// let dest = destination_root_for(Path::new("/home/user/Downloads")).unwrap();
/// assert_eq!(dest, Path::new("/home/user/(Downloads) sorted_folder"));
/// ```
pub fn destination_root_for(source: &Path) -> SortResult<PathBuf> {
    let invalid = |reason: &str| SortError::InvalidSource {
        path: source.to_path_buf(),
        reason: reason.to_string(),
    };
    let name = source
        .file_name()
        .ok_or_else(|| invalid("path has no directory name"))?;
    let parent = source
        .parent()
        .ok_or_else(|| invalid("path has no parent directory"))?;

    Ok(parent.join(format!("({}) sorted_folder", name.to_string_lossy())))
}

fn resolve_source(path: &Path) -> SortResult<PathBuf> {
    let source = fs::canonicalize(path).map_err(|e| SortError::InvalidSource {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !source.is_dir() {
        return Err(SortError::InvalidSource {
            path: path.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }
    Ok(source)
}

fn create_destination(source: &Path) -> SortResult<PathBuf> {
    let destination = destination_root_for(source)?;
    fs::create_dir_all(&destination).map_err(|e| SortError::DestinationCreate {
        path: destination.clone(),
        source: e,
    })?;
    Ok(destination)
}
