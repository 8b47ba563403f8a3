//! dirsort - sort a directory tree by file extension
//!
//! This library copies every file found under a directory into a sibling
//! `(<name>) sorted_folder`, one subdirectory per extension plus `hidden` and
//! `noext`, then writes `summary/summary.txt` listing each bucket with the
//! read/write flags of its files.

pub mod bucket;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod sorter;
pub mod summary;

pub use bucket::Bucket;
pub use classifier::{Classifier, FileOutcome, FileStatus, MoveResult};
pub use config::{ConfigError, FailurePolicy, SortConfig, SortOptions, TransferMode};
pub use error::{SortError, SortResult};
pub use sorter::{SortReport, sort_directory, sort_directory_with_options};
pub use summary::Summarizer;

pub use cli::{Cli, run_cli};
