//! Error types shared by the classification and summary passes.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while sorting a directory.
///
/// Every variant carries the path it failed on so the console message alone
/// is enough to find the problem.
#[derive(Debug, Error)]
pub enum SortError {
    /// The path to sort does not exist, is not a directory, or has no name.
    #[error("Invalid directory to sort {}: {reason}", path.display())]
    InvalidSource { path: PathBuf, reason: String },

    /// Failed to create the `(<name>) sorted_folder` directory.
    #[error("Failed to create sorted directory {}: {source}", path.display())]
    DestinationCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to list a directory while walking a tree.
    #[error("Failed to read {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a bucket directory.
    #[error("Failed to create directory {}: {source}", path.display())]
    BucketCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to copy or move a file into its bucket.
    #[error("Failed to transfer {} to {}: {source}", from.display(), to.display())]
    Transfer {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create the summary directory or file.
    #[error("Failed to create summary {}: {source}", path.display())]
    SummaryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed while writing report lines.
    #[error("Failed to write summary {}: {source}", path.display())]
    SummaryWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SortError {
    pub(crate) fn walk(err: walkdir::Error) -> Self {
        let path = err.path().map(PathBuf::from).unwrap_or_default();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
        SortError::Walk { path, source }
    }
}

/// Result type for sorting operations.
pub type SortResult<T> = Result<T, SortError>;
