//! Classification pass: copies (or moves) every file of a source tree into
//! per-extension bucket directories under a destination root.
//!
//! The source tree is flattened. `src/sub/img.png` and `src/top.png` both end
//! up in `<destination>/png/`.
use crate::bucket::{Bucket, strip_extension};
use crate::config::{FailurePolicy, SortOptions, TransferMode};
use crate::error::{SortError, SortResult};
use indicatif::ProgressBar;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// What happened to a single source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// The file now exists in its bucket.
    Transferred,
    /// A file with the same name was already in the bucket; nothing was written.
    SkippedExisting,
    /// Bucket creation or the transfer failed.
    Failed(String),
}

/// The record of one file reached by the classification pass.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// The file in the source tree.
    pub source: PathBuf,
    /// Where the file was (or would have been) placed.
    pub destination: PathBuf,
    /// The bucket directory name.
    pub bucket: String,
    pub status: FileStatus,
}

/// Result of a full classification pass, consumed by the summary pass.
#[derive(Debug, Default)]
pub struct MoveResult {
    /// Bucket directory names that exist because of this pass.
    pub buckets_touched: BTreeSet<String>,
    /// Longest file base name seen, extension included, in characters.
    pub longest_name_width: usize,
    /// Longest report name cell seen: `-` plus the name with its extension stripped.
    pub longest_row_width: usize,
    /// One entry per file reached, in walk order.
    pub outcomes: Vec<FileOutcome>,
    /// Directories that could not be listed, with the reason.
    pub unreadable_dirs: Vec<(PathBuf, String)>,
    /// The failure that stopped the pass early, if the policy is `Abort`.
    pub aborted: Option<SortError>,
}

impl MoveResult {
    /// Number of files that landed in a bucket.
    pub fn transferred(&self) -> usize {
        self.count(|status| *status == FileStatus::Transferred)
    }

    /// Number of files skipped because the bucket already had that name.
    pub fn skipped(&self) -> usize {
        self.count(|status| *status == FileStatus::SkippedExisting)
    }

    /// Number of files that failed.
    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, FileStatus::Failed(_)))
    }

    /// Returns true if every file reached was transferred or skipped and the
    /// whole tree was walked.
    pub fn is_complete_success(&self) -> bool {
        self.aborted.is_none() && self.unreadable_dirs.is_empty() && self.failed() == 0
    }

    /// Width of the report's name column.
    ///
    /// Names that keep their full text in the report (dotfiles, extensionless
    /// names) need one more character than their base name for the leading `-`.
    pub fn column_width(&self) -> usize {
        self.longest_name_width.max(self.longest_row_width)
    }

    fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    fn observe_name(&mut self, name: &str) {
        self.longest_name_width = self.longest_name_width.max(name.chars().count());
        self.longest_row_width = self
            .longest_row_width
            .max(strip_extension(name).chars().count() + 1);
    }
}

/// Walks a source tree and places every file into its bucket.
pub struct Classifier {
    destination_root: PathBuf,
    options: SortOptions,
    progress: ProgressBar,
}

impl Classifier {
    /// Creates a classifier writing into `destination_root`, which must already exist.
    pub fn new(destination_root: impl Into<PathBuf>, options: &SortOptions) -> Self {
        Self {
            destination_root: destination_root.into(),
            options: *options,
            progress: ProgressBar::hidden(),
        }
    }

    /// Ticks `progress` once per file reached.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Runs the classification pass over `source_root`.
    ///
    /// Entries are visited depth-first in file-name order. The destination
    /// root is never descended into, even when it sits inside the source tree.
    /// With `FailurePolicy::Abort` the first failure ends the walk and is
    /// returned in `MoveResult::aborted`; the files handled before it stay placed.
    pub fn classify(&self, source_root: &Path) -> MoveResult {
        let mut result = MoveResult::default();

        let walker = WalkDir::new(source_root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.path() != self.destination_root);

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let err = SortError::walk(err);
                    warn!(error = %err, "directory could not be listed");
                    if self.options.on_error == FailurePolicy::Abort {
                        result.aborted = Some(err);
                        break;
                    }
                    if let SortError::Walk { path, source } = &err {
                        result.unreadable_dirs.push((path.clone(), source.to_string()));
                    }
                    continue;
                }
            };

            // Follows symlinks to files; directories (linked or not) are skipped here.
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            result.observe_name(&name);
            self.progress.set_message(name.clone());
            self.progress.inc(1);

            let bucket = Bucket::for_file(path, &name);
            let bucket_dir = self.destination_root.join(bucket.dir_name());
            let destination = bucket_dir.join(entry.file_name());

            let placed = self.ensure_bucket(&bucket_dir).and_then(|()| {
                result.buckets_touched.insert(bucket.dir_name().to_string());
                self.place(path, &destination)
            });

            match placed {
                Ok(status) => {
                    result.outcomes.push(FileOutcome {
                        source: path.to_path_buf(),
                        destination,
                        bucket: bucket.dir_name().to_string(),
                        status,
                    });
                }
                Err(err) => {
                    warn!(source = %path.display(), error = %err, "file could not be sorted");
                    result.outcomes.push(FileOutcome {
                        source: path.to_path_buf(),
                        destination,
                        bucket: bucket.dir_name().to_string(),
                        status: FileStatus::Failed(err.to_string()),
                    });
                    if self.options.on_error == FailurePolicy::Abort {
                        result.aborted = Some(err);
                        break;
                    }
                }
            }
        }

        result
    }

    /// Creates a bucket directory if it is not there yet.
    fn ensure_bucket(&self, bucket_dir: &Path) -> SortResult<()> {
        match fs::create_dir(bucket_dir) {
            Ok(()) => {
                debug!(bucket = %bucket_dir.display(), "created bucket");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && bucket_dir.is_dir() => Ok(()),
            Err(e) => Err(SortError::BucketCreate {
                path: bucket_dir.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Puts one file at `destination` unless that path is already taken.
    fn place(&self, source: &Path, destination: &Path) -> SortResult<FileStatus> {
        if destination == source || destination.exists() {
            debug!(destination = %destination.display(), "destination exists, skipping");
            return Ok(FileStatus::SkippedExisting);
        }

        let transferred = match self.options.transfer {
            TransferMode::Copy => fs::copy(source, destination).map(|_| ()),
            TransferMode::Move => move_file(source, destination),
        };
        transferred.map_err(|e| SortError::Transfer {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
            source: e,
        })?;

        debug!(
            source = %source.display(),
            destination = %destination.display(),
            "transferred"
        );
        Ok(FileStatus::Transferred)
    }
}

/// Renames a file, copying then removing it when the rename crosses devices.
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(source, destination)?;
            fs::remove_file(source)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("src");
        let destination = temp_dir.path().join("dest");
        fs::create_dir(&source).expect("Failed to create source");
        fs::create_dir(&destination).expect("Failed to create destination");
        (temp_dir, source, destination)
    }

    #[test]
    fn test_classify_copies_into_extension_buckets() {
        let (_temp, source, destination) = setup();
        fs::write(source.join("a.txt"), "alpha").unwrap();
        fs::write(source.join("b.md"), "beta").unwrap();

        let result = Classifier::new(&destination, &SortOptions::default()).classify(&source);

        assert!(result.is_complete_success());
        assert_eq!(result.transferred(), 2);
        assert_eq!(fs::read_to_string(destination.join("txt/a.txt")).unwrap(), "alpha");
        assert_eq!(fs::read_to_string(destination.join("md/b.md")).unwrap(), "beta");
        assert!(source.join("a.txt").exists(), "copy mode must keep sources");
        let buckets: Vec<_> = result.buckets_touched.iter().cloned().collect();
        assert_eq!(buckets, vec!["md".to_string(), "txt".to_string()]);
    }

    #[test]
    fn test_classify_flattens_nested_directories() {
        let (_temp, source, destination) = setup();
        fs::create_dir(source.join("sub")).unwrap();
        fs::write(source.join("sub/img.png"), "nested").unwrap();
        fs::write(source.join("top.png"), "top").unwrap();

        let result = Classifier::new(&destination, &SortOptions::default()).classify(&source);

        assert_eq!(result.transferred(), 2);
        assert!(destination.join("png/img.png").is_file());
        assert!(destination.join("png/top.png").is_file());
        assert!(!destination.join("png/sub").exists());
    }

    #[test]
    fn test_longest_name_width_counts_full_name() {
        let (_temp, source, destination) = setup();
        fs::write(source.join("a.txt"), "").unwrap();
        fs::write(source.join("much_longer_name.markdown"), "").unwrap();

        let result = Classifier::new(&destination, &SortOptions::default()).classify(&source);

        assert_eq!(result.longest_name_width, "much_longer_name.markdown".len());
    }

    #[test]
    fn test_column_width_fits_unstripped_names() {
        let (_temp, source, destination) = setup();
        fs::write(source.join("a.txt"), "").unwrap();
        fs::write(source.join("Makefile"), "").unwrap();

        let result = Classifier::new(&destination, &SortOptions::default()).classify(&source);

        assert_eq!(result.longest_name_width, 8);
        assert_eq!(result.longest_row_width, 9);
        assert_eq!(result.column_width(), 9);
    }

    #[test]
    fn test_column_width_is_name_width_when_extensions_strip() {
        let (_temp, source, destination) = setup();
        fs::write(source.join("notes.md"), "").unwrap();

        let result = Classifier::new(&destination, &SortOptions::default()).classify(&source);

        assert_eq!(result.column_width(), result.longest_name_width);
    }

    #[test]
    fn test_extensionless_file_goes_to_noext() {
        let (_temp, source, destination) = setup();
        fs::write(source.join("Makefile"), "all:").unwrap();

        let result = Classifier::new(&destination, &SortOptions::default()).classify(&source);

        assert!(result.is_complete_success());
        assert!(destination.join("noext/Makefile").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_hidden_file_goes_to_hidden_bucket() {
        let (_temp, source, destination) = setup();
        fs::write(source.join(".env.local"), "KEY=1").unwrap();

        Classifier::new(&destination, &SortOptions::default()).classify(&source);

        assert!(destination.join("hidden/.env.local").is_file());
        assert!(!destination.join("local").exists());
    }

    #[test]
    fn test_existing_destination_is_skipped_not_overwritten() {
        let (_temp, source, destination) = setup();
        fs::write(source.join("notes.txt"), "new").unwrap();
        fs::create_dir(destination.join("txt")).unwrap();
        fs::write(destination.join("txt/notes.txt"), "old").unwrap();

        let result = Classifier::new(&destination, &SortOptions::default()).classify(&source);

        assert_eq!(result.skipped(), 1);
        assert!(result.is_complete_success());
        assert_eq!(fs::read_to_string(destination.join("txt/notes.txt")).unwrap(), "old");
    }

    #[test]
    fn test_move_mode_removes_sources() {
        let (_temp, source, destination) = setup();
        fs::write(source.join("song.mp3"), "la").unwrap();
        let options = SortOptions {
            transfer: TransferMode::Move,
            ..SortOptions::default()
        };

        let result = Classifier::new(&destination, &options).classify(&source);

        assert_eq!(result.transferred(), 1);
        assert!(!source.join("song.mp3").exists());
        assert_eq!(fs::read_to_string(destination.join("mp3/song.mp3")).unwrap(), "la");
    }

    #[test]
    fn test_abort_policy_stops_at_first_failure() {
        let (_temp, source, destination) = setup();
        // A plain file where the "a" bucket directory should go.
        fs::write(destination.join("a"), "blocker").unwrap();
        fs::write(source.join("1.a"), "").unwrap();
        fs::write(source.join("2.b"), "").unwrap();

        let result = Classifier::new(&destination, &SortOptions::default()).classify(&source);

        assert!(matches!(result.aborted, Some(SortError::BucketCreate { .. })));
        assert_eq!(result.failed(), 1);
        assert_eq!(result.outcomes.len(), 1);
        assert!(!destination.join("b").exists());
    }

    #[test]
    fn test_continue_policy_keeps_going() {
        let (_temp, source, destination) = setup();
        fs::write(destination.join("a"), "blocker").unwrap();
        fs::write(source.join("1.a"), "").unwrap();
        fs::write(source.join("2.b"), "").unwrap();
        let options = SortOptions {
            on_error: FailurePolicy::Continue,
            ..SortOptions::default()
        };

        let result = Classifier::new(&destination, &options).classify(&source);

        assert!(result.aborted.is_none());
        assert_eq!(result.failed(), 1);
        assert_eq!(result.transferred(), 1);
        assert!(!result.is_complete_success());
        assert!(destination.join("b/2.b").is_file());
        assert!(!result.buckets_touched.contains("a"));
    }

    #[test]
    fn test_destination_inside_source_is_not_walked() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().to_path_buf();
        let destination = source.join("out");
        fs::create_dir(&destination).unwrap();
        fs::write(source.join("x.txt"), "").unwrap();

        let result = Classifier::new(&destination, &SortOptions::default()).classify(&source);

        assert_eq!(result.outcomes.len(), 1);
        assert!(destination.join("txt/x.txt").is_file());
    }

    /// Makes `dir` unlistable. Returns false when permissions are not
    /// enforced for this user (e.g. root), so the caller can skip.
    #[cfg(unix)]
    fn lock_dir(dir: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o000)).unwrap();
        fs::read_dir(dir).is_err()
    }

    #[cfg(unix)]
    fn unlock_dir(dir: &Path) {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_aborts_walk() {
        let (_temp, source, destination) = setup();
        fs::write(source.join("a.txt"), "").unwrap();
        fs::create_dir(source.join("b_locked")).unwrap();
        fs::write(source.join("b_locked/inner.txt"), "").unwrap();
        fs::write(source.join("c.txt"), "").unwrap();
        let locked = source.join("b_locked");
        if !lock_dir(&locked) {
            unlock_dir(&locked);
            return;
        }

        let result = Classifier::new(&destination, &SortOptions::default()).classify(&source);
        unlock_dir(&locked);

        assert!(matches!(result.aborted, Some(SortError::Walk { .. })));
        assert!(result.unreadable_dirs.is_empty());
        assert!(destination.join("txt/a.txt").is_file());
        assert!(!destination.join("txt/c.txt").exists());
        assert!(!result.is_complete_success());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_recorded_under_continue() {
        let (_temp, source, destination) = setup();
        fs::write(source.join("a.txt"), "").unwrap();
        fs::create_dir(source.join("b_locked")).unwrap();
        fs::write(source.join("b_locked/inner.txt"), "").unwrap();
        fs::write(source.join("c.txt"), "").unwrap();
        let locked = source.join("b_locked");
        if !lock_dir(&locked) {
            unlock_dir(&locked);
            return;
        }
        let options = SortOptions {
            on_error: FailurePolicy::Continue,
            ..SortOptions::default()
        };

        let result = Classifier::new(&destination, &options).classify(&source);
        unlock_dir(&locked);

        assert!(result.aborted.is_none());
        assert_eq!(result.unreadable_dirs.len(), 1);
        assert!(result.unreadable_dirs[0].0.ends_with("b_locked"));
        assert!(destination.join("txt/a.txt").is_file());
        assert!(destination.join("txt/c.txt").is_file());
        assert!(!destination.join("txt/inner.txt").exists());
        assert!(!result.is_complete_success());
    }
}
