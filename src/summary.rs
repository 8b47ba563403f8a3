//! Summary pass: renders the sorted tree into `summary/summary.txt`.
//!
//! The report is a fixed-width text table. Every directory that has something
//! to list gets a dashed header block, every file gets one row with its name
//! (extension stripped) and two permission columns:
//!
//! ```text
//! name          |   readable   |   writeable   |
//!
//! ---
//! txt:
//! ----
//! -a            |      X       |       X       |
//! ```
//!
//! Column alignment uses the name widths seen by the classification pass
//! (`MoveResult::column_width`), so the summary must only run after that pass
//! is complete.

use crate::bucket::strip_extension;
use crate::error::{SortError, SortResult};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Directory under the destination root holding the report.
pub const SUMMARY_DIR: &str = "summary";

/// File name of the report.
pub const SUMMARY_FILE: &str = "summary.txt";

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// Writes the fixed-width report for a sorted tree.
#[derive(Debug, Clone, Copy)]
pub struct Summarizer {
    width: usize,
}

impl Summarizer {
    /// Creates a summarizer whose name column is `width` characters wide.
    ///
    /// Use `MoveResult::column_width` so names shown unstripped still fit.
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    /// The first line of the report.
    pub fn header_line(&self) -> String {
        format!(
            "name{}|   readable   |   writeable   |{LINE_ENDING}",
            padding(self.width, 4)
        )
    }

    /// The dashed block introducing a directory.
    pub fn directory_block(&self, name: &str) -> String {
        let dashes = "-".repeat(name.chars().count());
        format!("{LINE_ENDING}{dashes}{LINE_ENDING}{name}:{LINE_ENDING}{dashes}-{LINE_ENDING}")
    }

    /// One file row. `name` is the full base name; its extension is stripped.
    pub fn file_row(&self, name: &str, readable: bool, writeable: bool) -> String {
        let stem = strip_extension(name);
        format!(
            "-{stem}{}|      {}       |       {}       |{LINE_ENDING}",
            padding(self.width, stem.chars().count() + 1),
            flag(readable),
            flag(writeable),
        )
    }

    /// Renders the report for `root` into `out`.
    ///
    /// Entries are listed in file-name order. Directories with nothing to list
    /// are left out entirely. The report file itself is never listed.
    pub fn write_report<W: Write>(&self, root: &Path, out: &mut W) -> io::Result<()> {
        let report_path = report_path(root);
        out.write_all(self.header_line().as_bytes())?;

        let walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.path() != report_path);

        for entry in walker {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy();

            if entry.file_type().is_dir() {
                if has_listable_children(entry.path(), &report_path)? {
                    out.write_all(self.directory_block(&name).as_bytes())?;
                }
            } else {
                let (readable, writeable) = permission_flags(entry.path());
                out.write_all(self.file_row(&name, readable, writeable).as_bytes())?;
            }
        }

        Ok(())
    }

    /// Creates `summary/summary.txt` under `root` and writes the report into it.
    ///
    /// Any previous report is replaced. The file handle is released before this
    /// returns, on success or failure.
    pub fn write_summary_file(&self, root: &Path) -> SortResult<PathBuf> {
        let summary_dir = root.join(SUMMARY_DIR);
        fs::create_dir_all(&summary_dir).map_err(|e| SortError::SummaryCreate {
            path: summary_dir.clone(),
            source: e,
        })?;

        let path = report_path(root);
        let file = File::create(&path).map_err(|e| SortError::SummaryCreate {
            path: path.clone(),
            source: e,
        })?;

        let mut writer = BufWriter::new(file);
        self.write_report(root, &mut writer)
            .and_then(|()| writer.flush())
            .map_err(|e| SortError::SummaryWrite {
                path: path.clone(),
                source: e,
            })?;

        debug!(report = %path.display(), "summary written");
        Ok(path)
    }
}

/// Returns `(readable, writeable)` for a file.
///
/// Readable means the file can be opened by this process. Writeable means
/// its permissions are not read-only.
pub fn permission_flags(path: &Path) -> (bool, bool) {
    let readable = File::open(path).is_ok();
    let writeable = fs::metadata(path)
        .map(|meta| !meta.permissions().readonly())
        .unwrap_or(false);
    (readable, writeable)
}

fn report_path(root: &Path) -> PathBuf {
    root.join(SUMMARY_DIR).join(SUMMARY_FILE)
}

fn has_listable_children(dir: &Path, report_path: &Path) -> io::Result<bool> {
    for entry in fs::read_dir(dir)? {
        if entry?.path() != report_path {
            return Ok(true);
        }
    }
    Ok(false)
}

fn padding(width: usize, used: usize) -> String {
    " ".repeat(width.saturating_sub(used))
}

fn flag(set: bool) -> char {
    if set { 'X' } else { '/' }
}
