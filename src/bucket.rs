//! Bucket naming for sorted files.
//!
//! Every file lands in exactly one bucket directory: `hidden` for hidden files,
//! `noext` for files without an extension, and otherwise a directory named after
//! the extension exactly as it appears in the file name (case preserved).
//!
//! # Examples
//!
//! ```
//! use dirsort::bucket::{Bucket, extension_of, strip_extension};
//!
//! assert_eq!(extension_of("report.final.PDF"), Some("PDF"));
//! assert_eq!(extension_of("Makefile"), None);
//! assert_eq!(strip_extension("report.final.PDF"), "report.final");
//! assert_eq!(Bucket::NoExtension.dir_name(), "noext");
//! ```
use std::path::Path;

/// Directory name used for hidden files.
pub const HIDDEN_BUCKET: &str = "hidden";

/// Directory name used for files without an extension.
pub const NO_EXTENSION_BUCKET: &str = "noext";

/// The bucket a single file is sorted into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Hidden files, regardless of their apparent extension.
    Hidden,
    /// Files whose name has no `.` or ends with one.
    NoExtension,
    /// Files grouped by their verbatim extension.
    Extension(String),
}

impl Bucket {
    /// Picks the bucket for a file given its path and base name.
    ///
    /// The path is only consulted for the platform hidden attribute; the
    /// extension always comes from `name`.
    pub fn for_file(path: &Path, name: &str) -> Self {
        if is_hidden(path) {
            return Bucket::Hidden;
        }
        match extension_of(name) {
            Some(ext) => Bucket::Extension(ext.to_string()),
            None => Bucket::NoExtension,
        }
    }

    /// Returns the directory name for this bucket.
    pub fn dir_name(&self) -> &str {
        match self {
            Bucket::Hidden => HIDDEN_BUCKET,
            Bucket::NoExtension => NO_EXTENSION_BUCKET,
            Bucket::Extension(ext) => ext,
        }
    }
}

/// Returns the text after the last `.` of a base name.
///
/// `None` when the name has no `.` or nothing follows the last one.
pub fn extension_of(name: &str) -> Option<&str> {
    match name.rfind('.') {
        Some(pos) if pos + 1 < name.len() => Some(&name[pos + 1..]),
        _ => None,
    }
}

/// Strips the extension from a base name for display in the report.
///
/// A leading dot does not count as an extension separator, so `.bashrc`
/// stays `.bashrc`.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) if pos > 0 => &name[..pos],
        _ => name,
    }
}

/// Returns true if the host filesystem convention marks this file hidden.
#[cfg(not(windows))]
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Returns true if the host filesystem convention marks this file hidden.
#[cfg(windows)]
pub fn is_hidden(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

    std::fs::metadata(path)
        .map(|meta| meta.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
        .unwrap_or(false)
}
