//! Project-file codecs: the authoritative binary format and the structured
//! JSON rendition of the same document.

pub mod binary;
pub mod json;

pub use binary::{FILE_MAGIC, FILE_VERSION};

use std::path::{Path, PathBuf};

/// Source paths are persisted relative to the project file's own directory,
/// with forward slashes.
pub(crate) fn relative_path(path: &Path, base_dir: &Path) -> String {
    if path.as_os_str().is_empty() {
        return String::new();
    }
    let relative = path.strip_prefix(base_dir).unwrap_or(path);
    relative.to_string_lossy().replace('\\', "/")
}

/// Re-resolves a stored path against the loading file's directory.
pub(crate) fn resolve_path(stored: &str, base_dir: &Path) -> PathBuf {
    if stored.is_empty() {
        return PathBuf::new();
    }
    let path = PathBuf::from(stored);
    if path.is_relative() {
        base_dir.join(path)
    } else {
        path
    }
}
