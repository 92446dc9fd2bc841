//! The filesystem seam: documents and file-backed fetches read through it,
//! so tests can serve files from memory.

use std::io;
use std::path::{Path, PathBuf};

pub trait FileSystem: Send + Sync {
    /// # Errors
    ///
    /// Fails when the file is missing, unreadable or not UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    fn is_file(&self, path: &Path) -> bool;

    /// Absolute path with `.`/`..` and symlinks resolved.
    ///
    /// # Errors
    ///
    /// Fails when the path does not exist.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

/// The real filesystem.
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        path.canonicalize()
    }
}
