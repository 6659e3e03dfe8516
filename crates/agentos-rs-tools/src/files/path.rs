//! Confine caller-supplied filenames to the base directory.

use std::path::{Path, PathBuf};

use super::FileError;

/// Maps raw filenames onto flat names directly under a base directory.
///
/// `..` sequences are removed and both path separators become `_`, so the
/// result is always a single path component. Symlinks are not resolved and
/// distinct raw names may collide.
#[derive(Debug, Clone)]
pub struct PathSanitizer {
    base: PathBuf,
}

impl PathSanitizer {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Base directory every path is confined to.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Sanitised file name.
    pub fn sanitize_name(filename: &str) -> Result<String, FileError> {
        let name = filename
            .replace("..", "")
            .replace(['/', '\\'], "_");
        if name.is_empty() || name == "." || name.contains('\0') {
            return Err(FileError::InvalidFilename(filename.to_string()));
        }
        Ok(name)
    }

    /// `base / sanitize(filename)`.
    pub fn resolve(&self, filename: &str) -> Result<PathBuf, FileError> {
        Ok(self.base.join(Self::sanitize_name(filename)?))
    }
}
