//! Hero-image handling: candidate validation, collision-free path
//! allocation, canonical-format normalization, and the local placeholder
//! renderer.

pub mod allocate;
mod glyphs;
pub mod normalize;
pub mod placeholder;
pub mod validate;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A hero image file written to its final directory, before or after
/// normalization. Candidates that lose selection stay on disk; cleanup
/// belongs to the site build, not to this tool.
#[derive(Debug, Clone)]
pub struct ImageCandidate {
    pub path: PathBuf,
    pub byte_len: u64,
}

impl ImageCandidate {
    /// Stat an existing file into a candidate.
    pub fn from_path(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let byte_len = fs::metadata(&path)?.len();
        Ok(Self { path, byte_len })
    }

    /// Lowercased extension, if any.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.path)
    }

    pub fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }
}

pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}
