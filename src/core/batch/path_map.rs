use std::path::{Path, PathBuf};

use crate::types::OutputExtension;

/// Source extensions accepted for processing (compared case-insensitively).
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "png"];

/// Maps a source-relative path to its destination-relative path.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathMapper {
    output_extension: OutputExtension,
}

impl PathMapper {
    pub fn new(output_extension: OutputExtension) -> Self {
        Self { output_extension }
    }

    pub fn output_extension(&self) -> OutputExtension {
        self.output_extension
    }

    pub fn accepts(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                ACCEPTED_EXTENSIONS
                    .iter()
                    .any(|accepted| e.eq_ignore_ascii_case(accepted))
            })
            .unwrap_or(false)
    }

    /// `None` means the file is skipped.
    pub fn map(&self, relative: &Path) -> Option<PathBuf> {
        if !Self::accepts(relative) {
            return None;
        }
        Some(relative.with_extension(self.output_extension.as_str()))
    }
}
