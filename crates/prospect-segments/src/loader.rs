//! Segment loading from TOML files.
//!
//! Accepts either a single TOML file or a directory of them. Unparsable
//! files in a directory are logged and skipped; a missing path is an error.

use crate::definition::{SegmentFile, SegmentGroup};
use crate::error::{Result, SegmentError};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Loader for search-parameter groups.
pub struct SegmentLoader {
    path: PathBuf,
}

impl SegmentLoader {
    /// Create a loader for the given file or directory.
    ///
    /// # Errors
    /// Returns error if the path doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            return Err(SegmentError::NotFound {
                path: path.display().to_string(),
            });
        }

        Ok(Self { path })
    }

    /// Load all segment groups.
    ///
    /// For a directory, every `*.toml` file is loaded in filename order so
    /// the resulting group sequence (and therefore the combination order) is
    /// reproducible across runs.
    ///
    /// # Errors
    /// Returns error if a single configured file is unreadable or invalid,
    /// or if the directory can't be read. Invalid files inside a directory
    /// are skipped with a warning instead.
    pub fn load(&self) -> Result<Vec<SegmentGroup>> {
        let mut groups = Vec::new();

        if self.path.is_dir() {
            let mut files: Vec<PathBuf> = std::fs::read_dir(&self.path)?
                .filter_map(std::result::Result::ok)
                .map(|entry| entry.path())
                .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("toml"))
                .collect();
            files.sort();

            for file in files {
                match Self::load_file(&file) {
                    Ok(mut file_groups) => groups.append(&mut file_groups),
                    Err(e) => {
                        warn!(
                            path = %file.display(),
                            error = %e,
                            "skipping invalid segment file"
                        );
                    }
                }
            }
        } else {
            groups = Self::load_file(&self.path)?;
        }

        info!(
            groups = groups.len(),
            path = %self.path.display(),
            "loaded segment groups"
        );

        Ok(groups)
    }

    /// Load one segment TOML file.
    fn load_file(path: &Path) -> Result<Vec<SegmentGroup>> {
        let contents = std::fs::read_to_string(path).map_err(|e| SegmentError::LoadError {
            path: path.display().to_string(),
            source: e,
        })?;

        let file: SegmentFile = toml::from_str(&contents).map_err(|e| SegmentError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;

        Ok(file.groups)
    }
}
