use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::types::FileFormat;

/// Finds candidate profile files
pub struct FileDiscovery {
    recursive: bool,
}

impl FileDiscovery {
    pub fn new(recursive: bool) -> Self {
        Self { recursive }
    }

    /// Expand files and directories into a deduplicated list of profile files
    pub fn discover(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in paths {
            if path.is_file() {
                if self.is_profile_file(path) {
                    files.push(path.clone());
                } else {
                    warn!("Skipping {}: not a supported profile format", path.display());
                }
            } else if path.is_dir() {
                files.extend(self.discover_in_directory(path)?);
            } else {
                warn!("Skipping {}: no such file or directory", path.display());
            }
        }

        let mut seen = HashSet::new();
        files.retain(|path| seen.insert(path.clone()));

        debug!("Discovered {} profile files", files.len());
        Ok(files)
    }

    fn discover_in_directory(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        if self.recursive {
            for entry in WalkDir::new(dir)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && self.is_profile_file(path) {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            let entries = fs::read_dir(dir)
                .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

            for entry in entries {
                let entry = entry.with_context(|| {
                    format!("Failed to read directory entry in: {}", dir.display())
                })?;
                let path = entry.path();

                if path.is_file() && self.is_profile_file(&path) {
                    files.push(path);
                }
            }
            files.sort();
        }

        Ok(files)
    }

    fn is_profile_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| FileFormat::from_extension(&ext.to_string_lossy()).is_profile_format())
            .unwrap_or(false)
    }
}
