use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::core::models::SourceFile;
use crate::error::{DepmapError, Result};

const SOURCE_EXTENSION: &str = "py";

#[derive(Debug, Clone)]
pub struct FileInfo {
    /// Location on disk
    pub path: PathBuf,
    /// Identity relative to the scanned root
    pub file: SourceFile,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileScanner;

impl FileScanner {
    pub fn new() -> Self {
        Self
    }

    /// Source files under `root_path`, sorted by path.
    pub fn scan_directory(&self, root_path: &Path) -> Result<Vec<FileInfo>> {
        if !root_path.is_dir() {
            return Err(DepmapError::io(
                root_path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }

        let entries: Vec<_> = WalkDir::new(root_path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_ignored_dir(entry))
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .collect();

        let files: Vec<FileInfo> = entries
            .par_iter()
            .filter(|entry| {
                entry.path().extension().and_then(|ext| ext.to_str()) == Some(SOURCE_EXTENSION)
            })
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(root_path).ok()?;
                let relative = relative.to_string_lossy().replace('\\', "/");
                Some(FileInfo {
                    path: entry.path().to_path_buf(),
                    file: SourceFile::from_relative_path(&relative),
                })
            })
            .collect();

        debug!(root = %root_path.display(), files = files.len(), "scanned source tree");
        Ok(files)
    }
}

fn is_ignored_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name == "__pycache__"
}
