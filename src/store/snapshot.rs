//! Versioned on-disk snapshots of roadmap runs.
//!
//! Layout: `<root>/<version>/dependency_roadmap.json` and
//! `<root>/<version>/file_hashes.json`. Versions are local timestamps that
//! sort lexically in chronological order.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::diff::{Snapshot, VersionDiff, VersionReport};
use crate::core::hasher::FileHashes;
use crate::core::roadmap::DependencyRoadmap;
use crate::error::{DepmapError, Result};

pub const ROADMAP_FILE: &str = "dependency_roadmap.json";
pub const HASHES_FILE: &str = "file_hashes.json";
const VERSION_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist under a fresh timestamp version and return it.
    pub fn save(&self, roadmap: &DependencyRoadmap, hashes: &FileHashes) -> Result<String> {
        let stamp = chrono::Local::now().format(VERSION_FORMAT).to_string();
        let mut version = stamp.clone();
        let mut counter = 0;
        while self.root.join(&version).exists() {
            counter += 1;
            version = format!("{stamp}_{counter}");
        }

        self.save_as(&version, roadmap, hashes)?;
        Ok(version)
    }

    pub fn save_as(
        &self,
        version: &str,
        roadmap: &DependencyRoadmap,
        hashes: &FileHashes,
    ) -> Result<PathBuf> {
        if version.is_empty() || version.contains(['/', '\\']) || version.starts_with('.') {
            return Err(DepmapError::Snapshot(format!(
                "invalid snapshot version `{version}`"
            )));
        }

        let dir = self.root.join(version);
        fs::create_dir_all(&dir).map_err(|e| DepmapError::io(&dir, e))?;
        write_json(&dir.join(ROADMAP_FILE), roadmap)?;
        write_json(&dir.join(HASHES_FILE), hashes)?;

        info!(version, dir = %dir.display(), files = hashes.len(), "saved snapshot");
        Ok(dir)
    }

    /// Version directories in lexical order; empty when the root does not exist.
    pub fn versions(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut versions = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(|e| DepmapError::io(&self.root, e))? {
            let entry = entry.map_err(|e| DepmapError::io(&self.root, e))?;
            if entry.path().is_dir() {
                versions.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        versions.sort();
        Ok(versions)
    }

    pub fn load(&self, version: &str) -> Result<Snapshot> {
        let dir = self.root.join(version);
        if !dir.is_dir() {
            return Err(DepmapError::Snapshot(format!(
                "no snapshot `{version}` under {}",
                self.root.display()
            )));
        }

        Ok(Snapshot {
            version: version.to_string(),
            roadmap: read_json(&dir.join(ROADMAP_FILE))?,
            hashes: read_json(&dir.join(HASHES_FILE))?,
        })
    }

    /// The two lexically greatest versions as `(old, new)`
    pub fn latest_pair(&self) -> Result<Option<(String, String)>> {
        let mut versions = self.versions()?;
        let Some(new) = versions.pop() else {
            return Ok(None);
        };
        Ok(versions.pop().map(|old| (old, new)))
    }

    pub fn compare_latest(&self) -> Result<VersionReport> {
        let Some((old, new)) = self.latest_pair()? else {
            debug!(root = %self.root.display(), "fewer than two snapshots, nothing to compare");
            return Ok(VersionReport::empty());
        };

        let old = self.load(&old)?;
        let new = self.load(&new)?;
        Ok(VersionDiff::compare(&old, &new))
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).map_err(|e| DepmapError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(|e| DepmapError::io(path, e))?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| DepmapError::io(path, e))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
