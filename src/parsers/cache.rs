use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use super::SyntaxTree;
use crate::error::{DepmapError, Result};

const DEFAULT_MAX_MEMORY_ENTRIES: usize = 1000;

/// Lowered syntax tree of a file, valid for one content hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedFileEntry {
    pub content_hash: String,
    pub tree: SyntaxTree,
}

/// Thread-safe parse cache with memory and (best-effort) disk storage.
///
/// Entries are keyed by relative file path and only served when the stored
/// content hash matches the file's current one.
pub struct ParseCache {
    memory_cache: DashMap<String, ParsedFileEntry>,
    cache_dir: Option<PathBuf>,
    max_memory_entries: usize,
}

impl ParseCache {
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self> {
        let cache_dir = cache_dir.unwrap_or_else(|| std::env::temp_dir().join("depmap_cache"));
        fs::create_dir_all(&cache_dir).map_err(|e| DepmapError::io(&cache_dir, e))?;

        Ok(Self {
            memory_cache: DashMap::with_capacity(DEFAULT_MAX_MEMORY_ENTRIES),
            cache_dir: Some(cache_dir),
            max_memory_entries: DEFAULT_MAX_MEMORY_ENTRIES,
        })
    }

    /// Build an in-memory-only cache without touching the filesystem
    pub fn in_memory_only() -> Self {
        Self {
            memory_cache: DashMap::with_capacity(DEFAULT_MAX_MEMORY_ENTRIES),
            cache_dir: None,
            max_memory_entries: DEFAULT_MAX_MEMORY_ENTRIES,
        }
    }

    pub fn needs_update(&self, file_path: &str, content_hash: &str) -> bool {
        self.get(file_path, content_hash).is_none()
    }

    /// Cached tree if the stored hash matches `content_hash`
    pub fn get(&self, file_path: &str, content_hash: &str) -> Option<SyntaxTree> {
        if let Some(entry) = self.memory_cache.get(file_path) {
            if entry.content_hash == content_hash {
                return Some(entry.tree.clone());
            }
        }

        let cache_path = self.cache_path(file_path)?;
        let entry = self.load_from_disk(&cache_path).ok()?;
        if entry.content_hash != content_hash {
            return None;
        }

        let tree = entry.tree.clone();
        if self.memory_cache.len() < self.max_memory_entries {
            self.memory_cache.insert(file_path.to_string(), entry);
        }
        Some(tree)
    }

    pub fn store(&self, file_path: &str, content_hash: &str, tree: &SyntaxTree) -> Result<()> {
        let entry = ParsedFileEntry {
            content_hash: content_hash.to_string(),
            tree: tree.clone(),
        };

        if self.memory_cache.len() >= self.max_memory_entries {
            if let Some(evicted) = self.memory_cache.iter().next() {
                let key = evicted.key().clone();
                drop(evicted);
                self.memory_cache.remove(&key);
            }
        }
        self.memory_cache.insert(file_path.to_string(), entry.clone());

        if let Some(cache_path) = self.cache_path(file_path) {
            self.store_to_disk(&cache_path, &entry)?;
        }

        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.memory_cache.clear();
        if let Some(cache_dir) = &self.cache_dir {
            if cache_dir.exists() {
                fs::remove_dir_all(cache_dir).map_err(|e| DepmapError::io(cache_dir, e))?;
                fs::create_dir_all(cache_dir).map_err(|e| DepmapError::io(cache_dir, e))?;
            }
        }
        Ok(())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            memory_entries: self.memory_cache.len(),
            disk_entries: self.disk_entry_count(),
        }
    }

    fn cache_path(&self, file_path: &str) -> Option<PathBuf> {
        let cache_dir = self.cache_dir.as_ref()?;

        let mut hasher = DefaultHasher::new();
        file_path.hash(&mut hasher);
        let hash = hasher.finish();

        Some(cache_dir.join(format!("cache_{:x}.bincode", hash)))
    }

    fn load_from_disk(&self, cache_path: &Path) -> Result<ParsedFileEntry> {
        let data = fs::read(cache_path).map_err(|e| DepmapError::io(cache_path, e))?;
        let entry: ParsedFileEntry = bincode::deserialize(&data)?;
        Ok(entry)
    }

    fn store_to_disk(&self, cache_path: &Path, entry: &ParsedFileEntry) -> Result<()> {
        let data = bincode::serialize(entry)?;
        fs::write(cache_path, data).map_err(|e| DepmapError::io(cache_path, e))?;
        Ok(())
    }

    fn disk_entry_count(&self) -> usize {
        self.cache_dir
            .as_ref()
            .and_then(|dir| fs::read_dir(dir).ok())
            .map(|entries| entries.filter_map(|e| e.ok()).count())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub memory_entries: usize,
    pub disk_entries: usize,
}
