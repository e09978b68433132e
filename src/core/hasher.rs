use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::core::models::SourceFile;

/// Content hash of one file; a change detector, never an identity key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHash {
    #[serde(flatten)]
    pub file: SourceFile,
    pub hash: String,
}

/// Hashes of every file in a run, keyed by relative path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileHashes {
    hashes: BTreeMap<String, FileHash>,
}

impl FileHashes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file: SourceFile, hash: String) -> &FileHash {
        let path = file.file_path.clone();
        self.hashes.insert(path.clone(), FileHash { file, hash });
        &self.hashes[&path]
    }

    pub fn get(&self, file_path: &str) -> Option<&FileHash> {
        self.hashes.get(file_path)
    }

    pub fn hash_of(&self, file_path: &str) -> Option<&str> {
        self.hashes.get(file_path).map(|entry| entry.hash.as_str())
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.hashes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileHash)> {
        self.hashes.iter().map(|(path, entry)| (path.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

pub struct FileHasher;

impl FileHasher {
    /// SHA-256 hex digest of the raw source text
    pub fn compute(source: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
