use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{DepmapError, Result};

pub const DEFAULT_CHAIN_DEPTH: usize = 20;

/// Settings for one analysis run
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Worker threads for per-file extraction; `None` uses the rayon default
    pub workers: Option<usize>,
    /// Local name -> module path, consulted when a file does not import the name itself
    pub import_aliases: BTreeMap<String, String>,
    pub use_cache: bool,
    /// Disk location of the parse cache; `None` keeps it in memory
    pub cache_dir: Option<PathBuf>,
    /// Depth cutoff for execution chain extraction
    pub chain_depth: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            workers: None,
            import_aliases: BTreeMap::new(),
            use_cache: true,
            cache_dir: None,
            chain_depth: DEFAULT_CHAIN_DEPTH,
        }
    }
}

impl AnalyzerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    pub fn with_alias(mut self, name: impl Into<String>, module_path: impl Into<String>) -> Self {
        self.import_aliases.insert(name.into(), module_path.into());
        self
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    pub fn with_chain_depth(mut self, depth: usize) -> Self {
        self.chain_depth = depth;
        self
    }

    /// Merge aliases from a JSON object of `{"name": "module/path.py"}`.
    pub fn load_alias_file(mut self, path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| DepmapError::io(path, e))?;
        let aliases: BTreeMap<String, String> = serde_json::from_str(&data)?;
        self.import_aliases.extend(aliases);
        Ok(self)
    }
}

/// Parse a `NAME=PATH` alias argument.
pub fn parse_alias(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got `{raw}`"))?;
    let (name, path) = (name.trim(), path.trim());
    if name.is_empty() || path.is_empty() {
        return Err(format!("expected NAME=PATH, got `{raw}`"));
    }
    Ok((name.to_string(), path.to_string()))
}
