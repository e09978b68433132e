use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;
use tracing::{debug, info, warn};

use super::hasher::{FileHasher, FileHashes};
use super::imports::ImportTableBuilder;
use super::models::{Call, FileCalls, FileImports, ImportTable, RegistryFile, SourceFile};
use super::registry::RegistryBuilder;
use super::resolver::{CallResolver, Resolution, SymbolIndex};
use super::roadmap::{DependencyRoadmap, RoadmapAssembler};
use super::scanner::{FileInfo, FileScanner};
use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::parsers::{cache::ParseCache, common::read_source, python::PythonParser};
use crate::parsers::{LanguageParser, SyntaxTree};

/// Output of the per-file extraction unit of work
#[derive(Debug, Clone)]
pub struct FileExtraction {
    pub file: SourceFile,
    pub content_hash: String,
    pub registry: RegistryFile,
    pub imports: FileImports,
    pub calls: Vec<Call>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    pub file_path: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub roadmap: DependencyRoadmap,
    pub hashes: FileHashes,
    /// Files excluded from the roadmap because extraction failed
    pub failures: Vec<ExtractionFailure>,
}

/// Stable address of a call record inside a [`CallArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(usize);

/// Every call record of a run, grouped by file in contiguous spans
#[derive(Debug, Clone, Default)]
pub struct CallArena {
    records: Vec<Call>,
    spans: Vec<(SourceFile, Range<usize>)>,
}

impl CallArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_file(&mut self, file: SourceFile, calls: Vec<Call>) {
        let start = self.records.len();
        self.records.extend(calls);
        self.spans.push((file, start..self.records.len()));
    }

    pub fn get(&self, id: CallId) -> &Call {
        &self.records[id.0]
    }

    pub fn ids(&self) -> impl Iterator<Item = CallId> {
        (0..self.records.len()).map(CallId)
    }

    pub fn unresolved(&self) -> Vec<CallId> {
        self.ids().filter(|&id| !self.get(id).is_resolved()).collect()
    }

    pub fn calls_of(&self, file_path: &str) -> Option<&[Call]> {
        self.spans
            .iter()
            .find(|(file, _)| file.file_path == file_path)
            .map(|(_, span)| &self.records[span.clone()])
    }

    /// Populate the absent fields of a record; present fields are never
    /// overwritten. Returns whether anything changed.
    pub fn fill(&mut self, id: CallId, resolution: Resolution) -> bool {
        let call = &mut self.records[id.0];
        let mut changed = false;

        if call.resolved_file.is_none() && resolution.file.is_some() {
            call.resolved_file = resolution.file;
            changed = true;
        }
        if call.owning_class.is_none() && resolution.owning_class.is_some() {
            call.owning_class = resolution.owning_class;
            changed = true;
        }
        if call.parameters.is_none() && resolution.parameters.is_some() {
            call.parameters = resolution.parameters;
            call.param_types = resolution.param_types;
            changed = true;
        }

        changed
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_file_calls(self) -> Vec<FileCalls> {
        let mut records = self.records.into_iter();
        self.spans
            .into_iter()
            .map(|(file, span)| FileCalls {
                caller_file: file,
                calls: records.by_ref().take(span.len()).collect(),
            })
            .collect()
    }
}

/// Project-wide second look at calls the per-file pass left unresolved.
pub struct GlobalResolver;

impl GlobalResolver {
    /// Fill unresolved calls from the complete index. Idempotent; returns the
    /// number of records that changed.
    pub fn resolve(arena: &mut CallArena, index: &SymbolIndex) -> usize {
        let mut filled = 0;
        for id in arena.unresolved() {
            let Some(resolution) = Self::lookup(arena.get(id), index) else {
                continue;
            };
            if arena.fill(id, resolution) {
                filled += 1;
            }
        }
        filled
    }

    fn lookup(call: &Call, index: &SymbolIndex) -> Option<Resolution> {
        match &call.owning_class {
            // Bound instance of a class the declaring file could not see
            Some(class_name) => {
                let class_entry = index.lookup(class_name)?;
                let signature = index.method(class_name, &call.callee_name);
                Some(Resolution {
                    owning_class: None,
                    file: Some(class_entry.file.clone()),
                    parameters: signature.map(|entry| entry.parameters.clone()),
                    param_types: signature.map(|entry| entry.param_types.clone()),
                })
            }
            None => index.lookup(&call.callee_name).map(Resolution::from_entry),
        }
    }
}

pub struct CodebaseAnalyzer {
    config: AnalyzerConfig,
    file_scanner: FileScanner,
    parser: PythonParser,
    parse_cache: Option<ParseCache>,
}

impl Default for CodebaseAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl CodebaseAnalyzer {
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        let parse_cache = match (config.use_cache, &config.cache_dir) {
            (false, _) => None,
            (true, None) => Some(ParseCache::in_memory_only()),
            (true, Some(dir)) => Some(ParseCache::new(Some(dir.clone())).unwrap_or_else(|err| {
                warn!(error = %err, "failed to initialize disk parse cache");
                ParseCache::in_memory_only()
            })),
        };

        Self {
            config,
            file_scanner: FileScanner::new(),
            parser: PythonParser::new(),
            parse_cache,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn analyze(&self, root_path: &Path) -> Result<Analysis> {
        info!(root = %root_path.display(), "scanning files");
        let files = self.file_scanner.scan_directory(root_path)?;
        info!(files = files.len(), "extracting symbols, imports and calls");

        let results = self.extract_all(&files)?;

        let mut extractions = Vec::with_capacity(files.len());
        let mut failures = Vec::new();
        for (info, result) in files.iter().zip(results) {
            match result {
                Ok(extraction) => extractions.push(extraction),
                Err(err) => {
                    warn!(file = %info.file.file_path, error = %err, "extraction failed");
                    failures.push(ExtractionFailure {
                        file_path: info.file.file_path.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }

        Ok(Self::link(extractions, failures))
    }

    /// One independent unit of work per file; results keep the input order.
    fn extract_all(&self, files: &[FileInfo]) -> Result<Vec<Result<FileExtraction>>> {
        let run = || {
            files
                .par_iter()
                .map(|info| self.extract_file(info))
                .collect::<Vec<_>>()
        };

        match self.config.workers {
            Some(workers) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .build()?;
                Ok(pool.install(run))
            }
            None => Ok(run()),
        }
    }

    pub fn extract_file(&self, info: &FileInfo) -> Result<FileExtraction> {
        let source = read_source(&info.path)?;
        self.extract_source(&info.file, &source)
    }

    /// Registry, imports and file-local call resolution for one file.
    pub fn extract_source(&self, file: &SourceFile, source: &str) -> Result<FileExtraction> {
        let content_hash = FileHasher::compute(source);
        let tree = self.parse(file, source, &content_hash)?;

        let registry = RegistryBuilder::build(&tree, file);
        let imports = ImportTableBuilder::build(&tree, file);
        let import_table = ImportTable::from_imports(&imports)
            .with_fallback_aliases(&self.config.import_aliases);

        let local_index = SymbolIndex::from_registries([&registry]);
        let calls = CallResolver::new(&local_index, &import_table)
            .resolve_file(&tree, file)
            .calls;

        debug!(
            file = %file.file_path,
            declarations = registry.child_count(),
            imports = imports.imports.len(),
            calls = calls.len(),
            "extracted file"
        );

        Ok(FileExtraction {
            file: file.clone(),
            content_hash,
            registry,
            imports,
            calls,
        })
    }

    fn parse(&self, file: &SourceFile, source: &str, content_hash: &str) -> Result<SyntaxTree> {
        if let Some(cache) = &self.parse_cache {
            if let Some(tree) = cache.get(&file.file_path, content_hash) {
                return Ok(tree);
            }
        }

        let tree = self.parser.parse_source(source, &file.file_path)?;

        if let Some(cache) = &self.parse_cache {
            if let Err(err) = cache.store(&file.file_path, content_hash, &tree) {
                warn!(file = %file.file_path, error = %err, "failed to cache parse result");
            }
        }
        Ok(tree)
    }

    /// Barrier step: runs only once every extraction is collected.
    pub fn link(extractions: Vec<FileExtraction>, failures: Vec<ExtractionFailure>) -> Analysis {
        let index = SymbolIndex::from_registries(extractions.iter().map(|e| &e.registry));

        let mut hashes = FileHashes::new();
        let mut arena = CallArena::new();
        let mut registries = Vec::with_capacity(extractions.len());
        let mut imports = Vec::with_capacity(extractions.len());

        for extraction in extractions {
            hashes.insert(extraction.file.clone(), extraction.content_hash);
            arena.push_file(extraction.file, extraction.calls);
            registries.push(extraction.registry);
            imports.push(extraction.imports);
        }

        let unresolved = arena.unresolved().len();
        let filled = GlobalResolver::resolve(&mut arena, &index);
        info!(
            symbols = index.len(),
            calls = arena.len(),
            unresolved,
            filled,
            "global resolution complete"
        );

        let roadmap = RoadmapAssembler::assemble(registries, imports, arena.into_file_calls());
        Analysis {
            roadmap,
            hashes,
            failures,
        }
    }
}
