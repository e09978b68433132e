use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::models::{FileCalls, FileImports, RegistryFile};

/// Registry, imports and calls of one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub registry: RegistryFile,
    pub imports: Option<FileImports>,
    pub calls: Option<FileCalls>,
}

impl Dependency {
    pub fn file_path(&self) -> &str {
        &self.registry.file.file_path
    }
}

/// Project-wide collection of per-file dependencies, in traversal order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyRoadmap {
    pub map: Vec<Dependency>,
}

impl DependencyRoadmap {
    pub fn get(&self, file_path: &str) -> Option<&Dependency> {
        self.map.iter().find(|dep| dep.file_path() == file_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

pub struct RoadmapAssembler;

impl RoadmapAssembler {
    /// Join registries, imports and calls on file path. Ordering follows
    /// `registries`; a file without imports or calls is kept with those absent.
    pub fn assemble(
        registries: Vec<RegistryFile>,
        imports: Vec<FileImports>,
        calls: Vec<FileCalls>,
    ) -> DependencyRoadmap {
        let mut imports_by_path: HashMap<String, FileImports> = imports
            .into_iter()
            .map(|imports| (imports.file.file_path.clone(), imports))
            .collect();
        let mut calls_by_path: HashMap<String, FileCalls> = calls
            .into_iter()
            .map(|calls| (calls.caller_file.file_path.clone(), calls))
            .collect();

        let map = registries
            .into_iter()
            .map(|registry| {
                let path = registry.file.file_path.as_str();
                let imports = imports_by_path.remove(path);
                let calls = calls_by_path.remove(path);
                Dependency {
                    registry,
                    imports,
                    calls,
                }
            })
            .collect();

        DependencyRoadmap { map }
    }
}
