//! Hash-gated structural comparison of two roadmap snapshots.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::hasher::FileHashes;
use super::models::{RegistryClass, RegistryFile, RegistryFunction};
use super::roadmap::DependencyRoadmap;

/// A roadmap and its file hashes, as persisted by one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub version: String,
    pub roadmap: DependencyRoadmap,
    pub hashes: FileHashes,
}

/// Unit of structural comparison; equal only when every field matches.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FunctionChange {
    pub function_name: String,
    pub parameters: Vec<String>,
    pub param_types: Vec<Option<String>>,
    pub parent_class: Option<String>,
    pub parent_function: Option<String>,
}

/// Reserved for class-level diffs; never produced yet.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassChange {
    pub class_name: String,
    pub parent_class: Option<String>,
    pub parent_function: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileChange {
    pub file_path: String,
    pub added_functions: Vec<FunctionChange>,
    pub removed_functions: Vec<FunctionChange>,
    pub added_classes: Vec<ClassChange>,
    pub removed_classes: Vec<ClassChange>,
}

impl FileChange {
    pub fn is_empty(&self) -> bool {
        self.added_functions.is_empty()
            && self.removed_functions.is_empty()
            && self.added_classes.is_empty()
            && self.removed_classes.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredRoadmapChanges {
    pub files: Vec<FileChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HashChange {
    Added,
    Removed,
    Modified { old_hash: String, new_hash: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionReport {
    pub old_version: String,
    pub new_version: String,
    pub hash_changes: BTreeMap<String, HashChange>,
    pub roadmap_changes: StructuredRoadmapChanges,
}

impl VersionReport {
    /// Report for a store holding fewer than two snapshots
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.hash_changes.is_empty() && self.roadmap_changes.files.is_empty()
    }

    pub fn file_changes(&self, file_path: &str) -> Option<&FileChange> {
        self.roadmap_changes
            .files
            .iter()
            .find(|change| change.file_path == file_path)
    }
}

pub struct VersionDiff;

impl VersionDiff {
    pub fn compare(old: &Snapshot, new: &Snapshot) -> VersionReport {
        let hash_changes = Self::hash_changes(&old.hashes, &new.hashes);

        let files = hash_changes
            .keys()
            .filter_map(|path| {
                let before = Self::functions_of(old.roadmap.get(path).map(|d| &d.registry));
                let after = Self::functions_of(new.roadmap.get(path).map(|d| &d.registry));
                let change = FileChange {
                    file_path: path.clone(),
                    added_functions: after.difference(&before).cloned().collect(),
                    removed_functions: before.difference(&after).cloned().collect(),
                    ..FileChange::default()
                };
                (!change.is_empty()).then_some(change)
            })
            .collect::<Vec<_>>();

        debug!(
            old = %old.version,
            new = %new.version,
            changed_files = hash_changes.len(),
            structural_changes = files.len(),
            "compared snapshots"
        );

        VersionReport {
            old_version: old.version.clone(),
            new_version: new.version.clone(),
            hash_changes,
            roadmap_changes: StructuredRoadmapChanges { files },
        }
    }

    pub fn hash_changes(old: &FileHashes, new: &FileHashes) -> BTreeMap<String, HashChange> {
        let mut changes = BTreeMap::new();

        for (path, old_entry) in old.iter() {
            match new.hash_of(path) {
                None => {
                    changes.insert(path.to_string(), HashChange::Removed);
                }
                Some(new_hash) if new_hash != old_entry.hash => {
                    changes.insert(
                        path.to_string(),
                        HashChange::Modified {
                            old_hash: old_entry.hash.clone(),
                            new_hash: new_hash.to_string(),
                        },
                    );
                }
                Some(_) => {}
            }
        }
        for path in new.paths() {
            if old.get(path).is_none() {
                changes.insert(path.to_string(), HashChange::Added);
            }
        }

        changes
    }

    /// Every function of a file, nested functions and methods included,
    /// tagged with its enclosing class and function.
    pub fn functions_of(registry: Option<&RegistryFile>) -> BTreeSet<FunctionChange> {
        let mut out = BTreeSet::new();
        if let Some(registry) = registry {
            collect_functions(&registry.functions, None, None, &mut out);
            for class in &registry.classes {
                collect_class(class, &mut out);
            }
        }
        out
    }
}

fn collect_functions(
    functions: &[RegistryFunction],
    class: Option<&str>,
    function: Option<&str>,
    out: &mut BTreeSet<FunctionChange>,
) {
    for func in functions {
        out.insert(FunctionChange {
            function_name: func.function_name.clone(),
            parameters: func.parameters.clone(),
            param_types: func.param_types.clone(),
            parent_class: class.map(str::to_string),
            parent_function: function.map(str::to_string),
        });
        collect_functions(&func.functions, class, Some(&func.function_name), out);
        for nested in &func.classes {
            collect_class(nested, out);
        }
    }
}

fn collect_class(class: &RegistryClass, out: &mut BTreeSet<FunctionChange>) {
    collect_functions(&class.class_functions, Some(&class.class_name), None, out);
    for nested in &class.classes {
        collect_class(nested, out);
    }
}
