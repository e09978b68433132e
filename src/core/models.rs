//! Data model shared by the extraction pipeline, the roadmap and the diff engine.
//!
//! Declarations form a tree rooted at a [`RegistryFile`]. Parent links are
//! stored as names, never as references, so the tree serializes without
//! cycles.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Identity of a source file. Equality and hashing use `file_path` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub file_name: String,
    pub file_format: String,
    /// Path relative to the analyzed root, `/`-separated
    pub file_path: String,
}

impl SourceFile {
    pub fn new(
        file_name: impl Into<String>,
        file_format: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            file_format: file_format.into(),
            file_path: file_path.into(),
        }
    }

    /// Build a file identity from a `/`-separated relative path such as `pkg/mod.py`.
    pub fn from_relative_path(relative_path: &str) -> Self {
        let path = Path::new(relative_path);
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| relative_path.to_string());
        let file_format = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        Self::new(file_name, file_format, relative_path)
    }

    pub fn path(&self) -> &str {
        &self.file_path
    }
}

impl PartialEq for SourceFile {
    fn eq(&self, other: &Self) -> bool {
        self.file_path == other.file_path
    }
}

impl Eq for SourceFile {}

impl Hash for SourceFile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.file_path.hash(state);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryFunction {
    pub function_name: String,
    pub line: usize,
    pub parameters: Vec<String>,
    /// Parallel to `parameters`; `None` for unannotated slots
    pub param_types: Vec<Option<String>>,
    pub parent_file: Option<String>,
    pub parent_class: Option<String>,
    pub parent_function: Option<String>,
    pub functions: Vec<RegistryFunction>,
    pub classes: Vec<RegistryClass>,
}

impl RegistryFunction {
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            line: 0,
            parameters: Vec::new(),
            param_types: Vec::new(),
            parent_file: None,
            parent_class: None,
            parent_function: None,
            functions: Vec::new(),
            classes: Vec::new(),
        }
    }

    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<S>)>,
        S: Into<String>,
    {
        for (name, ty) in parameters {
            self.parameters.push(name.into());
            self.param_types.push(ty.map(Into::into));
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryClass {
    pub class_name: String,
    pub line: usize,
    pub parent_file: Option<String>,
    pub parent_class: Option<String>,
    pub parent_function: Option<String>,
    pub classes: Vec<RegistryClass>,
    pub class_functions: Vec<RegistryFunction>,
}

impl RegistryClass {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            line: 0,
            parent_file: None,
            parent_class: None,
            parent_function: None,
            classes: Vec::new(),
            class_functions: Vec::new(),
        }
    }

    pub fn method(&self, name: &str) -> Option<&RegistryFunction> {
        self.class_functions
            .iter()
            .find(|func| func.function_name == name)
    }
}

/// Root of one file's declaration tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryFile {
    pub file: SourceFile,
    pub classes: Vec<RegistryClass>,
    pub functions: Vec<RegistryFunction>,
}

impl RegistryFile {
    pub fn new(file: SourceFile) -> Self {
        Self {
            file,
            classes: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Number of top-level declarations
    pub fn child_count(&self) -> usize {
        self.classes.len() + self.functions.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// Name by which the importing file refers to the symbol
    pub imported_name: String,
    /// Module path, e.g. `pkg/util.py`
    pub imported_from: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileImports {
    pub file: SourceFile,
    pub imports: Vec<Import>,
}

/// Local name to module path lookup for one file
#[derive(Debug, Clone, Default)]
pub struct ImportTable {
    entries: HashMap<String, String>,
}

impl ImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later imports of the same local name shadow earlier ones.
    pub fn from_imports(imports: &FileImports) -> Self {
        let entries = imports
            .imports
            .iter()
            .map(|import| (import.imported_name.clone(), import.imported_from.clone()))
            .collect();
        Self { entries }
    }

    /// Add aliases for names the file does not import itself.
    pub fn with_fallback_aliases<'a, I>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (name, path) in aliases {
            self.entries
                .entry(name.clone())
                .or_insert_with(|| path.clone());
        }
        self
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallCoordinates {
    pub line: usize,
    pub column: usize,
}

/// One call-expression occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub caller_class: Option<String>,
    pub caller_function: Option<String>,
    pub callee_name: String,
    /// Class the callee belongs to, when determined
    pub owning_class: Option<String>,
    /// Declaring file; absent for unresolved or external callees
    pub resolved_file: Option<SourceFile>,
    pub coordinates: CallCoordinates,
    pub parameters: Option<Vec<String>>,
    pub param_types: Option<Vec<Option<String>>>,
    pub arguments: Vec<String>,
}

impl Call {
    pub fn new(callee_name: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            caller_class: None,
            caller_function: None,
            callee_name: callee_name.into(),
            owning_class: None,
            resolved_file: None,
            coordinates: CallCoordinates { line, column },
            parameters: None,
            param_types: None,
            arguments: Vec::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_file.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCalls {
    pub caller_file: SourceFile,
    pub calls: Vec<Call>,
}
