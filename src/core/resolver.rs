use std::collections::HashMap;

use crate::core::models::{
    Call, FileCalls, ImportTable, RegistryClass, RegistryFile, RegistryFunction, SourceFile,
};
use crate::parsers::syntax::{CallExpr, CallTarget, SyntaxNode, SyntaxTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Class,
    Method,
}

/// A project-visible declaration name
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub name: String,
    pub kind: SymbolKind,
    /// The class itself for classes, the declaring class for methods
    pub owning_class: Option<String>,
    pub file: SourceFile,
    pub parameters: Vec<String>,
    pub param_types: Vec<Option<String>>,
}

/// Flat, first-match-wins name index over a set of registries.
///
/// Entries are enumerated per file in registry order: top-level functions,
/// then classes depth-first (class, its methods, its nested classes). Lookups
/// have no notion of scope or distance; when several declarations share a
/// name the first one enumerated wins.
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    entries: Vec<SymbolEntry>,
    by_name: HashMap<String, usize>,
    members: HashMap<(String, String), usize>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_registries<'a, I>(registries: I) -> Self
    where
        I: IntoIterator<Item = &'a RegistryFile>,
    {
        let mut index = Self::new();
        for registry in registries {
            index.add_registry(registry);
        }
        index
    }

    pub fn add_registry(&mut self, registry: &RegistryFile) {
        for func in &registry.functions {
            self.push(Self::function_entry(func, SymbolKind::Function, None, &registry.file));
        }
        for class in &registry.classes {
            self.add_class(class, &registry.file);
        }
    }

    fn add_class(&mut self, class: &RegistryClass, file: &SourceFile) {
        let (parameters, param_types) = class
            .method("__init__")
            .map(|init| (init.parameters.clone(), init.param_types.clone()))
            .unwrap_or_default();

        self.push(SymbolEntry {
            name: class.class_name.clone(),
            kind: SymbolKind::Class,
            owning_class: Some(class.class_name.clone()),
            file: file.clone(),
            parameters,
            param_types,
        });

        for method in &class.class_functions {
            let entry = Self::function_entry(
                method,
                SymbolKind::Method,
                Some(&class.class_name),
                file,
            );
            let position = self.push(entry);
            self.members
                .entry((class.class_name.clone(), method.function_name.clone()))
                .or_insert(position);
        }

        for nested in &class.classes {
            self.add_class(nested, file);
        }
    }

    fn function_entry(
        func: &RegistryFunction,
        kind: SymbolKind,
        owning_class: Option<&str>,
        file: &SourceFile,
    ) -> SymbolEntry {
        SymbolEntry {
            name: func.function_name.clone(),
            kind,
            owning_class: owning_class.map(str::to_string),
            file: file.clone(),
            parameters: func.parameters.clone(),
            param_types: func.param_types.clone(),
        }
    }

    fn push(&mut self, entry: SymbolEntry) -> usize {
        let position = self.entries.len();
        self.by_name.entry(entry.name.clone()).or_insert(position);
        self.entries.push(entry);
        position
    }

    pub fn lookup(&self, name: &str) -> Option<&SymbolEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    /// First method `method` declared by a class named `class`
    pub fn method(&self, class: &str, method: &str) -> Option<&SymbolEntry> {
        self.members
            .get(&(class.to_string(), method.to_string()))
            .map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Best-effort attribution of a callee
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub owning_class: Option<String>,
    pub file: Option<SourceFile>,
    pub parameters: Option<Vec<String>>,
    pub param_types: Option<Vec<Option<String>>>,
}

impl Resolution {
    pub fn from_entry(entry: &SymbolEntry) -> Self {
        Self {
            owning_class: entry.owning_class.clone(),
            file: Some(entry.file.clone()),
            parameters: Some(entry.parameters.clone()),
            param_types: Some(entry.param_types.clone()),
        }
    }

    fn imported(module_path: &str) -> Self {
        Self {
            file: Some(SourceFile::from_relative_path(module_path)),
            ..Self::default()
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.file.is_some()
    }
}

/// Local variable -> class name, recorded on `var = ClassName(...)`.
///
/// Bindings are per file and are never cleared: a later reassignment of the
/// variable to something else keeps the old binding.
#[derive(Debug, Clone, Default)]
pub struct InstanceBindings {
    bindings: HashMap<String, String>,
}

impl InstanceBindings {
    pub fn bind(&mut self, variable: &str, class_name: &str) {
        self.bindings
            .insert(variable.to_string(), class_name.to_string());
    }

    pub fn class_of(&self, variable: &str) -> Option<&str> {
        self.bindings.get(variable).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct CallScope<'a> {
    class: Option<&'a str>,
    function: Option<&'a str>,
}

/// Walks one file and emits a [`Call`] per identifiable call expression.
pub struct CallResolver<'a> {
    index: &'a SymbolIndex,
    imports: &'a ImportTable,
}

impl<'a> CallResolver<'a> {
    pub fn new(index: &'a SymbolIndex, imports: &'a ImportTable) -> Self {
        Self { index, imports }
    }

    pub fn resolve_file(&self, tree: &SyntaxTree, file: &SourceFile) -> FileCalls {
        let mut bindings = InstanceBindings::default();
        let mut calls = Vec::new();
        self.visit(&tree.body, CallScope::default(), &mut bindings, &mut calls);
        FileCalls {
            caller_file: file.clone(),
            calls,
        }
    }

    fn visit(
        &self,
        nodes: &[SyntaxNode],
        scope: CallScope<'_>,
        bindings: &mut InstanceBindings,
        calls: &mut Vec<Call>,
    ) {
        for node in nodes {
            match node {
                SyntaxNode::Class(class) => {
                    let inner = CallScope {
                        class: Some(&class.name),
                        function: scope.function,
                    };
                    self.visit(&class.header, inner, bindings, calls);
                    self.visit(&class.body, inner, bindings, calls);
                }
                SyntaxNode::Function(func) => {
                    let inner = CallScope {
                        class: scope.class,
                        function: Some(&func.name),
                    };
                    self.visit(&func.header, inner, bindings, calls);
                    self.visit(&func.body, inner, bindings, calls);
                }
                SyntaxNode::Assign(assign) => {
                    if let Some(class_name) = &assign.constructor {
                        for target in &assign.targets {
                            bindings.bind(target, class_name);
                        }
                    }
                    self.visit(&assign.value, scope, bindings, calls);
                }
                SyntaxNode::Call(call) => {
                    if let Some(record) = self.record(call, scope, bindings) {
                        calls.push(record);
                    }
                    self.visit(&call.nested, scope, bindings, calls);
                }
                SyntaxNode::Import(_) => {}
            }
        }
    }

    fn record(
        &self,
        call: &CallExpr,
        scope: CallScope<'_>,
        bindings: &InstanceBindings,
    ) -> Option<Call> {
        let (callee_name, resolution) = self.resolve_target(&call.target, bindings)?;
        if callee_name.is_empty() {
            return None;
        }

        let mut record = Call::new(callee_name, call.position.line, call.position.column);
        record.caller_class = scope.class.map(str::to_string);
        record.caller_function = scope.function.map(str::to_string);
        record.owning_class = resolution.owning_class;
        record.resolved_file = resolution.file;
        record.parameters = resolution.parameters;
        record.param_types = resolution.param_types;
        record.arguments = call.arguments.clone();
        Some(record)
    }

    fn resolve_target(
        &self,
        target: &CallTarget,
        bindings: &InstanceBindings,
    ) -> Option<(String, Resolution)> {
        match target {
            CallTarget::Name(name) => Some((name.clone(), self.resolve_name(name))),
            CallTarget::Attribute { object, attribute } => {
                let bound = object
                    .as_deref()
                    .and_then(|object| bindings.class_of(object));
                let resolution = match bound {
                    Some(class_name) => self.resolve_member(class_name, attribute),
                    None => self.resolve_name(attribute),
                };
                Some((attribute.clone(), resolution))
            }
            CallTarget::Dynamic => None,
        }
    }

    /// Registry search, then the import table, else unresolved.
    pub fn resolve_name(&self, name: &str) -> Resolution {
        if let Some(entry) = self.index.lookup(name) {
            return Resolution::from_entry(entry);
        }
        match self.imports.lookup(name) {
            Some(module_path) => Resolution::imported(module_path),
            None => Resolution::default(),
        }
    }

    /// `obj.method()` with `obj` bound to `class_name`: the class is trusted,
    /// the file is wherever that class is declared or imported from.
    pub fn resolve_member(&self, class_name: &str, method: &str) -> Resolution {
        let file = match self.index.lookup(class_name) {
            Some(entry) => Some(entry.file.clone()),
            None => self
                .imports
                .lookup(class_name)
                .map(SourceFile::from_relative_path),
        };
        let signature = self.index.method(class_name, method);

        Resolution {
            owning_class: Some(class_name.to_string()),
            file,
            parameters: signature.map(|entry| entry.parameters.clone()),
            param_types: signature.map(|entry| entry.param_types.clone()),
        }
    }
}
