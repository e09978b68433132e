use std::path::Path;
use tree_sitter::Node as TSNode;

use super::common::{
    children_by_field, extract_text, find_child_by_kind, named_children, read_source,
    TreeSitterParser,
};
use super::syntax::{
    Assignment, CallExpr, CallTarget, ClassDef, FunctionDef, ImportStmt, ImportedName, Parameter,
    Position, SyntaxNode, SyntaxTree,
};
use super::LanguageParser;
use crate::error::{DepmapError, Result};

/// Lowers tree-sitter Python trees into [`SyntaxTree`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonParser;

impl PythonParser {
    pub fn new() -> Self {
        Self
    }

    fn lower_block(&self, node: &TSNode, source: &[u8], out: &mut Vec<SyntaxNode>) {
        for child in named_children(node) {
            self.lower(&child, source, out);
        }
    }

    fn lower(&self, node: &TSNode, source: &[u8], out: &mut Vec<SyntaxNode>) {
        match node.kind() {
            "class_definition" => self.lower_class(node, source, Vec::new(), out),
            "function_definition" => self.lower_function(node, source, Vec::new(), out),
            "decorated_definition" => self.lower_decorated(node, source, out),
            "call" => out.push(SyntaxNode::Call(self.lower_call(node, source))),
            "assignment" => out.push(SyntaxNode::Assign(self.lower_assignment(node, source))),
            "import_statement" => out.push(SyntaxNode::Import(self.lower_import(node, source))),
            "import_from_statement" => {
                if let Some(import) = self.lower_from_import(node, source) {
                    out.push(SyntaxNode::Import(import));
                }
            }
            "comment" => {}
            // if/for/while/try/with and plain expressions
            _ => self.lower_block(node, source, out),
        }
    }

    /// Decorator calls belong to the declaration they decorate.
    fn lower_decorated(&self, node: &TSNode, source: &[u8], out: &mut Vec<SyntaxNode>) {
        let mut decorators = Vec::new();
        for child in named_children(node) {
            if child.kind() == "decorator" {
                self.lower_block(&child, source, &mut decorators);
            }
        }

        match node.child_by_field_name("definition") {
            Some(def) if def.kind() == "class_definition" => {
                self.lower_class(&def, source, decorators, out)
            }
            Some(def) if def.kind() == "function_definition" => {
                self.lower_function(&def, source, decorators, out)
            }
            Some(def) => {
                out.append(&mut decorators);
                self.lower(&def, source, out);
            }
            None => out.append(&mut decorators),
        }
    }

    fn lower_class(
        &self,
        node: &TSNode,
        source: &[u8],
        decorators: Vec<SyntaxNode>,
        out: &mut Vec<SyntaxNode>,
    ) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };

        let mut header = Vec::new();
        if let Some(bases) = node.child_by_field_name("superclasses") {
            self.lower_block(&bases, source, &mut header);
        }
        header.extend(decorators);

        let mut body = Vec::new();
        if let Some(block) = node.child_by_field_name("body") {
            self.lower_block(&block, source, &mut body);
        }

        out.push(SyntaxNode::Class(ClassDef {
            name: extract_text(&name_node, source).to_string(),
            line: node.start_position().row + 1,
            header,
            body,
        }));
    }

    fn lower_function(
        &self,
        node: &TSNode,
        source: &[u8],
        decorators: Vec<SyntaxNode>,
        out: &mut Vec<SyntaxNode>,
    ) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };

        let mut header = Vec::new();
        let parameters = match node.child_by_field_name("parameters") {
            Some(params) => self.lower_parameters(&params, source, &mut header),
            None => Vec::new(),
        };
        header.extend(decorators);

        let mut body = Vec::new();
        if let Some(block) = node.child_by_field_name("body") {
            self.lower_block(&block, source, &mut body);
        }

        out.push(SyntaxNode::Function(FunctionDef {
            name: extract_text(&name_node, source).to_string(),
            line: node.start_position().row + 1,
            parameters,
            header,
            body,
        }));
    }

    /// Calls in default values are lowered into `defaults_out`.
    fn lower_parameters(
        &self,
        params: &TSNode,
        source: &[u8],
        defaults_out: &mut Vec<SyntaxNode>,
    ) -> Vec<Parameter> {
        let mut parameters = Vec::new();

        for param in named_children(params) {
            let annotation = param
                .child_by_field_name("type")
                .map(|ty| extract_text(&ty, source).to_string());

            let name = match param.kind() {
                "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                    extract_text(&param, source).to_string()
                }
                "typed_parameter" => match named_children(&param)
                    .into_iter()
                    .find(|child| child.kind() != "type")
                {
                    Some(name_node) => extract_text(&name_node, source).to_string(),
                    None => continue,
                },
                "default_parameter" | "typed_default_parameter" => {
                    if let Some(value) = param.child_by_field_name("value") {
                        self.lower(&value, source, defaults_out);
                    }
                    match param.child_by_field_name("name") {
                        Some(name_node) => extract_text(&name_node, source).to_string(),
                        None => continue,
                    }
                }
                // `*`, `/` separators and tuple patterns
                _ => continue,
            };

            parameters.push(Parameter { name, annotation });
        }

        parameters
    }

    fn lower_call(&self, node: &TSNode, source: &[u8]) -> CallExpr {
        let function = node.child_by_field_name("function");
        let target = function
            .map(|f| self.call_target(&f, source))
            .unwrap_or(CallTarget::Dynamic);

        let mut nested = Vec::new();
        if let Some(function) = function {
            match function.kind() {
                "identifier" => {}
                "attribute" => {
                    if let Some(object) = function.child_by_field_name("object") {
                        self.lower(&object, source, &mut nested);
                    }
                }
                _ => self.lower(&function, source, &mut nested),
            }
        }

        let mut arguments = Vec::new();
        if let Some(args) = node.child_by_field_name("arguments") {
            if args.kind() == "argument_list" {
                arguments.extend(
                    named_children(&args)
                        .iter()
                        .map(|arg| extract_text(arg, source).to_string()),
                );
            } else {
                // `f(x for x in xs)`
                arguments.push(extract_text(&args, source).to_string());
            }
            self.lower_block(&args, source, &mut nested);
        }

        CallExpr {
            target,
            position: Position {
                line: node.start_position().row + 1,
                column: node.start_position().column,
            },
            arguments,
            nested,
        }
    }

    fn call_target(&self, function: &TSNode, source: &[u8]) -> CallTarget {
        match function.kind() {
            "identifier" => CallTarget::Name(extract_text(function, source).to_string()),
            "attribute" => {
                let attribute = function
                    .child_by_field_name("attribute")
                    .map(|attr| extract_text(&attr, source))
                    .unwrap_or_default();
                if attribute.is_empty() {
                    return CallTarget::Dynamic;
                }
                let object = function
                    .child_by_field_name("object")
                    .filter(|object| object.kind() == "identifier")
                    .map(|object| extract_text(&object, source).to_string());
                CallTarget::Attribute {
                    object,
                    attribute: attribute.to_string(),
                }
            }
            _ => CallTarget::Dynamic,
        }
    }

    fn lower_assignment(&self, node: &TSNode, source: &[u8]) -> Assignment {
        let mut targets = Vec::new();
        let mut value = Vec::new();
        let mut current = *node;

        // `a = b = Foo()` nests assignments on the right
        let right = loop {
            if let Some(left) = current.child_by_field_name("left") {
                if left.kind() == "identifier" {
                    targets.push(extract_text(&left, source).to_string());
                } else {
                    self.lower(&left, source, &mut value);
                }
            }
            match current.child_by_field_name("right") {
                Some(next) if next.kind() == "assignment" => current = next,
                next => break next,
            }
        };

        let constructor = right
            .filter(|rhs| rhs.kind() == "call")
            .and_then(|call| call.child_by_field_name("function"))
            .filter(|function| function.kind() == "identifier")
            .map(|function| extract_text(&function, source).to_string());

        let mut rhs_nodes = Vec::new();
        if let Some(rhs) = right {
            self.lower(&rhs, source, &mut rhs_nodes);
        }
        rhs_nodes.append(&mut value);

        Assignment {
            targets,
            constructor,
            value: rhs_nodes,
        }
    }

    fn lower_import(&self, node: &TSNode, source: &[u8]) -> ImportStmt {
        ImportStmt {
            module: None,
            names: self.imported_names(node, source),
            from_import: false,
        }
    }

    fn lower_from_import(&self, node: &TSNode, source: &[u8]) -> Option<ImportStmt> {
        let module_node = node.child_by_field_name("module_name")?;
        let module = extract_text(&module_node, source).trim_start_matches('.');
        if module.is_empty() {
            return None;
        }

        let mut names = self.imported_names(node, source);
        if find_child_by_kind(node, "wildcard_import").is_some() {
            names.push(ImportedName {
                name: "*".to_string(),
                alias: None,
            });
        }

        Some(ImportStmt {
            module: Some(module.to_string()),
            names,
            from_import: true,
        })
    }

    fn imported_names(&self, node: &TSNode, source: &[u8]) -> Vec<ImportedName> {
        children_by_field(node, "name")
            .iter()
            .filter_map(|name_node| match name_node.kind() {
                "dotted_name" => Some(ImportedName {
                    name: extract_text(name_node, source).to_string(),
                    alias: None,
                }),
                "aliased_import" => {
                    let name = name_node.child_by_field_name("name")?;
                    Some(ImportedName {
                        name: extract_text(&name, source).to_string(),
                        alias: name_node
                            .child_by_field_name("alias")
                            .map(|alias| extract_text(&alias, source).to_string()),
                    })
                }
                _ => None,
            })
            .collect()
    }
}

fn first_error<'tree>(node: &TSNode<'tree>) -> Option<TSNode<'tree>> {
    if node.is_error() || node.is_missing() {
        return Some(*node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

impl LanguageParser for PythonParser {
    fn parse_source(&self, source: &str, file_path: &str) -> Result<SyntaxTree> {
        let mut parser = TreeSitterParser::new(tree_sitter_python::language())?;
        let tree = parser.parse_source(source, file_path)?;
        let root = tree.root_node();

        if root.has_error() {
            let line = first_error(&root)
                .map(|node| node.start_position().row + 1)
                .unwrap_or(1);
            return Err(DepmapError::parse(
                file_path,
                format!("syntax error near line {line}"),
            ));
        }

        let mut body = Vec::new();
        self.lower_block(&root, source.as_bytes(), &mut body);
        Ok(SyntaxTree::new(body))
    }

    fn parse_file(&self, file_path: &Path) -> Result<SyntaxTree> {
        let source = read_source(file_path)?;
        self.parse_source(&source, &file_path.to_string_lossy())
    }

    fn language_name(&self) -> &str {
        "python"
    }
}
