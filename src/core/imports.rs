use crate::core::models::{FileImports, Import, SourceFile};
use crate::parsers::syntax::{ImportStmt, SyntaxNode, SyntaxTree};

/// Collects every import statement of a file, at any nesting depth.
pub struct ImportTableBuilder;

impl ImportTableBuilder {
    pub fn build(tree: &SyntaxTree, file: &SourceFile) -> FileImports {
        let mut imports = Vec::new();
        Self::walk(&tree.body, &mut imports);
        FileImports {
            file: file.clone(),
            imports,
        }
    }

    fn walk(nodes: &[SyntaxNode], imports: &mut Vec<Import>) {
        for node in nodes {
            match node {
                SyntaxNode::Import(stmt) => Self::record(stmt, imports),
                SyntaxNode::Class(class) => Self::walk(&class.body, imports),
                SyntaxNode::Function(func) => Self::walk(&func.body, imports),
                SyntaxNode::Call(call) => Self::walk(&call.nested, imports),
                SyntaxNode::Assign(assign) => Self::walk(&assign.value, imports),
            }
        }
    }

    fn record(stmt: &ImportStmt, imports: &mut Vec<Import>) {
        for imported in &stmt.names {
            // `import a.b` refers to module a/b.py; `from a import b` to a.py
            let module = match (&stmt.module, stmt.from_import) {
                (Some(module), true) => module.as_str(),
                _ => imported.name.as_str(),
            };
            imports.push(Import {
                imported_name: imported.local_name().to_string(),
                imported_from: module_path(module),
            });
        }
    }
}

/// `pkg.sub.mod` -> `pkg/sub/mod.py`
pub fn module_path(module: &str) -> String {
    format!("{}.py", module.replace('.', "/"))
}
