use crate::core::models::{RegistryClass, RegistryFile, RegistryFunction, SourceFile};
use crate::parsers::syntax::{ClassDef, FunctionDef, SyntaxNode, SyntaxTree};

/// Builds the nested declaration registry of one file.
pub struct RegistryBuilder;

/// Lexical position of the declarations being collected
#[derive(Clone, Copy)]
struct Scope<'a> {
    file_path: &'a str,
    class: Option<&'a str>,
    function: Option<&'a str>,
}

#[derive(Default)]
struct Members {
    classes: Vec<RegistryClass>,
    functions: Vec<RegistryFunction>,
}

impl RegistryBuilder {
    pub fn build(tree: &SyntaxTree, file: &SourceFile) -> RegistryFile {
        let scope = Scope {
            file_path: &file.file_path,
            class: None,
            function: None,
        };
        let members = Self::collect(&tree.body, scope);

        RegistryFile {
            file: file.clone(),
            classes: members.classes,
            functions: members.functions,
        }
    }

    fn collect(nodes: &[SyntaxNode], scope: Scope<'_>) -> Members {
        let mut members = Members::default();
        Self::collect_into(nodes, scope, &mut members);
        members
    }

    fn collect_into(nodes: &[SyntaxNode], scope: Scope<'_>, members: &mut Members) {
        for node in nodes {
            match node {
                SyntaxNode::Class(class) => {
                    Self::collect_into(&class.header, scope, members);
                    members.classes.push(Self::class(class, scope));
                }
                SyntaxNode::Function(func) => {
                    Self::collect_into(&func.header, scope, members);
                    members.functions.push(Self::function(func, scope));
                }
                SyntaxNode::Call(call) => Self::collect_into(&call.nested, scope, members),
                SyntaxNode::Assign(assign) => Self::collect_into(&assign.value, scope, members),
                SyntaxNode::Import(_) => {}
            }
        }
    }

    fn class(class: &ClassDef, scope: Scope<'_>) -> RegistryClass {
        let inner = Scope {
            file_path: scope.file_path,
            class: Some(&class.name),
            function: None,
        };
        let members = Self::collect(&class.body, inner);

        RegistryClass {
            class_name: class.name.clone(),
            line: class.line,
            parent_file: Some(scope.file_path.to_string()),
            parent_class: scope.class.map(str::to_string),
            parent_function: scope.function.map(str::to_string),
            classes: members.classes,
            class_functions: members.functions,
        }
    }

    fn function(func: &FunctionDef, scope: Scope<'_>) -> RegistryFunction {
        let inner = Scope {
            file_path: scope.file_path,
            class: None,
            function: Some(&func.name),
        };
        let members = Self::collect(&func.body, inner);

        RegistryFunction {
            function_name: func.name.clone(),
            line: func.line,
            parameters: func.parameters.iter().map(|p| p.name.clone()).collect(),
            param_types: func
                .parameters
                .iter()
                .map(|p| p.annotation.clone())
                .collect(),
            parent_file: Some(scope.file_path.to_string()),
            parent_class: scope.class.map(str::to_string),
            parent_function: scope.function.map(str::to_string),
            functions: members.functions,
            classes: members.classes,
        }
    }
}
