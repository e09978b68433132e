//! Language-neutral syntax tree consumed by the core.
//!
//! Parsers lower their concrete trees into this shape: declarations with
//! nested bodies, call expressions, simple-name assignments and import
//! statements. Everything else is flattened away by the parser.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyntaxTree {
    pub body: Vec<SyntaxNode>,
}

impl SyntaxTree {
    pub fn new(body: Vec<SyntaxNode>) -> Self {
        Self { body }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SyntaxNode {
    Class(ClassDef),
    Function(FunctionDef),
    Call(CallExpr),
    Assign(Assignment),
    Import(ImportStmt),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub line: usize,
    /// Calls in base class expressions and decorators, attributed to the class
    pub header: Vec<SyntaxNode>,
    pub body: Vec<SyntaxNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub line: usize,
    pub parameters: Vec<Parameter>,
    /// Calls in default values and decorators, attributed to the function
    pub header: Vec<SyntaxNode>,
    pub body: Vec<SyntaxNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Annotation text, absent when the parameter is unannotated
    pub annotation: Option<String>,
}

/// Shape of the invoked expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CallTarget {
    /// `f(...)`
    Name(String),
    /// `obj.method(...)`; `object` is set only when the receiver is a plain identifier
    Attribute {
        object: Option<String>,
        attribute: String,
    },
    /// Computed callee such as `handlers[key](...)`
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// 1-based line
    pub line: usize,
    /// 0-based byte column
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub target: CallTarget,
    pub position: Position,
    /// Literal source text of each argument
    pub arguments: Vec<String>,
    /// Calls found inside the callee expression and the arguments
    pub nested: Vec<SyntaxNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Simple-name targets only; tuple and attribute targets are dropped
    pub targets: Vec<String>,
    /// Set when the right-hand side is `Name(...)`
    pub constructor: Option<String>,
    pub value: Vec<SyntaxNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportStmt {
    /// Module of a `from x import y` statement
    pub module: Option<String>,
    pub names: Vec<ImportedName>,
    pub from_import: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportedName {
    /// Name the importing file uses for the symbol
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}
