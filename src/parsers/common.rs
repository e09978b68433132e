use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tree_sitter::{Language, Node as TSNode, Parser, Tree};

use crate::error::{DepmapError, Result};

pub struct TreeSitterParser {
    parser: Parser,
}

impl TreeSitterParser {
    pub fn new(language: Language) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(language)
            .map_err(|err| DepmapError::parse("<grammar>", err.to_string()))?;
        Ok(Self { parser })
    }

    pub fn parse_source(&mut self, source: &str, file_path: &str) -> Result<Tree> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| DepmapError::parse(file_path, "tree-sitter returned no tree"))
    }
}

/// Buffered read of a whole source file
pub fn read_source(file_path: &Path) -> Result<String> {
    let file = File::open(file_path).map_err(|e| DepmapError::io(file_path, e))?;
    let file_size = file
        .metadata()
        .map_err(|e| DepmapError::io(file_path, e))?
        .len() as usize;

    let mut reader = BufReader::with_capacity(file_size.clamp(1, 8192), file);
    let mut content = String::with_capacity(file_size);
    reader
        .read_to_string(&mut content)
        .map_err(|e| DepmapError::io(file_path, e))?;
    Ok(content)
}

pub fn extract_text<'a>(node: &TSNode, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}

pub fn named_children<'tree>(node: &TSNode<'tree>) -> Vec<TSNode<'tree>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

pub fn children_by_field<'tree>(node: &TSNode<'tree>, field: &str) -> Vec<TSNode<'tree>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

pub fn find_child_by_kind<'tree>(node: &TSNode<'tree>, kind: &str) -> Option<TSNode<'tree>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}
