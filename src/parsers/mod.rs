pub mod cache;
pub mod common;
pub mod python;
pub mod syntax;

use std::path::Path;

use crate::error::Result;

pub use syntax::SyntaxTree;

pub trait LanguageParser {
    fn parse_source(&self, source: &str, file_path: &str) -> Result<SyntaxTree>;
    fn parse_file(&self, file_path: &Path) -> Result<SyntaxTree>;
    fn language_name(&self) -> &str;
}
