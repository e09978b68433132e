//! # depmap
//!
//! Cross-file symbol resolution and dependency mapping for Python codebases.
//!
//! A run walks a source tree, builds a nested symbol registry per file,
//! resolves call expressions across file boundaries and assembles a
//! dependency roadmap. Roadmaps are persisted as versioned snapshots so that
//! consecutive runs can be diffed, and turned into a call graph from which
//! entrypoint execution chains are extracted.
//!
//! ## Pipeline
//!
//! - **Extraction**: registry, imports and file-local call resolution, one
//!   parallel unit of work per file
//! - **Global resolution**: a monotonic fill-in pass over every unresolved call
//! - **Roadmap**: one dependency record per file, in traversal order
//! - **Diff**: hash-gated structural comparison of the two latest snapshots
//! - **Call graph**: deduplicated declaration nodes, call edges, entrypoint chains

pub mod config;
pub mod core;
pub mod error;
pub mod formatters;
pub mod parsers;
pub mod store;

pub use config::AnalyzerConfig;
pub use error::{DepmapError, Result};
