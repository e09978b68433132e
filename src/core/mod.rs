pub mod analyzer;
pub mod diff;
pub mod graph;
pub mod hasher;
pub mod imports;
pub mod models;
pub mod registry;
pub mod resolver;
pub mod roadmap;
pub mod scanner;

pub use analyzer::{
    Analysis, CallArena, CallId, CodebaseAnalyzer, ExtractionFailure, GlobalResolver,
};
pub use diff::{FileChange, FunctionChange, HashChange, Snapshot, VersionDiff, VersionReport};
pub use graph::{
    CallGraph, CallGraphBuilder, DependencyGraph, EdgeKind, ExecutionChain, GraphEdge, GraphNode,
};
pub use hasher::{FileHash, FileHasher, FileHashes};
pub use models::{
    Call, FileCalls, FileImports, Import, RegistryClass, RegistryFile, RegistryFunction, SourceFile,
};
pub use resolver::{CallResolver, SymbolIndex};
pub use roadmap::{Dependency, DependencyRoadmap, RoadmapAssembler};
pub use scanner::FileScanner;
