use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::{Directed, Direction, Graph};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use crate::core::models::{Call, FileCalls, RegistryClass, RegistryFile, RegistryFunction};
use crate::core::roadmap::DependencyRoadmap;

pub const LABEL_SEPARATOR: &str = "__";
pub const EXTERNAL_FILE: &str = "<external>";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphNode {
    /// Identifier-safe form of the label, unique within the graph
    pub id: String,
    pub label: String,
    /// First label segment, normally the declaring file
    pub group: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Contains,
    Call,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphEdge {
    pub kind: EdgeKind,
    /// File the call was made from
    pub file: Option<String>,
}

impl GraphEdge {
    pub fn contains() -> Self {
        Self {
            kind: EdgeKind::Contains,
            file: None,
        }
    }

    pub fn call(file: impl Into<String>) -> Self {
        Self {
            kind: EdgeKind::Call,
            file: Some(file.into()),
        }
    }
}

pub type DependencyGraph = Graph<GraphNode, GraphEdge, Directed>;

/// Reachable node labels from one entrypoint, in depth-first order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionChain {
    pub entrypoint: String,
    pub nodes: Vec<String>,
}

/// Join the present segments of a canonical node label.
pub fn node_label<'a, I>(segments: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    segments
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(LABEL_SEPARATOR)
}

pub fn sanitize_label(label: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let pattern = UNSAFE.get_or_init(|| {
        Regex::new(r"[^A-Za-z0-9_./\-]").expect("Invalid label sanitizer regex")
    });
    pattern.replace_all(label, "_").into_owned()
}

pub struct CallGraph {
    graph: DependencyGraph,
    by_label: HashMap<String, NodeIndex>,
}

impl CallGraph {
    pub fn from_roadmap(roadmap: &DependencyRoadmap) -> Self {
        let mut builder = CallGraphBuilder::new();
        builder.add_roadmap(roadmap);
        builder.build()
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, label: &str) -> Option<&GraphNode> {
        self.by_label.get(label).map(|&idx| &self.graph[idx])
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        match (self.by_label.get(source), self.by_label.get(target)) {
            (Some(&s), Some(&t)) => self.graph.find_edge(s, t).is_some(),
            _ => false,
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    /// Labels of nodes without incoming edges, in insertion order
    pub fn entrypoints(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter(|&idx| self.is_entrypoint(idx))
            .map(|idx| self.graph[idx].label.as_str())
            .collect()
    }

    /// One chain per entrypoint, visiting nodes at most `cutoff` edges away.
    pub fn extract_entrypoint_chains(&self, cutoff: usize) -> Vec<ExecutionChain> {
        self.graph
            .node_indices()
            .filter(|&idx| self.is_entrypoint(idx))
            .map(|entry| ExecutionChain {
                entrypoint: self.graph[entry].label.clone(),
                nodes: self.depth_limited_walk(entry, cutoff),
            })
            .collect()
    }

    fn is_entrypoint(&self, idx: NodeIndex) -> bool {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
            .is_none()
    }

    fn depth_limited_walk(&self, start: NodeIndex, cutoff: usize) -> Vec<String> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![(start, 0usize)];

        while let Some((idx, depth)) = stack.pop() {
            if !visited.insert(idx) {
                continue;
            }
            order.push(self.graph[idx].label.clone());
            if depth == cutoff {
                continue;
            }

            let mut next: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(idx, Direction::Outgoing)
                .filter(|n| !visited.contains(n))
                .collect();
            // Pushed in reverse so the earliest inserted neighbor is visited first
            next.sort_unstable_by(|a, b| b.cmp(a));
            next.dedup();
            stack.extend(next.into_iter().map(|n| (n, depth + 1)));
        }

        order
    }
}

/// Builds a [`CallGraph`]; nodes are deduplicated by their full label.
pub struct CallGraphBuilder {
    graph: DependencyGraph,
    by_label: HashMap<String, NodeIndex>,
    ids: HashSet<String>,
}

impl Default for CallGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CallGraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            by_label: HashMap::new(),
            ids: HashSet::new(),
        }
    }

    /// Node for `label`, created on first use. Distinct labels that sanitize to
    /// the same id get a numeric suffix.
    pub fn add_node_with_label(&mut self, label: &str) -> NodeIndex {
        if let Some(&idx) = self.by_label.get(label) {
            return idx;
        }

        let base = sanitize_label(label);
        let mut id = base.clone();
        let mut counter = 0;
        while self.ids.contains(&id) {
            counter += 1;
            id = format!("{base}_{counter}");
        }
        self.ids.insert(id.clone());

        let group = label
            .split(LABEL_SEPARATOR)
            .next()
            .unwrap_or(label)
            .to_string();
        let idx = self.graph.add_node(GraphNode {
            id,
            label: label.to_string(),
            group,
        });
        self.by_label.insert(label.to_string(), idx);
        idx
    }

    /// Parallel edges collapse into one; the last weight wins.
    pub fn add_edge(
        &mut self,
        source: NodeIndex,
        target: NodeIndex,
        edge: GraphEdge,
    ) -> EdgeIndex {
        self.graph.update_edge(source, target, edge)
    }

    pub fn add_roadmap(&mut self, roadmap: &DependencyRoadmap) {
        for dependency in roadmap.iter() {
            self.add_registry_file(&dependency.registry);
            if let Some(calls) = &dependency.calls {
                self.add_calls(calls);
            }
        }
    }

    fn add_registry_file(&mut self, registry: &RegistryFile) {
        let file = registry.file.file_path.as_str();
        for class in &registry.classes {
            self.add_registry_class(class, file);
        }
        for func in &registry.functions {
            self.add_registry_function(func, file, None);
        }
    }

    fn add_registry_class(&mut self, class: &RegistryClass, file: &str) -> NodeIndex {
        let class_node =
            self.add_node_with_label(&node_label([Some(file), Some(class.class_name.as_str())]));

        for nested in &class.classes {
            let nested_node = self.add_registry_class(nested, file);
            self.add_edge(class_node, nested_node, GraphEdge::contains());
        }
        for method in &class.class_functions {
            let method_node = self.add_registry_function(method, file, Some(class.class_name.as_str()));
            self.add_edge(class_node, method_node, GraphEdge::contains());
        }

        class_node
    }

    fn add_registry_function(
        &mut self,
        func: &RegistryFunction,
        file: &str,
        class: Option<&str>,
    ) -> NodeIndex {
        let func_node =
            self.add_node_with_label(&node_label([Some(file), class, Some(func.function_name.as_str())]));

        for nested in &func.functions {
            let nested_node = self.add_registry_function(nested, file, class);
            self.add_edge(func_node, nested_node, GraphEdge::contains());
        }
        for nested in &func.classes {
            let nested_node = self.add_registry_class(nested, file);
            self.add_edge(func_node, nested_node, GraphEdge::contains());
        }

        func_node
    }

    fn add_calls(&mut self, calls: &FileCalls) {
        let caller_file = calls.caller_file.file_path.as_str();
        for call in &calls.calls {
            let caller = self.add_node_with_label(&caller_label(caller_file, call));
            let callee = self.add_node_with_label(&callee_label(call));
            self.add_edge(caller, callee, GraphEdge::call(caller_file));
        }
    }

    pub fn build(self) -> CallGraph {
        CallGraph {
            graph: self.graph,
            by_label: self.by_label,
        }
    }
}

fn caller_label(caller_file: &str, call: &Call) -> String {
    node_label([
        Some(caller_file),
        call.caller_class.as_deref(),
        call.caller_function.as_deref(),
    ])
}

fn callee_label(call: &Call) -> String {
    let file = call
        .resolved_file
        .as_ref()
        .map(|file| file.file_path.as_str())
        .unwrap_or(EXTERNAL_FILE);
    let class = call.owning_class.as_deref();

    // Constructor calls land on the class node itself
    if class == Some(call.callee_name.as_str()) {
        return node_label([Some(file), class]);
    }
    node_label([Some(file), class, Some(call.callee_name.as_str())])
}
