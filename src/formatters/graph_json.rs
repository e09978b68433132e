use petgraph::visit::EdgeRef;
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::core::graph::{CallGraph, EdgeKind, ExecutionChain};
use crate::error::{DepmapError, Result};

/// Call graph export for rendering tools: nodes, edges and entrypoint chains
pub struct GraphJsonFormatter {
    pretty: bool,
}

impl GraphJsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn format_to_file(
        &self,
        graph: &CallGraph,
        chains: &[ExecutionChain],
        output_path: &Path,
    ) -> Result<()> {
        let json_content = self.format_graph(graph, chains)?;
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DepmapError::io(parent, e))?;
        }
        fs::write(output_path, json_content).map_err(|e| DepmapError::io(output_path, e))?;
        Ok(())
    }

    pub fn format_graph(&self, graph: &CallGraph, chains: &[ExecutionChain]) -> Result<String> {
        let inner = graph.graph();

        let nodes: Vec<_> = inner
            .node_weights()
            .map(|node| {
                json!({
                    "id": node.id,
                    "label": node.label,
                    "group": node.group
                })
            })
            .collect();

        // Edges refer to node ids, not labels
        let edges: Vec<_> = inner
            .edge_references()
            .map(|edge_ref| {
                let edge = edge_ref.weight();
                json!({
                    "source": inner[edge_ref.source()].id,
                    "target": inner[edge_ref.target()].id,
                    "kind": self.edge_code(edge.kind),
                    "file": edge.file
                })
            })
            .collect();

        let output = json!({
            "meta": {
                "nodes": graph.node_count(),
                "edges": graph.edge_count(),
                "entrypoints": chains.len()
            },
            "nodes": nodes,
            "edges": edges,
            "chains": chains
        });

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&output)?
        } else {
            serde_json::to_string(&output)?
        };
        Ok(rendered)
    }

    fn edge_code(&self, kind: EdgeKind) -> &'static str {
        match kind {
            EdgeKind::Contains => "contains",
            EdgeKind::Call => "call",
        }
    }
}

impl Default for GraphJsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}
