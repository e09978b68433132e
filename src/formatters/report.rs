use crate::core::diff::{FunctionChange, HashChange, VersionReport};
use crate::core::graph::ExecutionChain;

/// Plain-text console rendering of version reports and chain summaries
pub struct ReportFormatter {
    /// Maximum chain members listed per entrypoint
    chain_preview: usize,
}

impl ReportFormatter {
    pub fn new() -> Self {
        Self { chain_preview: 5 }
    }

    pub fn with_chain_preview(mut self, chain_preview: usize) -> Self {
        self.chain_preview = chain_preview;
        self
    }

    pub fn format_report(&self, report: &VersionReport) -> String {
        if report.old_version.is_empty() && report.new_version.is_empty() {
            return "Version diff: fewer than two snapshots, nothing to compare\n".to_string();
        }

        let mut out = format!(
            "Version diff: {} -> {}\n",
            report.old_version, report.new_version
        );
        if report.is_empty() {
            out.push_str("  no changes\n");
            return out;
        }

        out.push_str(&format!("Changed files ({}):\n", report.hash_changes.len()));
        for (path, change) in &report.hash_changes {
            let status = match change {
                HashChange::Added => "added",
                HashChange::Removed => "removed",
                HashChange::Modified { .. } => "modified",
            };
            out.push_str(&format!("  {status:<8} {path}\n"));
        }

        for file in &report.roadmap_changes.files {
            out.push_str(&format!("{}:\n", file.file_path));
            for func in &file.added_functions {
                out.push_str(&format!("  + {}\n", signature(func)));
            }
            for func in &file.removed_functions {
                out.push_str(&format!("  - {}\n", signature(func)));
            }
        }

        out
    }

    pub fn format_chains(&self, chains: &[ExecutionChain]) -> String {
        let mut out = format!("Execution chains ({}):\n", chains.len());
        for chain in chains {
            out.push_str(&format!(
                "  {} ({} nodes)\n",
                chain.entrypoint,
                chain.nodes.len()
            ));
            for label in chain.nodes.iter().skip(1).take(self.chain_preview) {
                out.push_str(&format!("    -> {label}\n"));
            }
            let hidden = chain.nodes.len().saturating_sub(1 + self.chain_preview);
            if hidden > 0 {
                out.push_str(&format!("    ... {hidden} more\n"));
            }
        }
        out
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn signature(func: &FunctionChange) -> String {
    let params = func
        .parameters
        .iter()
        .zip(func.param_types.iter())
        .map(|(name, ty)| match ty {
            Some(ty) => format!("{name}: {ty}"),
            None => name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ");

    let owner = [func.parent_class.as_deref(), func.parent_function.as_deref()]
        .into_iter()
        .flatten()
        .map(|name| format!("{name}."))
        .collect::<String>();

    format!("{owner}{}({params})", func.function_name)
}
