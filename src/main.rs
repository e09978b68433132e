use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use depmap::config::{parse_alias, AnalyzerConfig, DEFAULT_CHAIN_DEPTH};
use depmap::core::{CallGraph, CodebaseAnalyzer};
use depmap::formatters::{GraphJsonFormatter, ReportFormatter};
use depmap::store::SnapshotStore;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "depmap",
    version,
    about = "Cross-file dependency roadmap, version diff and call graph for Python codebases"
)]
struct Cli {
    /// Input directory to analyze
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    /// Directory holding versioned roadmap snapshots
    #[arg(short, long, value_name = "DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Call graph JSON output file
    #[arg(short, long, value_name = "FILE", default_value = "call_graph.json")]
    graph_output: PathBuf,

    /// Depth cutoff for entrypoint execution chains
    #[arg(long, value_name = "N", default_value_t = DEFAULT_CHAIN_DEPTH)]
    depth: usize,

    /// Worker threads for per-file extraction (defaults to all cores)
    #[arg(short, long, value_name = "N")]
    workers: Option<usize>,

    /// Import alias used when a file does not import NAME itself
    #[arg(long = "alias", value_name = "NAME=PATH", value_parser = parse_alias)]
    aliases: Vec<(String, String)>,

    /// JSON object of import aliases, `{"NAME": "module/path.py"}`
    #[arg(long, value_name = "FILE")]
    alias_file: Option<PathBuf>,

    /// Persist the parse cache in this directory
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Disable the parse cache
    #[arg(long)]
    no_cache: bool,

    /// Skip saving a snapshot and diffing against the previous one
    #[arg(long)]
    no_snapshot: bool,

    /// Write the call graph JSON on a single line
    #[arg(long)]
    compact: bool,

    /// Chain members listed per entrypoint in the console summary
    #[arg(long, value_name = "N", default_value_t = 5)]
    chain_preview: usize,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run(cli)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DEPMAP_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> Result<AnalyzerConfig> {
    let mut config = AnalyzerConfig::new()
        .with_chain_depth(cli.depth)
        .with_cache(!cli.no_cache);

    if let Some(workers) = cli.workers {
        config = config.with_workers(workers);
    }
    if let Some(cache_dir) = &cli.cache_dir {
        config = config.with_cache_dir(cache_dir);
    }
    if let Some(alias_file) = &cli.alias_file {
        config = config
            .load_alias_file(alias_file)
            .with_context(|| format!("loading alias file {}", alias_file.display()))?;
    }
    for (name, path) in &cli.aliases {
        config = config.with_alias(name, path);
    }

    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let start_time = Instant::now();
    let config = build_config(&cli)?;
    let chain_depth = config.chain_depth;

    println!("depmap - dependency roadmap analysis");
    println!("Input: {}", cli.input.display());

    let analyzer = CodebaseAnalyzer::with_config(config);
    let analysis = analyzer
        .analyze(&cli.input)
        .with_context(|| format!("analyzing {}", cli.input.display()))?;

    println!(
        "Analyzed {} files in {:.2}s ({} failed)",
        analysis.roadmap.len(),
        start_time.elapsed().as_secs_f64(),
        analysis.failures.len()
    );
    for failure in &analysis.failures {
        println!("  skipped {}: {}", failure.file_path, failure.message);
    }

    let report_formatter = ReportFormatter::new().with_chain_preview(cli.chain_preview);

    if !cli.no_snapshot {
        let store = SnapshotStore::new(&cli.data_dir);
        let version = store
            .save(&analysis.roadmap, &analysis.hashes)
            .with_context(|| format!("saving snapshot under {}", cli.data_dir.display()))?;
        println!("Snapshot: {}", cli.data_dir.join(&version).display());

        let report = store.compare_latest().context("comparing snapshots")?;
        print!("{}", report_formatter.format_report(&report));
    }

    let graph = CallGraph::from_roadmap(&analysis.roadmap);
    let chains = graph.extract_entrypoint_chains(chain_depth);
    print!("{}", report_formatter.format_chains(&chains));

    let graph_formatter = if cli.compact {
        GraphJsonFormatter::compact()
    } else {
        GraphJsonFormatter::new()
    };
    graph_formatter
        .format_to_file(&graph, &chains, &cli.graph_output)
        .with_context(|| format!("writing {}", cli.graph_output.display()))?;

    println!(
        "Call graph: {} nodes, {} edges -> {}",
        graph.node_count(),
        graph.edge_count(),
        cli.graph_output.display()
    );
    println!(
        "Total execution time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
