use criterion::{black_box, criterion_group, criterion_main, Criterion};
use depmap::config::AnalyzerConfig;
use depmap::core::{CallGraph, CodebaseAnalyzer};
use std::path::Path;

fn write_project(root: &Path, modules: usize) {
    std::fs::create_dir_all(root).unwrap();
    for i in 0..modules {
        let next = (i + 1) % modules;
        let content = format!(
            r#"
from module_{next} import helper_{next}

class TestClass{i}:
    def __init__(self):
        self.value = {i}

    def process(self):
        return self.calculate() * 2

    def calculate(self):
        return self.value + 10

def helper_{i}(x: int):
    return x + 1

def main():
    instance = TestClass{i}()
    helper_{next}(instance.process())
    return instance.calculate()

if __name__ == "__main__":
    main()
"#
        );
        std::fs::write(root.join(format!("module_{i}.py")), content).unwrap();
    }
}

fn benchmark_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("codebase_analysis");

    let small = tempfile::TempDir::new().unwrap();
    write_project(small.path(), 10);

    group.bench_function("small_codebase", |b| {
        b.iter(|| {
            let analyzer =
                CodebaseAnalyzer::with_config(AnalyzerConfig::new().with_cache(false));
            black_box(analyzer.analyze(black_box(small.path())).unwrap())
        });
    });

    let large = tempfile::TempDir::new().unwrap();
    write_project(large.path(), 200);

    group.bench_function("large_codebase", |b| {
        b.iter(|| {
            let analyzer =
                CodebaseAnalyzer::with_config(AnalyzerConfig::new().with_cache(false));
            black_box(analyzer.analyze(black_box(large.path())).unwrap())
        });
    });

    // Same analyzer across iterations: every parse after the first is a cache hit
    let cached = CodebaseAnalyzer::new();
    group.bench_function("large_codebase_cached", |b| {
        b.iter(|| black_box(cached.analyze(black_box(large.path())).unwrap()));
    });

    group.finish();
}

fn benchmark_call_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("call_graph");

    let dir = tempfile::TempDir::new().unwrap();
    write_project(dir.path(), 200);
    let analysis = CodebaseAnalyzer::new().analyze(dir.path()).unwrap();

    group.bench_function("build_and_extract_chains", |b| {
        b.iter(|| {
            let graph = CallGraph::from_roadmap(black_box(&analysis.roadmap));
            black_box(graph.extract_entrypoint_chains(20))
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_analysis, benchmark_call_graph);
criterion_main!(benches);
