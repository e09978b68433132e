use depmap::config::AnalyzerConfig;
use depmap::core::diff::{FunctionChange, HashChange, Snapshot, VersionDiff};
use depmap::core::CodebaseAnalyzer;
use std::fs;
use std::path::Path;

fn snapshot(version: &str, files: &[(&str, &str)]) -> Snapshot {
    let dir = tempfile::TempDir::new().unwrap();
    for (path, code) in files {
        fs::write(dir.path().join(path), code).unwrap();
    }
    analyze(version, dir.path())
}

fn analyze(version: &str, root: &Path) -> Snapshot {
    let analysis = CodebaseAnalyzer::with_config(AnalyzerConfig::new().with_cache(false))
        .analyze(root)
        .unwrap();
    Snapshot {
        version: version.to_string(),
        roadmap: analysis.roadmap,
        hashes: analysis.hashes,
    }
}

fn func(name: &str, params: &[&str]) -> FunctionChange {
    FunctionChange {
        function_name: name.to_string(),
        parameters: params.iter().map(|p| p.to_string()).collect(),
        param_types: vec![None; params.len()],
        parent_class: None,
        parent_function: None,
    }
}

#[test]
fn diff_body_only_change_is_modified_without_structural_changes() {
    let old = snapshot("v1", &[("x.py", "def foo(a):\n    return a\n"), ("y.py", "def y():\n    pass\n")]);
    let new = snapshot("v2", &[("x.py", "def foo(a):\n    return a + 1\n"), ("y.py", "def y():\n    pass\n")]);

    let report = VersionDiff::compare(&old, &new);

    assert_eq!(report.old_version, "v1");
    assert_eq!(report.new_version, "v2");
    assert_eq!(report.hash_changes.len(), 1);
    assert!(matches!(report.hash_changes["x.py"], HashChange::Modified { .. }));
    assert!(report.roadmap_changes.files.is_empty());
}

#[test]
fn diff_signature_change_is_add_plus_remove() {
    let old = snapshot("v1", &[("x.py", "def foo(a):\n    pass\n")]);
    let new = snapshot("v2", &[("x.py", "def foo(a, b):\n    pass\n\ndef bar():\n    pass\n")]);

    let report = VersionDiff::compare(&old, &new);

    match &report.hash_changes["x.py"] {
        HashChange::Modified { old_hash, new_hash } => {
            assert_eq!(old_hash, old.hashes.hash_of("x.py").unwrap());
            assert_eq!(new_hash, new.hashes.hash_of("x.py").unwrap());
        }
        other => panic!("expected modified, got {other:?}"),
    }

    let change = report.file_changes("x.py").unwrap();
    assert_eq!(change.added_functions, vec![func("bar", &[]), func("foo", &["a", "b"])]);
    assert_eq!(change.removed_functions, vec![func("foo", &["a"])]);
    assert!(change.added_classes.is_empty() && change.removed_classes.is_empty());
}

#[test]
fn diff_reports_added_and_removed_files() {
    let old = snapshot("v1", &[("keep.py", "def k():\n    pass\n"), ("gone.py", "def g(x):\n    pass\n")]);
    let new = snapshot("v2", &[("keep.py", "def k():\n    pass\n"), ("new.py", "class N:\n    def m(self):\n        pass\n")]);

    let report = VersionDiff::compare(&old, &new);

    assert_eq!(report.hash_changes.len(), 2);
    assert_eq!(report.hash_changes["gone.py"], HashChange::Removed);
    assert_eq!(report.hash_changes["new.py"], HashChange::Added);
    assert!(report.file_changes("keep.py").is_none());

    assert_eq!(report.file_changes("gone.py").unwrap().removed_functions, vec![func("g", &["x"])]);

    let added = &report.file_changes("new.py").unwrap().added_functions;
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].function_name, "m");
    assert_eq!(added[0].parent_class.as_deref(), Some("N"));
}

#[test]
fn diff_tags_nested_functions_with_their_parent() {
    let old = snapshot("v1", &[("x.py", "def outer():\n    pass\n")]);
    let new = snapshot("v2", &[("x.py", "def outer():\n    def inner(q):\n        pass\n")]);

    let report = VersionDiff::compare(&old, &new);
    let change = report.file_changes("x.py").unwrap();

    assert!(change.removed_functions.is_empty());
    assert_eq!(change.added_functions.len(), 1);
    assert_eq!(change.added_functions[0].function_name, "inner");
    assert_eq!(change.added_functions[0].parent_function.as_deref(), Some("outer"));
}

#[test]
fn diff_skips_structure_of_files_with_unchanged_hashes() {
    let old = snapshot("v1", &[("x.py", "def foo():\n    pass\n")]);
    let mut new = snapshot("v2", &[("x.py", "def foo():\n    pass\n")]);
    new.roadmap.map[0].registry.functions.clear();

    let report = VersionDiff::compare(&old, &new);
    assert!(report.is_empty());
}

#[test]
fn diff_report_serializes_status_tags() {
    let old = snapshot("v1", &[("a.py", "x = 1\n"), ("b.py", "y = 1\n")]);
    let new = snapshot("v2", &[("a.py", "x = 2\n"), ("c.py", "z = 1\n")]);

    let json = serde_json::to_value(VersionDiff::compare(&old, &new)).unwrap();
    assert_eq!(json["hash_changes"]["a.py"]["status"], "modified");
    assert!(json["hash_changes"]["a.py"]["old_hash"].is_string());
    assert_eq!(json["hash_changes"]["b.py"]["status"], "removed");
    assert_eq!(json["hash_changes"]["c.py"]["status"], "added");
}

#[test]
fn report_formatter_lists_hash_and_function_changes() {
    use depmap::core::diff::VersionReport;
    use depmap::formatters::ReportFormatter;

    let old = snapshot("v1", &[("x.py", "def foo(a):\n    pass\n")]);
    let new = snapshot("v2", &[("x.py", "def foo(a, b: int):\n    pass\n")]);

    let text = ReportFormatter::new().format_report(&VersionDiff::compare(&old, &new));
    assert!(text.starts_with("Version diff: v1 -> v2"));
    assert!(text.contains("modified x.py"));
    assert!(text.contains("  + foo(a, b: int)"));
    assert!(text.contains("  - foo(a)"));

    let empty = ReportFormatter::new().format_report(&VersionReport::empty());
    assert!(empty.contains("fewer than two snapshots"));
}

#[test]
fn report_formatter_truncates_chain_preview() {
    use depmap::core::graph::ExecutionChain;
    use depmap::formatters::ReportFormatter;

    let chain = ExecutionChain {
        entrypoint: "m.py__main".to_string(),
        nodes: ["m.py__main", "m.py__a", "m.py__b", "m.py__c", "m.py__d"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };

    let text = ReportFormatter::new()
        .with_chain_preview(2)
        .format_chains(std::slice::from_ref(&chain));
    assert!(text.starts_with("Execution chains (1):"));
    assert!(text.contains("  m.py__main (5 nodes)"));
    assert!(text.contains("    -> m.py__a"));
    assert!(text.contains("    -> m.py__b"));
    assert!(!text.contains("m.py__c"));
    assert!(text.contains("    ... 2 more"));
}
