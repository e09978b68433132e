use depmap::core::graph::{sanitize_label, CallGraph, CallGraphBuilder, EdgeKind, GraphEdge};
use depmap::core::models::{Call, FileCalls, RegistryClass, RegistryFile, RegistryFunction, SourceFile};
use depmap::core::roadmap::{DependencyRoadmap, RoadmapAssembler};

fn file(path: &str) -> SourceFile {
    SourceFile::from_relative_path(path)
}

fn registry(path: &str, functions: &[&str]) -> RegistryFile {
    let mut registry = RegistryFile::new(file(path));
    registry.functions = functions.iter().map(|&f| RegistryFunction::new(f)).collect();
    registry
}

fn call(caller_function: &str, callee: &str, resolved: Option<&str>) -> Call {
    let mut call = Call::new(callee, 1, 0);
    call.caller_function = Some(caller_function.to_string());
    call.resolved_file = resolved.map(file);
    call
}

fn roadmap(registries: Vec<RegistryFile>, calls: Vec<FileCalls>) -> DependencyRoadmap {
    RoadmapAssembler::assemble(registries, Vec::new(), calls)
}

#[test]
fn graph_two_file_call_has_one_entrypoint() {
    let roadmap = roadmap(
        vec![registry("a.py", &["main"]), registry("b.py", &["helper"])],
        vec![FileCalls {
            caller_file: file("a.py"),
            calls: vec![call("main", "helper", Some("b.py"))],
        }],
    );

    let graph = CallGraph::from_roadmap(&roadmap);

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert!(graph.has_edge("a.py__main", "b.py__helper"));
    assert_eq!(graph.entrypoints(), vec!["a.py__main"]);

    let chains = graph.extract_entrypoint_chains(20);
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].entrypoint, "a.py__main");
    assert_eq!(chains[0].nodes, vec!["a.py__main", "b.py__helper"]);
}

#[test]
fn graph_unresolved_calls_target_external_nodes() {
    let roadmap = roadmap(
        vec![registry("a.py", &["main"])],
        vec![FileCalls {
            caller_file: file("a.py"),
            calls: vec![call("main", "print", None), call("main", "print", None)],
        }],
    );

    let graph = CallGraph::from_roadmap(&roadmap);

    assert!(graph.has_edge("a.py__main", "<external>__print"));
    assert_eq!(graph.edge_count(), 1);
    let node = graph.node("<external>__print").unwrap();
    assert_eq!(node.id, "_external___print");
    assert_eq!(node.group, "<external>");
}

#[test]
fn graph_structural_edges_follow_declarations() {
    let mut registry = RegistryFile::new(file("m.py"));
    let mut class = RegistryClass::new("Job");
    class.class_functions.push(RegistryFunction::new("run"));
    class.classes.push(RegistryClass::new("Config"));
    let mut outer = RegistryFunction::new("outer");
    outer.functions.push(RegistryFunction::new("inner"));
    registry.classes.push(class);
    registry.functions.push(outer);

    let graph = CallGraph::from_roadmap(&roadmap(vec![registry], Vec::new()));

    assert!(graph.has_edge("m.py__Job", "m.py__Job__run"));
    assert!(graph.has_edge("m.py__Job", "m.py__Config"));
    assert!(graph.has_edge("m.py__outer", "m.py__inner"));
    assert_eq!(graph.entrypoints(), vec!["m.py__Job", "m.py__outer"]);
}

#[test]
fn graph_constructor_and_method_calls_land_on_declaration_nodes() {
    let mut registry = RegistryFile::new(file("m.py"));
    let mut class = RegistryClass::new("Job");
    class.class_functions.push(RegistryFunction::new("run"));
    registry.classes.push(class);
    registry.functions.push(RegistryFunction::new("main"));

    let mut ctor = call("main", "Job", Some("m.py"));
    ctor.owning_class = Some("Job".to_string());
    let mut run = call("main", "run", Some("m.py"));
    run.owning_class = Some("Job".to_string());

    let graph = CallGraph::from_roadmap(&roadmap(
        vec![registry],
        vec![FileCalls {
            caller_file: file("m.py"),
            calls: vec![ctor, run],
        }],
    ));

    assert_eq!(graph.node_count(), 3);
    assert!(graph.has_edge("m.py__main", "m.py__Job"));
    assert!(graph.has_edge("m.py__main", "m.py__Job__run"));
    assert_eq!(graph.entrypoints(), vec!["m.py__main"]);
}

#[test]
fn graph_label_collisions_get_distinct_ids() {
    let mut builder = CallGraphBuilder::new();
    let first = builder.add_node_with_label("a.py__f:x");
    let second = builder.add_node_with_label("a.py__f<x");
    let again = builder.add_node_with_label("a.py__f:x");
    assert_eq!(first, again);
    assert_ne!(first, second);

    let graph = builder.build();
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.node("a.py__f:x").unwrap().id, "a.py__f_x");
    assert_eq!(graph.node("a.py__f<x").unwrap().id, "a.py__f_x_1");
    assert_eq!(sanitize_label("<external>__x"), "_external___x");
}

#[test]
fn graph_chains_tolerate_cycles() {
    let mut builder = CallGraphBuilder::new();
    let entry = builder.add_node_with_label("a.py__start");
    let ping = builder.add_node_with_label("a.py__ping");
    let pong = builder.add_node_with_label("a.py__pong");
    builder.add_edge(entry, ping, GraphEdge::call("a.py"));
    builder.add_edge(ping, pong, GraphEdge::call("a.py"));
    builder.add_edge(pong, ping, GraphEdge::call("a.py"));
    let graph = builder.build();

    let chains = graph.extract_entrypoint_chains(20);
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].nodes, vec!["a.py__start", "a.py__ping", "a.py__pong"]);
}

#[test]
fn graph_chains_respect_depth_cutoff() {
    let mut builder = CallGraphBuilder::new();
    let nodes: Vec<_> = (0..5)
        .map(|i| builder.add_node_with_label(&format!("a.py__f{i}")))
        .collect();
    for pair in nodes.windows(2) {
        builder.add_edge(pair[0], pair[1], GraphEdge::call("a.py"));
    }
    let graph = builder.build();

    let chains = graph.extract_entrypoint_chains(2);
    assert_eq!(chains[0].nodes, vec!["a.py__f0", "a.py__f1", "a.py__f2"]);
    assert_eq!(graph.extract_entrypoint_chains(20)[0].nodes.len(), 5);
}

#[test]
fn graph_duplicate_edges_collapse() {
    let mut builder = CallGraphBuilder::new();
    let a = builder.add_node_with_label("a.py__a");
    let b = builder.add_node_with_label("a.py__b");
    builder.add_edge(a, b, GraphEdge::contains());
    builder.add_edge(a, b, GraphEdge::call("a.py"));
    let graph = builder.build();

    assert_eq!(graph.edge_count(), 1);
    let edge = graph.graph().edge_weights().next().unwrap();
    assert_eq!(edge.kind, EdgeKind::Call);
}
