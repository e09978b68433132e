use depmap::core::models::{Call, FileCalls, FileImports, Import, RegistryFile, SourceFile};
use depmap::core::roadmap::RoadmapAssembler;

fn file(path: &str) -> SourceFile {
    SourceFile::from_relative_path(path)
}

#[test]
fn roadmap_follows_registry_order_and_keeps_bare_files() {
    let registries = vec![
        RegistryFile::new(file("z.py")),
        RegistryFile::new(file("a.py")),
        RegistryFile::new(file("m.py")),
    ];
    let imports = vec![FileImports {
        file: file("a.py"),
        imports: vec![Import {
            imported_name: "x".to_string(),
            imported_from: "lib.py".to_string(),
        }],
    }];
    let calls = vec![FileCalls {
        caller_file: file("z.py"),
        calls: vec![Call::new("x", 1, 0)],
    }];

    let roadmap = RoadmapAssembler::assemble(registries, imports, calls);

    let paths: Vec<_> = roadmap.iter().map(|d| d.file_path()).collect();
    assert_eq!(paths, vec!["z.py", "a.py", "m.py"]);

    let z = roadmap.get("z.py").unwrap();
    assert!(z.imports.is_none());
    assert_eq!(z.calls.as_ref().unwrap().calls.len(), 1);

    let a = roadmap.get("a.py").unwrap();
    assert_eq!(a.imports.as_ref().unwrap().imports[0].imported_from, "lib.py");
    assert!(a.calls.is_none());

    let m = roadmap.get("m.py").unwrap();
    assert!(m.imports.is_none() && m.calls.is_none());
}

#[test]
fn roadmap_serializes_back_references_as_names() {
    let mut registry = RegistryFile::new(file("pkg/mod.py"));
    let mut method = depmap::core::models::RegistryFunction::new("run")
        .with_parameters([("self", None)]);
    method.parent_class = Some("Job".to_string());
    method.parent_file = Some("pkg/mod.py".to_string());
    let mut class = depmap::core::models::RegistryClass::new("Job");
    class.class_functions.push(method);
    registry.classes.push(class);

    let roadmap = RoadmapAssembler::assemble(vec![registry], Vec::new(), Vec::new());
    let json = serde_json::to_value(&roadmap).unwrap();

    let method = &json["map"][0]["registry"]["classes"][0]["class_functions"][0];
    assert_eq!(method["parent_class"], "Job");
    assert_eq!(method["parent_file"], "pkg/mod.py");
    assert_eq!(method["parameters"][0], "self");
    assert!(method["param_types"][0].is_null());
    assert_eq!(json["map"][0]["registry"]["file"]["file_format"], ".py");
}
