use depmap::config::{parse_alias, AnalyzerConfig};
use std::fs;

#[test]
fn config_alias_file_merges_into_existing_aliases() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("aliases.json");
    fs::write(
        &path,
        r#"{"np": "vendor/numpy.py", "helper": "lib/helpers.py"}"#,
    )
    .unwrap();

    let config = AnalyzerConfig::new()
        .with_alias("helper", "old/helpers.py")
        .with_alias("fmt", "lib/fmt.py")
        .load_alias_file(&path)
        .unwrap();

    assert_eq!(config.import_aliases.len(), 3);
    assert_eq!(config.import_aliases["np"], "vendor/numpy.py");
    assert_eq!(config.import_aliases["helper"], "lib/helpers.py");
    assert_eq!(config.import_aliases["fmt"], "lib/fmt.py");
}

#[test]
fn config_alias_file_errors_are_reported() {
    let dir = tempfile::TempDir::new().unwrap();
    assert!(AnalyzerConfig::new()
        .load_alias_file(&dir.path().join("missing.json"))
        .is_err());

    let path = dir.path().join("bad.json");
    fs::write(&path, r#"["not", "an", "object"]"#).unwrap();
    assert!(AnalyzerConfig::new().load_alias_file(&path).is_err());
}

#[test]
fn parse_alias_splits_name_and_path() {
    assert_eq!(
        parse_alias("helper=lib/helpers.py").unwrap(),
        ("helper".to_string(), "lib/helpers.py".to_string())
    );
    assert_eq!(
        parse_alias(" np = vendor/numpy.py ").unwrap(),
        ("np".to_string(), "vendor/numpy.py".to_string())
    );
}

#[test]
fn parse_alias_rejects_missing_parts() {
    assert!(parse_alias("=x").is_err());
    assert!(parse_alias("x=").is_err());
    assert!(parse_alias("x").is_err());
}
