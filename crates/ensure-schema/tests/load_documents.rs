//! Integration test: load schema documents from disk in both formats.

use std::io::Write;

use ensure_core::{builtins, TypeRegistry};
use ensure_schema::{SchemaDocument, SchemaLoadError};

fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

#[test]
fn loads_yaml_by_extension() {
    let file = write_temp(
        ".yaml",
        "target: scale\nparameters:\n  - {name: factor, type: float, position: 0}\nreturns: float\n",
    );
    let doc = SchemaDocument::load(file.path()).unwrap();
    assert_eq!(doc.target.as_deref(), Some("scale"));
    let resolved = doc.resolve(TypeRegistry::new()).unwrap();
    assert_eq!(resolved.return_type, Some(builtins().float.clone()));
    assert_eq!(resolved.schema.get(0).unwrap().name(), "factor");
}

#[test]
fn loads_json_by_extension() {
    let file = write_temp(
        ".json",
        r#"{"target": "greet", "parameters": [{"name": "who", "type": "str"}]}"#,
    );
    let doc = SchemaDocument::load(file.path()).unwrap();
    assert_eq!(doc.parameters.len(), 1);
    assert_eq!(doc.parameters[0].type_name, "str");
    assert_eq!(doc.parameters[0].position, None);
}

#[test]
fn json_syntax_in_a_json_file_must_be_json() {
    let file = write_temp(".json", "target: greet\n");
    let err = SchemaDocument::load(file.path()).unwrap_err();
    assert!(matches!(err, SchemaLoadError::Parse { .. }));
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");
    let err = SchemaDocument::load(&missing).unwrap_err();
    match err {
        SchemaLoadError::DocumentLoad { path, .. } => assert!(path.ends_with("absent.yaml")),
        other => panic!("expected DocumentLoad, got {other:?}"),
    }
}
