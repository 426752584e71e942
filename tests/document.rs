//! Tests for the `.bp` document format and compiling loaded documents.
mod common;
use bgc::*;
use common::*;
use serde_json::json;

fn greeter_document() -> BlueprintDocument {
    let mut b = GraphBuilder::function("Greeter");
    let start = b.entry("function_start");
    let print = b.print(json!("hello"));
    b.wire(&start, "exec", &print, "exec");
    BlueprintDocument::with_catalog(b.blueprint, &b.catalog).author("tests")
}

#[test]
fn test_document_round_trip() {
    let document = greeter_document();
    let text = document.serialize().expect("Failed to serialize");

    assert!(text.contains("\"nodeDefinitions\""));
    assert!(text.contains("\"createdAt\""));
    assert!(text.contains("\"type\": \"function\""));

    let loaded = BlueprintDocument::deserialize(&text).expect("Failed to deserialize");
    assert_eq!(loaded, document);
}

#[test]
fn test_syntax_error_is_json_error() {
    let result = BlueprintDocument::deserialize("{ not json");
    assert!(matches!(result, Err(BlueprintError::Json(_))));
}

#[test]
fn test_missing_fields_are_malformed() {
    let text = json!({ "version": "1.0.0", "name": "Broken" }).to_string();
    let result = BlueprintDocument::deserialize(&text);
    assert!(matches!(result, Err(BlueprintError::MalformedDocument(_))));
}

#[test]
fn test_duplicate_connection_ids_are_malformed() {
    let mut document = greeter_document();
    let connection = document.blueprint.connections[0].clone();
    document.blueprint.connections.push(connection);
    let text = serde_json::to_string(&document).unwrap();

    let result = BlueprintDocument::deserialize(&text);
    assert!(matches!(result, Err(BlueprintError::MalformedDocument(_))));
}

#[test]
fn test_unsupported_version_rejected() {
    let mut document = greeter_document();
    document.version = "3.1.0".to_string();
    let text = serde_json::to_string(&document).unwrap();

    let err = BlueprintDocument::deserialize(&text).unwrap_err();
    assert!(err.to_string().contains("3.1.0"));
}

#[test]
fn test_touch_updates_last_modified_only() {
    let mut document = greeter_document();
    let created = document.metadata.created_at;
    document.touch();
    assert_eq!(document.metadata.created_at, created);
    assert!(document.metadata.last_modified >= created);
}

#[test]
fn test_compile_document_uses_embedded_definitions() {
    let mut b = GraphBuilder::function("Portable");
    let custom = NodeDefinition::new("shout", "Shout", "Custom")
        .input(NodeParam::exec("exec", "Exec"))
        .output(NodeParam::exec("exec", "Then"));
    b.catalog.insert(custom.clone());
    let start = b.entry("function_start");
    let shout = b.node("shout");
    b.wire(&start, "exec", &shout, "exec");

    let document = BlueprintDocument::new(b.blueprint, vec![custom]);
    let output = compile_document(&document, &NodeCatalog::builtin(), &CompilerOptions::default());

    // Known to the document, so not a dangling reference, but it has no emitter.
    assert!(output.source.contains("// Unsupported node type: shout"));
    assert!(!output.source.contains("Unknown node type"));
}
