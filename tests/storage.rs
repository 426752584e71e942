//! Tests for directory-backed persistence.
use bgc::*;
use serde_json::json;
use tempfile::tempdir;

#[test]
fn test_missing_catalog_falls_back_to_builtin() {
    let dir = tempdir().unwrap();
    let storage = DirectoryPersistence::new(dir.path());

    let catalog = storage.load_catalog().expect("Failed to load catalog");
    assert_eq!(catalog.len(), NodeCatalog::builtin().len());
    assert!(catalog.contains("print"));
}

#[test]
fn test_catalog_file_replaces_builtin() {
    let dir = tempdir().unwrap();
    let definitions = json!([{
        "id": "print",
        "name": "Print",
        "category": "Events",
        "inputs": [{ "id": "exec", "name": "Exec", "type": "exec" }],
        "outputs": [{ "id": "exec", "name": "Then", "type": "exec" }]
    }]);
    std::fs::write(dir.path().join("catalog.json"), definitions.to_string()).unwrap();

    let catalog = DirectoryPersistence::new(dir.path()).load_catalog().unwrap();
    assert_eq!(catalog.len(), 1);
    assert!(catalog.find("print").is_some());
}

#[test]
fn test_save_list_and_load_blueprint() {
    let dir = tempdir().unwrap();
    let storage = DirectoryPersistence::new(dir.path());
    assert!(storage.list_blueprints().unwrap().is_empty());

    let catalog = NodeCatalog::builtin();
    let blueprint = Blueprint::scaffold("Player", BlueprintType::Component, &catalog);
    let document = BlueprintDocument::with_catalog(blueprint, &catalog);

    let path = storage
        .save_document(&document)
        .expect("Failed to save")
        .expect("Save should not be cancelled");
    assert_eq!(path, dir.path().join("blueprints").join("Player.bp"));

    assert_eq!(storage.list_blueprints().unwrap(), vec!["Player".to_string()]);
    let loaded = storage.load_blueprint("Player").unwrap();
    assert_eq!(loaded, document);
    assert_eq!(storage.load_blueprint("Player.bp").unwrap(), document);
}

#[test]
fn test_generated_code_goes_to_scripts() {
    let dir = tempdir().unwrap();
    let storage = DirectoryPersistence::new(dir.path());

    let path = storage
        .persist("blueprint-helpers.ts", &generate_helper_library())
        .unwrap()
        .unwrap();
    assert_eq!(path, dir.path().join("scripts").join("blueprint-helpers.ts"));
    let written = std::fs::read_to_string(path).unwrap();
    assert!(written.contains("export function log("));
}

#[test]
fn test_invalid_file_names_rejected() {
    let dir = tempdir().unwrap();
    let storage = DirectoryPersistence::new(dir.path());

    for name in ["", ".", "..", "a/b.ts", "what?.bp", "pipe|.ts"] {
        let result = storage.persist(name, "x");
        assert!(
            matches!(result, Err(BlueprintError::InvalidFileName(_))),
            "'{}' should be rejected",
            name
        );
    }
}

#[test]
fn test_missing_blueprint_is_io_error() {
    let dir = tempdir().unwrap();
    let storage = DirectoryPersistence::new(dir.path());
    assert!(matches!(storage.load_blueprint("Ghost"), Err(BlueprintError::Io { .. })));
}
