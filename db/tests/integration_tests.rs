use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde_json::json;
use tempfile::TempDir;
use value_schema_core::{
    Conditional, ErrorCode, Schema, SchemaBuilder, SchemaDefinition, SchemaPackage,
    ValidationOptions, WhenOptions, boolean, number, object, string,
};
use value_schema_db::{
    DatabaseError, SchemaDatabase, ValidatorConfig, bundle_hash, read_definition_dir,
    seal_package,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn service_schema() -> Schema {
    let port = number()
        .integer()
        .when("tls", WhenOptions::new().is(true).then(number().min(1024.0)))
        .unwrap();
    object()
        .keys([
            ("host", Schema::from(string().required())),
            ("tls", boolean().into()),
            ("port", port.into()),
        ])
        .unwrap()
        .into()
}

fn write_json(path: &Path, value: &impl serde::Serialize) {
    let mut f = std::fs::File::create(path).unwrap();
    serde_json::to_writer_pretty(&mut f, value).unwrap();
    f.flush().unwrap();
}

fn write_definitions(dir: &Path) {
    write_json(
        &dir.join("service.json"),
        &SchemaDefinition::new("service", &service_schema()),
    );
    let yaml = serde_yaml::to_string(&SchemaDefinition::new(
        "name",
        &string().label("name").into(),
    ))
    .unwrap();
    std::fs::write(dir.join("name.yml"), yaml).unwrap();
}

fn sealed_package(definitions: Vec<SchemaDefinition>) -> SchemaPackage {
    let mut package = SchemaPackage::new("1.0.0", Utc::now().to_rfc3339());
    package.definitions = definitions;
    seal_package(&mut package).unwrap();
    package
}

// ---------------------------------------------------------------------------
// Directory loading
// ---------------------------------------------------------------------------

#[test]
fn test_directory_loading_and_validation() {
    let dir = TempDir::new().unwrap();
    write_definitions(dir.path());

    let db = SchemaDatabase::from_dir(dir.path()).unwrap();
    assert_eq!(db.len(), 2);
    assert!(db.contains("service"));
    assert!(db.contains("name"));

    let options = ValidationOptions::default();
    assert_eq!(
        db.validate("service", &json!({ "host": "a", "tls": "true", "port": "8443" }), &options)
            .unwrap(),
        json!({ "host": "a", "tls": true, "port": 8443 })
    );

    match db.validate("service", &json!({ "host": "a", "tls": true, "port": 80 }), &options) {
        Err(DatabaseError::Validation(errors)) => {
            assert_eq!(errors.codes(), vec![ErrorCode::NumberMin]);
            assert_eq!(errors.errors()[0].path_string(), "port");
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn test_directory_definitions_round_trip_descriptions() {
    let dir = TempDir::new().unwrap();
    write_definitions(dir.path());

    let definitions = read_definition_dir(dir.path()).unwrap();
    let names: Vec<_> = definitions.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["name", "service"]);
    assert_eq!(definitions[1].schema, service_schema().describe());
}

// ---------------------------------------------------------------------------
// Bundle loading
// ---------------------------------------------------------------------------

#[test]
fn test_bundle_loading() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("schemas.json");

    let package = sealed_package(vec![
        SchemaDefinition::new("service", &service_schema()),
        SchemaDefinition::new("flag", &boolean().required().into()),
    ]);
    assert_eq!(
        package.bundle_hash.as_deref(),
        Some(bundle_hash(&package.definitions).unwrap().as_str())
    );
    write_json(&path, &package);

    let db = SchemaDatabase::from_bundle(&path).unwrap();
    assert_eq!(db.len(), 2);
    let options = ValidationOptions::default();
    assert_eq!(db.validate("flag", &json!("FALSE"), &options).unwrap(), json!(false));
}

#[test]
fn test_tampered_bundle_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("schemas.json");

    let mut package = sealed_package(vec![SchemaDefinition::new("flag", &boolean().into())]);
    package.definitions[0].name = "renamed".into();
    write_json(&path, &package);

    assert!(matches!(
        SchemaDatabase::from_bundle(&path),
        Err(DatabaseError::InvalidChecksum(_))
    ));
}

// ---------------------------------------------------------------------------
// Configuration-driven loading
// ---------------------------------------------------------------------------

#[test]
fn test_config_workflow() {
    let dir = TempDir::new().unwrap();
    let schemas = dir.path().join("schemas");
    std::fs::create_dir_all(&schemas).unwrap();
    write_definitions(&schemas);

    let config_path = dir.path().join("validator.yml");
    let yaml = format!(
        r#"
version: "1.0"
options:
  abort_early: false
sources:
  directories:
    - {}
  bundles:
    - {}
"#,
        dir.path().join("missing").display(),
        schemas.display()
    );
    std::fs::write(&config_path, yaml).unwrap();

    let config = ValidatorConfig::load(&config_path).unwrap();
    assert!(!config.options.abort_early);

    // The missing directory and the directory listed as a bundle both fail.
    assert!(matches!(
        config.database_builder().build(),
        Err(DatabaseError::NoSourcesAvailable)
    ));

    let mut fixed = config.clone();
    fixed.sources.directories.push(schemas.clone());
    let db = fixed.database_builder().build().unwrap();

    match db.validate("service", &json!({ "tls": true, "port": 1.5 }), &fixed.options) {
        Err(DatabaseError::Validation(errors)) => assert_eq!(
            errors.codes(),
            vec![ErrorCode::AnyRequired, ErrorCode::NumberInteger, ErrorCode::NumberMin]
        ),
        other => panic!("expected validation failure, got {other:?}"),
    }

    let saved = dir.path().join("validator-copy.yml");
    fixed.save(&saved).unwrap();
    assert_eq!(ValidatorConfig::load(&saved).unwrap(), fixed);
}
