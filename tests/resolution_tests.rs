mod common;

use aperture_oas::fetch::{FsFetcher, MapFetcher};
use aperture_oas::fs::OsFileSystem;
use aperture_oas::model::{
    Document, Example, FromNode, Header, Operation, Parameter, PathItem, RequestBody, Schema,
};
use aperture_oas::{Error, ResolveOptions, SchemaRegistry};
use common::{fixtures_dir, parse_fixture, read_fixture};
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;
use url::Url;

fn document(value: Value) -> Document {
    Document::from_node(&value, "").unwrap()
}

#[tokio::test]
async fn same_document_schema_refs_validate() {
    let mut document = document(json!({
        "openapi": "3.1.0",
        "info": {"title": "t", "version": "1"},
        "components": {
            "schemas": {
                "target": {
                    "type": "object",
                    "required": ["id"],
                    "properties": {"id": {"type": "integer"}}
                },
                "start": {"$ref": "#/components/schemas/target"}
            }
        }
    }));
    let mut registry = SchemaRegistry::new();
    document
        .initialize(&mut registry, &ResolveOptions::default())
        .await
        .unwrap();

    let start: Schema = document.find_str("/components/schemas/start").unwrap().unwrap();
    let validator = start.validator(&registry).unwrap();
    assert!(validator.is_valid(&json!({"id": 3})));
    assert!(!validator.is_valid(&json!({"id": "three"})));
    assert!(!validator.is_valid(&json!({})));
}

#[tokio::test]
async fn petstore_resolves_completely() {
    let mut document = parse_fixture("petstore.yaml");
    let mut registry = SchemaRegistry::new();
    let report = document
        .initialize(&mut registry, &ResolveOptions::default())
        .await
        .unwrap();
    assert!(report.is_complete(), "{:?}", report.unresolved);
    // limit, two Error responses, Pet request body, rex example, one more Error response
    assert_eq!(report.resolved, 6);

    let limit: Parameter = document
        .find_str("/paths/~1pets/get/parameters/0")
        .unwrap()
        .unwrap();
    assert_eq!(limit.name, "limit");

    let body: RequestBody = document
        .find_str("/paths/~1pets/post/requestBody")
        .unwrap()
        .unwrap();
    assert_eq!(body.required, Some(true));

    let schema: Schema = document
        .find_str("/paths/~1pets~1{petId}/get/responses/200/content/application~1json/schema")
        .unwrap()
        .unwrap();
    let validator = schema.validator(&registry).unwrap();
    let valid = serde_json::from_str(&read_fixture("pet-valid.json")).unwrap();
    let invalid = serde_json::from_str(&read_fixture("pet-invalid.json")).unwrap();
    assert!(validator.is_valid(&valid));
    assert!(!validator.is_valid(&invalid));
}

#[tokio::test]
async fn cross_document_refs_through_the_filesystem() {
    let root = TempDir::new().unwrap();
    fs::copy(
        fixtures_dir().join("ref-target.json"),
        root.path().join("ref-target.json"),
    )
    .unwrap();

    let mut document = parse_fixture("remote-refs.yaml");
    let options =
        ResolveOptions::default().with_fetcher(FsFetcher::rooted(OsFileSystem, root.path()));
    let mut registry = SchemaRegistry::new();
    let report = document.initialize(&mut registry, &options).await.unwrap();
    assert!(report.is_complete(), "{:?}", report.unresolved);

    let examples = "/paths/~1pets/get/responses/200/content/application~1json/examples";
    let remote: Example = document
        .find_str(&format!("{examples}/remote"))
        .unwrap()
        .unwrap();
    assert_eq!(remote.value, Some(json!({"id": 7, "name": "Remote Rex"})));
    let aliased: Example = document
        .find_str(&format!("{examples}/aliased"))
        .unwrap()
        .unwrap();
    assert_eq!(aliased, remote);

    let header: Header = document
        .find_str("/paths/~1pets/get/responses/200/headers/X-Rate-Limit")
        .unwrap()
        .unwrap();
    assert_eq!(
        header.details.description.as_deref(),
        Some("Requests left in the window")
    );
    assert!(registry.contains("http://localhost:1234/ref-target.json"));
}

#[tokio::test]
async fn cross_document_target_is_the_exact_fragment() {
    let target = serde_json::from_str(&read_fixture("ref-target.json")).unwrap();
    let fetcher = MapFetcher::new()
        .with_document("http://localhost:1234/ref-target.json", target)
        .unwrap();
    let mut document = parse_fixture("remote-refs.yaml");
    document
        .initialize(
            &mut SchemaRegistry::new(),
            &ResolveOptions::default().with_fetcher(fetcher),
        )
        .await
        .unwrap();
    let found: serde_json::Value = document
        .find_str("/paths/~1pets/get/responses/200/content/application~1json/examples/remote")
        .unwrap()
        .unwrap();
    assert_eq!(
        found,
        json!({
            "summary": "An example served from another document",
            "value": {"id": 7, "name": "Remote Rex"}
        })
    );
}

#[tokio::test]
async fn disabled_fetch_is_a_reference_fault() {
    let mut document = parse_fixture("remote-refs.yaml");
    let err = document
        .initialize(&mut SchemaRegistry::new(), &ResolveOptions::default())
        .await
        .unwrap_err();
    match err {
        Error::Reference { uri, reason } => {
            assert!(uri.starts_with("http://localhost:1234/ref-target.json"));
            assert!(reason.contains("disabled"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_external_document_is_a_reference_fault() {
    let mut document = parse_fixture("remote-refs.yaml");
    let options = ResolveOptions::default().with_fetcher(MapFetcher::new());
    let err = document
        .initialize(&mut SchemaRegistry::new(), &options)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Reference { .. }));
}

#[tokio::test]
async fn relative_refs_resolve_against_the_file_location() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("shared.yaml"),
        "parameters:\n  trace:\n    name: X-Trace\n    in: header\n    schema:\n      type: string\n",
    )
    .unwrap();
    let spec = dir.path().join("api.yaml");
    fs::write(
        &spec,
        "openapi: 3.0.3\ninfo:\n  title: t\n  version: '1'\npaths:\n  /a:\n    parameters:\n      - $ref: 'shared.yaml#/parameters/trace'\n",
    )
    .unwrap();

    let mut document = aperture_oas::spec::load_document(&OsFileSystem, &spec).unwrap();
    assert_eq!(document.base_uri().scheme(), "file");
    let options = ResolveOptions::default().with_fetcher(FsFetcher::local());
    document
        .initialize(&mut SchemaRegistry::new(), &options)
        .await
        .unwrap();
    let param: Parameter = document.find_str("/paths/~1a/parameters/0").unwrap().unwrap();
    assert_eq!(param.name, "X-Trace");
}

#[tokio::test]
async fn path_item_refs_merge_with_local_operations() {
    let mut document = document(json!({
        "openapi": "3.1.0",
        "info": {"title": "t", "version": "1"},
        "paths": {
            "/pets": {
                "$ref": "#/components/pathItems/pets",
                "get": {
                    "operationId": "localGet",
                    "responses": {"200": {"description": "local"}}
                }
            }
        },
        "components": {
            "pathItems": {
                "pets": {
                    "description": "shared",
                    "get": {
                        "operationId": "sharedGet",
                        "responses": {"200": {"description": "shared"}}
                    },
                    "delete": {
                        "operationId": "sharedDelete",
                        "responses": {"204": {"description": "gone"}}
                    }
                }
            }
        }
    }));
    let original = document.to_json_string().unwrap();
    document
        .initialize(&mut SchemaRegistry::new(), &ResolveOptions::default())
        .await
        .unwrap();

    let item: PathItem = document.find_str("/paths/~1pets").unwrap().unwrap();
    assert_eq!(
        item.get.as_ref().unwrap().operation_id.as_deref(),
        Some("localGet")
    );
    assert_eq!(
        item.delete.as_ref().unwrap().operation_id.as_deref(),
        Some("sharedDelete")
    );
    assert_eq!(item.description.as_deref(), Some("shared"));
    let delete: Operation = document.find_str("/paths/~1pets/delete").unwrap().unwrap();
    assert_eq!(delete.operation_id.as_deref(), Some("sharedDelete"));
    // the authored form is what gets written
    assert_eq!(document.to_json_string().unwrap(), original);
}

#[tokio::test]
async fn webhook_path_items_resolve_and_schema_ids_register() {
    let mut document = parse_fixture("webhooks.yaml");
    let mut registry = SchemaRegistry::new();
    let report = document
        .initialize(&mut registry, &ResolveOptions::default())
        .await
        .unwrap();
    assert!(report.is_complete());
    assert!(registry.contains("https://schemas.example.com/pet.json"));

    let item: PathItem = document.find_str("/webhooks/newPet").unwrap().unwrap();
    assert_eq!(item.description.as_deref(), Some("Fired for every new pet"));
    assert_eq!(item.summary.as_deref(), Some("New pet notification"));
    assert!(item.post.is_some());

    let anything: Schema = document.find_str("/components/schemas/Anything").unwrap().unwrap();
    assert!(anything.validator(&registry).unwrap().is_valid(&json!([1, 2])));
}

#[tokio::test]
async fn initialize_is_repeatable() {
    let mut document = parse_fixture("petstore.yaml");
    let mut registry = SchemaRegistry::new();
    let options = ResolveOptions::default().with_max_concurrency(1);
    let first = document.initialize(&mut registry, &options).await.unwrap();
    let second = document.initialize(&mut registry, &options).await.unwrap();
    assert_eq!(first.resolved, 6);
    assert_eq!(second.resolved, 0);
    assert!(second.is_complete());
}

#[test]
fn synthetic_and_explicit_base_uris() {
    let document = parse_fixture("petstore.yaml");
    assert_eq!(document.base_uri().host_str(), Some("aperture.invalid"));
    let based = document.with_base_uri(Url::parse("https://api.example.com/openapi.yaml").unwrap());
    assert_eq!(based.base_uri().as_str(), "https://api.example.com/openapi.yaml");
}
