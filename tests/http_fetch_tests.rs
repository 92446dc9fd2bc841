mod common;

use aperture_oas::fetch::{Fetch, HttpFetcher};
use aperture_oas::model::{Document, Example, Header};
use aperture_oas::{ResolveOptions, SchemaRegistry};
use common::read_fixture;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves `ref-target.json`, failing the test on drop unless it was
/// requested exactly once.
async fn serve_ref_target() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ref-target.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(read_fixture("ref-target.json"))
                .insert_header("content-type", "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn fetches_documents_over_http() {
    let server = serve_ref_target().await;
    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();

    let uri = Url::parse(&format!("{}/ref-target.json", server.uri())).unwrap();
    let document = fetcher.fetch(&uri).await.unwrap().unwrap();
    assert_eq!(document["foo"]["alias"]["$ref"], "#/foo/example");

    let missing = Url::parse(&format!("{}/nowhere.json", server.uri())).unwrap();
    assert!(fetcher.fetch(&missing).await.unwrap().is_none());
}

#[tokio::test]
async fn initialize_resolves_refs_against_a_live_server() {
    let server = serve_ref_target().await;
    let content = read_fixture("remote-refs.yaml").replace("http://localhost:1234", &server.uri());
    let mut document = Document::parse(&content).unwrap();

    // three refs into one document, resolved concurrently, one request
    let options = ResolveOptions::default()
        .with_fetcher(HttpFetcher::new(Duration::from_secs(5)).unwrap())
        .with_max_concurrency(8);
    let mut registry = SchemaRegistry::new();
    let report = document.initialize(&mut registry, &options).await.unwrap();
    assert!(report.is_complete(), "{:?}", report.unresolved);
    assert_eq!(report.resolved, 3);

    let aliased: Example = document
        .find_str("/paths/~1pets/get/responses/200/content/application~1json/examples/aliased")
        .unwrap()
        .unwrap();
    assert_eq!(
        aliased.summary.as_deref(),
        Some("An example served from another document")
    );
    let header: Header = document
        .find_str("/paths/~1pets/get/responses/200/headers/X-Rate-Limit")
        .unwrap()
        .unwrap();
    let schema = header.details.schema.unwrap();
    assert_eq!(
        schema.location().unwrap().uri(),
        format!("{}/ref-target.json#/headers/rate-limit/schema", server.uri())
    );
    assert!(registry.contains(&format!("{}/ref-target.json", server.uri())));
    let validator = schema.validator(&registry).unwrap();
    assert!(validator.is_valid(&serde_json::json!(10)));
    assert!(!validator.is_valid(&serde_json::json!(-1)));
}

#[tokio::test]
async fn a_missing_remote_document_stops_initialization() {
    let server = MockServer::start().await;
    let content = read_fixture("remote-refs.yaml").replace("http://localhost:1234", &server.uri());
    let mut document = Document::parse(&content).unwrap();

    let options =
        ResolveOptions::default().with_fetcher(HttpFetcher::new(Duration::from_secs(5)).unwrap());
    let err = document
        .initialize(&mut SchemaRegistry::new(), &options)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("ref-target.json"), "{err}");
}
