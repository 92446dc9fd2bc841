#![cfg(feature = "integration")]

mod common;

use common::{aperture_oas_cmd, fixture, fixtures_dir};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn roundtrip_writes_json_and_yaml() {
    aperture_oas_cmd()
        .arg("roundtrip")
        .arg(fixture("petstore.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"openapi\""))
        .stdout(predicate::str::contains("3.0.3"))
        .stdout(predicate::str::contains("x-logo"));

    aperture_oas_cmd()
        .args(["roundtrip", "--format", "yaml"])
        .arg(fixture("links-callbacks.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("openapi:"))
        .stdout(predicate::str::contains("{$request.query.callbackUrl}/data"));
}

#[test]
fn find_prints_the_resolved_node() {
    aperture_oas_cmd()
        .arg("find")
        .arg(fixture("petstore.yaml"))
        .arg("/paths/~1pets/get/parameters/0")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"limit\""))
        .stdout(predicate::str::contains("$ref").not());
}

#[test]
fn find_prints_null_for_nothing() {
    aperture_oas_cmd()
        .arg("find")
        .arg(fixture("petstore.yaml"))
        .arg("/paths/~1v2")
        .assert()
        .success()
        .stdout("null\n");
}

#[test]
fn find_inside_a_schema_fails() {
    aperture_oas_cmd()
        .arg("find")
        .arg(fixture("petstore.yaml"))
        .arg("/components/schemas/Pet/properties")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported Lookup"));
}

#[test]
fn validate_checks_instances_against_schemas() {
    aperture_oas_cmd()
        .arg("validate")
        .arg(fixture("petstore.yaml"))
        .arg("/components/schemas/Pet")
        .arg(fixture("pet-valid.json"))
        .assert()
        .success()
        .stdout("valid\n");

    aperture_oas_cmd()
        .arg("validate")
        .arg(fixture("petstore.yaml"))
        .arg("/components/schemas/Pet")
        .arg(fixture("pet-invalid.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Schema Error"));

    aperture_oas_cmd()
        .arg("validate")
        .arg(fixture("petstore.yaml"))
        .arg("/components/schemas/Pet")
        .arg(fixture("no-such-instance.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("File Not Found"));
}

#[test]
fn resolve_reports_counts() {
    aperture_oas_cmd()
        .arg("resolve")
        .arg(fixture("petstore.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"resolved\": 6"))
        .stdout(predicate::str::contains("\"unresolved\": []"));
}

#[test]
fn strict_resolve_fails_on_cycles() {
    let dir = TempDir::new().unwrap();
    let spec = dir.path().join("cycle.yaml");
    fs::write(
        &spec,
        "openapi: 3.0.3\ninfo:\n  title: t\n  version: '1'\npaths: {}\ncomponents:\n  \
         parameters:\n    a:\n      $ref: '#/components/parameters/b'\n    b:\n      \
         $ref: '#/components/parameters/a'\n",
    )
    .unwrap();

    aperture_oas_cmd()
        .arg("resolve")
        .arg(&spec)
        .assert()
        .success()
        .stdout(predicate::str::contains("#/components/parameters/b"));

    aperture_oas_cmd()
        .args(["resolve", "--strict"])
        .arg(&spec)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Reference Error"));
}

#[test]
fn no_remote_turns_external_refs_into_errors() {
    aperture_oas_cmd()
        .args(["--no-remote", "resolve"])
        .arg(fixture("remote-refs.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("remote resolution is disabled"));
}

#[test]
fn json_errors_are_structured() {
    aperture_oas_cmd()
        .args(["--json-errors", "--no-remote", "resolve"])
        .arg(fixture("remote-refs.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"error_type\": \"Reference\""));
}

#[test]
fn config_file_roots_fetches_in_a_directory() {
    let dir = TempDir::new().unwrap();
    fs::copy(
        fixtures_dir().join("ref-target.json"),
        dir.path().join("ref-target.json"),
    )
    .unwrap();
    let config = dir.path().join("config.toml");
    fs::write(
        &config,
        format!("fetch_root = {:?}\nmax_concurrency = 2\n", dir.path().display().to_string()),
    )
    .unwrap();

    aperture_oas_cmd()
        .arg("--config")
        .arg(&config)
        .arg("resolve")
        .arg(fixture("remote-refs.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"resolved\": 3"));
}

#[test]
fn config_from_the_environment_is_validated() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "max_concurrency = 0\n").unwrap();

    aperture_oas_cmd()
        .env("APERTURE_OAS_CONFIG", &config)
        .arg("resolve")
        .arg(fixture("petstore.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_concurrency"));
}

#[test]
fn missing_documents_are_file_errors() {
    aperture_oas_cmd()
        .args(["roundtrip", "does-not-exist.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File Not Found"));
}
