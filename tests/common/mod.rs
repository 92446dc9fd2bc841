//! Shared test utilities

#![allow(dead_code)]

use aperture_oas::Document;
use std::path::PathBuf;

/// Cached binary path for the aperture-oas CLI to avoid repeated lookups
#[allow(deprecated)]
pub static APERTURE_OAS_BIN: std::sync::LazyLock<PathBuf> =
    std::sync::LazyLock::new(|| assert_cmd::cargo::cargo_bin("aperture-oas"));

/// Test helper to create a command with the cached binary
pub fn aperture_oas_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(&*APERTURE_OAS_BIN);
    cmd.env_remove("APERTURE_OAS_CONFIG")
        .env_remove("APERTURE_OAS_LOG");
    cmd
}

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

pub fn fixture(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

pub fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).unwrap()
}

pub fn parse_fixture(name: &str) -> Document {
    Document::parse(&read_fixture(name)).unwrap()
}
