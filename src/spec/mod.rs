//! Reading and writing OpenAPI documents.
//!
//! Input text (JSON or YAML) is turned into one generic JSON tree by
//! [`parser`]; node types read that tree through [`reader::ObjectReader`] and
//! write it back through [`writer::ObjectWriter`].

pub mod parser;
pub mod reader;
pub mod writer;

pub use parser::{parse_content, to_yaml_string, yaml_to_json};

use crate::error::Error;
use crate::fs::FileSystem;
use crate::model::{Document, FromNode};
use std::path::Path;
use tracing::debug;
use url::Url;

/// Parses a JSON or YAML OpenAPI document.
///
/// # Errors
///
/// Returns an error if the content is not JSON/YAML or not a valid document.
pub fn parse_document(content: &str) -> Result<Document, Error> {
    let value = parse_content(content)?;
    Document::from_node(&value, "")
}

/// Parses a document and gives it `base_uri` for resolving relative references.
///
/// # Errors
///
/// Returns an error if the content is not JSON/YAML or not a valid document.
pub fn parse_document_at(content: &str, base_uri: Url) -> Result<Document, Error> {
    parse_document(content).map(|document| document.with_base_uri(base_uri))
}

/// Reads a document from disk; its base URI is the file's canonical `file:` URI.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid document.
pub fn load_document<F: FileSystem>(fs: &F, path: &Path) -> Result<Document, Error> {
    let canonical = fs.canonicalize(path)?;
    let base_uri = Url::from_file_path(&canonical).map_err(|()| {
        Error::Config(format!("cannot form a file URI for '{}'", canonical.display()))
    })?;
    debug!(target: "aperture_oas::spec", path = %canonical.display(), "loading document");
    let content = fs.read_to_string(&canonical)?;
    parse_document_at(&content, base_uri)
}
