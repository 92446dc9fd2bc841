//! Fetching external documents for cross-document `$ref`s.
//!
//! A fetcher returns `Ok(None)` when the document does not exist and an
//! error only when fetching itself broke (I/O, network, unparseable content).
//! Disabling remote resolution is done by passing no fetcher at all.

use crate::error::Error;
use crate::fs::{FileSystem, OsFileSystem};
use crate::spec::parser::parse_content;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Option<Value>, Error>> + Send + 'a>>;

/// Loads the document identified by an absolute URI (fragment already removed).
pub trait Fetch: Send + Sync {
    fn fetch<'a>(&'a self, uri: &'a Url) -> FetchFuture<'a>;
}

/// Maximum accepted document size (10MB)
const MAX_DOCUMENT_SIZE: u64 = 10 * 1024 * 1024;

/// Installs the process-wide rustls crypto provider once; later calls are no-ops.
fn install_crypto_provider() {
    #[cfg(not(windows))]
    let _ = rustls::crypto::ring::default_provider().install_default();
    #[cfg(windows)]
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// Fetches `http`/`https` documents with `reqwest`.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        install_crypto_provider();
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    async fn fetch_document(&self, uri: &Url) -> Result<Option<Value>, Error> {
        debug!(target: "aperture_oas::fetch", uri = %uri, "fetching document over HTTP");
        let response = self.client.get(uri.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::reference_error(
                    uri.as_str(),
                    format!("request timed out after {} seconds", self.timeout.as_secs()),
                )
            } else {
                Error::Network(e)
            }
        })?;

        if !response.status().is_success() {
            debug!(
                target: "aperture_oas::fetch",
                uri = %uri,
                status = %response.status(),
                "document not available"
            );
            return Ok(None);
        }

        if let Some(content_length) = response.content_length() {
            if content_length > MAX_DOCUMENT_SIZE {
                return Err(too_large(uri, content_length));
            }
        }

        let bytes = response.bytes().await?;
        let length = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        if length > MAX_DOCUMENT_SIZE {
            return Err(too_large(uri, length));
        }

        let text = String::from_utf8(bytes.to_vec()).map_err(|e| {
            Error::reference_error(uri.as_str(), format!("invalid UTF-8 in response: {e}"))
        })?;
        parse_content(&text).map(Some)
    }
}

fn too_large(uri: &Url, size: u64) -> Error {
    Error::reference_error(
        uri.as_str(),
        format!("document too large: {size} bytes (max {MAX_DOCUMENT_SIZE} bytes)"),
    )
}

impl Fetch for HttpFetcher {
    fn fetch<'a>(&'a self, uri: &'a Url) -> FetchFuture<'a> {
        Box::pin(self.fetch_document(uri))
    }
}

/// How [`FsFetcher`] maps URIs onto files.
enum FsMapping {
    /// Only `file:` URIs, read from their own path.
    FileUris,
    /// Any URI; its path is taken relative to the root directory.
    Rooted(PathBuf),
}

/// Serves documents from a filesystem.
pub struct FsFetcher<F: FileSystem> {
    fs: F,
    mapping: FsMapping,
}

impl FsFetcher<OsFileSystem> {
    /// Reads `file:` URIs from the local filesystem.
    #[must_use]
    pub const fn local() -> Self {
        Self {
            fs: OsFileSystem,
            mapping: FsMapping::FileUris,
        }
    }
}

impl<F: FileSystem> FsFetcher<F> {
    /// Serves every URI from `root`: `http://host:1234/dir/a.json` reads `root/dir/a.json`.
    pub fn rooted(fs: F, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            mapping: FsMapping::Rooted(root.into()),
        }
    }

    fn path_for(&self, uri: &Url) -> Option<PathBuf> {
        match &self.mapping {
            FsMapping::FileUris => (uri.scheme() == "file")
                .then(|| uri.to_file_path().ok())
                .flatten(),
            FsMapping::Rooted(root) => {
                let decoded = urlencoding::decode(uri.path()).ok()?;
                let relative = Path::new(decoded.trim_start_matches('/'));
                // Never escape the root.
                if relative
                    .components()
                    .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
                {
                    return None;
                }
                Some(root.join(relative))
            }
        }
    }

    fn read(&self, uri: &Url) -> Result<Option<Value>, Error> {
        let Some(path) = self.path_for(uri) else {
            debug!(target: "aperture_oas::fetch", uri = %uri, "no file mapping for URI");
            return Ok(None);
        };
        debug!(target: "aperture_oas::fetch", uri = %uri, path = %path.display(), "reading document");
        match self.fs.read_to_string(&path) {
            Ok(content) => parse_content(&content).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

impl<F: FileSystem> Fetch for FsFetcher<F> {
    fn fetch<'a>(&'a self, uri: &'a Url) -> FetchFuture<'a> {
        Box::pin(async move { self.read(uri) })
    }
}

/// In-memory documents keyed by URI.
#[derive(Debug, Default, Clone)]
pub struct MapFetcher {
    documents: HashMap<String, Value>,
}

impl MapFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document. Any fragment in `uri` is ignored.
    ///
    /// # Errors
    ///
    /// Returns a parse error if `uri` is not an absolute URI.
    pub fn with_document(mut self, uri: &str, document: Value) -> Result<Self, Error> {
        let mut parsed = Url::parse(uri)
            .map_err(|e| Error::parse_error(uri, format!("not an absolute URI: {e}")))?;
        parsed.set_fragment(None);
        self.documents.insert(parsed.to_string(), document);
        Ok(self)
    }
}

impl Fetch for MapFetcher {
    fn fetch<'a>(&'a self, uri: &'a Url) -> FetchFuture<'a> {
        let found = self.documents.get(uri.as_str()).cloned();
        Box::pin(async move { Ok(found) })
    }
}

/// Routes `file:` URIs to the local filesystem and `http(s):` URIs to HTTP.
pub struct SchemeFetcher {
    files: Arc<dyn Fetch>,
    http: Arc<dyn Fetch>,
}

impl SchemeFetcher {
    pub fn new(files: Arc<dyn Fetch>, http: Arc<dyn Fetch>) -> Self {
        Self { files, http }
    }
}

impl Fetch for SchemeFetcher {
    fn fetch<'a>(&'a self, uri: &'a Url) -> FetchFuture<'a> {
        match uri.scheme() {
            "file" => self.files.fetch(uri),
            "http" | "https" => self.http.fetch(uri),
            other => {
                let error = Error::reference_error(
                    uri.as_str(),
                    format!("no fetcher for the '{other}' scheme"),
                );
                Box::pin(async move { Err(error) })
            }
        }
    }
}
