//! `$ref` resolution for OpenAPI documents.
//!
//! [`Document::initialize`](crate::model::Document::initialize) runs in two
//! phases: schemas are first stamped with their locations and registered in a
//! [`SchemaRegistry`], then every reference slot is resolved. Same-document
//! targets are looked up through the document's own pointer lookup;
//! other documents are loaded through a [`Fetch`] implementation, each at most
//! once per initialization.

pub mod initialize;
pub mod registry;
pub(crate) mod walk;

pub use initialize::{InitializeReport, UnresolvedReference};
pub use registry::SchemaRegistry;

use crate::constants::KEY_REF;
use crate::error::Error;
use crate::fetch::Fetch;
use crate::lookup::Node;
use crate::model::{Document, SchemaLocation};
use crate::pointer::JsonPointer;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

/// Default number of references resolved concurrently.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Default limit on `$ref` → `$ref` hops inside fetched documents.
pub const DEFAULT_MAX_REFERENCE_DEPTH: usize = 10;

/// Knobs for [`Document::initialize`](crate::model::Document::initialize).
#[derive(Clone)]
pub struct ResolveOptions {
    /// Loads other documents. `None` makes any cross-document `$ref` an error.
    pub fetcher: Option<Arc<dyn Fetch>>,
    pub max_concurrency: usize,
    pub max_reference_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            fetcher: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            max_reference_depth: DEFAULT_MAX_REFERENCE_DEPTH,
        }
    }
}

impl ResolveOptions {
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: impl Fetch + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    #[must_use]
    pub const fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }
}

impl fmt::Debug for ResolveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveOptions")
            .field("remote", &self.fetcher.is_some())
            .field("max_concurrency", &self.max_concurrency)
            .field("max_reference_depth", &self.max_reference_depth)
            .finish()
    }
}

/// Outcome of resolving one target.
#[derive(Debug)]
pub(crate) enum Resolution {
    /// `origin` is where content taken from another document sits there.
    Found {
        node: Node,
        origin: Option<SchemaLocation>,
    },
    /// Nothing usable there (yet); carries the reason for the report.
    Missing(String),
}

/// Fetched documents, each loaded at most once even under concurrent demand.
#[derive(Default)]
struct DocumentCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<Option<Arc<Value>>>>>>,
}

impl DocumentCache {
    async fn get(&self, fetcher: &dyn Fetch, uri: &Url) -> Result<Option<Arc<Value>>, Error> {
        let cell = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.entry(uri.to_string()).or_default().clone()
        };
        cell.get_or_try_init(|| async {
            debug!(target: "aperture_oas::resolver", uri = %uri, "fetching referenced document");
            fetcher.fetch(uri).await.map(|found| found.map(Arc::new))
        })
        .await
        .cloned()
    }

    /// Every document fetched successfully so far.
    fn fetched(&self) -> Vec<(String, Arc<Value>)> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .filter_map(|(uri, cell)| cell.get().cloned().flatten().map(|doc| (uri.clone(), doc)))
            .collect()
    }
}

/// Shared state of one initialization run.
pub(crate) struct Resolver {
    fetcher: Option<Arc<dyn Fetch>>,
    max_depth: usize,
    documents: DocumentCache,
}

impl Resolver {
    pub(crate) fn new(options: &ResolveOptions) -> Self {
        Self {
            fetcher: options.fetcher.clone(),
            max_depth: options.max_reference_depth,
            documents: DocumentCache::default(),
        }
    }

    pub(crate) fn fetched_documents(&self) -> Vec<(String, Arc<Value>)> {
        self.documents.fetched()
    }

    /// Resolves `target` as written in `document`.
    ///
    /// With `follows_chains`, a target in another document that is itself a
    /// `$ref` object is followed, up to the configured depth.
    pub(crate) async fn resolve(
        &self,
        document: &Document,
        target: &str,
        follows_chains: bool,
    ) -> Result<Resolution, Error> {
        let base = document.base_uri();
        let mut uri = base
            .join(target)
            .map_err(|e| Error::reference_error(target, format!("invalid reference URI: {e}")))?;
        let mut visited = HashSet::new();

        loop {
            if !visited.insert(uri.to_string()) {
                return Ok(Resolution::Missing(format!("reference cycle through '{uri}'")));
            }
            if visited.len() > self.max_depth + 1 {
                return Ok(Resolution::Missing(format!(
                    "more than {} chained references",
                    self.max_depth
                )));
            }
            let pointer = JsonPointer::from_uri_fragment(uri.fragment().unwrap_or_default())?;

            if same_resource(&uri, base) {
                return Ok(match document.find_node(&pointer) {
                    Ok(Some(node)) => Resolution::Found {
                        node: node.as_ref().clone(),
                        origin: None,
                    },
                    Ok(None) => Resolution::Missing(format!("nothing at '{pointer}'")),
                    Err(e) if e.is_unsupported() => Resolution::Missing(e.to_string()),
                    Err(e) => return Err(e),
                });
            }

            let Some(fetcher) = self.fetcher.as_deref() else {
                return Err(Error::reference_error(
                    uri.as_str(),
                    "remote resolution is disabled",
                ));
            };
            let mut resource = uri.clone();
            resource.set_fragment(None);
            let Some(fetched) = self.documents.get(fetcher, &resource).await? else {
                return Err(Error::reference_error(
                    uri.as_str(),
                    format!("document '{resource}' not found"),
                ));
            };
            let Some(value) = pointer.evaluate(&fetched) else {
                return Ok(Resolution::Missing(format!("nothing at '{pointer}' in '{resource}'")));
            };

            match value.get(KEY_REF).and_then(Value::as_str) {
                Some(next) if follows_chains => {
                    uri = uri.join(next).map_err(|e| {
                        Error::reference_error(next, format!("invalid reference URI: {e}"))
                    })?;
                }
                _ => {
                    return Ok(Resolution::Found {
                        node: Node::Json(value.clone()),
                        origin: Some(SchemaLocation {
                            base_uri: resource,
                            pointer,
                        }),
                    })
                }
            }
        }
    }
}

fn same_resource(a: &Url, b: &Url) -> bool {
    let mut a = a.clone();
    let mut b = b.clone();
    a.set_fragment(None);
    b.set_fragment(None);
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MapFetcher;
    use crate::model::FromNode;
    use serde_json::json;

    fn document() -> Document {
        Document::from_node(
            &json!({
                "openapi": "3.0.3",
                "info": {"title": "t", "version": "1"},
                "paths": {},
                "components": {"examples": {"a": {"value": 1}}}
            }),
            "",
        )
        .unwrap()
        .with_base_uri(Url::parse("http://localhost:1234/root.json").unwrap())
    }

    fn fetcher() -> MapFetcher {
        MapFetcher::new()
            .with_document(
                "http://localhost:1234/ref-target.json",
                json!({
                    "foo": {"example": {"value": 42}},
                    "hop": {"$ref": "#/foo/example"},
                    "loop": {"$ref": "#/loop2"},
                    "loop2": {"$ref": "#/loop"}
                }),
            )
            .unwrap()
    }

    #[tokio::test]
    async fn same_document_targets() {
        let resolver = Resolver::new(&ResolveOptions::default());
        let doc = document();
        let found = resolver.resolve(&doc, "#/components/examples/a", true).await.unwrap();
        assert!(matches!(
            found,
            Resolution::Found {
                node: Node::Example(_),
                origin: None
            }
        ));
        let missing = resolver.resolve(&doc, "#/components/examples/b", true).await.unwrap();
        assert!(matches!(missing, Resolution::Missing(_)));
    }

    #[tokio::test]
    async fn remote_targets_need_a_fetcher() {
        let resolver = Resolver::new(&ResolveOptions::default());
        let err = resolver
            .resolve(&document(), "ref-target.json#/foo/example", true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("remote resolution is disabled"));
    }

    #[tokio::test]
    async fn remote_targets_and_chains() {
        let resolver = Resolver::new(&ResolveOptions::default().with_fetcher(fetcher()));
        let doc = document();
        let Resolution::Found {
            node: Node::Json(value),
            origin: Some(origin),
        } = resolver
            .resolve(&doc, "ref-target.json#/hop", true)
            .await
            .unwrap()
        else {
            panic!("expected a found value");
        };
        assert_eq!(value, json!({"value": 42}));
        // the chain ends at the hop's target
        assert_eq!(origin.pointer.to_string(), "/foo/example");
        assert!(origin.base_uri.as_str().ends_with("ref-target.json"));
        let cycle = resolver.resolve(&doc, "ref-target.json#/loop", true).await.unwrap();
        assert!(matches!(cycle, Resolution::Missing(reason) if reason.contains("cycle")));
        assert_eq!(resolver.fetched_documents().len(), 1);

        let err = resolver
            .resolve(&doc, "http://localhost:1234/absent.json#/x", true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Reference { .. }));
    }
}
