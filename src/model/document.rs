use crate::constants::{
    is_supported_version, DEFAULT_BASE_URI_PREFIX, FIELD_COMPONENTS, FIELD_PATHS, FIELD_WEBHOOKS,
    SUPPORTED_VERSIONS,
};
use crate::error::Error;
use crate::lookup::{
    resolve_child, resolve_indexed, resolve_keyed, Addressable, FromLookup, LookupCache,
    LookupResult, Node,
};
use crate::model::{
    Components, Extensions, ExternalDocs, FromNode, Info, PathItem, Paths, SecurityRequirement,
    Server, Tag, ToNode,
};
use crate::pointer::JsonPointer;
use crate::spec::parser::{parse_content, to_yaml_string, yaml_to_json};
use crate::spec::reader::ObjectReader;
use crate::spec::writer::ObjectWriter;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use url::Url;

static NEXT_SYNTHETIC_ID: AtomicU64 = AtomicU64::new(1);

fn synthetic_base_uri() -> Result<Url, Error> {
    let id = NEXT_SYNTHETIC_ID.fetch_add(1, Ordering::Relaxed);
    Url::parse(&format!("{DEFAULT_BASE_URI_PREFIX}{id}.json"))
        .map_err(|e| Error::Config(format!("invalid synthetic base URI: {e}")))
}

/// The root of an OpenAPI description.
#[derive(Debug, Clone)]
pub struct Document {
    pub openapi: String,
    pub info: Info,
    /// 3.1 only.
    pub json_schema_dialect: Option<String>,
    pub servers: Option<Vec<Server>>,
    pub paths: Option<Paths>,
    /// 3.1 only.
    pub webhooks: Option<IndexMap<String, PathItem>>,
    pub components: Option<Components>,
    pub security: Option<Vec<SecurityRequirement>>,
    pub tags: Option<Vec<Tag>>,
    pub external_docs: Option<ExternalDocs>,
    pub extensions: Extensions,
    base_uri: Url,
    lookup_cache: LookupCache,
}

impl Document {
    /// An empty document with a synthetic base URI.
    ///
    /// # Errors
    ///
    /// Returns a parse error if `openapi` is not a supported version.
    pub fn new(openapi: impl Into<String>, info: Info) -> Result<Self, Error> {
        let openapi = openapi.into();
        check_version(&openapi)?;
        Ok(Self {
            openapi,
            info,
            json_schema_dialect: None,
            servers: None,
            paths: Some(Paths::default()),
            webhooks: None,
            components: None,
            security: None,
            tags: None,
            external_docs: None,
            extensions: Extensions::new(),
            base_uri: synthetic_base_uri()?,
            lookup_cache: LookupCache::default(),
        })
    }

    /// Parses JSON or YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or is not a valid document.
    pub fn parse(content: &str) -> Result<Self, Error> {
        Self::from_node(&parse_content(content)?, "")
    }

    /// # Errors
    ///
    /// Returns an error if the JSON does not parse or is not a valid document.
    pub fn from_json_str(content: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_node(&value, "")
    }

    /// # Errors
    ///
    /// Returns an error if the YAML does not parse or is not a valid document.
    pub fn from_yaml_str(content: &str) -> Result<Self, Error> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
        Self::from_node(&yaml_to_json(yaml)?, "")
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn to_json_string(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(&self.to_node())?)
    }

    /// # Errors
    ///
    /// Returns an error if YAML serialization fails.
    pub fn to_yaml_string(&self) -> Result<String, Error> {
        to_yaml_string(&self.to_node())
    }

    /// The URI relative `$ref`s and schema `$id`s resolve against.
    #[must_use]
    pub const fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    #[must_use]
    pub fn with_base_uri(mut self, base_uri: Url) -> Self {
        self.set_base_uri(base_uri);
        self
    }

    pub fn set_base_uri(&mut self, base_uri: Url) {
        self.base_uri = base_uri;
        self.lookup_cache.clear();
    }

    /// Looks up the node at `pointer` and converts it to `T`.
    ///
    /// `Ok(None)` covers both "nothing there" and "something of another kind".
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] when the pointer enters a schema body.
    pub fn find<T: FromLookup>(&self, pointer: &JsonPointer) -> Result<Option<T>, Error> {
        Ok(self
            .find_node(pointer)?
            .and_then(|node| T::from_lookup(&node)))
    }

    /// [`Document::find`] with the pointer given as text.
    ///
    /// # Errors
    ///
    /// Returns a parse error for a malformed pointer, otherwise as [`Document::find`].
    pub fn find_str<T: FromLookup>(&self, pointer: &str) -> Result<Option<T>, Error> {
        self.find(&JsonPointer::parse(pointer)?)
    }

    /// The memoized, untyped lookup behind [`Document::find`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] when the pointer enters a schema body.
    pub fn find_node(&self, pointer: &JsonPointer) -> Result<Option<Arc<Node>>, Error> {
        let key = pointer.to_string();
        if let Some(hit) = self.lookup_cache.get(&key) {
            return Ok(hit);
        }
        let found = match self.resolve(pointer.segments()) {
            Ok(found) => found.map(Arc::new),
            Err(Error::Unsupported { reason, .. }) => {
                return Err(Error::unsupported(key, reason));
            }
            Err(other) => return Err(other),
        };
        self.lookup_cache.insert(key, found.clone());
        Ok(found)
    }

    /// Drops memoized lookups. Needed after mutating fields directly.
    pub fn clear_lookup_cache(&self) {
        self.lookup_cache.clear();
    }

    #[must_use]
    pub fn is_3_1(&self) -> bool {
        self.openapi.starts_with("3.1")
    }
}

fn check_version(openapi: &str) -> Result<(), Error> {
    if is_supported_version(openapi) {
        Ok(())
    } else {
        Err(Error::parse_error(
            "/openapi",
            format!(
                "unsupported OpenAPI version '{openapi}' (expected one of {})",
                SUPPORTED_VERSIONS.join(", ")
            ),
        ))
    }
}

/// Equality covers document content; base URI and lookup cache are excluded.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.openapi == other.openapi
            && self.info == other.info
            && self.json_schema_dialect == other.json_schema_dialect
            && self.servers == other.servers
            && self.paths == other.paths
            && self.webhooks == other.webhooks
            && self.components == other.components
            && self.security == other.security
            && self.tags == other.tags
            && self.external_docs == other.external_docs
            && self.extensions == other.extensions
    }
}

impl FromNode for Document {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "an OpenAPI document")?;
        let openapi = r.required_string("openapi")?;
        check_version(&openapi)?;
        let document = Self {
            info: r.required_node("info")?,
            json_schema_dialect: r.string("jsonSchemaDialect")?,
            servers: r.list("servers")?,
            paths: r.node(FIELD_PATHS)?,
            webhooks: r.map(FIELD_WEBHOOKS)?,
            components: r.node(FIELD_COMPONENTS)?,
            security: r.list("security")?,
            tags: r.list("tags")?,
            external_docs: r.node("externalDocs")?,
            extensions: r.finish()?,
            openapi,
            base_uri: synthetic_base_uri()?,
            lookup_cache: LookupCache::default(),
        };
        if document.is_3_1() {
            if document.paths.is_none()
                && document.webhooks.is_none()
                && document.components.is_none()
            {
                return Err(Error::parse_error(
                    path,
                    "a 3.1 document needs at least one of 'paths', 'webhooks' or 'components'",
                ));
            }
        } else if document.paths.is_none() {
            return Err(Error::parse_error(path, "missing required field 'paths'"));
        }
        Ok(document)
    }
}

impl ToNode for Document {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .string("openapi", &self.openapi)
            .node("info", &self.info)
            .opt_string("jsonSchemaDialect", self.json_schema_dialect.as_ref())
            .opt_list("servers", self.servers.as_ref())
            .opt_node(FIELD_PATHS, self.paths.as_ref())
            .opt_map(FIELD_WEBHOOKS, self.webhooks.as_ref())
            .opt_node(FIELD_COMPONENTS, self.components.as_ref())
            .opt_list("security", self.security.as_ref())
            .opt_list("tags", self.tags.as_ref())
            .opt_node("externalDocs", self.external_docs.as_ref())
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for Document {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(self.lookup_node());
        };
        match first.as_str() {
            "info" => resolve_child(Some(&self.info), rest),
            "servers" => resolve_indexed(self.servers.as_deref(), rest),
            FIELD_PATHS => self
                .paths
                .as_ref()
                .map_or(Ok(None), |paths| paths.resolve(rest)),
            FIELD_WEBHOOKS => resolve_keyed(self.webhooks.as_ref(), rest),
            FIELD_COMPONENTS => resolve_child(self.components.as_ref(), rest),
            "tags" => resolve_indexed(self.tags.as_deref(), rest),
            "externalDocs" => resolve_child(self.external_docs.as_ref(), rest),
            _ => self.extensions.resolve(keys),
        }
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::Document(Box::new(self.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Example;
    use serde_json::json;

    fn sample() -> Document {
        Document::from_node(
            &json!({
                "openapi": "3.0.3",
                "info": {"title": "t", "version": "1"},
                "paths": {
                    "/v2": {
                        "get": {
                            "responses": {
                                "200": {
                                    "description": "ok",
                                    "content": {
                                        "application/json": {
                                            "examples": {"foo": {"value": {"versions": [1, 2]}}}
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }),
            "",
        )
        .unwrap()
    }

    #[test]
    fn version_gate() {
        let value = json!({"openapi": "2.0", "info": {"title": "t", "version": "1"}, "paths": {}});
        let err = Document::from_node(&value, "").unwrap_err();
        assert!(err.to_string().contains("2.0"));
        assert!(Document::new("3.1.1", Info::new("t", "1")).is_err());
    }

    #[test]
    fn paths_required_before_3_1() {
        let value = json!({"openapi": "3.0.0", "info": {"title": "t", "version": "1"}});
        assert!(Document::from_node(&value, "").is_err());
        let value = json!({
            "openapi": "3.1.0",
            "info": {"title": "t", "version": "1"},
            "webhooks": {"newPet": {"post": {}}}
        });
        assert!(Document::from_node(&value, "").is_ok());
    }

    #[test]
    fn documents_get_distinct_synthetic_bases() {
        let a = sample();
        let b = sample();
        assert_ne!(a.base_uri(), b.base_uri());
        assert!(a.base_uri().as_str().starts_with(DEFAULT_BASE_URI_PREFIX));
        assert_eq!(a, b);
    }

    #[test]
    fn find_escaped_path_and_nested_example() {
        let doc = sample();
        let item: PathItem = doc.find_str("/paths/~1v2").unwrap().unwrap();
        assert!(item.get.is_some());
        let example: Example = doc
            .find_str("/paths/~1v2/get/responses/200/content/application~1json/examples/foo")
            .unwrap()
            .unwrap();
        assert_eq!(example.value, Some(json!({"versions": [1, 2]})));
        let version: Value = doc
            .find_str("/paths/~1v2/get/responses/200/content/application~1json/examples/foo/value/versions/1")
            .unwrap()
            .unwrap();
        assert_eq!(version, json!(2));
    }

    #[test]
    fn find_misses_and_wrong_kinds() {
        let doc = sample();
        assert!(doc.find_str::<PathItem>("/paths").unwrap().is_none());
        assert!(doc.find_str::<PathItem>("/paths/~1v3").unwrap().is_none());
        assert!(doc.find_str::<Info>("/paths/~1v2").unwrap().is_none());
        let root: Document = doc.find_str("").unwrap().unwrap();
        assert_eq!(root, doc);
    }

    #[test]
    fn lookups_are_cached_until_cleared() {
        let mut doc = sample();
        assert!(doc.find_str::<Info>("/info").unwrap().is_some());
        doc.info.title = "changed".to_string();
        let cached: Info = doc.find_str("/info").unwrap().unwrap();
        assert_eq!(cached.title, "t");
        doc.clear_lookup_cache();
        let fresh: Info = doc.find_str("/info").unwrap().unwrap();
        assert_eq!(fresh.title, "changed");
    }
}
