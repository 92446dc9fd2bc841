//! Schema resources addressable by URI, for schema `$ref` resolution.
//!
//! Every initialized document is registered whole under its base URI, and
//! each schema with an `$id` additionally under that id. Validators compiled
//! through the registry resolve `$ref`s against these resources only; nothing
//! is fetched while compiling.

use crate::error::Error;
use crate::model::{Document, Schema, SchemaLocation, ToNode};
use crate::pointer::JsonPointer;
use crate::resolver::walk::{Visitor, Walk, Walker};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// URI-keyed schema resources.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    resources: HashMap<String, Arc<Value>>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` under `uri`; any fragment is dropped. Replaces an
    /// earlier resource with the same URI.
    pub fn register(&mut self, uri: &Url, value: Value) {
        let key = resource_key(uri);
        debug!(target: "aperture_oas::registry", uri = %key, "registering schema resource");
        self.resources.insert(key, Arc::new(value));
    }

    #[must_use]
    pub fn get(&self, uri: &str) -> Option<&Value> {
        let key = Url::parse(uri).map_or_else(|_| uri.to_string(), |url| resource_key(&url));
        self.resources.get(&key).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.get(uri).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Stamps every embedded schema with its location and registers the
    /// document, plus each object schema declaring an `$id`.
    pub fn register_document(&mut self, document: &mut Document) {
        let base_uri = document.base_uri().clone();
        for (uri, value) in stamp_locations(&mut *document, &base_uri, JsonPointer::root()) {
            self.register(&uri, value);
        }
        self.register(&base_uri, document.to_node());
    }

    /// Compiles a validator for `schema`.
    ///
    /// A schema stamped with a location compiles as a reference to that
    /// location, so relative `$ref`s inside it resolve against its document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the schema is invalid or a `$ref` inside it
    /// points at an unregistered resource.
    pub fn compile(&self, schema: &Schema) -> Result<jsonschema::Validator, Error> {
        let root = match schema.location() {
            Some(location) if !schema.is_boolean() => json!({ "$ref": location.uri() }),
            _ => schema.value().clone(),
        };
        jsonschema::options()
            .with_retriever(RegistryRetriever {
                resources: self.resources.clone(),
            })
            .build(&root)
            .map_err(|e| Error::Schema(e.to_string()))
    }
}

fn resource_key(uri: &Url) -> String {
    let mut uri = uri.clone();
    uri.set_fragment(None);
    uri.to_string()
}

/// Stamps every schema under `node`, which sits at `at` in the document at
/// `base_uri`, and returns the schemas declaring an `$id` keyed by it.
pub(crate) fn stamp_locations<W: Walk + ?Sized>(
    node: &mut W,
    base_uri: &Url,
    at: JsonPointer,
) -> Vec<(Url, Value)> {
    let mut stamper = LocationStamper {
        base_uri,
        identified: Vec::new(),
    };
    node.walk(&mut Walker::at(at, &mut stamper));
    stamper.identified
}

struct LocationStamper<'a> {
    base_uri: &'a Url,
    identified: Vec<(Url, Value)>,
}

impl Visitor for LocationStamper<'_> {
    fn schema(&mut self, at: &JsonPointer, schema: &mut Schema) {
        schema.set_location(SchemaLocation {
            base_uri: self.base_uri.clone(),
            pointer: at.clone(),
        });
        if let Some(id) = schema.id() {
            match self.base_uri.join(id) {
                Ok(uri) => self.identified.push((uri, schema.value().clone())),
                Err(e) => warn!(
                    target: "aperture_oas::registry",
                    location = %at,
                    id,
                    error = %e,
                    "ignoring schema with an invalid $id"
                ),
            }
        }
    }
}

/// Serves `$ref` targets from a snapshot of the registry.
struct RegistryRetriever {
    resources: HashMap<String, Arc<Value>>,
}

impl jsonschema::Retrieve for RegistryRetriever {
    fn retrieve(
        &self,
        uri: &jsonschema::Uri<String>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let key = Url::parse(uri.as_str())
            .map_or_else(|_| uri.as_str().to_string(), |url| resource_key(&url));
        self.resources
            .get(&key)
            .map(|value| value.as_ref().clone())
            .ok_or_else(|| format!("no schema resource registered for '{key}'").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FromNode;

    fn document() -> Document {
        Document::from_node(
            &json!({
                "openapi": "3.1.0",
                "info": {"title": "t", "version": "1"},
                "components": {
                    "schemas": {
                        "Name": {"type": "string", "minLength": 1},
                        "Pet": {
                            "type": "object",
                            "required": ["name"],
                            "properties": {"name": {"$ref": "#/components/schemas/Name"}}
                        },
                        "Tagged": {"$id": "https://schemas.example.com/tagged.json", "type": "integer"}
                    }
                }
            }),
            "",
        )
        .unwrap()
    }

    #[test]
    fn located_schemas_resolve_local_refs() {
        let mut doc = document();
        let mut registry = SchemaRegistry::new();
        registry.register_document(&mut doc);
        assert!(registry.contains(doc.base_uri().as_str()));

        let pet = &doc.components.as_ref().unwrap().schemas.as_ref().unwrap()["Pet"];
        assert_eq!(
            pet.location().unwrap().pointer.to_string(),
            "/components/schemas/Pet"
        );
        let validator = pet.validator(&registry).unwrap();
        assert!(validator.is_valid(&json!({"name": "Rex"})));
        assert!(!validator.is_valid(&json!({"name": ""})));
        assert!(!validator.is_valid(&json!({})));
    }

    #[test]
    fn ids_are_registered() {
        let mut doc = document();
        let mut registry = SchemaRegistry::new();
        registry.register_document(&mut doc);
        assert!(registry.contains("https://schemas.example.com/tagged.json"));
        let by_id = Schema::new(json!({"$ref": "https://schemas.example.com/tagged.json"})).unwrap();
        let validator = registry.compile(&by_id).unwrap();
        assert!(validator.is_valid(&json!(3)));
        assert!(!validator.is_valid(&json!("three")));
    }

    #[test]
    fn unknown_resources_fail_to_compile() {
        let registry = SchemaRegistry::new();
        let schema = Schema::new(json!({"$ref": "https://nowhere.example.com/x.json"})).unwrap();
        assert!(matches!(registry.compile(&schema), Err(Error::Schema(_))));
        let standalone = Schema::new(json!({"type": "boolean"})).unwrap();
        assert!(registry.compile(&standalone).unwrap().is_valid(&json!(true)));
    }
}
