use crate::constants::{COMPONENT_SCHEMAS, KEY_REF, KEY_SCHEMA_ID};
use crate::error::Error;
use crate::lookup::{Addressable, LookupResult, Node};
use crate::model::reference::component_target;
use crate::model::{Component, FromNode, ToNode};
use crate::pointer::JsonPointer;
use crate::resolver::registry::SchemaRegistry;
use crate::spec::reader::type_name;
use serde_json::{json, Value};
use url::Url;

/// Where an embedded schema lives: the owning document's base URI and the
/// JSON Pointer to the schema inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaLocation {
    pub base_uri: Url,
    pub pointer: JsonPointer,
}

impl SchemaLocation {
    /// `<base>#<pointer>` as a URI.
    #[must_use]
    pub fn uri(&self) -> String {
        let mut base = self.base_uri.clone();
        base.set_fragment(None);
        format!("{base}{}", self.pointer.to_uri_fragment())
    }
}

/// A JSON Schema embedded in the document, kept as raw JSON.
///
/// Schema `$ref`s are left to the validator; the location stamped during
/// initialization lets them resolve against the owning document.
#[derive(Debug, Clone)]
pub struct Schema {
    value: Value,
    location: Option<SchemaLocation>,
}

impl Schema {
    /// # Errors
    ///
    /// Returns a parse error unless `value` is an object or a boolean.
    pub fn new(value: Value) -> Result<Self, Error> {
        Self::from_node(&value, "")
    }

    /// `{"$ref": "#/components/schemas/<name>"}`.
    #[must_use]
    pub fn to_component(name: &str) -> Self {
        Self {
            value: json!({ KEY_REF: component_target(COMPONENT_SCHEMAS, name) }),
            location: None,
        }
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    #[must_use]
    pub const fn location(&self) -> Option<&SchemaLocation> {
        self.location.as_ref()
    }

    pub(crate) fn set_location(&mut self, location: SchemaLocation) {
        self.location = Some(location);
    }

    /// The schema's own `$id`, if it declares one.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.value.get(KEY_SCHEMA_ID).and_then(Value::as_str)
    }

    #[must_use]
    pub fn is_boolean(&self) -> bool {
        self.value.is_boolean()
    }

    /// Compiles a validator for this schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the schema or one of its `$ref` targets is invalid.
    pub fn validator(&self, registry: &SchemaRegistry) -> Result<jsonschema::Validator, Error> {
        registry.compile(self)
    }
}

/// Equality is over the schema content only.
impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl FromNode for Schema {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        match value {
            Value::Object(_) | Value::Bool(_) => Ok(Self {
                value: value.clone(),
                location: None,
            }),
            other => Err(Error::parse_error(
                path,
                format!("a schema must be an object or a boolean, found {}", type_name(other)),
            )),
        }
    }
}

impl ToNode for Schema {
    fn to_node(&self) -> Value {
        self.value.clone()
    }
}

impl Addressable for Schema {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        if keys.is_empty() {
            return Ok(self.lookup_node());
        }
        Err(Error::unsupported(
            JsonPointer::from_segments(keys).to_string(),
            "addressing inside a schema is not supported",
        ))
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::Schema(self.clone()))
    }
}

impl Component for Schema {
    const SECTION: &'static str = COMPONENT_SCHEMAS;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_objects_and_booleans_only() {
        assert!(Schema::new(json!({"type": "string"})).is_ok());
        assert!(Schema::new(json!(true)).unwrap().is_boolean());
        assert!(Schema::new(json!("string")).unwrap_err().is_parse());
    }

    #[test]
    fn inner_addressing_is_unsupported() {
        let schema = Schema::new(json!({"properties": {"a": {}}})).unwrap();
        let keys = ["properties", "a"].map(String::from);
        assert!(schema.resolve(&keys).unwrap_err().is_unsupported());
        assert!(schema.resolve(&[]).unwrap().is_some());
    }

    #[test]
    fn component_reference() {
        assert_eq!(
            Schema::to_component("Pet").value(),
            &json!({"$ref": "#/components/schemas/Pet"})
        );
    }

    #[test]
    fn location_uri_joins_base_and_pointer() {
        let location = SchemaLocation {
            base_uri: Url::parse("https://example.com/api.json").unwrap(),
            pointer: JsonPointer::from_segments(["components", "schemas", "Pet"]),
        };
        assert_eq!(
            location.uri(),
            "https://example.com/api.json#/components/schemas/Pet"
        );
    }
}
