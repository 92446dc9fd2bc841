use crate::constants::{
    COMPONENT_CALLBACKS, COMPONENT_EXAMPLES, COMPONENT_HEADERS, COMPONENT_LINKS,
    COMPONENT_PARAMETERS, COMPONENT_PATH_ITEMS, COMPONENT_REQUEST_BODIES, COMPONENT_RESPONSES,
    COMPONENT_SCHEMAS, COMPONENT_SECURITY_SCHEMES,
};
use crate::error::Error;
use crate::lookup::{resolve_keyed, Addressable, LookupResult, Node};
use crate::model::{
    CallbackOrRef, ExampleOrRef, Extensions, FromNode, HeaderOrRef, LinkOrRef, ParameterOrRef,
    PathItem, RequestBodyOrRef, ResponseOrRef, Schema, SecuritySchemeOrRef, ToNode,
};
use crate::spec::reader::ObjectReader;
use crate::spec::writer::ObjectWriter;
use indexmap::IndexMap;
use serde_json::Value;

/// Reusable, named definitions. The usual target of same-document `$ref`s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Components {
    pub schemas: Option<IndexMap<String, Schema>>,
    pub responses: Option<IndexMap<String, ResponseOrRef>>,
    pub parameters: Option<IndexMap<String, ParameterOrRef>>,
    pub examples: Option<IndexMap<String, ExampleOrRef>>,
    pub request_bodies: Option<IndexMap<String, RequestBodyOrRef>>,
    pub headers: Option<IndexMap<String, HeaderOrRef>>,
    pub security_schemes: Option<IndexMap<String, SecuritySchemeOrRef>>,
    pub links: Option<IndexMap<String, LinkOrRef>>,
    pub callbacks: Option<IndexMap<String, CallbackOrRef>>,
    /// 3.1 only.
    pub path_items: Option<IndexMap<String, PathItem>>,
    pub extensions: Extensions,
}

impl FromNode for Components {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "components")?;
        Ok(Self {
            schemas: r.map(COMPONENT_SCHEMAS)?,
            responses: r.map(COMPONENT_RESPONSES)?,
            parameters: r.map(COMPONENT_PARAMETERS)?,
            examples: r.map(COMPONENT_EXAMPLES)?,
            request_bodies: r.map(COMPONENT_REQUEST_BODIES)?,
            headers: r.map(COMPONENT_HEADERS)?,
            security_schemes: r.map(COMPONENT_SECURITY_SCHEMES)?,
            links: r.map(COMPONENT_LINKS)?,
            callbacks: r.map(COMPONENT_CALLBACKS)?,
            path_items: r.map(COMPONENT_PATH_ITEMS)?,
            extensions: r.finish()?,
        })
    }
}

impl ToNode for Components {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .opt_map(COMPONENT_SCHEMAS, self.schemas.as_ref())
            .opt_map(COMPONENT_RESPONSES, self.responses.as_ref())
            .opt_map(COMPONENT_PARAMETERS, self.parameters.as_ref())
            .opt_map(COMPONENT_EXAMPLES, self.examples.as_ref())
            .opt_map(COMPONENT_REQUEST_BODIES, self.request_bodies.as_ref())
            .opt_map(COMPONENT_HEADERS, self.headers.as_ref())
            .opt_map(COMPONENT_SECURITY_SCHEMES, self.security_schemes.as_ref())
            .opt_map(COMPONENT_LINKS, self.links.as_ref())
            .opt_map(COMPONENT_CALLBACKS, self.callbacks.as_ref())
            .opt_map(COMPONENT_PATH_ITEMS, self.path_items.as_ref())
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for Components {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(self.lookup_node());
        };
        match first.as_str() {
            COMPONENT_SCHEMAS => resolve_keyed(self.schemas.as_ref(), rest),
            COMPONENT_RESPONSES => resolve_keyed(self.responses.as_ref(), rest),
            COMPONENT_PARAMETERS => resolve_keyed(self.parameters.as_ref(), rest),
            COMPONENT_EXAMPLES => resolve_keyed(self.examples.as_ref(), rest),
            COMPONENT_REQUEST_BODIES => resolve_keyed(self.request_bodies.as_ref(), rest),
            COMPONENT_HEADERS => resolve_keyed(self.headers.as_ref(), rest),
            COMPONENT_SECURITY_SCHEMES => resolve_keyed(self.security_schemes.as_ref(), rest),
            COMPONENT_LINKS => resolve_keyed(self.links.as_ref(), rest),
            COMPONENT_CALLBACKS => resolve_keyed(self.callbacks.as_ref(), rest),
            COMPONENT_PATH_ITEMS => resolve_keyed(self.path_items.as_ref(), rest),
            _ => self.extensions.resolve(keys),
        }
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::Components(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_section_round_trips() {
        let value = json!({
            "schemas": {"Pet": {"type": "object"}, "Any": true},
            "responses": {"NotFound": {"description": "missing"}},
            "parameters": {"limit": {"name": "limit", "in": "query"}},
            "examples": {"cat": {"value": {"name": "Tom"}}},
            "requestBodies": {"Pet": {"content": {"application/json": {}}}},
            "headers": {"X-Rate": {"schema": {"type": "integer"}}},
            "securitySchemes": {"key": {"type": "apiKey", "name": "k", "in": "header"}},
            "links": {"self": {"operationId": "getPet"}},
            "callbacks": {"hook": {"{$url}": {}}},
            "pathItems": {"shared": {"get": {}}},
            "x-owner": "platform"
        });
        let components = Components::from_node(&value, "/components").unwrap();
        assert_eq!(components.to_node(), value);
    }

    #[test]
    fn unknown_section_is_rejected() {
        let err = Components::from_node(&json!({"models": {}}), "/components").unwrap_err();
        assert!(err.to_string().contains("models"));
    }

    #[test]
    fn section_lookups() {
        let components = Components::from_node(
            &json!({
                "callbacks": {"hook": {"{$url}": {}}},
                "schemas": {"Pet": {"type": "object"}}
            }),
            "",
        )
        .unwrap();
        let keys = ["callbacks", "hook"].map(String::from);
        assert!(matches!(components.resolve(&keys).unwrap(), Some(Node::Callback(_))));
        let keys = ["schemas", "Pet"].map(String::from);
        assert!(matches!(components.resolve(&keys).unwrap(), Some(Node::Schema(_))));
        let keys = ["schemas", "Pet", "type"].map(String::from);
        assert!(components.resolve(&keys).unwrap_err().is_unsupported());
        let keys = ["schemas".to_string()];
        assert_eq!(components.resolve(&keys).unwrap(), None);
    }
}
