use crate::constants::is_extension_key;
use crate::error::Error;
use crate::expression::RuntimeExpression;
use crate::lookup::{resolve_child, Addressable, LookupResult, Node};
use crate::model::{Extensions, FromNode, PathItem, ToNode};
use crate::pointer::escape;
use crate::spec::reader::type_name;
use crate::spec::writer::write_map;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A callback URL template such as `{$request.body#/callbackUrl}/events`.
///
/// Identity is the raw text; the embedded expressions are parsed once and
/// exposed for callers that evaluate them.
#[derive(Debug, Clone)]
pub struct CallbackKey {
    raw: String,
    expressions: Vec<RuntimeExpression>,
}

impl CallbackKey {
    /// # Errors
    ///
    /// Returns a parse error if an embedded `{$...}` expression is malformed.
    pub fn parse(raw: impl Into<String>) -> Result<Self, Error> {
        let raw = raw.into();
        let expressions = RuntimeExpression::parse_embedded(&raw)?;
        Ok(Self { raw, expressions })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn expressions(&self) -> &[RuntimeExpression] {
        &self.expressions
    }
}

impl PartialEq for CallbackKey {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for CallbackKey {}

impl Hash for CallbackKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl Borrow<str> for CallbackKey {
    fn borrow(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for CallbackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Out-of-band requests the API may make, keyed by URL template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Callback {
    pub entries: IndexMap<CallbackKey, PathItem>,
    pub extensions: Extensions,
}

impl FromNode for Callback {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let Value::Object(map) = value else {
            return Err(Error::parse_error(
                path,
                format!("a callback must be an object, found {}", type_name(value)),
            ));
        };
        let mut callback = Self::default();
        let mut extensions = IndexMap::new();
        for (key, item) in map {
            if is_extension_key(key) {
                extensions.insert(key.clone(), item.clone());
                continue;
            }
            let child = format!("{path}/{}", escape(key));
            let parsed = CallbackKey::parse(key.as_str()).map_err(|e| match e {
                Error::Parse { message, .. } => Error::parse_error(&child, message),
                other => other,
            })?;
            callback
                .entries
                .insert(parsed, PathItem::from_node(item, &child)?);
        }
        callback.extensions = Extensions::from_entries(extensions);
        Ok(callback)
    }
}

impl ToNode for Callback {
    fn to_node(&self) -> Value {
        let mut map = match write_map(&self.entries) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in self.extensions.iter() {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }
}

/// Reached with no remaining keys the callback yields nothing; containers
/// hand out the callback itself through `lookup_node`.
impl Addressable for Callback {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(None);
        };
        match self.entries.get(first.as_str()) {
            Some(item) => resolve_child(Some(item), rest),
            None => self.extensions.resolve(keys),
        }
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::Callback(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_expression_keys() {
        let value = json!({
            "{$request.body#/callbackUrl}/events": {
                "post": {"responses": {"200": {"description": "ok"}}}
            },
            "x-retry": 3
        });
        let callback = Callback::from_node(&value, "/components/callbacks/onEvent").unwrap();
        let (key, item) = callback.entries.first().unwrap();
        assert_eq!(key.expressions().len(), 1);
        assert!(item.post.is_some());
        assert_eq!(callback.to_node(), value);
    }

    #[test]
    fn malformed_embedded_expression_fails() {
        let value = json!({"{$request.bogus}": {}});
        let err = Callback::from_node(&value, "/c").unwrap_err();
        assert!(matches!(err, Error::Parse { ref path, .. } if path.starts_with("/c/")));
    }

    #[test]
    fn lookup_by_raw_key() {
        let callback = Callback::from_node(&json!({"{$url}": {"get": {}}}), "").unwrap();
        let keys = ["{$url}", "get"].map(String::from);
        assert!(matches!(callback.resolve(&keys).unwrap(), Some(Node::Operation(_))));
        assert_eq!(callback.resolve(&[]).unwrap(), None);
    }
}
