use crate::constants::is_extension_key;
use crate::error::Error;
use crate::lookup::{resolve_child, resolve_keyed, Addressable, LookupResult, Node};
use crate::model::{Extensions, FromNode, HeaderOrRef, LinkOrRef, MediaType, ResponseOrRef, ToNode};
use crate::pointer::escape;
use crate::spec::reader::{type_name, ObjectReader};
use crate::spec::writer::{write_map, ObjectWriter};
use indexmap::IndexMap;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub description: String,
    pub headers: Option<IndexMap<String, HeaderOrRef>>,
    pub content: Option<IndexMap<String, MediaType>>,
    pub links: Option<IndexMap<String, LinkOrRef>>,
    pub extensions: Extensions,
}

impl Response {
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }
}

impl FromNode for Response {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "response")?;
        Ok(Self {
            description: r.required_string("description")?,
            headers: r.map("headers")?,
            content: r.map("content")?,
            links: r.map("links")?,
            extensions: r.finish()?,
        })
    }
}

impl ToNode for Response {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .string("description", &self.description)
            .opt_map("headers", self.headers.as_ref())
            .opt_map("content", self.content.as_ref())
            .opt_map("links", self.links.as_ref())
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for Response {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(self.lookup_node());
        };
        match first.as_str() {
            "headers" => resolve_keyed(self.headers.as_ref(), rest),
            "content" => resolve_keyed(self.content.as_ref(), rest),
            "links" => resolve_keyed(self.links.as_ref(), rest),
            _ => self.extensions.resolve(keys),
        }
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::Response(self.clone()))
    }
}

/// An operation's responses keyed by `default`, a status code or a range like `4XX`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Responses {
    pub entries: IndexMap<String, ResponseOrRef>,
    pub extensions: Extensions,
}

impl Responses {
    #[must_use]
    pub fn get(&self, status: &str) -> Option<&ResponseOrRef> {
        self.entries.get(status)
    }

    /// # Errors
    ///
    /// Returns a parse error if `status` is not a valid responses key.
    pub fn insert(
        &mut self,
        status: impl Into<String>,
        response: ResponseOrRef,
    ) -> Result<Option<ResponseOrRef>, Error> {
        let status = status.into();
        check_status_key(&status, "")?;
        Ok(self.entries.insert(status, response))
    }
}

fn check_status_key(key: &str, path: &str) -> Result<(), Error> {
    let bytes = key.as_bytes();
    let valid = key == "default"
        || (bytes.len() == 3 && bytes.iter().all(u8::is_ascii_digit) && (b'1'..=b'5').contains(&bytes[0]))
        || (bytes.len() == 3
            && (b'1'..=b'5').contains(&bytes[0])
            && bytes[1..].eq_ignore_ascii_case(b"XX"));
    if valid {
        Ok(())
    } else {
        Err(Error::parse_error(
            format!("{path}/{}", escape(key)),
            format!("'{key}' is not a response key (default, a status code, or 1XX-5XX)"),
        ))
    }
}

impl FromNode for Responses {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let Value::Object(map) = value else {
            return Err(Error::parse_error(
                path,
                format!("responses must be an object, found {}", type_name(value)),
            ));
        };
        let mut responses = Self::default();
        let mut extensions = IndexMap::new();
        for (key, item) in map {
            if is_extension_key(key) {
                extensions.insert(key.clone(), item.clone());
                continue;
            }
            check_status_key(key, path)?;
            let entry = ResponseOrRef::from_node(item, &format!("{path}/{}", escape(key)))?;
            responses.entries.insert(key.clone(), entry);
        }
        responses.extensions = Extensions::from_entries(extensions);
        Ok(responses)
    }
}

impl ToNode for Responses {
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

/// The collection itself is not a lookup target; only its entries are.
impl Addressable for Responses {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(None);
        };
        match self.entries.get(first.as_str()) {
            Some(entry) => resolve_child(Some(entry), rest),
            None => self.extensions.resolve(keys),
        }
    }

    fn lookup_node(&self) -> Option<Node> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_codes_ranges_and_default() {
        let value = json!({
            "200": {"description": "ok"},
            "4XX": {"description": "client error"},
            "default": {"$ref": "#/components/responses/Error"},
            "x-note": "kept"
        });
        let responses = Responses::from_node(&value, "/paths/~1a/get/responses").unwrap();
        assert_eq!(responses.entries.len(), 3);
        assert!(responses.get("default").unwrap().is_reference());
        assert_eq!(responses.to_node(), value);
    }

    #[test]
    fn rejects_bad_keys() {
        for key in ["20", "600", "6XX", "ok", "2X0"] {
            let value = json!({ key: {"description": "x"} });
            assert!(Responses::from_node(&value, "/r").is_err(), "{key}");
        }
    }

    #[test]
    fn empty_path_is_not_addressable() {
        let responses = Responses::from_node(&json!({"200": {"description": "ok"}}), "").unwrap();
        assert_eq!(responses.resolve(&[]).unwrap(), None);
        let keys = ["200".to_string()];
        assert!(matches!(responses.resolve(&keys).unwrap(), Some(Node::Response(_))));
    }
}
