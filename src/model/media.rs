use crate::error::Error;
use crate::lookup::{resolve_child, resolve_json, resolve_keyed, Addressable, LookupResult, Node};
use crate::model::{ExampleOrRef, Extensions, FromNode, HeaderOrRef, Schema, ToNode};
use crate::spec::reader::ObjectReader;
use crate::spec::writer::ObjectWriter;
use indexmap::IndexMap;
use serde_json::Value;

/// Content for one media type (`application/json`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaType {
    pub schema: Option<Schema>,
    pub example: Option<Value>,
    pub examples: Option<IndexMap<String, ExampleOrRef>>,
    pub encoding: Option<IndexMap<String, Encoding>>,
    pub extensions: Extensions,
}

impl FromNode for MediaType {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "media type")?;
        let media = Self {
            schema: r.node("schema")?,
            example: r.value("example"),
            examples: r.map("examples")?,
            encoding: r.map("encoding")?,
            extensions: r.finish()?,
        };
        if media.example.is_some() && media.examples.is_some() {
            return Err(Error::parse_error(
                path,
                "'example' and 'examples' are mutually exclusive",
            ));
        }
        Ok(media)
    }
}

impl ToNode for MediaType {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .opt_node("schema", self.schema.as_ref())
            .opt_value("example", self.example.as_ref())
            .opt_map("examples", self.examples.as_ref())
            .opt_map("encoding", self.encoding.as_ref())
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for MediaType {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(self.lookup_node());
        };
        match first.as_str() {
            "schema" => resolve_child(self.schema.as_ref(), rest),
            "example" => resolve_json(self.example.as_ref(), rest),
            "examples" => resolve_keyed(self.examples.as_ref(), rest),
            "encoding" => resolve_keyed(self.encoding.as_ref(), rest),
            _ => self.extensions.resolve(keys),
        }
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::MediaType(self.clone()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Encoding {
    pub content_type: Option<String>,
    pub headers: Option<IndexMap<String, HeaderOrRef>>,
    pub style: Option<String>,
    pub explode: Option<bool>,
    pub allow_reserved: Option<bool>,
    pub extensions: Extensions,
}

impl FromNode for Encoding {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "encoding")?;
        Ok(Self {
            content_type: r.string("contentType")?,
            headers: r.map("headers")?,
            style: r.string("style")?,
            explode: r.bool("explode")?,
            allow_reserved: r.bool("allowReserved")?,
            extensions: r.finish()?,
        })
    }
}

impl ToNode for Encoding {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .opt_string("contentType", self.content_type.as_ref())
            .opt_map("headers", self.headers.as_ref())
            .opt_string("style", self.style.as_ref())
            .opt_bool("explode", self.explode)
            .opt_bool("allowReserved", self.allow_reserved)
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for Encoding {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(self.lookup_node());
        };
        match first.as_str() {
            "headers" => resolve_keyed(self.headers.as_ref(), rest),
            _ => self.extensions.resolve(keys),
        }
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::Encoding(self.clone()))
    }
}
