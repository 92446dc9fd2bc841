use crate::error::Error;
use crate::lookup::{resolve_keyed, Addressable, LookupResult, Node};
use crate::model::{Extensions, FromNode, MediaType, ToNode};
use crate::spec::reader::ObjectReader;
use crate::spec::writer::ObjectWriter;
use indexmap::IndexMap;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBody {
    pub description: Option<String>,
    pub content: IndexMap<String, MediaType>,
    pub required: Option<bool>,
    pub extensions: Extensions,
}

impl FromNode for RequestBody {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "request body")?;
        Ok(Self {
            description: r.string("description")?,
            content: r
                .map("content")?
                .ok_or_else(|| Error::parse_error(path, "missing required field 'content'"))?,
            required: r.bool("required")?,
            extensions: r.finish()?,
        })
    }
}

impl ToNode for RequestBody {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .opt_string("description", self.description.as_ref())
            .opt_map("content", Some(&self.content))
            .opt_bool("required", self.required)
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for RequestBody {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(self.lookup_node());
        };
        match first.as_str() {
            "content" => resolve_keyed(Some(&self.content), rest),
            _ => self.extensions.resolve(keys),
        }
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::RequestBody(self.clone()))
    }
}
