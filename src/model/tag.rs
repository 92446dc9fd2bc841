use crate::error::Error;
use crate::lookup::{resolve_child, Addressable, LookupResult, Node};
use crate::model::{Extensions, FromNode, ToNode};
use crate::spec::reader::ObjectReader;
use crate::spec::writer::ObjectWriter;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    pub name: String,
    pub description: Option<String>,
    pub external_docs: Option<ExternalDocs>,
    pub extensions: Extensions,
}

impl FromNode for Tag {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "tag")?;
        Ok(Self {
            name: r.required_string("name")?,
            description: r.string("description")?,
            external_docs: r.node("externalDocs")?,
            extensions: r.finish()?,
        })
    }
}

impl ToNode for Tag {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .string("name", &self.name)
            .opt_string("description", self.description.as_ref())
            .opt_node("externalDocs", self.external_docs.as_ref())
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for Tag {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(self.lookup_node());
        };
        match first.as_str() {
            "externalDocs" => resolve_child(self.external_docs.as_ref(), rest),
            _ => self.extensions.resolve(keys),
        }
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::Tag(self.clone()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalDocs {
    pub description: Option<String>,
    pub url: String,
    pub extensions: Extensions,
}

impl FromNode for ExternalDocs {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "external docs")?;
        Ok(Self {
            description: r.string("description")?,
            url: r.required_string("url")?,
            extensions: r.finish()?,
        })
    }
}

impl ToNode for ExternalDocs {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .opt_string("description", self.description.as_ref())
            .string("url", &self.url)
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for ExternalDocs {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        if keys.is_empty() {
            return Ok(self.lookup_node());
        }
        self.extensions.resolve(keys)
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::ExternalDocs(self.clone()))
    }
}
