use crate::error::Error;
use crate::lookup::{resolve_json, Addressable, LookupResult, Node};
use crate::model::{Extensions, FromNode, ToNode};
use crate::spec::reader::ObjectReader;
use crate::spec::writer::ObjectWriter;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Example {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub value: Option<Value>,
    pub external_value: Option<String>,
    pub extensions: Extensions,
}

impl Example {
    #[must_use]
    pub fn with_value(value: Value) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }
}

impl FromNode for Example {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "example")?;
        let example = Self {
            summary: r.string("summary")?,
            description: r.string("description")?,
            value: r.value("value"),
            external_value: r.string("externalValue")?,
            extensions: r.finish()?,
        };
        if example.value.is_some() && example.external_value.is_some() {
            return Err(Error::parse_error(
                path,
                "'value' and 'externalValue' are mutually exclusive",
            ));
        }
        Ok(example)
    }
}

impl ToNode for Example {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .opt_string("summary", self.summary.as_ref())
            .opt_string("description", self.description.as_ref())
            .opt_value("value", self.value.as_ref())
            .opt_string("externalValue", self.external_value.as_ref())
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for Example {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(self.lookup_node());
        };
        match first.as_str() {
            "value" => resolve_json(self.value.as_ref(), rest),
            _ => self.extensions.resolve(keys),
        }
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::Example(self.clone()))
    }
}
