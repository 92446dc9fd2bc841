use crate::error::Error;
use crate::lookup::{resolve_keyed, Addressable, LookupResult, Node};
use crate::model::{Extensions, FromNode, ToNode};
use crate::spec::reader::ObjectReader;
use crate::spec::writer::ObjectWriter;
use indexmap::IndexMap;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Server {
    /// May be relative and may contain `{variable}` placeholders.
    pub url: String,
    pub description: Option<String>,
    pub variables: Option<IndexMap<String, ServerVariable>>,
    pub extensions: Extensions,
}

impl Server {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Substitutes every variable's default into the URL template.
    #[must_use]
    pub fn default_url(&self) -> String {
        self.variables
            .iter()
            .flatten()
            .fold(self.url.clone(), |url, (name, variable)| {
                url.replace(&format!("{{{name}}}"), &variable.default)
            })
    }
}

impl FromNode for Server {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "server")?;
        Ok(Self {
            url: r.required_string("url")?,
            description: r.string("description")?,
            variables: r.map("variables")?,
            extensions: r.finish()?,
        })
    }
}

impl ToNode for Server {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .string("url", &self.url)
            .opt_string("description", self.description.as_ref())
            .opt_map("variables", self.variables.as_ref())
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for Server {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(self.lookup_node());
        };
        match first.as_str() {
            "variables" => resolve_keyed(self.variables.as_ref(), rest),
            _ => self.extensions.resolve(keys),
        }
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::Server(self.clone()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerVariable {
    pub enumeration: Option<Vec<String>>,
    pub default: String,
    pub description: Option<String>,
    pub extensions: Extensions,
}

impl FromNode for ServerVariable {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "server variable")?;
        let variable = Self {
            enumeration: r.string_list("enum")?,
            default: r.required_string("default")?,
            description: r.string("description")?,
            extensions: r.finish()?,
        };
        if let Some(values) = &variable.enumeration {
            if values.is_empty() {
                return Err(Error::parse_error(
                    format!("{path}/enum"),
                    "'enum' must not be empty",
                ));
            }
        }
        Ok(variable)
    }
}

impl ToNode for ServerVariable {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .opt_strings("enum", self.enumeration.as_ref())
            .string("default", &self.default)
            .opt_string("description", self.description.as_ref())
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for ServerVariable {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        if keys.is_empty() {
            return Ok(self.lookup_node());
        }
        self.extensions.resolve(keys)
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::ServerVariable(self.clone()))
    }
}
