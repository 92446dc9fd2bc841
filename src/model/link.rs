use crate::error::Error;
use crate::expression::RuntimeExpression;
use crate::lookup::{resolve_child, resolve_json, Addressable, LookupResult, Node};
use crate::model::{Extensions, FromNode, Server, ToNode};
use crate::spec::reader::ObjectReader;
use crate::spec::writer::ObjectWriter;
use indexmap::IndexMap;
use serde_json::Value;

/// A link parameter or request body: a runtime expression or a constant.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkValue {
    Expression(RuntimeExpression),
    Literal(Value),
}

impl LinkValue {
    #[must_use]
    pub fn as_expression(&self) -> Option<&RuntimeExpression> {
        match self {
            Self::Expression(expression) => Some(expression),
            Self::Literal(_) => None,
        }
    }
}

impl FromNode for LinkValue {
    fn from_node(value: &Value, _path: &str) -> Result<Self, Error> {
        if let Some(text) = value.as_str().filter(|text| text.starts_with('$')) {
            if let Ok(expression) = RuntimeExpression::parse(text) {
                return Ok(Self::Expression(expression));
            }
        }
        Ok(Self::Literal(value.clone()))
    }
}

impl ToNode for LinkValue {
    fn to_node(&self) -> Value {
        match self {
            Self::Expression(expression) => Value::String(expression.to_string()),
            Self::Literal(value) => value.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Link {
    pub operation_ref: Option<String>,
    pub operation_id: Option<String>,
    pub parameters: Option<IndexMap<String, LinkValue>>,
    pub request_body: Option<LinkValue>,
    pub description: Option<String>,
    pub server: Option<Server>,
    pub extensions: Extensions,
}

impl FromNode for Link {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "link")?;
        let link = Self {
            operation_ref: r.string("operationRef")?,
            operation_id: r.string("operationId")?,
            parameters: r.map("parameters")?,
            request_body: r.node("requestBody")?,
            description: r.string("description")?,
            server: r.node("server")?,
            extensions: r.finish()?,
        };
        if link.operation_ref.is_some() && link.operation_id.is_some() {
            return Err(Error::parse_error(
                path,
                "'operationRef' and 'operationId' are mutually exclusive",
            ));
        }
        Ok(link)
    }
}

impl ToNode for Link {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .opt_string("operationRef", self.operation_ref.as_ref())
            .opt_string("operationId", self.operation_id.as_ref())
            .opt_map("parameters", self.parameters.as_ref())
            .opt_node("requestBody", self.request_body.as_ref())
            .opt_string("description", self.description.as_ref())
            .opt_node("server", self.server.as_ref())
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for Link {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(self.lookup_node());
        };
        match first.as_str() {
            "server" => resolve_child(self.server.as_ref(), rest),
            "parameters" => {
                let Some((name, rest)) = rest.split_first() else {
                    return Ok(None);
                };
                let value = self
                    .parameters
                    .as_ref()
                    .and_then(|map| map.get(name.as_str()))
                    .map(ToNode::to_node);
                resolve_json(value.as_ref(), rest)
            }
            "requestBody" => {
                let value = self.request_body.as_ref().map(ToNode::to_node);
                resolve_json(value.as_ref(), rest)
            }
            _ => self.extensions.resolve(keys),
        }
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::Link(self.clone()))
    }
}
