use crate::constants::{
    PARAM_LOCATION_COOKIE, PARAM_LOCATION_HEADER, PARAM_LOCATION_PATH, PARAM_LOCATION_QUERY,
};
use crate::error::Error;
use crate::lookup::{resolve_child, resolve_json, resolve_keyed, Addressable, LookupResult, Node};
use crate::model::{ExampleOrRef, Extensions, FromNode, MediaType, Schema, ToNode};
use crate::spec::reader::ObjectReader;
use crate::spec::writer::ObjectWriter;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Path => PARAM_LOCATION_PATH,
            Self::Query => PARAM_LOCATION_QUERY,
            Self::Header => PARAM_LOCATION_HEADER,
            Self::Cookie => PARAM_LOCATION_COOKIE,
        }
    }

    fn parse(text: &str, path: &str) -> Result<Self, Error> {
        match text {
            PARAM_LOCATION_PATH => Ok(Self::Path),
            PARAM_LOCATION_QUERY => Ok(Self::Query),
            PARAM_LOCATION_HEADER => Ok(Self::Header),
            PARAM_LOCATION_COOKIE => Ok(Self::Cookie),
            other => Err(Error::parse_error(
                path,
                format!("'{other}' is not a parameter location (path, query, header, cookie)"),
            )),
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields shared by parameters and headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterDetails {
    pub description: Option<String>,
    pub required: Option<bool>,
    pub deprecated: Option<bool>,
    pub allow_empty_value: Option<bool>,
    pub style: Option<String>,
    pub explode: Option<bool>,
    pub allow_reserved: Option<bool>,
    pub schema: Option<Schema>,
    pub example: Option<Value>,
    pub examples: Option<IndexMap<String, ExampleOrRef>>,
    pub content: Option<IndexMap<String, MediaType>>,
}

impl ParameterDetails {
    fn read(r: &mut ObjectReader<'_>) -> Result<Self, Error> {
        let style = Self {
            description: r.string("description")?,
            required: r.bool("required")?,
            deprecated: r.bool("deprecated")?,
            allow_empty_value: r.bool("allowEmptyValue")?,
            style: r.string("style")?,
            explode: r.bool("explode")?,
            allow_reserved: r.bool("allowReserved")?,
            schema: r.node("schema")?,
            example: r.value("example"),
            examples: r.map("examples")?,
            content: r.map("content")?,
        };
        if style.example.is_some() && style.examples.is_some() {
            return Err(Error::parse_error(
                r.path(),
                "'example' and 'examples' are mutually exclusive",
            ));
        }
        if style.schema.is_some() && style.content.is_some() {
            return Err(Error::parse_error(
                r.path(),
                "'schema' and 'content' are mutually exclusive",
            ));
        }
        Ok(style)
    }

    fn write(&self, w: &mut ObjectWriter) {
        w.opt_string("description", self.description.as_ref())
            .opt_bool("required", self.required)
            .opt_bool("deprecated", self.deprecated)
            .opt_bool("allowEmptyValue", self.allow_empty_value)
            .opt_string("style", self.style.as_ref())
            .opt_bool("explode", self.explode)
            .opt_bool("allowReserved", self.allow_reserved)
            .opt_node("schema", self.schema.as_ref())
            .opt_value("example", self.example.as_ref())
            .opt_map("examples", self.examples.as_ref())
            .opt_map("content", self.content.as_ref());
    }

    fn resolve(&self, first: &str, rest: &[String]) -> Option<LookupResult> {
        Some(match first {
            "schema" => resolve_child(self.schema.as_ref(), rest),
            "example" => resolve_json(self.example.as_ref(), rest),
            "examples" => resolve_keyed(self.examples.as_ref(), rest),
            "content" => resolve_keyed(self.content.as_ref(), rest),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub details: ParameterDetails,
    pub extensions: Extensions,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            location,
            details: ParameterDetails {
                required: (location == ParameterLocation::Path).then_some(true),
                ..ParameterDetails::default()
            },
            extensions: Extensions::new(),
        }
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.details.required.unwrap_or(false)
    }
}

impl FromNode for Parameter {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "parameter")?;
        let name = r.required_string("name")?;
        let location_path = r.child_path("in");
        let location = ParameterLocation::parse(&r.required_string("in")?, &location_path)?;
        let details = ParameterDetails::read(&mut r)?;
        if location == ParameterLocation::Path && details.required != Some(true) {
            return Err(Error::parse_error(
                path,
                format!("path parameter '{name}' must declare 'required: true'"),
            ));
        }
        Ok(Self {
            name,
            location,
            details,
            extensions: r.finish()?,
        })
    }
}

impl ToNode for Parameter {
    fn to_node(&self) -> Value {
        let mut w = ObjectWriter::new();
        w.string("name", &self.name).string("in", self.location.as_str());
        self.details.write(&mut w);
        w.extensions(&self.extensions).finish()
    }
}

impl Addressable for Parameter {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(self.lookup_node());
        };
        self.details
            .resolve(first, rest)
            .unwrap_or_else(|| self.extensions.resolve(keys))
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::Parameter(self.clone()))
    }
}

/// A response or encoding header: a parameter without `name` and `in`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub details: ParameterDetails,
    pub extensions: Extensions,
}

impl FromNode for Header {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "header")?;
        Ok(Self {
            details: ParameterDetails::read(&mut r)?,
            extensions: r.finish()?,
        })
    }
}

impl ToNode for Header {
    fn to_node(&self) -> Value {
        let mut w = ObjectWriter::new();
        self.details.write(&mut w);
        w.extensions(&self.extensions).finish()
    }
}

impl Addressable for Header {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(self.lookup_node());
        };
        self.details
            .resolve(first, rest)
            .unwrap_or_else(|| self.extensions.resolve(keys))
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::Header(self.clone()))
    }
}
