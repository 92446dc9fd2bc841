use crate::error::Error;
use crate::lookup::{resolve_child, Addressable, LookupResult, Node};
use crate::model::{Extensions, FromNode, ToNode};
use crate::spec::reader::ObjectReader;
use crate::spec::writer::ObjectWriter;
use serde_json::Value;

/// API metadata (`info`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Info {
    pub title: String,
    /// 3.1 only.
    pub summary: Option<String>,
    pub description: Option<String>,
    pub terms_of_service: Option<String>,
    pub contact: Option<Contact>,
    pub license: Option<License>,
    pub version: String,
    pub extensions: Extensions,
}

impl Info {
    #[must_use]
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            ..Self::default()
        }
    }
}

impl FromNode for Info {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "info")?;
        Ok(Self {
            title: r.required_string("title")?,
            summary: r.string("summary")?,
            description: r.string("description")?,
            terms_of_service: r.string("termsOfService")?,
            contact: r.node("contact")?,
            license: r.node("license")?,
            version: r.required_string("version")?,
            extensions: r.finish()?,
        })
    }
}

impl ToNode for Info {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .string("title", &self.title)
            .opt_string("summary", self.summary.as_ref())
            .opt_string("description", self.description.as_ref())
            .opt_string("termsOfService", self.terms_of_service.as_ref())
            .opt_node("contact", self.contact.as_ref())
            .opt_node("license", self.license.as_ref())
            .string("version", &self.version)
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for Info {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(self.lookup_node());
        };
        match first.as_str() {
            "contact" => resolve_child(self.contact.as_ref(), rest),
            "license" => resolve_child(self.license.as_ref(), rest),
            _ => self.extensions.resolve(keys),
        }
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::Info(self.clone()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contact {
    pub name: Option<String>,
    pub url: Option<String>,
    pub email: Option<String>,
    pub extensions: Extensions,
}

impl FromNode for Contact {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "contact")?;
        Ok(Self {
            name: r.string("name")?,
            url: r.string("url")?,
            email: r.string("email")?,
            extensions: r.finish()?,
        })
    }
}

impl ToNode for Contact {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .opt_string("name", self.name.as_ref())
            .opt_string("url", self.url.as_ref())
            .opt_string("email", self.email.as_ref())
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for Contact {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        if keys.is_empty() {
            return Ok(self.lookup_node());
        }
        self.extensions.resolve(keys)
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::Contact(self.clone()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct License {
    pub name: String,
    /// SPDX expression, 3.1 only.
    pub identifier: Option<String>,
    pub url: Option<String>,
    pub extensions: Extensions,
}

impl FromNode for License {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "license")?;
        let license = Self {
            name: r.required_string("name")?,
            identifier: r.string("identifier")?,
            url: r.string("url")?,
            extensions: r.finish()?,
        };
        if license.identifier.is_some() && license.url.is_some() {
            return Err(Error::parse_error(
                path,
                "'identifier' and 'url' are mutually exclusive",
            ));
        }
        Ok(license)
    }
}

impl ToNode for License {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .string("name", &self.name)
            .opt_string("identifier", self.identifier.as_ref())
            .opt_string("url", self.url.as_ref())
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for License {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        if keys.is_empty() {
            return Ok(self.lookup_node());
        }
        self.extensions.resolve(keys)
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::License(self.clone()))
    }
}
