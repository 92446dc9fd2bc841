use crate::constants::{DEFAULT_BASE_URI_PREFIX, KEY_DESCRIPTION, KEY_REF, KEY_SUMMARY};
use crate::error::Error;
use crate::lookup::{Addressable, LookupResult};
use crate::model::{
    Callback, Component, Example, FromNode, Header, Link, Parameter, RequestBody, Response,
    SecurityScheme, ToNode,
};
use crate::pointer::{escape, JsonPointer};
use crate::spec::reader::ObjectReader;
use crate::spec::writer::ObjectWriter;
use serde_json::Value;
use url::Url;

/// A `$ref` placeholder standing in for a `T` declared elsewhere.
///
/// `summary` and `description` are the reference's own overrides; they are
/// kept alongside the resolved content and not copied into it.
#[derive(Debug, Clone)]
pub struct Reference<T> {
    target: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    resolved: Option<Box<T>>,
}

impl<T> Reference<T> {
    /// # Errors
    ///
    /// Returns a parse error if `target` is not a URI reference or its
    /// fragment is not a JSON Pointer.
    pub fn new(target: impl Into<String>) -> Result<Self, Error> {
        let target = target.into();
        validate_target(&target, "")?;
        Ok(Self {
            target,
            summary: None,
            description: None,
            resolved: None,
        })
    }

    /// The `$ref` text exactly as written.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    #[must_use]
    pub fn resolved(&self) -> Option<&T> {
        self.resolved.as_deref()
    }

    /// Fills the resolution slot. Returns false if it was already filled.
    pub(crate) fn set_resolved(&mut self, content: T) -> bool {
        if self.resolved.is_some() {
            return false;
        }
        self.resolved = Some(Box::new(content));
        true
    }

    fn from_reader(reader: &mut ObjectReader<'_>) -> Result<Self, Error> {
        let target = reader.required_string(KEY_REF)?;
        validate_target(&target, &reader.child_path(KEY_REF))?;
        Ok(Self {
            target,
            summary: reader.string(KEY_SUMMARY)?,
            description: reader.string(KEY_DESCRIPTION)?,
            resolved: None,
        })
    }
}

impl<T: Component> Reference<T> {
    /// A reference to `#/components/<section>/<name>`.
    #[must_use]
    pub fn to_component(name: &str) -> Self {
        Self {
            target: component_target(T::SECTION, name),
            summary: None,
            description: None,
            resolved: None,
        }
    }
}

/// Equality covers what was written, not resolution state.
impl<T> PartialEq for Reference<T> {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.summary == other.summary
            && self.description == other.description
    }
}

impl<T> ToNode for Reference<T> {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .string(KEY_REF, &self.target)
            .opt_string(KEY_SUMMARY, self.summary.as_ref())
            .opt_string(KEY_DESCRIPTION, self.description.as_ref())
            .finish()
    }
}

/// Either a concrete node or a reference to one.
#[derive(Debug, Clone, PartialEq)]
pub enum RefOr<T> {
    Item(T),
    Reference(Reference<T>),
}

pub type ParameterOrRef = RefOr<Parameter>;
pub type ResponseOrRef = RefOr<Response>;
pub type HeaderOrRef = RefOr<Header>;
pub type ExampleOrRef = RefOr<Example>;
pub type LinkOrRef = RefOr<Link>;
pub type CallbackOrRef = RefOr<Callback>;
pub type RequestBodyOrRef = RefOr<RequestBody>;
pub type SecuritySchemeOrRef = RefOr<SecurityScheme>;

impl<T> RefOr<T> {
    /// The concrete node: the item itself, or the resolved target.
    #[must_use]
    pub fn as_item(&self) -> Option<&T> {
        match self {
            Self::Item(item) => Some(item),
            Self::Reference(reference) => reference.resolved(),
        }
    }

    #[must_use]
    pub const fn as_reference(&self) -> Option<&Reference<T>> {
        match self {
            Self::Item(_) => None,
            Self::Reference(reference) => Some(reference),
        }
    }

    #[must_use]
    pub const fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }
}

impl<T: Component> RefOr<T> {
    #[must_use]
    pub fn to_component(name: &str) -> Self {
        Self::Reference(Reference::to_component(name))
    }
}

impl<T> From<T> for RefOr<T> {
    fn from(item: T) -> Self {
        Self::Item(item)
    }
}

impl<T: FromNode> FromNode for RefOr<T> {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let is_reference = value
            .as_object()
            .is_some_and(|map| map.contains_key(KEY_REF));
        if !is_reference {
            return T::from_node(value, path).map(Self::Item);
        }
        let mut reader = ObjectReader::new(value, path, "reference")?;
        let reference = Reference::from_reader(&mut reader)?;
        let extensions = reader.finish()?;
        if let Some((key, _)) = extensions.iter().next() {
            return Err(Error::parse_error(
                path,
                format!("unexpected key '{key}' next to '$ref'"),
            ));
        }
        Ok(Self::Reference(reference))
    }
}

impl<T: ToNode> ToNode for RefOr<T> {
    fn to_node(&self) -> Value {
        match self {
            Self::Item(item) => item.to_node(),
            Self::Reference(reference) => reference.to_node(),
        }
    }
}

impl<T: Addressable> Addressable for RefOr<T> {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        self.as_item().map_or(Ok(None), |item| item.resolve(keys))
    }

    fn lookup_node(&self) -> Option<crate::lookup::Node> {
        self.as_item().and_then(Addressable::lookup_node)
    }
}

/// Builds the canonical `#/components/<section>/<name>` reference text.
#[must_use]
pub fn component_target(section: &str, name: &str) -> String {
    format!("#/components/{section}/{}", escape(name))
}

/// Checks that a `$ref` is a URI reference whose fragment, if any, is a JSON Pointer.
pub(crate) fn validate_target(target: &str, path: &str) -> Result<(), Error> {
    let base = Url::parse(&format!("{DEFAULT_BASE_URI_PREFIX}0.json"))
        .map_err(|e| Error::parse_error(path, e.to_string()))?;
    let resolved = base
        .join(target)
        .map_err(|e| Error::parse_error(path, format!("'{target}' is not a valid URI: {e}")))?;
    if let Some(fragment) = resolved.fragment() {
        JsonPointer::from_uri_fragment(fragment)
            .map_err(|e| Error::parse_error(path, format!("'{target}': {e}")))?;
    }
    Ok(())
}

impl Component for Parameter {
    const SECTION: &'static str = crate::constants::COMPONENT_PARAMETERS;
}
impl Component for Response {
    const SECTION: &'static str = crate::constants::COMPONENT_RESPONSES;
}
impl Component for Header {
    const SECTION: &'static str = crate::constants::COMPONENT_HEADERS;
}
impl Component for Example {
    const SECTION: &'static str = crate::constants::COMPONENT_EXAMPLES;
}
impl Component for Link {
    const SECTION: &'static str = crate::constants::COMPONENT_LINKS;
}
impl Component for Callback {
    const SECTION: &'static str = crate::constants::COMPONENT_CALLBACKS;
}
impl Component for RequestBody {
    const SECTION: &'static str = crate::constants::COMPONENT_REQUEST_BODIES;
}
impl Component for SecurityScheme {
    const SECTION: &'static str = crate::constants::COMPONENT_SECURITY_SCHEMES;
}
