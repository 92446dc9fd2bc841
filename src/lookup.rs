//! Pointer-based addressing into the node model.
//!
//! Each node type implements [`Addressable`]: given the remaining key path it
//! either descends into one of its own fields or, for unknown keys, falls back
//! to its extension data. Results are owned [`Node`] values so they can be
//! memoized by [`LookupCache`] independently of the document's lifetime.

use crate::error::Error;
use crate::model::{
    Callback, Components, Contact, Document, Encoding, Example, ExternalDocs, FromNode, Header,
    Info, License, Link, MediaType, OAuthFlow, OAuthFlows, Operation, Parameter, PathItem,
    RequestBody, Response, Schema, SecurityScheme, Server, ServerVariable, Tag, ToNode,
};
use crate::pointer::{evaluate_segments, parse_index};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub type LookupResult = Result<Option<Node>, Error>;

/// A node found by a lookup.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum Node {
    Document(Box<Document>),
    Info(Info),
    Contact(Contact),
    License(License),
    Server(Server),
    ServerVariable(ServerVariable),
    ExternalDocs(ExternalDocs),
    Tag(Tag),
    Parameter(Parameter),
    Header(Header),
    Example(Example),
    Link(Link),
    MediaType(MediaType),
    Encoding(Encoding),
    RequestBody(RequestBody),
    Response(Response),
    Operation(Operation),
    PathItem(PathItem),
    Callback(Callback),
    SecurityScheme(SecurityScheme),
    OAuthFlows(OAuthFlows),
    OAuthFlow(OAuthFlow),
    Components(Components),
    Schema(Schema),
    /// Untyped content: extension data, example values, fetched documents.
    Json(Value),
}

impl Node {
    /// Short kind name for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Document(_) => "document",
            Self::Info(_) => "info",
            Self::Contact(_) => "contact",
            Self::License(_) => "license",
            Self::Server(_) => "server",
            Self::ServerVariable(_) => "server variable",
            Self::ExternalDocs(_) => "external docs",
            Self::Tag(_) => "tag",
            Self::Parameter(_) => "parameter",
            Self::Header(_) => "header",
            Self::Example(_) => "example",
            Self::Link(_) => "link",
            Self::MediaType(_) => "media type",
            Self::Encoding(_) => "encoding",
            Self::RequestBody(_) => "request body",
            Self::Response(_) => "response",
            Self::Operation(_) => "operation",
            Self::PathItem(_) => "path item",
            Self::Callback(_) => "callback",
            Self::SecurityScheme(_) => "security scheme",
            Self::OAuthFlows(_) => "oauth flows",
            Self::OAuthFlow(_) => "oauth flow",
            Self::Components(_) => "components",
            Self::Schema(_) => "schema",
            Self::Json(_) => "json",
        }
    }

    /// The node as a generic JSON tree.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Document(n) => n.to_node(),
            Self::Info(n) => n.to_node(),
            Self::Contact(n) => n.to_node(),
            Self::License(n) => n.to_node(),
            Self::Server(n) => n.to_node(),
            Self::ServerVariable(n) => n.to_node(),
            Self::ExternalDocs(n) => n.to_node(),
            Self::Tag(n) => n.to_node(),
            Self::Parameter(n) => n.to_node(),
            Self::Header(n) => n.to_node(),
            Self::Example(n) => n.to_node(),
            Self::Link(n) => n.to_node(),
            Self::MediaType(n) => n.to_node(),
            Self::Encoding(n) => n.to_node(),
            Self::RequestBody(n) => n.to_node(),
            Self::Response(n) => n.to_node(),
            Self::Operation(n) => n.to_node(),
            Self::PathItem(n) => n.to_node(),
            Self::Callback(n) => n.to_node(),
            Self::SecurityScheme(n) => n.to_node(),
            Self::OAuthFlows(n) => n.to_node(),
            Self::OAuthFlow(n) => n.to_node(),
            Self::Components(n) => n.to_node(),
            Self::Schema(n) => n.to_node(),
            Self::Json(v) => v.clone(),
        }
    }
}

/// Resolves a remaining key path relative to a node's own fields.
pub trait Addressable {
    /// `Ok(None)` means nothing is there; `Err(Error::Unsupported)` means the
    /// location exists but cannot be addressed into.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] for addressing inside a schema body.
    fn resolve(&self, keys: &[String]) -> LookupResult;

    /// The node itself, as reached from a containing collection.
    fn lookup_node(&self) -> Option<Node>;
}

/// Descends into an optional child node.
pub(crate) fn resolve_child<T: Addressable>(child: Option<&T>, rest: &[String]) -> LookupResult {
    match child {
        None => Ok(None),
        Some(child) if rest.is_empty() => Ok(child.lookup_node()),
        Some(child) => child.resolve(rest),
    }
}

/// Descends into a name-keyed collection; the collection itself is not addressable.
pub(crate) fn resolve_keyed<T: Addressable>(
    entries: Option<&IndexMap<String, T>>,
    keys: &[String],
) -> LookupResult {
    let Some((name, rest)) = keys.split_first() else {
        return Ok(None);
    };
    resolve_child(entries.and_then(|map| map.get(name.as_str())), rest)
}

/// Descends into a list by canonical, forward-only index.
pub(crate) fn resolve_indexed<T: Addressable>(items: Option<&[T]>, keys: &[String]) -> LookupResult {
    let Some((index, rest)) = keys.split_first() else {
        return Ok(None);
    };
    let item = items.zip(parse_index(index)).and_then(|(list, i)| list.get(i));
    resolve_child(item, rest)
}

/// Evaluates the remaining keys as a JSON Pointer into raw JSON content.
pub(crate) fn resolve_json(value: Option<&Value>, rest: &[String]) -> LookupResult {
    Ok(value
        .and_then(|value| evaluate_segments(rest, value))
        .map(|found| Node::Json(found.clone())))
}

/// Converts a lookup result into a concrete type.
pub trait FromLookup: Sized {
    fn from_lookup(node: &Node) -> Option<Self>;
}

macro_rules! lookup_node_types {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl FromLookup for $ty {
                fn from_lookup(node: &Node) -> Option<Self> {
                    match node {
                        Node::$variant(found) => Some(found.clone()),
                        Node::Json(value) => <$ty>::from_node(value, "").ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

lookup_node_types! {
    Info => Info,
    Contact => Contact,
    License => License,
    Server => Server,
    ServerVariable => ServerVariable,
    ExternalDocs => ExternalDocs,
    Tag => Tag,
    Parameter => Parameter,
    Header => Header,
    Example => Example,
    Link => Link,
    MediaType => MediaType,
    Encoding => Encoding,
    RequestBody => RequestBody,
    Response => Response,
    Operation => Operation,
    PathItem => PathItem,
    Callback => Callback,
    SecurityScheme => SecurityScheme,
    OAuthFlows => OAuthFlows,
    OAuthFlow => OAuthFlow,
    Components => Components,
    Schema => Schema,
}

impl FromLookup for Document {
    fn from_lookup(node: &Node) -> Option<Self> {
        match node {
            Node::Document(doc) => Some(doc.as_ref().clone()),
            Node::Json(value) => Self::from_node(value, "").ok(),
            _ => None,
        }
    }
}

impl FromLookup for Value {
    fn from_lookup(node: &Node) -> Option<Self> {
        Some(node.to_value())
    }
}

impl FromLookup for Node {
    fn from_lookup(node: &Node) -> Option<Self> {
        Some(node.clone())
    }
}

/// Memoized lookups keyed by pointer text, including misses.
#[derive(Debug, Default)]
pub struct LookupCache {
    entries: RwLock<HashMap<String, Option<Arc<Node>>>>,
}

impl LookupCache {
    pub fn get(&self, key: &str) -> Option<Option<Arc<Node>>> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.get(key).cloned()
    }

    pub fn insert(&self, key: String, node: Option<Arc<Node>>) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key, node);
    }

    pub fn clear(&self) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A fresh, empty cache: cached lookups describe one document instance.
impl Clone for LookupCache {
    fn clone(&self) -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_lookup_evaluates_pointer() {
        let value = json!({"a": [{"b": 1}]});
        let keys = ["a", "0", "b"].map(String::from);
        assert_eq!(
            resolve_json(Some(&value), &keys).unwrap(),
            Some(Node::Json(json!(1)))
        );
        let keys = ["a", "1"].map(String::from);
        assert_eq!(resolve_json(Some(&value), &keys).unwrap(), None);
    }

    #[test]
    fn value_from_typed_node_serializes_it() {
        let tag = Tag::from_node(&json!({"name": "pets"}), "").unwrap();
        let value = Value::from_lookup(&Node::Tag(tag)).unwrap();
        assert_eq!(value, json!({"name": "pets"}));
    }

    #[test]
    fn typed_from_json_parses_each_time() {
        let node = Node::Json(json!({"name": "pets", "description": "all pets"}));
        let tag = Tag::from_lookup(&node).unwrap();
        assert_eq!(tag.name, "pets");
        assert!(Parameter::from_lookup(&node).is_none());
    }

    #[test]
    fn cache_memoizes_misses_and_clears() {
        let cache = LookupCache::default();
        assert!(cache.get("/a").is_none());
        cache.insert("/a".to_string(), None);
        assert_eq!(cache.get("/a"), Some(None));
        assert!(cache.clone().is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}
