//! The OpenAPI node model.
//!
//! Every node type parses from the generic JSON tree ([`FromNode`]), writes
//! back to it ([`ToNode`]) and answers key-path lookups
//! ([`crate::lookup::Addressable`]). Unknown `x-*` keys are kept in
//! [`Extensions`]; any other unknown key is a parse error.

use crate::error::Error;
use serde_json::Value;

pub mod callback;
pub mod components;
pub mod document;
pub mod example;
pub mod extensions;
pub mod info;
pub mod link;
pub mod media;
pub mod operation;
pub mod parameter;
pub mod path_item;
pub mod reference;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod server;
pub mod tag;

pub use callback::{Callback, CallbackKey};
pub use components::Components;
pub use document::Document;
pub use example::Example;
pub use extensions::Extensions;
pub use info::{Contact, Info, License};
pub use link::{Link, LinkValue};
pub use media::{Encoding, MediaType};
pub use operation::Operation;
pub use parameter::{Header, Parameter, ParameterDetails, ParameterLocation};
pub use path_item::{PathItem, PathItemReference, Paths};
pub use reference::{
    CallbackOrRef, ExampleOrRef, HeaderOrRef, LinkOrRef, ParameterOrRef, RefOr, Reference,
    RequestBodyOrRef, ResponseOrRef, SecuritySchemeOrRef,
};
pub use request_body::RequestBody;
pub use response::{Response, Responses};
pub use schema::{Schema, SchemaLocation};
pub use security::{OAuthFlow, OAuthFlows, SecurityRequirement, SecurityScheme, SecuritySchemeType};
pub use server::{Server, ServerVariable};
pub use tag::{ExternalDocs, Tag};

/// Parses a node from the generic JSON tree.
pub trait FromNode: Sized {
    /// `path` is the JSON Pointer of `value` inside the document, used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] on any structural problem.
    fn from_node(value: &Value, path: &str) -> Result<Self, Error>;
}

/// Serializes a node back into the generic JSON tree.
pub trait ToNode {
    fn to_node(&self) -> Value;
}

/// Node kinds that can be declared under `components` and referenced with `$ref`.
pub trait Component {
    /// The `components` section holding this kind (`parameters`, `responses`, ...).
    const SECTION: &'static str;
}
