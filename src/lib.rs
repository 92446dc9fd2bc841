//! OpenAPI 3.0/3.1 documents as a typed node graph.
//!
//! Documents parse losslessly from JSON or YAML into [`model::Document`],
//! serialize back to an equal tree, and resolve their `$ref` graph, across
//! documents when a [`fetch::Fetch`] implementation is supplied. Any node can
//! then be looked up by JSON Pointer with [`model::Document::find`].

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod expression;
pub mod fetch;
pub mod fs;
pub mod lookup;
pub mod model;
pub mod path_template;
pub mod pointer;
pub mod resolver;
pub mod spec;

pub use error::Error;
pub use model::Document;
pub use pointer::JsonPointer;
pub use resolver::{InitializeReport, ResolveOptions, SchemaRegistry};
