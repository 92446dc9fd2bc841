//! Mutable depth-first traversal over every schema and `$ref` slot.
//!
//! The order is fixed by the field order below, so two walks over an
//! unchanged document visit the same slots in the same sequence. The
//! initializer relies on that to write results back by ordinal.

use crate::lookup::{FromLookup, Node};
use crate::model::{
    Callback, Components, Document, Encoding, Example, Header, Link, MediaType, Operation,
    Parameter, ParameterDetails, PathItem, PathItemReference, Paths, RefOr, Reference,
    RequestBody, Response, Responses, Schema, SchemaLocation, SecurityScheme,
};
use crate::pointer::JsonPointer;
use crate::resolver::registry::stamp_locations;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt::Display;
use url::Url;

/// A `$ref` placeholder the initializer can fill.
pub(crate) trait RefSlot: Send {
    fn target(&self) -> &str;
    fn is_resolved(&self) -> bool;
    /// Whether a `$ref` found at the target should be followed further.
    fn follows_chains(&self) -> bool {
        true
    }
    /// Converts and stores resolved content; false if it does not fit.
    ///
    /// Content from another document arrives with its `origin` there; its
    /// schemas are stamped with locations in that document, and those
    /// declaring an `$id` are added to `identified`.
    fn accept(
        &mut self,
        node: &Node,
        origin: Option<&SchemaLocation>,
        identified: &mut Vec<(Url, Value)>,
    ) -> bool;
}

fn imported<W: Walk>(
    mut content: W,
    origin: Option<&SchemaLocation>,
    identified: &mut Vec<(Url, Value)>,
) -> W {
    if let Some(origin) = origin {
        identified.extend(stamp_locations(
            &mut content,
            &origin.base_uri,
            origin.pointer.clone(),
        ));
    }
    content
}

impl<T: Walk + FromLookup + Send> RefSlot for Reference<T> {
    fn target(&self) -> &str {
        Reference::target(self)
    }

    fn is_resolved(&self) -> bool {
        Reference::is_resolved(self)
    }

    fn accept(
        &mut self,
        node: &Node,
        origin: Option<&SchemaLocation>,
        identified: &mut Vec<(Url, Value)>,
    ) -> bool {
        if self.is_resolved() {
            return false;
        }
        T::from_lookup(node)
            .is_some_and(|content| self.set_resolved(imported(content, origin, identified)))
    }
}

impl RefSlot for PathItemReference {
    fn target(&self) -> &str {
        PathItemReference::target(self)
    }

    fn is_resolved(&self) -> bool {
        PathItemReference::is_resolved(self)
    }

    // A path item target is merged as found, local fields and all.
    fn follows_chains(&self) -> bool {
        false
    }

    // A target whose own `$ref` is still pending is retried on a later pass.
    fn accept(
        &mut self,
        node: &Node,
        origin: Option<&SchemaLocation>,
        identified: &mut Vec<(Url, Value)>,
    ) -> bool {
        if self.is_resolved() {
            return false;
        }
        PathItem::from_lookup(node)
            .filter(|item| !matches!(&item.reference, Some(r) if !r.is_resolved()))
            .is_some_and(|content| self.set_resolved(imported(content, origin, identified)))
    }
}

pub(crate) trait Visitor {
    fn schema(&mut self, _at: &JsonPointer, _schema: &mut Schema) {}
    fn reference(&mut self, _at: &JsonPointer, _slot: &mut dyn RefSlot) {}
}

pub(crate) struct Walker<'v> {
    at: JsonPointer,
    visitor: &'v mut dyn Visitor,
}

impl<'v> Walker<'v> {
    pub(crate) fn new(visitor: &'v mut dyn Visitor) -> Self {
        Self::at(JsonPointer::root(), visitor)
    }

    /// A walker for a node found at `at` rather than at the root.
    pub(crate) fn at(at: JsonPointer, visitor: &'v mut dyn Visitor) -> Self {
        Self { at, visitor }
    }

    fn enter<W: Walk + ?Sized>(&mut self, segment: impl Into<String>, node: &mut W) {
        self.at.push(segment);
        node.walk(self);
        self.at.pop();
    }

    fn field<W: Walk>(&mut self, key: &str, node: Option<&mut W>) {
        if let Some(node) = node {
            self.enter(key, node);
        }
    }

    fn map<K: Display, W: Walk>(&mut self, key: &str, entries: Option<&mut IndexMap<K, W>>) {
        let Some(entries) = entries else {
            return;
        };
        self.at.push(key);
        for (name, node) in entries.iter_mut() {
            self.enter(name.to_string(), node);
        }
        self.at.pop();
    }

    fn list<W: Walk>(&mut self, key: &str, items: Option<&mut Vec<W>>) {
        let Some(items) = items else {
            return;
        };
        self.at.push(key);
        for (index, node) in items.iter_mut().enumerate() {
            self.enter(index.to_string(), node);
        }
        self.at.pop();
    }

    fn reference(&mut self, slot: &mut dyn RefSlot) {
        self.visitor.reference(&self.at, slot);
    }
}

pub(crate) trait Walk {
    fn walk(&mut self, w: &mut Walker<'_>);
}

impl Walk for Schema {
    fn walk(&mut self, w: &mut Walker<'_>) {
        w.visitor.schema(&w.at, self);
    }
}

impl<T: Walk + FromLookup + Send> Walk for RefOr<T> {
    fn walk(&mut self, w: &mut Walker<'_>) {
        match self {
            Self::Item(item) => item.walk(w),
            Self::Reference(reference) => w.reference(reference),
        }
    }
}

impl Walk for Document {
    fn walk(&mut self, w: &mut Walker<'_>) {
        w.field("paths", self.paths.as_mut());
        w.map("webhooks", self.webhooks.as_mut());
        w.field("components", self.components.as_mut());
    }
}

impl Walk for Components {
    fn walk(&mut self, w: &mut Walker<'_>) {
        w.map("schemas", self.schemas.as_mut());
        w.map("responses", self.responses.as_mut());
        w.map("parameters", self.parameters.as_mut());
        w.map("examples", self.examples.as_mut());
        w.map("requestBodies", self.request_bodies.as_mut());
        w.map("headers", self.headers.as_mut());
        w.map("securitySchemes", self.security_schemes.as_mut());
        w.map("links", self.links.as_mut());
        w.map("callbacks", self.callbacks.as_mut());
        w.map("pathItems", self.path_items.as_mut());
    }
}

impl Walk for Paths {
    fn walk(&mut self, w: &mut Walker<'_>) {
        for (template, item) in &mut self.entries {
            w.enter(template.to_string(), item);
        }
    }
}

impl Walk for PathItem {
    fn walk(&mut self, w: &mut Walker<'_>) {
        if let Some(reference) = self.reference.as_mut() {
            w.reference(reference);
        }
        for (method, operation) in self.operations_mut() {
            w.field(method, operation);
        }
        w.list("parameters", self.parameters.as_mut());
    }
}

impl Walk for Operation {
    fn walk(&mut self, w: &mut Walker<'_>) {
        w.list("parameters", self.parameters.as_mut());
        w.field("requestBody", self.request_body.as_mut());
        w.field("responses", self.responses.as_mut());
        w.map("callbacks", self.callbacks.as_mut());
    }
}

impl Walk for ParameterDetails {
    fn walk(&mut self, w: &mut Walker<'_>) {
        w.field("schema", self.schema.as_mut());
        w.map("examples", self.examples.as_mut());
        w.map("content", self.content.as_mut());
    }
}

impl Walk for Parameter {
    fn walk(&mut self, w: &mut Walker<'_>) {
        self.details.walk(w);
    }
}

impl Walk for Header {
    fn walk(&mut self, w: &mut Walker<'_>) {
        self.details.walk(w);
    }
}

impl Walk for MediaType {
    fn walk(&mut self, w: &mut Walker<'_>) {
        w.field("schema", self.schema.as_mut());
        w.map("examples", self.examples.as_mut());
        w.map("encoding", self.encoding.as_mut());
    }
}

impl Walk for Encoding {
    fn walk(&mut self, w: &mut Walker<'_>) {
        w.map("headers", self.headers.as_mut());
    }
}

impl Walk for RequestBody {
    fn walk(&mut self, w: &mut Walker<'_>) {
        w.map("content", Some(&mut self.content));
    }
}

impl Walk for Response {
    fn walk(&mut self, w: &mut Walker<'_>) {
        w.map("headers", self.headers.as_mut());
        w.map("content", self.content.as_mut());
        w.map("links", self.links.as_mut());
    }
}

impl Walk for Responses {
    fn walk(&mut self, w: &mut Walker<'_>) {
        for (status, response) in &mut self.entries {
            w.enter(status.clone(), response);
        }
    }
}

impl Walk for Callback {
    fn walk(&mut self, w: &mut Walker<'_>) {
        for (key, item) in &mut self.entries {
            w.enter(key.to_string(), item);
        }
    }
}

// Leaf kinds: nothing inside them is a schema or a `$ref`.
impl Walk for Example {
    fn walk(&mut self, _w: &mut Walker<'_>) {}
}

impl Walk for Link {
    fn walk(&mut self, _w: &mut Walker<'_>) {}
}

impl Walk for SecurityScheme {
    fn walk(&mut self, _w: &mut Walker<'_>) {}
}

/// Walks a whole document with `visitor`.
pub(crate) fn walk_document(document: &mut Document, visitor: &mut dyn Visitor) {
    let mut walker = Walker::new(visitor);
    document.walk(&mut walker);
}
