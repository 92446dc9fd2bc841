use crate::error::Error;
use crate::lookup::{resolve_child, resolve_indexed, resolve_keyed, Addressable, LookupResult, Node};
use crate::model::{
    CallbackOrRef, Extensions, ExternalDocs, FromNode, ParameterOrRef, RequestBodyOrRef, Responses,
    SecurityRequirement, Server, ToNode,
};
use crate::spec::reader::ObjectReader;
use crate::spec::writer::ObjectWriter;
use indexmap::IndexMap;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    pub tags: Option<Vec<String>>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub external_docs: Option<ExternalDocs>,
    pub operation_id: Option<String>,
    pub parameters: Option<Vec<ParameterOrRef>>,
    pub request_body: Option<RequestBodyOrRef>,
    /// Required by 3.0, optional since 3.1.
    pub responses: Option<Responses>,
    pub callbacks: Option<IndexMap<String, CallbackOrRef>>,
    pub deprecated: Option<bool>,
    pub security: Option<Vec<SecurityRequirement>>,
    pub servers: Option<Vec<Server>>,
    pub extensions: Extensions,
}

impl FromNode for Operation {
    fn from_node(value: &Value, path: &str) -> Result<Self, Error> {
        let mut r = ObjectReader::new(value, path, "operation")?;
        Ok(Self {
            tags: r.string_list("tags")?,
            summary: r.string("summary")?,
            description: r.string("description")?,
            external_docs: r.node("externalDocs")?,
            operation_id: r.string("operationId")?,
            parameters: r.list("parameters")?,
            request_body: r.node("requestBody")?,
            responses: r.node("responses")?,
            callbacks: r.map("callbacks")?,
            deprecated: r.bool("deprecated")?,
            security: r.list("security")?,
            servers: r.list("servers")?,
            extensions: r.finish()?,
        })
    }
}

impl ToNode for Operation {
    fn to_node(&self) -> Value {
        ObjectWriter::new()
            .opt_strings("tags", self.tags.as_ref())
            .opt_string("summary", self.summary.as_ref())
            .opt_string("description", self.description.as_ref())
            .opt_node("externalDocs", self.external_docs.as_ref())
            .opt_string("operationId", self.operation_id.as_ref())
            .opt_list("parameters", self.parameters.as_ref())
            .opt_node("requestBody", self.request_body.as_ref())
            .opt_node("responses", self.responses.as_ref())
            .opt_map("callbacks", self.callbacks.as_ref())
            .opt_bool("deprecated", self.deprecated)
            .opt_list("security", self.security.as_ref())
            .opt_list("servers", self.servers.as_ref())
            .extensions(&self.extensions)
            .finish()
    }
}

impl Addressable for Operation {
    fn resolve(&self, keys: &[String]) -> LookupResult {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(self.lookup_node());
        };
        match first.as_str() {
            "externalDocs" => resolve_child(self.external_docs.as_ref(), rest),
            "parameters" => resolve_indexed(self.parameters.as_deref(), rest),
            "requestBody" => resolve_child(self.request_body.as_ref(), rest),
            "responses" => self
                .responses
                .as_ref()
                .map_or(Ok(None), |responses| responses.resolve(rest)),
            "callbacks" => resolve_keyed(self.callbacks.as_ref(), rest),
            "servers" => resolve_indexed(self.servers.as_deref(), rest),
            _ => self.extensions.resolve(keys),
        }
    }

    fn lookup_node(&self) -> Option<Node> {
        Some(Node::Operation(self.clone()))
    }
}
